use crate::{
    common::error::LedgerError,
    domain::{
        category::Category,
        member::MemberId,
        sink::LedgerSink,
        transaction::{NewTransaction, Transaction, TxType},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormVariant {
    Personal,
    Family,
}

/// Field values while the form is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub tx_type: TxType,
    pub description: String,
    pub amount: String,
    pub category: String,
    pub member_id: Option<MemberId>,
}

impl Draft {
    fn empty(tx_type: TxType) -> Self {
        Self {
            tx_type,
            description: String::new(),
            amount: String::new(),
            category: String::new(),
            member_id: None,
        }
    }

    fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction {
            description: self.description.clone(),
            amount: self.amount.clone(),
            category: self.category.clone(),
            tx_type: self.tx_type,
            member_id: self.member_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Idle,
    Editing(Draft),
}

/// The add-income/add-expense form.
///
/// `Idle -> Editing -> (submit ok) -> Idle`, or `Editing -> (cancel) -> Idle`.
/// A submit that fails validation keeps the form open with the draft intact.
#[derive(Debug, Clone)]
pub struct EntryForm {
    variant: FormVariant,
    state: FormState,
}

impl EntryForm {
    pub fn new(variant: FormVariant) -> Self {
        Self {
            variant,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Editing(_))
    }

    /// Opens the form with blank fields, discarding any previous draft.
    pub fn open(&mut self, tx_type: TxType) {
        self.state = FormState::Editing(Draft::empty(tx_type));
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            FormState::Editing(d) => Some(d),
            FormState::Idle => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.state {
            FormState::Editing(d) => Some(d),
            FormState::Idle => None,
        }
    }

    /// Switches between income and expense while editing. A chosen category
    /// that is not offered for the new type is cleared, as is the member
    /// when switching to income.
    pub fn switch_type(&mut self, tx_type: TxType) {
        let Some(draft) = self.draft_mut() else {
            return;
        };
        draft.tx_type = tx_type;
        let still_valid = draft
            .category
            .parse::<Category>()
            .is_ok_and(|c| c.allowed_for(tx_type));
        if !still_valid {
            draft.category.clear();
        }
        if tx_type == TxType::Income {
            draft.member_id = None;
        }
    }

    pub fn category_options(&self) -> &'static [Category] {
        self.draft()
            .map(|d| Category::options(d.tx_type))
            .unwrap_or(&[])
    }

    pub fn member_selector_visible(&self) -> bool {
        self.variant == FormVariant::Family
            && self.draft().is_some_and(|d| d.tx_type == TxType::Expense)
    }

    pub fn cancel(&mut self) {
        self.state = FormState::Idle;
    }

    /// Hands the draft to `sink`. On success the form closes; on any error
    /// it stays open so the user can correct the input.
    pub fn submit<L: LedgerSink + ?Sized>(
        &mut self,
        sink: &mut L,
    ) -> Result<Transaction, LedgerError> {
        let draft = self.draft().ok_or(LedgerError::FormClosed)?;
        let tx = sink.add_transaction(draft.to_new_transaction())?;
        self.state = FormState::Idle;
        Ok(tx)
    }
}
