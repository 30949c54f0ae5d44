use chrono::Utc;

use crate::{
    common::{
        confirm::{ConfirmToken, ConfirmationGate},
        error::{LedgerError, ValidationError},
        observer::Observers,
    },
    domain::{
        ids::IdGenerator,
        sink::LedgerSink,
        summary::{CategoryBreakdown, Summary},
        transaction::{NewTransaction, Transaction, TransactionId},
    },
    io::store::{self, SnapshotStore, TRANSACTIONS_KEY},
};

/// Transactions of a single person, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalState {
    transactions: Vec<Transaction>,
}

impl PersonalState {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    pub fn find(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.transactions)
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        CategoryBreakdown::compute(&self.transactions)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingDelete {
    Transaction(TransactionId),
}

#[derive(Debug)]
pub struct PersonalLedger<S: SnapshotStore> {
    state: PersonalState,
    store: S,
    ids: IdGenerator,
    pending: ConfirmationGate<PendingDelete>,
    observers: Observers<PersonalState>,
}

impl<S: SnapshotStore> PersonalLedger<S> {
    pub fn open(store: S) -> Result<Self, LedgerError> {
        let transactions: Vec<Transaction> =
            store::load_json_or_default(&store, TRANSACTIONS_KEY)?;
        let ids = IdGenerator::resume_after(transactions.iter().map(|t| t.id));
        tracing::debug!(count = transactions.len(), "personal ledger restored");
        Ok(Self {
            state: PersonalState { transactions },
            store,
            ids,
            pending: ConfirmationGate::new(),
            observers: Observers::default(),
        })
    }

    pub fn state(&self) -> &PersonalState {
        &self.state
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state.transactions()
    }

    pub fn summary(&self) -> Summary {
        self.state.summary()
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        self.state.category_breakdown()
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&PersonalState) + Send + 'static,
    {
        self.observers.subscribe(callback);
    }

    /// Validates and prepends a new transaction. A member reference has no
    /// meaning here and is dropped.
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        let mut valid = new.validate()?;
        valid.member_id = None;

        let now = Utc::now();
        let tx = valid.into_transaction(self.ids.next_at(now), now);
        let mut next = self.state.transactions.clone();
        next.insert(0, tx.clone());
        if Summary::try_compute(&next).is_none() {
            return Err(ValidationError::AmountOutOfRange.into());
        }
        self.commit(next)?;
        tracing::debug!(id = tx.id, amount = %tx.amount, kind = %tx.tx_type, "transaction added");
        Ok(tx)
    }

    /// First phase of a delete. `None` when no such transaction exists.
    pub fn request_delete_transaction(&mut self, id: TransactionId) -> Option<ConfirmToken> {
        self.state.find(id)?;
        Some(self.pending.request(PendingDelete::Transaction(id)))
    }

    /// Runs the parked delete. Returns the removed transaction, or `None` if
    /// it disappeared in the meantime. The token stays redeemable when the
    /// save fails.
    pub fn confirm(&mut self, token: ConfirmToken) -> Result<Option<Transaction>, LedgerError> {
        let PendingDelete::Transaction(id) = *self
            .pending
            .peek(token)
            .ok_or(LedgerError::UnknownConfirmation(token))?;

        let Some(pos) = self.state.transactions.iter().position(|t| t.id == id) else {
            self.pending.take(token);
            return Ok(None);
        };
        let mut next = self.state.transactions.clone();
        let removed = next.remove(pos);
        self.commit(next)?;
        self.pending.take(token);
        tracing::debug!(id, "transaction deleted");
        Ok(Some(removed))
    }

    pub fn decline(&mut self, token: ConfirmToken) -> bool {
        self.pending.cancel(token)
    }

    /// Persists `next` and only then makes it the current list.
    fn commit(&mut self, next: Vec<Transaction>) -> Result<(), LedgerError> {
        store::save_json(&mut self.store, TRANSACTIONS_KEY, &next)?;
        self.state.transactions = next;
        self.observers.notify(&self.state);
        Ok(())
    }
}

impl<S: SnapshotStore> LedgerSink for PersonalLedger<S> {
    fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        PersonalLedger::add_transaction(self, new)
    }
}
