use chrono::Utc;

use crate::{
    common::{
        confirm::{ConfirmToken, ConfirmationGate},
        error::{LedgerError, ValidationError},
        money::Money,
        observer::Observers,
    },
    domain::{
        ids::IdGenerator,
        member::{FamilyMember, MemberId, NewMember},
        sink::LedgerSink,
        summary::{CategoryBreakdown, Summary},
        transaction::{NewTransaction, Transaction, TransactionId, TxType},
    },
    io::store::{self, FAMILY_MEMBERS_KEY, FAMILY_TRANSACTIONS_KEY, SnapshotStore},
};

/// Household transactions plus the member roster they are attributed to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyState {
    transactions: Vec<Transaction>,
    members: Vec<FamilyMember>,
}

impl FamilyState {
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn members(&self) -> &[FamilyMember] {
        &self.members
    }

    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    pub fn member(&self, id: MemberId) -> Option<&FamilyMember> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn member_by_name(&self, name: &str) -> Option<&FamilyMember> {
        let name = name.trim();
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn transactions_for(&self, member: MemberId) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.member_id == Some(member))
    }

    /// Sum of the member's expenses, computed from the transactions.
    pub fn spent_by(&self, member: MemberId) -> Money {
        self.transactions
            .iter()
            .filter(|t| t.is_spending_of(member))
            .map(|t| t.amount)
            .sum()
    }

    pub fn spending_percentage(&self, member: MemberId) -> f64 {
        self.member(member)
            .map(FamilyMember::spending_percentage)
            .unwrap_or(0.0)
    }

    pub fn summary(&self) -> Summary {
        Summary::compute(&self.transactions)
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        CategoryBreakdown::compute(&self.transactions)
    }

    fn member_mut(&mut self, id: MemberId) -> Option<&mut FamilyMember> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    /// Inserts a transaction and charges its member in one step. This and
    /// `detach` are the only writers of `total_spent`.
    fn attach(&mut self, tx: Transaction) -> Result<(), ValidationError> {
        if tx.is_expense() {
            if let Some(m) = tx.member_id.and_then(|id| self.member_mut(id)) {
                m.total_spent = m
                    .total_spent
                    .checked_add(tx.amount)
                    .ok_or(ValidationError::AmountOutOfRange)?;
            }
        }
        self.transactions.insert(0, tx);
        Ok(())
    }

    fn detach(&mut self, id: TransactionId) -> Option<Transaction> {
        let pos = self.transactions.iter().position(|t| t.id == id)?;
        let tx = self.transactions.remove(pos);
        if tx.is_expense() {
            if let Some(m) = tx.member_id.and_then(|mid| self.member_mut(mid)) {
                m.total_spent -= tx.amount;
            }
        }
        Some(tx)
    }

    /// Recomputes every `total_spent` from the transactions. Returns how many
    /// members had drifted.
    fn reconcile(&mut self) -> usize {
        let totals: Vec<Money> = self.members.iter().map(|m| self.spent_by(m.id)).collect();
        let mut drifted = 0;
        for (member, actual) in self.members.iter_mut().zip(totals) {
            if member.total_spent != actual {
                tracing::warn!(
                    member = member.id,
                    stored = %member.total_spent,
                    actual = %actual,
                    "member spending out of sync, recomputed"
                );
                member.total_spent = actual;
                drifted += 1;
            }
        }
        drifted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingAction {
    DeleteTransaction(TransactionId),
    DeleteMember(MemberId),
    ResetAll,
}

/// What a confirmed action actually did.
#[derive(Debug, Clone, PartialEq)]
pub enum FamilyOutcome {
    TransactionDeleted(Transaction),
    MemberDeleted {
        member: FamilyMember,
        transactions: Vec<Transaction>,
    },
    Reset,
    /// The target was already gone when the action was confirmed.
    Nothing,
}

#[derive(Debug)]
pub struct FamilyLedger<S: SnapshotStore> {
    state: FamilyState,
    store: S,
    ids: IdGenerator,
    pending: ConfirmationGate<PendingAction>,
    observers: Observers<FamilyState>,
}

impl<S: SnapshotStore> FamilyLedger<S> {
    pub fn open(store: S) -> Result<Self, LedgerError> {
        let transactions: Vec<Transaction> =
            store::load_json_or_default(&store, FAMILY_TRANSACTIONS_KEY)?;
        let members: Vec<FamilyMember> = store::load_json_or_default(&store, FAMILY_MEMBERS_KEY)?;

        let ids = IdGenerator::resume_after(
            transactions
                .iter()
                .map(|t| t.id)
                .chain(members.iter().map(|m| m.id)),
        );
        let mut state = FamilyState {
            transactions,
            members,
        };
        let drifted = state.reconcile();
        tracing::debug!(
            transactions = state.transactions.len(),
            members = state.members.len(),
            drifted,
            "family ledger restored"
        );

        Ok(Self {
            state,
            store,
            ids,
            pending: ConfirmationGate::new(),
            observers: Observers::default(),
        })
    }

    pub fn state(&self) -> &FamilyState {
        &self.state
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state.transactions()
    }

    pub fn members(&self) -> &[FamilyMember] {
        self.state.members()
    }

    pub fn member(&self, id: MemberId) -> Option<&FamilyMember> {
        self.state.member(id)
    }

    pub fn summary(&self) -> Summary {
        self.state.summary()
    }

    pub fn category_breakdown(&self) -> CategoryBreakdown {
        self.state.category_breakdown()
    }

    pub fn spending_percentage(&self, member: MemberId) -> f64 {
        self.state.spending_percentage(member)
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&FamilyState) + Send + 'static,
    {
        self.observers.subscribe(callback);
    }

    pub fn add_family_member(&mut self, new: NewMember) -> Result<FamilyMember, LedgerError> {
        let (name, role, spending_limit) = new.validate()?;
        let member = FamilyMember {
            id: self.ids.next(),
            name,
            role,
            spending_limit,
            total_spent: Money::zero(),
        };
        let mut members = self.state.members.clone();
        members.push(member.clone());
        store::save_json(&mut self.store, FAMILY_MEMBERS_KEY, &members)?;
        self.state.members = members;
        self.observers.notify(&self.state);
        tracing::debug!(id = member.id, role = %member.role, "family member added");
        Ok(member)
    }

    /// Adds a transaction. An expense must name an existing member, who is
    /// charged the amount in the same step.
    pub fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        let mut valid = new.validate()?;
        match valid.tx_type {
            TxType::Expense => {
                let id = valid.member_id.ok_or(ValidationError::MissingMember)?;
                if self.state.member(id).is_none() {
                    return Err(ValidationError::UnknownMember(id).into());
                }
            }
            TxType::Income => valid.member_id = None,
        }

        let now = Utc::now();
        let tx = valid.into_transaction(self.ids.next_at(now), now);
        let mut next = self.state.clone();
        next.attach(tx.clone())?;
        if Summary::try_compute(&next.transactions).is_none() {
            return Err(ValidationError::AmountOutOfRange.into());
        }
        self.commit(next)?;
        tracing::debug!(id = tx.id, amount = %tx.amount, kind = %tx.tx_type, member = ?tx.member_id, "transaction added");
        Ok(tx)
    }

    pub fn request_delete_transaction(&mut self, id: TransactionId) -> Option<ConfirmToken> {
        self.state.transactions.iter().find(|t| t.id == id)?;
        Some(self.pending.request(PendingAction::DeleteTransaction(id)))
    }

    /// Deleting a member also deletes every transaction attributed to them.
    pub fn request_delete_member(&mut self, id: MemberId) -> Option<ConfirmToken> {
        self.state.member(id)?;
        Some(self.pending.request(PendingAction::DeleteMember(id)))
    }

    /// Wipes transactions and members, including their stored snapshots.
    pub fn request_reset(&mut self) -> ConfirmToken {
        self.pending.request(PendingAction::ResetAll)
    }

    pub fn decline(&mut self, token: ConfirmToken) -> bool {
        self.pending.cancel(token)
    }

    /// Runs the parked action. If persisting fails the ledger is left as it
    /// was and the token can be redeemed again.
    pub fn confirm(&mut self, token: ConfirmToken) -> Result<FamilyOutcome, LedgerError> {
        let action = *self
            .pending
            .peek(token)
            .ok_or(LedgerError::UnknownConfirmation(token))?;

        let outcome = match action {
            PendingAction::DeleteTransaction(id) => {
                let mut next = self.state.clone();
                match next.detach(id) {
                    Some(tx) => {
                        self.commit(next)?;
                        tracing::debug!(id, "transaction deleted");
                        FamilyOutcome::TransactionDeleted(tx)
                    }
                    None => FamilyOutcome::Nothing,
                }
            }
            PendingAction::DeleteMember(id) => {
                match self.state.members.iter().position(|m| m.id == id) {
                    Some(pos) => {
                        let mut next = self.state.clone();
                        let (removed, kept): (Vec<_>, Vec<_>) =
                            std::mem::take(&mut next.transactions)
                                .into_iter()
                                .partition(|t| t.member_id == Some(id));
                        next.transactions = kept;
                        let member = next.members.remove(pos);
                        self.commit(next)?;
                        tracing::debug!(
                            id,
                            cascaded = removed.len(),
                            "family member deleted with their transactions"
                        );
                        FamilyOutcome::MemberDeleted {
                            member,
                            transactions: removed,
                        }
                    }
                    None => FamilyOutcome::Nothing,
                }
            }
            PendingAction::ResetAll => {
                self.wipe_snapshots()?;
                self.state = FamilyState::default();
                self.pending.clear();
                self.observers.notify(&self.state);
                tracing::debug!("family ledger reset");
                return Ok(FamilyOutcome::Reset);
            }
        };
        self.pending.take(token);
        Ok(outcome)
    }

    /// Persists both collections of `next`, then makes it the current state.
    /// When the second write fails the first key is put back.
    fn commit(&mut self, next: FamilyState) -> Result<(), LedgerError> {
        store::save_json(&mut self.store, FAMILY_TRANSACTIONS_KEY, &next.transactions)?;
        if let Err(e) = store::save_json(&mut self.store, FAMILY_MEMBERS_KEY, &next.members) {
            self.restore_transactions_snapshot();
            return Err(e.into());
        }
        self.state = next;
        self.observers.notify(&self.state);
        Ok(())
    }

    fn wipe_snapshots(&mut self) -> Result<(), LedgerError> {
        self.store.remove(FAMILY_TRANSACTIONS_KEY)?;
        if let Err(e) = self.store.remove(FAMILY_MEMBERS_KEY) {
            self.restore_transactions_snapshot();
            return Err(e.into());
        }
        Ok(())
    }

    fn restore_transactions_snapshot(&mut self) {
        if let Err(e) = store::save_json(
            &mut self.store,
            FAMILY_TRANSACTIONS_KEY,
            &self.state.transactions,
        ) {
            tracing::error!(error = %e, "could not restore family transactions snapshot");
        }
    }
}

impl<S: SnapshotStore> LedgerSink for FamilyLedger<S> {
    fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        FamilyLedger::add_transaction(self, new)
    }

    fn tracks_members(&self) -> bool {
        true
    }

    fn member_id_by_name(&self, name: &str) -> Option<MemberId> {
        self.state.member_by_name(name).map(|m| m.id)
    }

    fn add_member(&mut self, new: NewMember) -> Result<Option<FamilyMember>, LedgerError> {
        self.add_family_member(new).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use std::sync::atomic::Ordering;

    use crate::{
        domain::category::Category,
        io::store::{MemoryStore, testing::FlakyStore},
    };

    fn ledger() -> FamilyLedger<MemoryStore> {
        FamilyLedger::open(MemoryStore::new()).unwrap()
    }

    fn add_member(ledger: &mut FamilyLedger<MemoryStore>, name: &str, limit: &str) -> MemberId {
        ledger
            .add_family_member(NewMember::new(name, "teen", limit))
            .unwrap()
            .id
    }

    fn spend(
        ledger: &mut FamilyLedger<MemoryStore>,
        member: MemberId,
        amount: &str,
        category: &str,
    ) -> Transaction {
        ledger
            .add_transaction(NewTransaction::expense("spend", amount, category).by_member(member))
            .unwrap()
    }

    #[test]
    fn member_spending_tracks_expenses() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "300", "food");
        spend(&mut ledger, ada, "250", "transport");

        let member = ledger.member(ada).unwrap();
        assert_eq!(member.total_spent, Money::from_units(550));
        assert_eq!(ledger.spending_percentage(ada), 55.0);
        assert_eq!(ledger.state().spent_by(ada), member.total_spent);
    }

    #[test]
    fn new_member_starts_with_nothing_spent() {
        let mut ledger = ledger();
        let m = ledger
            .add_family_member(NewMember::new("Bo", "child", "50"))
            .unwrap();
        assert_eq!(m.total_spent, Money::zero());
        assert_eq!(ledger.members().len(), 1);
        assert_eq!(ledger.spending_percentage(m.id), 0.0);
    }

    #[test]
    fn invalid_member_is_rejected() {
        let mut ledger = ledger();
        let err = ledger
            .add_family_member(NewMember::new("Bo", "child", "0"))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::NonPositiveSpendingLimit)
        ));
        assert!(ledger.members().is_empty());
    }

    #[test]
    fn expense_requires_an_existing_member() {
        let mut ledger = ledger();
        let err = ledger
            .add_transaction(NewTransaction::expense("bus", "3", "transport"))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::MissingMember)
        ));

        let err = ledger
            .add_transaction(NewTransaction::expense("bus", "3", "transport").by_member(77))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::UnknownMember(77))
        ));
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn income_needs_no_member_and_drops_one_if_given() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "100");
        let tx = ledger
            .add_transaction(NewTransaction::income("pay", "500", "salary").by_member(ada))
            .unwrap();
        assert_eq!(tx.member_id, None);
        assert_eq!(ledger.member(ada).unwrap().total_spent, Money::zero());
    }

    #[test]
    fn deleting_expense_refunds_member() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "300", "food");
        let tx = spend(&mut ledger, ada, "250", "food");

        let token = ledger.request_delete_transaction(tx.id).unwrap();
        let outcome = ledger.confirm(token).unwrap();

        assert_eq!(outcome, FamilyOutcome::TransactionDeleted(tx));
        assert_eq!(
            ledger.member(ada).unwrap().total_spent,
            Money::from_units(300)
        );
        assert_eq!(ledger.category_breakdown().get(Category::Food), Money::from_units(300));
    }

    #[test]
    fn deleting_member_cascades_to_their_transactions() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        let bo = add_member(&mut ledger, "Bo", "1000");
        ledger
            .add_transaction(NewTransaction::income("pay", "2000", "salary"))
            .unwrap();
        spend(&mut ledger, ada, "300", "food");
        spend(&mut ledger, bo, "40", "entertainment");
        spend(&mut ledger, ada, "100", "utilities");

        let token = ledger.request_delete_member(ada).unwrap();
        assert_eq!(ledger.members().len(), 2, "nothing happens before confirm");

        let FamilyOutcome::MemberDeleted {
            member,
            transactions,
        } = ledger.confirm(token).unwrap()
        else {
            panic!("expected member deletion");
        };
        assert_eq!(member.id, ada);
        assert_eq!(transactions.len(), 2);

        assert!(ledger.member(ada).is_none());
        assert_eq!(ledger.state().transactions_for(ada).count(), 0);
        assert_eq!(ledger.transactions().len(), 2);
        let summary = ledger.summary();
        assert_eq!(summary.expenses, Money::from_units(40));
        assert_eq!(summary.balance, Money::from_units(1960));
        assert_eq!(ledger.category_breakdown().get(Category::Food), Money::zero());
    }

    #[test]
    fn declined_member_delete_changes_nothing() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "10", "food");
        let before = ledger.state().clone();

        let token = ledger.request_delete_member(ada).unwrap();
        assert!(ledger.decline(token));
        assert!(ledger.confirm(token).is_err());
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.request_delete_member(999), None);
    }

    #[test]
    fn reset_wipes_state_and_snapshots() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "10", "food");
        let stale = ledger.request_delete_member(ada).unwrap();

        let token = ledger.request_reset();
        assert_eq!(ledger.confirm(token).unwrap(), FamilyOutcome::Reset);

        assert!(ledger.transactions().is_empty());
        assert!(ledger.members().is_empty());
        assert_eq!(ledger.summary(), Summary::default());
        assert!(ledger.confirm(stale).is_err(), "pending actions do not survive a reset");

        let store = ledger.into_store();
        assert!(!store.contains(FAMILY_TRANSACTIONS_KEY));
        assert!(!store.contains(FAMILY_MEMBERS_KEY));
    }

    #[test]
    fn reopen_recomputes_drifted_spending() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "120", "food");
        let mut store = ledger.into_store();

        let mut members: serde_json::Value =
            serde_json::from_str(store.raw(FAMILY_MEMBERS_KEY).unwrap()).unwrap();
        members[0]["totalSpent"] = serde_json::json!(9999);
        store
            .save(FAMILY_MEMBERS_KEY, &members.to_string())
            .unwrap();

        let reopened = FamilyLedger::open(store).unwrap();
        assert_eq!(
            reopened.member(ada).unwrap().total_spent,
            Money::from_units(120)
        );
    }

    #[test]
    fn member_lookup_by_name_is_case_insensitive() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        assert_eq!(ledger.member_id_by_name(" ada "), Some(ada));
        assert_eq!(ledger.member_id_by_name("Bo"), None);
    }

    #[test]
    fn observers_see_roster_and_transactions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ledger = ledger();
        let sink = Arc::clone(&seen);
        ledger.subscribe(move |s| {
            sink.lock()
                .unwrap()
                .push((s.members().len(), s.transactions().len()))
        });

        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "5", "food");
        let token = ledger.request_reset();
        ledger.confirm(token).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 0), (1, 1), (0, 0)]);
    }

    #[test]
    fn member_spending_out_of_range_is_rejected() {
        let mut ledger = ledger();
        let ada = add_member(&mut ledger, "Ada", "1000");
        spend(&mut ledger, ada, "900000000000000", "food");
        let before = ledger.state().clone();

        let err = ledger
            .add_transaction(
                NewTransaction::expense("more", "900000000000000", "food").by_member(ada),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::AmountOutOfRange)
        ));
        assert_eq!(ledger.state(), &before);
    }

    #[test]
    fn failed_save_leaves_family_state_unchanged() {
        let (store, failing) = FlakyStore::new();
        let mut ledger = FamilyLedger::open(store).unwrap();
        let ada = ledger
            .add_family_member(NewMember::new("Ada", "teen", "100"))
            .unwrap()
            .id;
        let tx = ledger
            .add_transaction(NewTransaction::expense("lunch", "10", "food").by_member(ada))
            .unwrap();
        let before = ledger.state().clone();
        let delete_tx = ledger.request_delete_transaction(tx.id).unwrap();
        let delete_member = ledger.request_delete_member(ada).unwrap();
        let reset = ledger.request_reset();

        failing.store(true, Ordering::SeqCst);
        assert!(
            ledger
                .add_transaction(NewTransaction::expense("more", "5", "food").by_member(ada))
                .is_err()
        );
        assert!(
            ledger
                .add_family_member(NewMember::new("Bo", "child", "50"))
                .is_err()
        );
        assert!(ledger.confirm(delete_tx).is_err());
        assert!(ledger.confirm(delete_member).is_err());
        assert!(ledger.confirm(reset).is_err());
        assert_eq!(ledger.state(), &before);
        assert_eq!(ledger.member(ada).unwrap().total_spent, Money::from_units(10));

        failing.store(false, Ordering::SeqCst);
        assert_eq!(
            ledger.confirm(delete_tx).unwrap(),
            FamilyOutcome::TransactionDeleted(tx)
        );
        assert_eq!(ledger.member(ada).unwrap().total_spent, Money::zero());
        assert_eq!(ledger.confirm(reset).unwrap(), FamilyOutcome::Reset);
        assert!(ledger.into_store().inner.raw(FAMILY_MEMBERS_KEY).is_none());
    }
}
