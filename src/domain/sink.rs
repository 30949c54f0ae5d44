use crate::{
    common::error::LedgerError,
    domain::{
        member::{FamilyMember, MemberId, NewMember},
        transaction::{NewTransaction, Transaction},
    },
};

/// Anything that accepts new transactions: the entry form and the batch
/// importer write through this instead of a concrete ledger.
pub trait LedgerSink {
    fn add_transaction(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError>;

    /// Whether expenses need a member attached.
    fn tracks_members(&self) -> bool {
        false
    }

    fn member_id_by_name(&self, _name: &str) -> Option<MemberId> {
        None
    }

    /// `Ok(None)` when this ledger keeps no member roster.
    fn add_member(&mut self, _new: NewMember) -> Result<Option<FamilyMember>, LedgerError> {
        Ok(None)
    }
}
