use crate::domain::transaction::TxType;

/// One imported row, sent from the reader to the processor.
///
/// Members are referenced by name because ids only exist once the ledger
/// has assigned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    AddTransaction {
        tx_type: TxType,
        description: String,
        amount: String,
        category: String,
        member: Option<String>,
    },
    AddMember {
        name: String,
        role: String,
        limit: String,
    },
}
