use crate::{
    common::confirm::ConfirmToken,
    domain::{member::MemberId, transaction::TxType},
};

/// A create/update request with a missing or unusable field. State is never
/// mutated when one of these is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description is required")]
    MissingDescription,
    #[error("amount is required")]
    MissingAmount,
    #[error("amount is not a valid number: {0}")]
    InvalidAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount is outside the supported range")]
    AmountOutOfRange,
    #[error("category is required")]
    MissingCategory,
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("category {category} is not valid for {tx_type} transactions")]
    CategoryMismatch { category: String, tx_type: TxType },
    #[error("expenses must be attributed to a family member")]
    MissingMember,
    #[error("no family member with id {0}")]
    UnknownMember(MemberId),
    #[error("member name is required")]
    MissingName,
    #[error("member role is required")]
    MissingRole,
    #[error("spending limit is required")]
    MissingSpendingLimit,
    #[error("spending limit is not a valid number: {0}")]
    InvalidSpendingLimit(String),
    #[error("spending limit must be greater than zero")]
    NonPositiveSpendingLimit,
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,
    #[error("cannot place an order for an empty cart")]
    EmptyCart,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot `{key}` is not valid json: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no pending confirmation for token {0}")]
    UnknownConfirmation(ConfirmToken),
    #[error("entry form is not open")]
    FormClosed,
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

/// Failure reported by a remote catalog or auth backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(
        "missing command. usage: ledger [--store DIR] <summary|import|import-members|export|members|cart> [personal|family] [FILE]"
    )]
    MissingArg,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown ledger `{0}`, expected `personal` or `family`")]
    UnknownBook(String),
    #[error("failed to open input file: {0}")]
    OpenInput(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Ledger(LedgerError::Store(e))
    }
}
