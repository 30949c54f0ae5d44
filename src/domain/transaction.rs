use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    common::{error::ValidationError, money::Money},
    domain::{category::Category, member::MemberId},
};

pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    pub amount: Money,
    pub category: Category,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<MemberId>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.tx_type == TxType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.tx_type == TxType::Income
    }

    /// Expense attributed to `member`; the only kind that counts toward a member's spending.
    pub fn is_spending_of(&self, member: MemberId) -> bool {
        self.is_expense() && self.member_id == Some(member)
    }

    /// Signed amount as shown in lists: `+` for income, `-` for expense.
    pub fn signed_display(&self) -> String {
        let sign = match self.tx_type {
            TxType::Income => '+',
            TxType::Expense => '-',
        };
        format!("{sign} {}", self.amount.to_string_2dp())
    }
}

/// Raw user input for a new transaction, as typed into the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub tx_type: TxType,
    pub member_id: Option<MemberId>,
}

impl NewTransaction {
    pub fn new(
        tx_type: TxType,
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            tx_type,
            member_id: None,
        }
    }

    pub fn income(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(TxType::Income, description, amount, category)
    }

    pub fn expense(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(TxType::Expense, description, amount, category)
    }

    pub fn by_member(mut self, member: MemberId) -> Self {
        self.member_id = Some(member);
        self
    }

    /// Checks the fields every ledger variant requires. Member rules are
    /// applied by the family ledger on top of this.
    pub fn validate(&self) -> Result<ValidTransaction, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let amount_str = self.amount.trim();
        if amount_str.is_empty() {
            return Err(ValidationError::MissingAmount);
        }
        let amount: Money = amount_str
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(amount_str.to_string()))?;
        if !amount.is_positive() {
            return Err(ValidationError::NonPositiveAmount);
        }

        let category_str = self.category.trim();
        if category_str.is_empty() {
            return Err(ValidationError::MissingCategory);
        }
        let category: Category = category_str
            .parse()
            .map_err(|_| ValidationError::UnknownCategory(category_str.to_string()))?;
        if !category.allowed_for(self.tx_type) {
            return Err(ValidationError::CategoryMismatch {
                category: category.to_string(),
                tx_type: self.tx_type,
            });
        }

        Ok(ValidTransaction {
            description: description.to_string(),
            amount,
            category,
            tx_type: self.tx_type,
            member_id: self.member_id,
        })
    }
}

/// Input that passed validation; only needs an id and a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTransaction {
    pub description: String,
    pub amount: Money,
    pub category: Category,
    pub tx_type: TxType,
    pub member_id: Option<MemberId>,
}

impl ValidTransaction {
    pub fn into_transaction(self, id: TransactionId, date: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            tx_type: self.tx_type,
            date,
            member_id: self.member_id,
        }
    }
}
