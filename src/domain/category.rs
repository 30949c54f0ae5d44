use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::transaction::TxType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Business,
    Investment,
    Rental,
    Food,
    Transport,
    Utilities,
    Entertainment,
    /// Catch-all shared by both income and expense.
    Others,
}

pub const INCOME_CATEGORIES: [Category; 5] = [
    Category::Salary,
    Category::Business,
    Category::Investment,
    Category::Rental,
    Category::Others,
];

/// Fixed order used by the expense breakdown.
pub const EXPENSE_CATEGORIES: [Category; 5] = [
    Category::Food,
    Category::Transport,
    Category::Utilities,
    Category::Entertainment,
    Category::Others,
];

impl Category {
    /// Options offered to the entry form for a transaction type.
    pub fn options(tx_type: TxType) -> &'static [Category] {
        match tx_type {
            TxType::Income => &INCOME_CATEGORIES,
            TxType::Expense => &EXPENSE_CATEGORIES,
        }
    }

    pub fn allowed_for(&self, tx_type: TxType) -> bool {
        Self::options(tx_type).contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Business => "business",
            Category::Investment => "investment",
            Category::Rental => "rental",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Others => "others",
        }
    }

    /// Display label. `Others` reads differently depending on the side of the ledger.
    pub fn label(&self, tx_type: TxType) -> &'static str {
        match (self, tx_type) {
            (Category::Salary, _) => "Salary",
            (Category::Business, _) => "Business Income",
            (Category::Investment, _) => "Investment Returns",
            (Category::Rental, _) => "Rental Income",
            (Category::Food, _) => "Food",
            (Category::Transport, _) => "Transport",
            (Category::Utilities, _) => "Utilities",
            (Category::Entertainment, _) => "Entertainment",
            (Category::Others, TxType::Income) => "Other Income",
            (Category::Others, TxType::Expense) => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = INCOME_CATEGORIES.iter().chain(EXPENSE_CATEGORIES.iter());
        let wanted = s.trim().to_ascii_lowercase();
        all.copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_transaction_type() {
        assert_eq!(Category::options(TxType::Income)[0], Category::Salary);
        assert_eq!(Category::options(TxType::Expense)[0], Category::Food);
        assert_eq!(Category::options(TxType::Expense).len(), 5);
    }

    #[test]
    fn others_is_allowed_on_both_sides() {
        assert!(Category::Others.allowed_for(TxType::Income));
        assert!(Category::Others.allowed_for(TxType::Expense));
        assert!(!Category::Food.allowed_for(TxType::Income));
        assert!(!Category::Salary.allowed_for(TxType::Expense));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Food ".parse::<Category>(), Ok(Category::Food));
        assert_eq!("RENTAL".parse::<Category>(), Ok(Category::Rental));
        assert_eq!(
            "groceries".parse::<Category>(),
            Err(UnknownCategory("groceries".into()))
        );
    }

    #[test]
    fn labels_distinguish_other_income() {
        assert_eq!(Category::Others.label(TxType::Income), "Other Income");
        assert_eq!(Category::Others.label(TxType::Expense), "Others");
        assert_eq!(Category::Business.label(TxType::Income), "Business Income");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Entertainment).unwrap(),
            "\"entertainment\""
        );
    }
}
