use serde::Serialize;

use crate::{
    common::money::Money,
    domain::{
        category::{Category, EXPENSE_CATEGORIES},
        transaction::{Transaction, TxType},
    },
};

/// Income/expense totals, always recomputed from the full transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub income: Money,
    pub expenses: Money,
    pub balance: Money,
}

impl Summary {
    pub fn compute(transactions: &[Transaction]) -> Self {
        let mut income = Money::zero();
        let mut expenses = Money::zero();
        for tx in transactions {
            match tx.tx_type {
                TxType::Income => income += tx.amount,
                TxType::Expense => expenses += tx.amount,
            }
        }
        Summary {
            income,
            expenses,
            balance: income - expenses,
        }
    }

    /// Like `compute`, but `None` when a total would not fit in `Money`.
    pub fn try_compute(transactions: &[Transaction]) -> Option<Self> {
        let income = Money::checked_sum(
            transactions.iter().filter(|t| t.is_income()).map(|t| t.amount),
        )?;
        let expenses = Money::checked_sum(
            transactions.iter().filter(|t| t.is_expense()).map(|t| t.amount),
        )?;
        Some(Summary {
            income,
            expenses,
            balance: income.checked_sub(expenses)?,
        })
    }

    /// Everything not spent counts as savings.
    pub fn savings(&self) -> Money {
        self.balance
    }
}

/// Expense totals per category, one entry for every expense category in
/// display order. Categories without activity report zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    entries: Vec<(Category, Money)>,
}

impl CategoryBreakdown {
    pub fn compute(transactions: &[Transaction]) -> Self {
        let entries = EXPENSE_CATEGORIES
            .iter()
            .map(|&category| {
                let total = transactions
                    .iter()
                    .filter(|t| t.is_expense() && t.category == category)
                    .map(|t| t.amount)
                    .sum();
                (category, total)
            })
            .collect();
        CategoryBreakdown { entries }
    }

    pub fn entries(&self) -> &[(Category, Money)] {
        &self.entries
    }

    pub fn get(&self, category: Category) -> Money {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, m)| *m)
            .unwrap_or_default()
    }

    pub fn total(&self) -> Money {
        self.entries.iter().map(|(_, m)| *m).sum()
    }

    /// Share of all expenses for `category`, rounded to a whole percent.
    pub fn share(&self, category: Category) -> u32 {
        self.get(category).percent_of(self.total()).round() as u32
    }
}
