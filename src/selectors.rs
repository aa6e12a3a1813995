//! Pure views computed from registry state
//!
//! The registry wires these into derived cells; they are plain functions so
//! the presentation layer can also call them on arbitrary snapshots.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::models::filter;
use crate::models::{Budget, Money, Transaction};

/// Budget against actual spending for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub category: String,
    pub budgeted: Money,
    /// Absolute value of the summed transaction amounts
    pub spent: Money,
}

impl BudgetProgress {
    /// Budgeted minus spent; negative when over budget
    pub fn remaining(&self) -> Money {
        self.budgeted - self.spent
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent > self.budgeted
    }
}

/// Transactions that fall within the month and year filters
///
/// Either filter set to `-1` admits every value. When a filter is active,
/// transactions without a usable date are left out.
pub fn filter_by_period(transactions: &[Transaction], month: i32, year: i32) -> Vec<Transaction> {
    if filter::is_unset(month) && filter::is_unset(year) {
        return transactions.to_vec();
    }

    transactions
        .iter()
        .filter(|tx| match tx.effective_date() {
            Some(date) => {
                filter::month_admits(month, date.month())
                    && filter::year_admits(year, date.year())
            }
            None => false,
        })
        .cloned()
        .collect()
}

/// Budgeted and spent amounts per budget category
///
/// Categories in `excluded` are skipped, as are categories with neither a
/// budget nor any spending. Totals saturate rather than overflow, and
/// amounts too large to hold as cents are left out.
pub fn budget_progress(
    budget: &Budget,
    transactions: &[Transaction],
    excluded: &[String],
) -> Vec<BudgetProgress> {
    budget
        .iter()
        .filter(|(category, _)| !excluded.iter().any(|e| e == category))
        .map(|(category, budgeted)| {
            let spent: Money = transactions
                .iter()
                .filter(|tx| tx.category() == Some(category))
                .filter_map(Transaction::amount)
                .sum();
            BudgetProgress {
                category: category.to_string(),
                budgeted,
                spent: spent.abs(),
            }
        })
        .filter(|row| !row.budgeted.is_zero() || !row.spent.is_zero())
        .collect()
}
