//! Identifiers for the registry's cells

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;

/// Name of a cell in the state registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellId {
    Balances,
    Transactions,
    LinkToken,
    IsPageLoaded,
    IsBokehInitialized,
    IsPlaidLinkInitialized,
    FilterMonth,
    FilterYear,
    FilterYearlyTransactions,
    YearlyTransactions,
    Budget,
    Rules,
    /// Derived: transactions within the month/year filter
    FilteredTransactions,
    /// Derived: budget against spending per category
    BudgetProgress,
}

impl CellId {
    /// The writable cells, in declaration order
    pub const WRITABLE: [CellId; 12] = [
        CellId::Balances,
        CellId::Transactions,
        CellId::LinkToken,
        CellId::IsPageLoaded,
        CellId::IsBokehInitialized,
        CellId::IsPlaidLinkInitialized,
        CellId::FilterMonth,
        CellId::FilterYear,
        CellId::FilterYearlyTransactions,
        CellId::YearlyTransactions,
        CellId::Budget,
        CellId::Rules,
    ];

    /// The read-only cells computed from the writable ones
    pub const DERIVED: [CellId; 2] = [CellId::FilteredTransactions, CellId::BudgetProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            CellId::Balances => "balances",
            CellId::Transactions => "transactions",
            CellId::LinkToken => "link_token",
            CellId::IsPageLoaded => "is_page_loaded",
            CellId::IsBokehInitialized => "is_bokeh_initialized",
            CellId::IsPlaidLinkInitialized => "is_plaid_link_initialized",
            CellId::FilterMonth => "filter_month",
            CellId::FilterYear => "filter_year",
            CellId::FilterYearlyTransactions => "filter_yearly_transactions",
            CellId::YearlyTransactions => "yearly_transactions",
            CellId::Budget => "budget",
            CellId::Rules => "rules",
            CellId::FilteredTransactions => "filtered_transactions",
            CellId::BudgetProgress => "budget_progress",
        }
    }

    pub fn is_derived(&self) -> bool {
        Self::DERIVED.contains(self)
    }

    /// Whether the cell holds a `-1`-sentinel filter
    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            CellId::FilterMonth | CellId::FilterYear | CellId::FilterYearlyTransactions
        )
    }

    /// Every identifier, writable first
    pub fn all() -> impl Iterator<Item = CellId> {
        Self::WRITABLE.into_iter().chain(Self::DERIVED)
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellId::all()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| StoreError::cell_not_found(s))
    }
}
