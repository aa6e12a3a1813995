//! Budget model
//!
//! Maps a spending category name to the amount budgeted for it. On the wire a
//! budget is a flat JSON object: `{"FOOD_AND_DRINK": 250.0, "TRAVEL": 0.0}`.
//! Amounts are kept as the numbers that were sent and read as [`Money`].

use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;

use super::money::Money;

/// Amount budgeted per category
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Budget(BTreeMap<String, Number>);

impl Budget {
    /// Create an empty budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the budgeted amount for a category, adding it if needed
    pub fn set_category(&mut self, category: impl Into<String>, amount: Money) {
        self.0.insert(category.into(), amount.to_number());
    }

    /// Budgeted amount for a category
    ///
    /// `None` if the category is absent or its amount does not fit in cents.
    pub fn get_category(&self, category: &str) -> Option<Money> {
        self.0
            .get(category)
            .and_then(|amount| Money::from_number(amount).ok())
    }

    /// Make the budget cover exactly `categories`
    ///
    /// Missing categories are added at zero and categories not in the list
    /// are dropped. Existing amounts are kept.
    pub fn sync_categories<S: AsRef<str>>(&mut self, categories: &[S]) {
        for category in categories {
            self.0
                .entry(category.as_ref().to_string())
                .or_insert_with(|| Money::zero().to_number());
        }
        self.0
            .retain(|name, _| categories.iter().any(|c| c.as_ref() == name));
    }

    /// Categories and their amounts, in category order
    ///
    /// An amount that does not fit in cents reads as zero.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.0.iter().map(|(name, amount)| {
            (
                name.as_str(),
                Money::from_number(amount).unwrap_or_default(),
            )
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
