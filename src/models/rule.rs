//! Categorization rules
//!
//! A rule says: when `transaction_field` of a transaction contains
//! `search_str`, file the transaction under `categorize`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::transaction::Transaction;

/// One categorization rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Text to look for (case-sensitive)
    pub search_str: String,

    /// Wire name of the transaction field to search, e.g. "name"
    pub transaction_field: String,

    /// Category assigned on a match
    pub categorize: String,

    /// Any other fields stored with the rule
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    pub fn new(
        search_str: impl Into<String>,
        transaction_field: impl Into<String>,
        categorize: impl Into<String>,
    ) -> Self {
        Self {
            search_str: search_str.into(),
            transaction_field: transaction_field.into(),
            categorize: categorize.into(),
            extra: Map::new(),
        }
    }

    /// Whether the rule's field on `transaction` contains the search text
    pub fn matches(&self, transaction: &Transaction) -> bool {
        transaction
            .field(&self.transaction_field)
            .is_some_and(|value| value.contains(&self.search_str))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' in {} -> {}",
            self.search_str, self.transaction_field, self.categorize
        )
    }
}

/// Category of the first rule matching `transaction`
pub fn categorize<'a>(transaction: &Transaction, rules: &'a [Rule]) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| rule.matches(transaction))
        .map(|rule| rule.categorize.as_str())
}
