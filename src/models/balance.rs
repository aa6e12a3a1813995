//! Account balance record
//!
//! One entry per linked account, as served by the finance backend's
//! `/balances/` endpoint. The record is the backend's JSON object as sent;
//! the accessors read typed views of the fields the client uses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::money::Money;

/// Number of account id characters shown in a legend label
const LEGEND_ID_CHARS: usize = 4;

/// The available balance of one account
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(Map<String, Value>);

impl Balance {
    /// Create a balance with the display fields filled in
    pub fn new(account_id: impl Into<String>, name: impl Into<String>, available: Money) -> Self {
        let mut balance = Self::default();
        balance.insert("account_id", Value::String(account_id.into()));
        balance.insert("name", Value::String(name.into()));
        balance.insert("balances", available.to_number());
        balance.insert("balances_str", available.to_string());
        let legend = balance.legend_label();
        balance.insert("legend", legend);
        balance
    }

    /// Raw field by its wire name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn account_id(&self) -> Option<&str> {
        self.get("account_id").and_then(Value::as_str)
    }

    /// Account display name
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Available balance; the backend names this field `balances`
    ///
    /// `None` when absent, not a number, or too large to hold as cents.
    pub fn available(&self) -> Option<Money> {
        match self.get("balances")? {
            Value::Number(amount) => Money::from_number(amount).ok(),
            _ => None,
        }
    }

    /// Pre-formatted balance, e.g. "$12.50"
    pub fn balances_str(&self) -> Option<&str> {
        self.get("balances_str").and_then(Value::as_str)
    }

    /// Chart legend label as sent, e.g. "Checking (abcd)"
    pub fn legend(&self) -> Option<&str> {
        self.get("legend").and_then(Value::as_str)
    }

    /// Legend label: the account name followed by the first characters of its id
    pub fn legend_label(&self) -> String {
        let short_id: String = self
            .account_id()
            .unwrap_or_default()
            .chars()
            .take(LEGEND_ID_CHARS)
            .collect();
        format!("{} ({})", self.name().unwrap_or_default(), short_id)
    }
}
