//! Transaction record
//!
//! Mirrors a transaction row from the finance backend's `/transactions/`
//! endpoint. Amounts follow the aggregator's sign convention: positive is
//! money leaving the account, negative is money coming in.
//!
//! The record is the backend's JSON object as sent. Rows serialized from a
//! dataframe carry `date` as epoch milliseconds; other producers send an ISO
//! date string. Both are accepted, with `datestr` as the fallback.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::money::Money;

/// Date format used by the backend's `datestr` column
pub const DATESTR_FORMAT: &str = "%Y-%m-%d";

/// A single account transaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(Map<String, Value>);

impl Transaction {
    /// Create a transaction with its formatted date filled in
    pub fn new(
        transaction_id: impl Into<String>,
        account_id: impl Into<String>,
        name: impl Into<String>,
        amount: Money,
        date: NaiveDate,
    ) -> Self {
        let formatted = date.format(DATESTR_FORMAT).to_string();
        let mut tx = Self::default();
        tx.insert("transaction_id", Value::String(transaction_id.into()));
        tx.insert("account_id", Value::String(account_id.into()));
        tx.insert("name", Value::String(name.into()));
        tx.insert("amount", amount.to_number());
        tx.insert("date", formatted.clone());
        tx.insert("datestr", formatted);
        tx
    }

    /// Set the primary category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.insert("personal_finance_category_primary", Value::String(category.into()));
        self
    }

    /// Raw field by its wire name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, replacing any previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.get("transaction_id").and_then(Value::as_str)
    }

    pub fn account_id(&self) -> Option<&str> {
        self.get("account_id").and_then(Value::as_str)
    }

    /// Description as shown on the statement
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Amount in dollars, `None` if absent or too large to hold as cents
    pub fn amount(&self) -> Option<Money> {
        match self.get("amount")? {
            Value::Number(amount) => Money::from_number(amount).ok(),
            _ => None,
        }
    }

    pub fn merchant_name(&self) -> Option<&str> {
        self.get("merchant_name").and_then(Value::as_str)
    }

    /// Primary personal-finance category, e.g. "FOOD_AND_DRINK"
    pub fn category(&self) -> Option<&str> {
        self.get("personal_finance_category_primary")
            .and_then(Value::as_str)
    }

    /// The transaction date from `date`, falling back to `datestr`
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.get("date").and_then(parse_date).or_else(|| {
            self.get("datestr")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, DATESTR_FORMAT).ok())
        })
    }

    /// Calendar month (1-12) of the transaction, if it has a date
    pub fn month(&self) -> Option<u32> {
        self.effective_date().map(|d| d.month())
    }

    /// Calendar year of the transaction, if it has a date
    pub fn year(&self) -> Option<i32> {
        self.effective_date().map(|d| d.year())
    }

    /// Text value of a field by its wire name
    ///
    /// `date` and `datestr` read as `YYYY-MM-DD`; other fields give their
    /// string, number or bool value.
    pub fn field(&self, field: &str) -> Option<String> {
        match field {
            "date" | "datestr" => self
                .effective_date()
                .map(|d| d.format(DATESTR_FORMAT).to_string()),
            other => match self.get(other)? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            },
        }
    }
}

/// Epoch milliseconds, or an ISO date optionally followed by a time
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        Value::String(s) => s
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, DATESTR_FORMAT).ok()),
        _ => None,
    }
}
