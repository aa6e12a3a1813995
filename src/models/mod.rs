//! Records held by the state registry
//!
//! Balances, transactions, link tokens, rules and the budget, plus the
//! `Money` amount type and the `-1` filter sentinel helpers.

pub mod balance;
pub mod budget;
pub mod filter;
pub mod link_token;
pub mod money;
pub mod rule;
pub mod transaction;

pub use balance::Balance;
pub use budget::Budget;
pub use link_token::LinkToken;
pub use money::{Money, MoneyError};
pub use rule::Rule;
pub use transaction::Transaction;
