//! finance-store - Observable client state for a personal finance dashboard
//!
//! This library holds the state a finance dashboard's presentation layer
//! reads and writes: linked-account balances, transactions, the account
//! link token, page flags, period filters, the budget and categorization
//! rules. Every piece of state is an observable cell; the presentation layer
//! subscribes and is called back synchronously on every change.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `store`: Observable cells, derived cells and subscriptions
//! - `models`: Data carried by the cells (balances, transactions, rules, etc.)
//! - `registry`: The state registry and its cell identifiers
//! - `selectors`: Pure views such as period filtering and budget progress
//! - `audit`: Change journal written as JSON lines
//! - `config`: Settings loading
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use finance_store::StateRegistry;
//!
//! let registry = StateRegistry::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = Rc::clone(&seen);
//! let sub = registry.filter_month().subscribe(move |m| sink.borrow_mut().push(*m));
//!
//! registry.filter_month().set(3);
//! sub.unsubscribe();
//! registry.filter_month().set(4);
//!
//! assert_eq!(*seen.borrow(), vec![-1, 3]);
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod selectors;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use registry::{CellId, StateRegistry};
pub use store::{Cell, Derived, Readable, Subscription};
