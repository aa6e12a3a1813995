//! Audit journal for registry cell changes
//!
//! Records every change to a registry cell with its before/after values in an
//! append-only JSON-lines log.
//!
//! # Architecture
//!
//! - `AuditEntry`: one change, with timestamp, cell, before/after JSON and a
//!   readable diff summary.
//! - `AuditLogger`: writes entries as JSON lines to any `io::Write`.
//! - `ChangeJournal`: subscribes to a registry and feeds the logger.
//! - `generate_diff`: readable summaries of what changed.
//!
//! # Example
//!
//! ```rust
//! use finance_store::registry::StateRegistry;
//!
//! let registry = StateRegistry::new();
//! let journal = registry.start_journal(std::io::sink()).unwrap();
//!
//! registry.filter_month().set(3);
//! assert_eq!(journal.entries()[0].diff_summary.as_deref(), Some("-1 -> 3"));
//! ```

mod diff;
mod entry;
mod journal;
mod logger;

pub use diff::{generate_detailed_diff, generate_diff};
pub use entry::AuditEntry;
pub use journal::ChangeJournal;
pub use logger::{read_entries, read_recent, AuditLogger};
