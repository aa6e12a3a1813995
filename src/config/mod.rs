//! Configuration module for finance-store
//!
//! Settings are plain serde structs with a default for every field, so a
//! partial JSON or YAML document is always enough.

pub mod settings;

pub use settings::{AuditSettings, Settings, DEFAULT_BUDGET_CATEGORIES};
