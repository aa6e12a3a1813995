//! Audit entry data structures
//!
//! One entry per observed cell change, with the value before and after as
//! JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::CellId;

/// A single audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the change was observed (UTC)
    pub timestamp: DateTime<Utc>,

    /// The cell that changed
    pub cell: CellId,

    /// JSON value before the change
    pub before: serde_json::Value,

    /// JSON value after the change
    pub after: serde_json::Value,

    /// Human-readable diff summary; absent when the value was set to itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        cell: CellId,
        before: serde_json::Value,
        after: serde_json::Value,
        diff_summary: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            cell,
            before,
            after,
            diff_summary,
        }
    }

    /// Whether the value actually differs
    pub fn is_change(&self) -> bool {
        self.before != self.after
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] SET {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.cell
        );

        match &self.diff_summary {
            Some(diff) => output.push_str(&format!("\n  Changes: {}", diff)),
            None => output.push_str(" (unchanged)"),
        }

        output
    }
}
