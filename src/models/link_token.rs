//! Opaque link token handed to the account-linking widget

use serde::{Deserialize, Serialize};
use std::fmt;

/// A link token as issued by the backend; never inspected by the client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkToken(String);

impl LinkToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LinkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LinkToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for LinkToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}
