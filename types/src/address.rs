//! Account identity type.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An account on the governance ledger.
///
/// Accounts are opaque labels: the ledger never interprets them beyond
/// equality, ordering and hashing. Contracts (the governor, the timelock)
/// are accounts too, so calls can target them.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id from a raw label.
    ///
    /// # Panics
    /// Panics if the label is empty or contains whitespace. Use
    /// [`AccountId::parse`] for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(Self::is_well_formed(&s), "account id must be non-empty without whitespace");
        Self(s)
    }

    /// Parse an account id from untrusted input.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let trimmed = raw.trim();
        if !Self::is_well_formed(trimmed) {
            return Err(TypeError::InvalidAccount(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the raw label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(s: &str) -> bool {
        !s.is_empty() && !s.chars().any(char::is_whitespace)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::str::FromStr for AccountId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
