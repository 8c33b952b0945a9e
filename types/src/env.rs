//! The execution-environment collaborator.
//!
//! The protocol core never owns time or executes calls itself. Whatever hosts
//! it (a chain, a devnet, a test double) implements [`ExecutionEnvironment`].

use crate::call::CallDescriptor;
use crate::time::{BlockHeight, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A reverted dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revert {
    pub reason: String,
}

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// Ledger / execution environment consumed by the protocol.
///
/// `current_height` and `current_time` must never decrease between calls.
pub trait ExecutionEnvironment {
    fn current_height(&self) -> BlockHeight;

    fn current_time(&self) -> Timestamp;

    /// Execute `call` against its target.
    fn dispatch(&mut self, call: &CallDescriptor) -> Result<(), Revert>;
}
