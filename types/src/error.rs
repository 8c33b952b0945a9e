//! Error classification shared across crates.

use thiserror::Error;

/// How a failed operation should be treated by its caller.
///
/// Every protocol error belongs to exactly one class. None of them is fatal
/// to the protocol as a whole: each failure is local to one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Rejected before any state mutation; retry with corrected inputs or
    /// once time/height has advanced.
    Precondition,
    /// A dispatched call reverted after its queued transaction was consumed.
    /// Nothing is re-queued automatically.
    Execution,
    /// The caller lacks the required authority.
    Authorization,
}

/// Errors from constructing or decoding shared value types.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid account id: {0:?}")]
    InvalidAccount(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("argument encoding error: {0}")]
    Encoding(String),

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl TypeError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Precondition
    }
}
