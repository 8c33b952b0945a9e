use covenant_types::{BlockHeight, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient balance: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient locked stake: need {needed}, locked {locked}")]
    InsufficientLocked { needed: u128, locked: u128 },

    #[error("voting power at {requested} is not yet determined (current height {current})")]
    NotYetDetermined {
        requested: BlockHeight,
        current: BlockHeight,
    },

    #[error("height moved backwards: last write at {last}, attempted {attempted}")]
    HeightRegression {
        last: BlockHeight,
        attempted: BlockHeight,
    },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("arithmetic overflow in ledger accounting")]
    Overflow,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Precondition
    }
}
