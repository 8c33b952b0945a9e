//! Vote ledger for the covenant governance protocol.
//!
//! Holds per-account balances, token-weighted delegation links and per-account
//! vote checkpoints. The proposal engine reads voting power from it and uses
//! lock/unlock/settle to account for stake committed to votes.
//!
//! Conservation invariant, always: `locked + available == balance` for every
//! account, and the balances sum to `total_supply`.

pub mod account;
pub mod checkpoint;
pub mod delegation;
pub mod error;
pub mod ledger;

pub use account::AccountBalance;
pub use checkpoint::{Checkpoint, Checkpoints};
pub use delegation::{DelegationRegistry, DelegationSnapshot};
pub use error::LedgerError;
pub use ledger::{LedgerSummary, VoteLedger};
