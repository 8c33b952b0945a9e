use covenant_types::{AccountId, ErrorClass, Timestamp, TxHash, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimelockError {
    #[error("{caller} is not authorized: requires {required}")]
    Unauthorized { caller: AccountId, required: String },

    #[error("eta {eta} is too soon: earliest allowed is {earliest}")]
    EtaTooSoon { eta: Timestamp, earliest: Timestamp },

    #[error("transaction {0} is already queued")]
    AlreadyQueued(TxHash),

    #[error("transaction {0} is not queued")]
    NotQueued(TxHash),

    #[error("transaction has not reached its eta {eta} (now {now})")]
    NotYetReady { eta: Timestamp, now: Timestamp },

    #[error("transaction is stale: grace period ended at {expired_at}, must be re-queued")]
    StaleTransaction { eta: Timestamp, expired_at: Timestamp },

    #[error("transaction {hash} reverted: {reason}")]
    ExecutionReverted { hash: TxHash, reason: String },

    #[error("delay {delay} outside allowed range {min}..={max}")]
    InvalidDelay { delay: u64, min: u64, max: u64 },

    #[error("{0}")]
    Type(#[from] TypeError),
}

impl TimelockError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized { .. } => ErrorClass::Authorization,
            Self::ExecutionReverted { .. } => ErrorClass::Execution,
            _ => ErrorClass::Precondition,
        }
    }
}
