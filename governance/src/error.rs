use crate::proposal::ProposalState;
use covenant_ledger::LedgerError;
use covenant_timelock::TimelockError;
use covenant_types::{AccountId, ErrorClass, ProposalId, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {id} is {state}, which does not allow this action")]
    InvalidState { id: ProposalId, state: ProposalState },

    #[error("invalid action count: {0}")]
    InvalidActionCount(String),

    #[error("proposer votes below threshold: have {have}, need {need}")]
    BelowThreshold { have: u128, need: u128 },

    #[error("{proposer} already has live proposal {existing}")]
    ActiveProposalExists {
        proposer: AccountId,
        existing: ProposalId,
    },

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(AccountId),

    #[error("vote amount must be non-zero")]
    ZeroVotes,

    #[error("insufficient voting power: need {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("proposal {0} is already canceled")]
    AlreadyCanceled(ProposalId),

    #[error("an identical action is already queued in the timelock")]
    AlreadyQueued,

    #[error("refund already claimed")]
    AlreadyRefunded,

    #[error("nothing to refund")]
    NothingToRefund,

    #[error("action {index} of proposal {id} reverted: {reason}")]
    ExecutionReverted {
        id: ProposalId,
        index: usize,
        reason: String,
    },

    #[error("{caller} is not authorized: requires {required}")]
    Unauthorized { caller: AccountId, required: String },

    #[error("refund arithmetic overflow")]
    Overflow,

    #[error("ledger: {0}")]
    Ledger(#[from] LedgerError),

    #[error("timelock: {0}")]
    Timelock(#[from] TimelockError),

    #[error("{0}")]
    Type(#[from] TypeError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GovernanceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized { .. } => ErrorClass::Authorization,
            Self::ExecutionReverted { .. } => ErrorClass::Execution,
            Self::Ledger(e) => e.class(),
            Self::Timelock(e) => e.class(),
            Self::Type(e) => e.class(),
            _ => ErrorClass::Precondition,
        }
    }
}
