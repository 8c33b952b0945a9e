//! Notification side channel for pollers.

use crate::params::GovernableParam;
use crate::refund::RefundKind;
use covenant_types::{AccountId, BlockHeight, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: AccountId,
        start_block: BlockHeight,
        end_block: BlockHeight,
        description: String,
    },
    VoteCast {
        id: ProposalId,
        voter: AccountId,
        support: bool,
        votes: u128,
        raw_votes: u128,
    },
    ProposalCanceled {
        id: ProposalId,
    },
    ProposalQueued {
        id: ProposalId,
        eta: Timestamp,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    Refunded {
        id: ProposalId,
        account: AccountId,
        kind: RefundKind,
        amount: u128,
    },
    ParamChanged {
        param: GovernableParam,
        old: u128,
        new: u128,
    },
}
