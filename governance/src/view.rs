//! Read interface polled by presentation layers.

use crate::proposal::{ProposalState, Receipt};
use covenant_types::{AccountId, BlockHeight, CallDescriptor, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDetails {
    pub proposer: AccountId,
    pub for_votes: u128,
    pub against_votes: u128,
    pub raw_for_votes: u128,
    pub raw_against_votes: u128,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
    pub quorum_votes: u128,
    pub proposer_votes: u128,
    pub eta: Option<Timestamp>,
}

/// Everything a client needs to render one proposal, with state derived at
/// read time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub state: ProposalState,
    pub details: ProposalDetails,
    pub receipt: Option<Receipt>,
    pub actions: Vec<CallDescriptor>,
    pub description: String,
    /// What a refund call by the viewer would pay out now.
    pub refundable: u128,
    /// Voting is open and the viewer has votes and has not voted.
    pub eligible_to_vote: bool,
}
