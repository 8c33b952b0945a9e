//! Proposals, receipts and live state derivation.

use crate::error::GovernanceError;
use crate::tally::{resolve, Outcome};
use covenant_types::{AccountId, BlockHeight, CallDescriptor, ProposalId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Most actions a single proposal may carry.
pub const MAX_ACTIONS: usize = 10;

/// Lifecycle state of a proposal. Always derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    QuorumFailed,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl ProposalState {
    /// Voting has closed (or the proposal was canceled).
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending | Self::Active)
    }

    /// States that block the proposer from opening another proposal.
    pub fn is_live(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Active | Self::Succeeded | Self::Queued
        )
    }

    /// The voting outcome this state implies, for refund purposes.
    /// `None` while voting is open or after cancellation.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Defeated => Some(Outcome::Defeated),
            Self::QuorumFailed => Some(Outcome::QuorumFailed),
            Self::Succeeded | Self::Queued | Self::Expired | Self::Executed => {
                Some(Outcome::Succeeded)
            }
            Self::Pending | Self::Active | Self::Canceled => None,
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Canceled => "Canceled",
            Self::Defeated => "Defeated",
            Self::QuorumFailed => "Quorum Failed",
            Self::Succeeded => "Succeeded",
            Self::Queued => "Queued",
            Self::Expired => "Expired",
            Self::Executed => "Executed",
        };
        f.write_str(s)
    }
}

/// One voter's record on one proposal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub has_voted: bool,
    pub support: bool,
    /// Weighted votes (square root of `raw_votes`).
    pub votes: u128,
    /// Stake locked when voting.
    pub raw_votes: u128,
    pub has_votes_refunded: bool,
    pub has_stake_refunded: bool,
}

/// Proposal input as parallel arrays, one entry per action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub targets: Vec<AccountId>,
    pub values: Vec<u128>,
    pub signatures: Vec<String>,
    pub calldatas: Vec<Vec<u8>>,
    pub description: String,
}

impl ProposalDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Append one action.
    pub fn action(mut self, call: CallDescriptor) -> Self {
        self.targets.push(call.target);
        self.values.push(call.value);
        self.signatures.push(call.signature);
        self.calldatas.push(call.data);
        self
    }

    /// Zip the arrays into call descriptors. All four must have the same,
    /// non-zero length.
    pub fn into_actions(self) -> Result<(Vec<CallDescriptor>, String), GovernanceError> {
        let n = self.targets.len();
        if self.values.len() != n || self.signatures.len() != n || self.calldatas.len() != n {
            return Err(GovernanceError::InvalidActionCount(format!(
                "information arity mismatch: {} targets, {} values, {} signatures, {} calldatas",
                n,
                self.values.len(),
                self.signatures.len(),
                self.calldatas.len()
            )));
        }
        if n == 0 {
            return Err(GovernanceError::InvalidActionCount(
                "must provide actions".into(),
            ));
        }
        if n > MAX_ACTIONS {
            return Err(GovernanceError::InvalidActionCount(format!(
                "too many actions: {n} > {MAX_ACTIONS}"
            )));
        }
        let actions = self
            .targets
            .into_iter()
            .zip(self.values)
            .zip(self.signatures)
            .zip(self.calldatas)
            .map(|(((target, value), signature), data)| {
                CallDescriptor::new(target, value, signature, data)
            })
            .collect();
        Ok((actions, self.description))
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    pub actions: Vec<CallDescriptor>,
    pub description: String,
    /// Weighted totals.
    pub for_votes: u128,
    pub against_votes: u128,
    /// Locked stake totals.
    pub raw_for_votes: u128,
    pub raw_against_votes: u128,
    pub start_block: BlockHeight,
    pub end_block: BlockHeight,
    /// Proposer's voting power at the last settled height before creation.
    /// Informational only: the stake refund is based on the proposer's own
    /// receipt `raw_votes`, not on this snapshot.
    pub proposer_votes: u128,
    /// Quorum in force when the proposal was created.
    pub quorum_votes: u128,
    pub created_at: Timestamp,
    pub canceled: bool,
    pub executed: bool,
    pub eta: Option<Timestamp>,
    pub receipts: BTreeMap<AccountId, Receipt>,
}

impl Proposal {
    /// Derive the state at `height`/`now`. `grace_period` is the timelock's.
    pub fn state(&self, height: BlockHeight, now: Timestamp, grace_period: u64) -> ProposalState {
        if self.canceled {
            return ProposalState::Canceled;
        }
        if height < self.start_block {
            return ProposalState::Pending;
        }
        if height <= self.end_block {
            return ProposalState::Active;
        }
        match resolve(self.for_votes, self.against_votes, self.quorum_votes) {
            Outcome::Defeated => ProposalState::Defeated,
            Outcome::QuorumFailed => ProposalState::QuorumFailed,
            Outcome::Succeeded => match self.eta {
                None => ProposalState::Succeeded,
                Some(_) if self.executed => ProposalState::Executed,
                Some(eta) if eta.has_expired(grace_period, now) => ProposalState::Expired,
                Some(_) => ProposalState::Queued,
            },
        }
    }

    pub fn receipt(&self, voter: &AccountId) -> Option<&Receipt> {
        self.receipts.get(voter)
    }

    pub fn total_raw_votes(&self) -> u128 {
        self.raw_for_votes.saturating_add(self.raw_against_votes)
    }
}
