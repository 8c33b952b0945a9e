//! Governable proposal-engine parameters.
//!
//! Each parameter is changed by a call targeting the governor's own address,
//! and the governor only applies such calls when the timelock delivers them.
//! There is no direct setter.

use covenant_types::{AccountId, CallDescriptor, GovernanceParams, TypeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every proposal-engine parameter that a proposal can amend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    ProposalThreshold,
    QuorumVotes,
    VotingDelay,
    VotingPeriod,
}

impl GovernableParam {
    pub const ALL: [GovernableParam; 4] = [
        Self::ProposalThreshold,
        Self::QuorumVotes,
        Self::VotingDelay,
        Self::VotingPeriod,
    ];

    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProposalThreshold => "proposal_threshold",
            Self::QuorumVotes => "quorum_votes",
            Self::VotingDelay => "voting_delay",
            Self::VotingPeriod => "voting_period",
        }
    }

    /// Signature of the self-call that sets this parameter.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::ProposalThreshold => "setProposalThreshold(uint256)",
            Self::QuorumVotes => "setQuorumVotes(uint256)",
            Self::VotingDelay => "setVotingDelay(uint256)",
            Self::VotingPeriod => "setVotingPeriod(uint256)",
        }
    }

    pub fn from_signature(signature: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.signature() == signature)
    }

    pub fn current(&self, params: &GovernanceParams) -> u128 {
        match self {
            Self::ProposalThreshold => params.proposal_threshold,
            Self::QuorumVotes => params.quorum_votes,
            Self::VotingDelay => u128::from(params.voting_delay),
            Self::VotingPeriod => u128::from(params.voting_period),
        }
    }

    /// Write `value` into `params`. The result must still validate.
    pub fn apply(&self, params: &mut GovernanceParams, value: u128) -> Result<(), TypeError> {
        let mut next = params.clone();
        let blocks = || {
            u64::try_from(value).map_err(|_| {
                TypeError::InvalidParams(format!("{} value {value} out of range", self.name()))
            })
        };
        match self {
            Self::ProposalThreshold => next.proposal_threshold = value,
            Self::QuorumVotes => next.quorum_votes = value,
            Self::VotingDelay => next.voting_delay = blocks()?,
            Self::VotingPeriod => next.voting_period = blocks()?,
        }
        next.validate()?;
        *params = next;
        Ok(())
    }

    /// Build the call a proposal carries to set this parameter on `governor`.
    pub fn call(
        &self,
        governor: AccountId,
        value: u128,
    ) -> Result<CallDescriptor, TypeError> {
        CallDescriptor::with_args(governor, 0, self.signature(), &value)
    }
}

impl fmt::Display for GovernableParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
