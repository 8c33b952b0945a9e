//! Protocol parameters for the proposal engine and the timelock.
//!
//! These are configuration surfaces, not protocol logic. After deployment
//! every field is only changeable through a queued, timelocked self-call.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// A truncating rational multiplier (`amount * numerator / denominator`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub numerator: u128,
    pub denominator: u128,
}

impl Ratio {
    pub const fn new(numerator: u128, denominator: u128) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Apply the ratio, truncating toward zero. `None` on overflow or a zero
    /// denominator.
    pub fn apply(&self, amount: u128) -> Option<u128> {
        amount
            .checked_mul(self.numerator)?
            .checked_div(self.denominator)
    }
}

/// Proposal-engine parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Minimum current voting power a proposer must hold.
    #[serde(default = "default_proposal_threshold")]
    pub proposal_threshold: u128,

    /// Minimum weighted (square-root scaled) `for` votes for success.
    #[serde(default = "default_quorum_votes")]
    pub quorum_votes: u128,

    /// Blocks between proposal creation and the start of voting.
    #[serde(default = "default_voting_delay")]
    pub voting_delay: u64,

    /// Length of the voting window in blocks.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    /// Proposer refund multiplier when the proposal succeeded.
    #[serde(default = "default_refund_success")]
    pub refund_success: Ratio,

    /// Proposer refund multiplier when the proposal was canceled or missed quorum.
    #[serde(default = "default_refund_penalty")]
    pub refund_penalty: Ratio,
}

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.voting_period == 0 {
            return Err(TypeError::InvalidParams("voting_period must be non-zero".into()));
        }
        if self.refund_success.denominator == 0 || self.refund_penalty.denominator == 0 {
            return Err(TypeError::InvalidParams("refund ratio denominator must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            proposal_threshold: default_proposal_threshold(),
            quorum_votes: default_quorum_votes(),
            voting_delay: default_voting_delay(),
            voting_period: default_voting_period(),
            refund_success: default_refund_success(),
            refund_penalty: default_refund_penalty(),
        }
    }
}

/// Timelock parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelockParams {
    /// Minimum distance between queue time and ETA, in seconds.
    #[serde(default = "default_minimum_delay")]
    pub minimum_delay: u64,

    /// Upper bound accepted by `setDelay`.
    #[serde(default = "default_maximum_delay")]
    pub maximum_delay: u64,

    /// Seconds after the ETA during which a queued transaction stays executable.
    #[serde(default = "default_grace_period")]
    pub grace_period: u64,

    /// Delay used for the `setPendingAdmin` step of an admin handoff.
    #[serde(default = "default_handoff_delay")]
    pub handoff_delay: u64,
}

impl TimelockParams {
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.minimum_delay > self.maximum_delay {
            return Err(TypeError::InvalidParams(format!(
                "minimum_delay {} exceeds maximum_delay {}",
                self.minimum_delay, self.maximum_delay
            )));
        }
        if self.handoff_delay < self.minimum_delay {
            return Err(TypeError::InvalidParams(format!(
                "handoff_delay {} is shorter than minimum_delay {}",
                self.handoff_delay, self.minimum_delay
            )));
        }
        if self.grace_period == 0 {
            return Err(TypeError::InvalidParams("grace_period must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for TimelockParams {
    fn default() -> Self {
        Self {
            minimum_delay: default_minimum_delay(),
            maximum_delay: default_maximum_delay(),
            grace_period: default_grace_period(),
            handoff_delay: default_handoff_delay(),
        }
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_proposal_threshold() -> u128 {
    100_000
}

fn default_quorum_votes() -> u128 {
    2_000 // sqrt(4_000_000) raw
}

fn default_voting_delay() -> u64 {
    1
}

fn default_voting_period() -> u64 {
    17_280 // ~3 days of 15s blocks
}

fn default_refund_success() -> Ratio {
    Ratio::new(3, 2)
}

fn default_refund_penalty() -> Ratio {
    Ratio::new(3, 4)
}

fn default_minimum_delay() -> u64 {
    2 * DAY
}

fn default_maximum_delay() -> u64 {
    30 * DAY
}

fn default_grace_period() -> u64 {
    14 * DAY
}

fn default_handoff_delay() -> u64 {
    50 * HOUR
}
