//! Refund accounting for voters and proposers.
//!
//! A voter gets back the stake they locked once the proposal has resolved.
//! A proposer whose proposal succeeded is paid `(current + threshold) * 3/2`;
//! one whose proposal was canceled or missed quorum gets
//! `(current + threshold) * 3/4`, where `current` is the stake the proposer
//! locked by voting on it. A defeated proposer only recovers their own vote.

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalState};
use crate::tally::Outcome;
use covenant_types::{AccountId, GovernanceParams, Ratio};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundKind {
    /// Locked vote stake returned as-is.
    Votes,
    /// Proposer stake payout; also settles the proposer's own vote.
    Stake,
}

/// What a refund call would do right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuote {
    pub kind: RefundKind,
    /// Locked stake released from the ledger.
    pub released: u128,
    /// Amount credited to the account's available balance.
    pub payout: u128,
}

fn stake_ratio(state: ProposalState, params: &GovernanceParams) -> Option<Ratio> {
    match state {
        ProposalState::Canceled => Some(params.refund_penalty),
        _ => match state.outcome()? {
            Outcome::Succeeded => Some(params.refund_success),
            Outcome::QuorumFailed => Some(params.refund_penalty),
            Outcome::Defeated => None,
        },
    }
}

/// Work out the refund due to `account` on `proposal` in `state`.
pub fn quote(
    proposal: &Proposal,
    state: ProposalState,
    account: &AccountId,
    params: &GovernanceParams,
) -> Result<RefundQuote, GovernanceError> {
    if !state.is_resolved() {
        return Err(GovernanceError::NothingToRefund);
    }
    let receipt = proposal.receipt(account).cloned().unwrap_or_default();
    let still_locked = if receipt.has_voted && !receipt.has_votes_refunded {
        receipt.raw_votes
    } else {
        0
    };

    let stake_ratio = if account == &proposal.proposer {
        stake_ratio(state, params)
    } else {
        None
    };

    if let Some(ratio) = stake_ratio {
        if !receipt.has_stake_refunded {
            let base = receipt
                .raw_votes
                .checked_add(params.proposal_threshold)
                .ok_or(GovernanceError::Overflow)?;
            let payout = ratio.apply(base).ok_or(GovernanceError::Overflow)?;
            if payout == 0 && still_locked == 0 {
                return Err(GovernanceError::NothingToRefund);
            }
            return Ok(RefundQuote {
                kind: RefundKind::Stake,
                released: still_locked,
                payout,
            });
        }
    }

    if still_locked > 0 {
        return Ok(RefundQuote {
            kind: RefundKind::Votes,
            released: still_locked,
            payout: still_locked,
        });
    }

    let claimed = receipt.has_votes_refunded || (stake_ratio.is_some() && receipt.has_stake_refunded);
    if claimed {
        Err(GovernanceError::AlreadyRefunded)
    } else {
        Err(GovernanceError::NothingToRefund)
    }
}

/// Amount `quote` would pay out, or zero.
pub fn refundable(
    proposal: &Proposal,
    state: ProposalState,
    account: &AccountId,
    params: &GovernanceParams,
) -> u128 {
    quote(proposal, state, account, params)
        .map(|q| q.payout)
        .unwrap_or(0)
}
