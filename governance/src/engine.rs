//! Core governance engine: proposals through their lifecycle, backed by the
//! vote ledger and executed through the timelock.

use crate::error::GovernanceError;
use crate::events::GovernanceEvent;
use crate::proposal::{Proposal, ProposalDraft, ProposalState, Receipt};
use crate::refund::{self, RefundKind};
use crate::router::GovernorRouter;
use crate::tally::vote_weight;
use crate::view::{ProposalDetails, ProposalView};
use covenant_ledger::{LedgerError, VoteLedger};
use covenant_timelock::{
    transaction_hash, AdminHandoff, HandoffPlan, HandoffProgress, Timelock, TimelockError,
};
use covenant_types::{
    AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, GovernanceParams, ProposalId,
    Timestamp, TxHash,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// The governor: owns proposals and receipts, its vote ledger and its
/// timelock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Governor {
    address: AccountId,
    guardian: Option<AccountId>,
    params: GovernanceParams,
    ledger: VoteLedger,
    timelock: Timelock,
    proposals: BTreeMap<ProposalId, Proposal>,
    latest_proposal: BTreeMap<AccountId, ProposalId>,
    #[serde(skip)]
    events: Vec<GovernanceEvent>,
}

impl Governor {
    pub fn new(
        address: AccountId,
        guardian: AccountId,
        params: GovernanceParams,
        ledger: VoteLedger,
        timelock: Timelock,
    ) -> Result<Self, GovernanceError> {
        params.validate()?;
        Ok(Self {
            address,
            guardian: Some(guardian),
            params,
            ledger,
            timelock,
            proposals: BTreeMap::new(),
            latest_proposal: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn guardian(&self) -> Option<&AccountId> {
        self.guardian.as_ref()
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    /// Token-side operations (mint, transfer, delegate) go through here.
    pub fn ledger_mut(&mut self) -> &mut VoteLedger {
        &mut self.ledger
    }

    pub fn timelock(&self) -> &Timelock {
        &self.timelock
    }

    /// The timelock enforces its own admin checks on every call.
    pub fn timelock_mut(&mut self) -> &mut Timelock {
        &mut self.timelock
    }

    /// Take the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn state(
        &self,
        id: ProposalId,
        env: &dyn ExecutionEnvironment,
    ) -> Result<ProposalState, GovernanceError> {
        self.state_at(id, env.current_height(), env.current_time())
    }

    pub fn receipt(
        &self,
        id: ProposalId,
        voter: &AccountId,
    ) -> Result<Option<&Receipt>, GovernanceError> {
        Ok(self.proposal(id)?.receipt(voter))
    }

    pub fn actions(&self, id: ProposalId) -> Result<&[CallDescriptor], GovernanceError> {
        Ok(&self.proposal(id)?.actions)
    }

    pub fn latest_proposal_of(&self, account: &AccountId) -> Option<ProposalId> {
        self.latest_proposal.get(account).copied()
    }

    pub fn proposal_view(
        &self,
        id: ProposalId,
        voter: Option<&AccountId>,
        env: &dyn ExecutionEnvironment,
    ) -> Result<ProposalView, GovernanceError> {
        let proposal = self.proposal(id)?;
        let state = self.state_at(id, env.current_height(), env.current_time())?;
        let receipt = voter.and_then(|v| proposal.receipt(v)).cloned();
        let refundable = voter
            .map(|v| refund::refundable(proposal, state, v, &self.params))
            .unwrap_or(0);
        let eligible_to_vote = voter.is_some_and(|v| {
            state == ProposalState::Active
                && !receipt.as_ref().is_some_and(|r| r.has_voted)
                && self.ledger.current_votes(v) > 0
        });
        Ok(ProposalView {
            id,
            state,
            details: ProposalDetails {
                proposer: proposal.proposer.clone(),
                for_votes: proposal.for_votes,
                against_votes: proposal.against_votes,
                raw_for_votes: proposal.raw_for_votes,
                raw_against_votes: proposal.raw_against_votes,
                start_block: proposal.start_block,
                end_block: proposal.end_block,
                quorum_votes: proposal.quorum_votes,
                proposer_votes: proposal.proposer_votes,
                eta: proposal.eta,
            },
            receipt,
            actions: proposal.actions.clone(),
            description: proposal.description.clone(),
            refundable,
            eligible_to_vote,
        })
    }

    /// Views of every proposal, newest first.
    pub fn proposal_views(
        &self,
        voter: Option<&AccountId>,
        env: &dyn ExecutionEnvironment,
    ) -> Result<Vec<ProposalView>, GovernanceError> {
        self.proposals
            .keys()
            .rev()
            .map(|id| self.proposal_view(*id, voter, env))
            .collect()
    }

    // ── Proposal lifecycle ──────────────────────────────────────────────

    pub fn propose(
        &mut self,
        proposer: &AccountId,
        draft: ProposalDraft,
        env: &dyn ExecutionEnvironment,
    ) -> Result<ProposalId, GovernanceError> {
        let (actions, description) = draft.into_actions()?;
        let height = env.current_height();
        let now = env.current_time();

        let votes = self.ledger.current_votes(proposer);
        if votes < self.params.proposal_threshold {
            return Err(GovernanceError::BelowThreshold {
                have: votes,
                need: self.params.proposal_threshold,
            });
        }

        if let Some(existing) = self.latest_proposal_of(proposer) {
            let state = self.state_at(existing, height, now)?;
            if state.is_live() {
                return Err(GovernanceError::ActiveProposalExists {
                    proposer: proposer.clone(),
                    existing,
                });
            }
        }

        let proposer_votes = if height > BlockHeight::GENESIS {
            self.ledger
                .voting_power_of(proposer, height.previous(), height)?
        } else {
            0
        };

        let id = self.proposal_count() + 1;
        let start_block = height.saturating_add(self.params.voting_delay);
        let end_block = start_block.saturating_add(self.params.voting_period);

        info!(id, %proposer, %start_block, %end_block, actions = actions.len(), "proposal created");
        self.events.push(GovernanceEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            start_block,
            end_block,
            description: description.clone(),
        });
        self.proposals.insert(
            id,
            Proposal {
                id,
                proposer: proposer.clone(),
                actions,
                description,
                for_votes: 0,
                against_votes: 0,
                raw_for_votes: 0,
                raw_against_votes: 0,
                start_block,
                end_block,
                proposer_votes,
                quorum_votes: self.params.quorum_votes,
                created_at: now,
                canceled: false,
                executed: false,
                eta: None,
                receipts: BTreeMap::new(),
            },
        );
        self.latest_proposal.insert(proposer.clone(), id);
        Ok(id)
    }

    /// Lock `raw_amount` of the voter's stake behind `support`. Returns the
    /// weighted vote, `floor(sqrt(raw_amount))`.
    pub fn cast_vote(
        &mut self,
        voter: &AccountId,
        id: ProposalId,
        support: bool,
        raw_amount: u128,
        env: &dyn ExecutionEnvironment,
    ) -> Result<u128, GovernanceError> {
        let height = env.current_height();
        let state = self.state_at(id, height, env.current_time())?;
        if state != ProposalState::Active {
            return Err(GovernanceError::InvalidState { id, state });
        }
        if self
            .proposal(id)?
            .receipt(voter)
            .is_some_and(|r| r.has_voted)
        {
            return Err(GovernanceError::AlreadyVoted(voter.clone()));
        }
        if raw_amount == 0 {
            return Err(GovernanceError::ZeroVotes);
        }
        let available = self.ledger.current_votes(voter);
        if raw_amount > available {
            return Err(GovernanceError::InsufficientBalance {
                needed: raw_amount,
                available,
            });
        }

        self.ledger
            .lock(voter, raw_amount, height)
            .map_err(|e| match e {
                LedgerError::InsufficientBalance { needed, available } => {
                    GovernanceError::InsufficientBalance { needed, available }
                }
                other => GovernanceError::Ledger(other),
            })?;

        let votes = vote_weight(raw_amount);
        let proposal = self.proposal_mut(id)?;
        if support {
            proposal.for_votes = proposal.for_votes.saturating_add(votes);
            proposal.raw_for_votes = proposal.raw_for_votes.saturating_add(raw_amount);
        } else {
            proposal.against_votes = proposal.against_votes.saturating_add(votes);
            proposal.raw_against_votes = proposal.raw_against_votes.saturating_add(raw_amount);
        }
        proposal.receipts.insert(
            voter.clone(),
            Receipt {
                has_voted: true,
                support,
                votes,
                raw_votes: raw_amount,
                has_votes_refunded: false,
                has_stake_refunded: false,
            },
        );

        info!(id, %voter, support, votes, raw_amount, "vote cast");
        self.events.push(GovernanceEvent::VoteCast {
            id,
            voter: voter.clone(),
            support,
            votes,
            raw_votes: raw_amount,
        });
        Ok(votes)
    }

    /// Queue every action of a succeeded proposal in the timelock at
    /// `now + delay`. Returns the ETA.
    pub fn queue(
        &mut self,
        id: ProposalId,
        env: &dyn ExecutionEnvironment,
    ) -> Result<Timestamp, GovernanceError> {
        let now = env.current_time();
        let state = self.state_at(id, env.current_height(), now)?;
        if state != ProposalState::Succeeded {
            return Err(GovernanceError::InvalidState { id, state });
        }
        self.require_timelock_admin()?;

        let eta = self.timelock.earliest_eta(now);
        let actions = self.proposal(id)?.actions.clone();
        let mut seen = HashSet::new();
        for action in &actions {
            let hash = transaction_hash(action, eta);
            if !seen.insert(hash) || self.timelock.is_queued(&hash) {
                return Err(GovernanceError::AlreadyQueued);
            }
        }

        let governor = self.address.clone();
        for action in actions {
            self.timelock
                .queue_transaction(&governor, action, eta, now)?;
        }
        self.proposal_mut(id)?.eta = Some(eta);

        info!(id, %eta, "proposal queued");
        self.events.push(GovernanceEvent::ProposalQueued { id, eta });
        Ok(eta)
    }

    /// Execute a queued proposal's actions in order.
    ///
    /// The proposal is marked executed before dispatch. The first action that
    /// reverts stops execution; the actions after it are removed from the
    /// timelock queue.
    pub fn execute(
        &mut self,
        id: ProposalId,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<(), GovernanceError> {
        let now = env.current_time();
        let state = self.state_at(id, env.current_height(), now)?;
        let proposal = self.proposal(id)?;
        let eta = match (state, proposal.eta) {
            (ProposalState::Queued, Some(eta)) => eta,
            (ProposalState::Expired, Some(eta)) => {
                return Err(TimelockError::StaleTransaction {
                    eta,
                    expired_at: eta.saturating_add(self.timelock.grace_period()),
                }
                .into())
            }
            _ => return Err(GovernanceError::InvalidState { id, state }),
        };
        if now < eta {
            return Err(TimelockError::NotYetReady { eta, now }.into());
        }
        for action in &proposal.actions {
            let hash = transaction_hash(action, eta);
            if !self.timelock.is_queued(&hash) {
                return Err(TimelockError::NotQueued(hash).into());
            }
        }

        let actions = proposal.actions.clone();
        self.proposal_mut(id)?.executed = true;

        for (index, action) in actions.iter().enumerate() {
            if let Err(e) = self.execute_timelock_transaction(action, eta, &mut *env) {
                let reason = match e {
                    GovernanceError::Timelock(TimelockError::ExecutionReverted { reason, .. }) => {
                        reason
                    }
                    other => other.to_string(),
                };
                let governor = self.address.clone();
                for rest in &actions[index + 1..] {
                    if let Err(e) = self.timelock.cancel_transaction(&governor, rest, eta) {
                        warn!(id, error = %e, "could not unqueue remaining action");
                    }
                }
                warn!(id, index, %reason, "proposal execution stopped");
                return Err(GovernanceError::ExecutionReverted { id, index, reason });
            }
        }

        info!(id, actions = actions.len(), "proposal executed");
        self.events.push(GovernanceEvent::ProposalExecuted { id });
        Ok(())
    }

    /// Cancel a proposal that has not executed.
    ///
    /// Resolved outcomes (Defeated, Quorum Failed, Expired) are final. The
    /// proposer and the guardian may always cancel; anyone may cancel once
    /// the proposer's current votes plus locked stake drop below the
    /// threshold.
    pub fn cancel(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        env: &dyn ExecutionEnvironment,
    ) -> Result<(), GovernanceError> {
        let state = self.state(id, env)?;
        let proposal = self.proposal(id)?;
        if proposal.canceled {
            return Err(GovernanceError::AlreadyCanceled(id));
        }
        if proposal.executed
            || matches!(
                state,
                ProposalState::Defeated | ProposalState::QuorumFailed | ProposalState::Expired
            )
        {
            return Err(GovernanceError::InvalidState { id, state });
        }

        // Stake the proposer locked behind votes still counts as theirs.
        let proposer_votes = self
            .ledger
            .current_votes(&proposal.proposer)
            .saturating_add(self.ledger.locked_of(&proposal.proposer));
        let authorized = caller == &proposal.proposer
            || self.guardian.as_ref() == Some(caller)
            || proposer_votes < self.params.proposal_threshold;
        if !authorized {
            return Err(GovernanceError::Unauthorized {
                caller: caller.clone(),
                required: "proposer, guardian, or proposer below threshold".into(),
            });
        }

        if let Some(eta) = proposal.eta {
            let queued: Vec<CallDescriptor> = proposal
                .actions
                .iter()
                .filter(|a| self.timelock.is_queued(&transaction_hash(a, eta)))
                .cloned()
                .collect();
            if !queued.is_empty() {
                self.require_timelock_admin()?;
                let governor = self.address.clone();
                for action in &queued {
                    self.timelock.cancel_transaction(&governor, action, eta)?;
                }
            }
        }

        self.proposal_mut(id)?.canceled = true;
        info!(id, %caller, "proposal canceled");
        self.events.push(GovernanceEvent::ProposalCanceled { id });
        Ok(())
    }

    /// Claim whatever refund `caller` is owed on a resolved proposal.
    /// Returns the amount credited.
    pub fn refund(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        env: &dyn ExecutionEnvironment,
    ) -> Result<u128, GovernanceError> {
        let height = env.current_height();
        let state = self.state_at(id, height, env.current_time())?;
        let quote = refund::quote(self.proposal(id)?, state, caller, &self.params)?;

        self.ledger
            .settle(caller, quote.released, quote.payout, height)?;

        let receipt = self
            .proposal_mut(id)?
            .receipts
            .entry(caller.clone())
            .or_default();
        receipt.has_votes_refunded = true;
        if quote.kind == RefundKind::Stake {
            receipt.has_stake_refunded = true;
        }

        info!(id, account = %caller, kind = ?quote.kind, amount = quote.payout, "refunded");
        self.events.push(GovernanceEvent::Refunded {
            id,
            account: caller.clone(),
            kind: quote.kind,
            amount: quote.payout,
        });
        Ok(quote.payout)
    }

    // ── Timelock execution ──────────────────────────────────────────────

    /// Execute one queued timelock transaction. Calls targeting the governor
    /// are applied as parameter amendments.
    pub fn execute_timelock_transaction(
        &mut self,
        call: &CallDescriptor,
        eta: Timestamp,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<TxHash, GovernanceError> {
        let mut router = GovernorRouter {
            governor: &self.address,
            params: &mut self.params,
            events: &mut self.events,
            env,
        };
        Ok(self.timelock.execute_transaction(call, eta, &mut router)?)
    }

    // ── Guardian ────────────────────────────────────────────────────────

    /// Have the governor accept admin authority over its timelock.
    pub fn accept_timelock_admin(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.require_guardian(caller)?;
        self.timelock.accept_admin(&self.address)?;
        info!(governor = %self.address, "governor is now timelock admin");
        Ok(())
    }

    /// Renounce the guardian role for good.
    pub fn abdicate(&mut self, caller: &AccountId) -> Result<(), GovernanceError> {
        self.require_guardian(caller)?;
        info!(guardian = %caller, "guardian abdicated");
        self.guardian = None;
        Ok(())
    }

    /// Finish handing the timelock over to this governor: execute the queued
    /// `setPendingAdmin` if it has not run, then accept as guardian. Steps
    /// already performed are skipped.
    pub fn complete_admin_handoff(
        &mut self,
        caller: &AccountId,
        plan: &HandoffPlan,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<(), GovernanceError> {
        if plan.new_admin != self.address {
            return Err(GovernanceError::Unauthorized {
                caller: plan.new_admin.clone(),
                required: format!("handoff to governor {}", self.address),
            });
        }
        self.require_guardian(caller)?;
        match AdminHandoff::execute_step(&mut self.timelock, plan, env)? {
            HandoffProgress::Completed => {
                debug!("timelock handoff already complete");
                Ok(())
            }
            _ => self.accept_timelock_admin(caller),
        }
    }

    // ── Persistence ─────────────────────────────────────────────────────

    pub fn save_state(&self) -> Result<Vec<u8>, GovernanceError> {
        bincode::serialize(self).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    pub fn load_state(data: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(data).map_err(|e| GovernanceError::Serialization(e.to_string()))
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn state_at(
        &self,
        id: ProposalId,
        height: BlockHeight,
        now: Timestamp,
    ) -> Result<ProposalState, GovernanceError> {
        let state = self
            .proposal(id)?
            .state(height, now, self.timelock.grace_period());
        debug!(id, %state, %height, "derived proposal state");
        Ok(state)
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn require_guardian(&self, caller: &AccountId) -> Result<(), GovernanceError> {
        if self.guardian.as_ref() != Some(caller) {
            return Err(GovernanceError::Unauthorized {
                caller: caller.clone(),
                required: "guardian".into(),
            });
        }
        Ok(())
    }

    fn require_timelock_admin(&self) -> Result<(), GovernanceError> {
        if self.timelock.admin() != &self.address {
            return Err(GovernanceError::Unauthorized {
                caller: self.address.clone(),
                required: "timelock admin".into(),
            });
        }
        Ok(())
    }
}
