use covenant_governance::{
    GovernableParam, GovernanceError, GovernanceEvent, Governor, ProposalDraft, ProposalState,
    RefundKind,
};
use covenant_ledger::VoteLedger;
use covenant_nullables::NullChain;
use covenant_timelock::{AdminHandoff, HandoffStep, Timelock, TimelockError};
use covenant_types::{
    AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, GovernanceParams, ProposalId,
    TimelockParams,
};

const DELAY: u64 = 172_800;
const GRACE: u64 = 14 * 86_400;

fn acct(name: &str) -> AccountId {
    AccountId::new(name)
}

fn params() -> GovernanceParams {
    GovernanceParams {
        proposal_threshold: 400_000,
        quorum_votes: 600,
        voting_delay: 1,
        voting_period: 10,
        ..GovernanceParams::default()
    }
}

fn setup_full(params: GovernanceParams, timelock_admin: &str) -> (Governor, NullChain) {
    let chain = NullChain::new(1, 1_000_000);
    let h = chain.current_height();
    let mut ledger = VoteLedger::new();
    for (name, amount) in [("alice", 500_000u128), ("bob", 20_000), ("carol", 10_000)] {
        ledger.mint(&acct(name), amount, h).unwrap();
        ledger.delegate(&acct(name), &acct(name), h).unwrap();
    }
    let timelock =
        Timelock::new(acct("timelock"), acct(timelock_admin), TimelockParams::default()).unwrap();
    let gov = Governor::new(acct("governor"), acct("guardian"), params, ledger, timelock).unwrap();
    chain.advance_blocks(1);
    (gov, chain)
}

fn setup() -> (Governor, NullChain) {
    setup_full(params(), "governor")
}

fn call(target: &str, signature: &str) -> CallDescriptor {
    CallDescriptor::new(acct(target), 0, signature, vec![])
}

fn poke() -> CallDescriptor {
    call("target", "poke()")
}

fn draft(actions: Vec<CallDescriptor>) -> ProposalDraft {
    actions
        .into_iter()
        .fold(ProposalDraft::new("test proposal"), ProposalDraft::action)
}

fn open_voting(gov: &Governor, chain: &NullChain, id: ProposalId) {
    let start = gov.proposal(id).unwrap().start_block;
    while chain.current_height() < start {
        chain.advance_blocks(1);
    }
}

fn close_voting(gov: &Governor, chain: &NullChain, id: ProposalId) {
    let end = gov.proposal(id).unwrap().end_block;
    while chain.current_height() <= end {
        chain.advance_blocks(1);
    }
}

/// Propose `actions` as alice, have alice lock `raw` behind them and close
/// the vote.
fn passed_proposal(
    gov: &mut Governor,
    chain: &NullChain,
    actions: Vec<CallDescriptor>,
    raw: u128,
) -> ProposalId {
    let id = gov.propose(&acct("alice"), draft(actions), chain).unwrap();
    open_voting(gov, chain, id);
    gov.cast_vote(&acct("alice"), id, true, raw, chain).unwrap();
    close_voting(gov, chain, id);
    id
}

// ── Proposal creation ───────────────────────────────────────────────────

#[test]
fn propose_returns_first_id_and_starts_pending() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    assert_eq!(id, 1);
    assert_eq!(gov.proposal_count(), 1);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Pending);

    let p = gov.proposal(id).unwrap();
    assert_eq!(p.start_block, BlockHeight::new(3));
    assert_eq!(p.end_block, BlockHeight::new(13));
    assert_eq!(p.proposer_votes, 500_000);
    assert_eq!(gov.latest_proposal_of(&acct("alice")), Some(1));
    assert_eq!(gov.actions(id).unwrap(), &[poke()]);
}

#[test]
fn propose_requires_threshold() {
    let (mut gov, chain) = setup();
    let err = gov
        .propose(&acct("bob"), draft(vec![poke()]), &chain)
        .unwrap_err();
    assert!(matches!(
        err,
        GovernanceError::BelowThreshold {
            have: 20_000,
            need: 400_000
        }
    ));
    assert_eq!(gov.proposal_count(), 0);
}

#[test]
fn propose_rejects_bad_action_arrays() {
    let (mut gov, chain) = setup();
    assert!(matches!(
        gov.propose(&acct("alice"), ProposalDraft::new("nothing"), &chain),
        Err(GovernanceError::InvalidActionCount(_))
    ));
    let mut mismatched = draft(vec![poke()]);
    mismatched.signatures.push("extra()".into());
    assert!(matches!(
        gov.propose(&acct("alice"), mismatched, &chain),
        Err(GovernanceError::InvalidActionCount(_))
    ));
}

#[test]
fn one_live_proposal_per_proposer() {
    let (mut gov, chain) = setup();
    let first = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    assert!(matches!(
        gov.propose(&acct("alice"), draft(vec![poke()]), &chain),
        Err(GovernanceError::ActiveProposalExists { existing, .. }) if existing == first
    ));

    // Once defeated, the proposer may try again.
    close_voting(&gov, &chain, first);
    assert_eq!(gov.state(first, &chain).unwrap(), ProposalState::Defeated);
    let second = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    assert_eq!(second, 2);
}

// ── Voting ──────────────────────────────────────────────────────────────

#[test]
fn quadratic_vote_weight() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);

    let weight = gov.cast_vote(&acct("bob"), id, true, 10_000, &chain).unwrap();
    assert_eq!(weight, 100);

    let p = gov.proposal(id).unwrap();
    assert_eq!(p.for_votes, 100);
    assert_eq!(p.raw_for_votes, 10_000);
    let receipt = gov.receipt(id, &acct("bob")).unwrap().unwrap();
    assert!(receipt.has_voted && receipt.support);
    assert_eq!((receipt.votes, receipt.raw_votes), (100, 10_000));

    assert_eq!(gov.ledger().locked_of(&acct("bob")), 10_000);
    assert_eq!(gov.ledger().current_votes(&acct("bob")), 10_000);
}

#[test]
fn vote_guards() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();

    assert!(matches!(
        gov.cast_vote(&acct("bob"), id, true, 100, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Pending,
            ..
        })
    ));

    open_voting(&gov, &chain, id);
    assert!(matches!(
        gov.cast_vote(&acct("carol"), id, true, 10_001, &chain),
        Err(GovernanceError::InsufficientBalance {
            needed: 10_001,
            available: 10_000
        })
    ));
    assert!(matches!(
        gov.cast_vote(&acct("carol"), id, true, 0, &chain),
        Err(GovernanceError::ZeroVotes)
    ));
    assert!(matches!(
        gov.cast_vote(&acct("nobody"), id, true, 1, &chain),
        Err(GovernanceError::InsufficientBalance { .. })
    ));

    gov.cast_vote(&acct("carol"), id, false, 400, &chain).unwrap();
    let before = gov.proposal(id).unwrap().clone();
    assert!(matches!(
        gov.cast_vote(&acct("carol"), id, true, 100, &chain),
        Err(GovernanceError::AlreadyVoted(_))
    ));
    assert_eq!(gov.proposal(id).unwrap(), &before);

    close_voting(&gov, &chain, id);
    assert!(matches!(
        gov.cast_vote(&acct("bob"), id, true, 100, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Defeated,
            ..
        })
    ));
}

#[test]
fn for_below_quorum_resolves_quorum_failed() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);
    gov.cast_vote(&acct("alice"), id, true, 250_000, &chain).unwrap();
    gov.cast_vote(&acct("carol"), id, false, 10_000, &chain).unwrap();
    close_voting(&gov, &chain, id);

    let p = gov.proposal(id).unwrap();
    assert_eq!((p.for_votes, p.against_votes, p.quorum_votes), (500, 100, 600));
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::QuorumFailed);
}

#[test]
fn tie_is_defeated() {
    let (mut gov, chain) = setup_full(
        GovernanceParams {
            quorum_votes: 0,
            ..params()
        },
        "governor",
    );
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);
    gov.cast_vote(&acct("alice"), id, true, 10_000, &chain).unwrap();
    gov.cast_vote(&acct("carol"), id, false, 10_000, &chain).unwrap();
    close_voting(&gov, &chain, id);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Defeated);
}

// ── Refunds ─────────────────────────────────────────────────────────────

#[test]
fn proposer_refund_after_success() {
    let (mut gov, chain) = setup_full(
        GovernanceParams {
            quorum_votes: 100,
            ..params()
        },
        "governor",
    );
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);
    gov.cast_vote(&acct("alice"), id, true, 1_000, &chain).unwrap();
    gov.cast_vote(&acct("bob"), id, true, 10_000, &chain).unwrap();
    close_voting(&gov, &chain, id);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Succeeded);

    let view = gov.proposal_view(id, Some(&acct("alice")), &chain).unwrap();
    assert_eq!(view.refundable, 601_500);

    let paid = gov.refund(&acct("alice"), id, &chain).unwrap();
    assert_eq!(paid, 601_500);
    assert_eq!(gov.ledger().balance_of(&acct("alice")), 500_000 - 1_000 + 601_500);
    assert_eq!(gov.ledger().locked_of(&acct("alice")), 0);

    let receipt = gov.receipt(id, &acct("alice")).unwrap().unwrap();
    assert!(receipt.has_votes_refunded && receipt.has_stake_refunded);
    assert!(matches!(
        gov.refund(&acct("alice"), id, &chain),
        Err(GovernanceError::AlreadyRefunded)
    ));

    assert_eq!(gov.refund(&acct("bob"), id, &chain).unwrap(), 10_000);
    assert_eq!(gov.ledger().locked_of(&acct("bob")), 0);
    assert_eq!(gov.ledger().balance_of(&acct("bob")), 20_000);
    assert!(matches!(
        gov.refund(&acct("bob"), id, &chain),
        Err(GovernanceError::AlreadyRefunded)
    ));

    let events = gov.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GovernanceEvent::Refunded {
            kind: RefundKind::Stake,
            amount: 601_500,
            ..
        }
    )));
}

#[test]
fn refund_waits_for_resolution() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);
    gov.cast_vote(&acct("bob"), id, true, 900, &chain).unwrap();
    assert!(matches!(
        gov.refund(&acct("bob"), id, &chain),
        Err(GovernanceError::NothingToRefund)
    ));
    assert!(matches!(
        gov.refund(&acct("carol"), id, &chain),
        Err(GovernanceError::NothingToRefund)
    ));
}

// ── Queue / execute ─────────────────────────────────────────────────────

#[test]
fn full_lifecycle_with_self_amendment() {
    let (mut gov, mut chain) = setup();
    let amend = GovernableParam::QuorumVotes
        .call(acct("governor"), 5_000)
        .unwrap();
    let id = passed_proposal(&mut gov, &chain, vec![amend, poke()], 490_000);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Succeeded);

    let eta = gov.queue(id, &chain).unwrap();
    assert_eq!(eta.as_secs(), chain.current_time().as_secs() + DELAY);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Queued);
    assert_eq!(gov.timelock().queued_transactions().len(), 2);
    assert!(matches!(
        gov.queue(id, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Queued,
            ..
        })
    ));

    assert!(matches!(
        gov.execute(id, &mut chain),
        Err(GovernanceError::Timelock(TimelockError::NotYetReady { .. }))
    ));

    chain.advance(DELAY);
    gov.execute(id, &mut chain).unwrap();

    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Executed);
    assert_eq!(gov.params().quorum_votes, 5_000);
    assert_eq!(chain.dispatched(), vec![poke()]);
    assert!(gov.timelock().queued_transactions().is_empty());

    let events = gov.drain_events();
    assert!(events.contains(&GovernanceEvent::ParamChanged {
        param: GovernableParam::QuorumVotes,
        old: 600,
        new: 5_000
    }));
    assert!(events.contains(&GovernanceEvent::ProposalExecuted { id }));
    assert!(gov.drain_events().is_empty());
}

#[test]
fn execution_stops_at_first_revert() {
    let (mut gov, mut chain) = setup();
    let pay = call("treasury", "pay()");
    let after = call("registry", "record()");
    let id = passed_proposal(&mut gov, &chain, vec![poke(), pay.clone(), after], 490_000);
    gov.queue(id, &chain).unwrap();
    chain.advance(DELAY);
    chain.reject_target(&pay.target, "treasury paused");

    let err = gov.execute(id, &mut chain).unwrap_err();
    assert!(matches!(
        &err,
        GovernanceError::ExecutionReverted { index: 1, reason, .. } if reason == "treasury paused"
    ));
    assert_eq!(err.class(), covenant_types::ErrorClass::Execution);
    assert_eq!(chain.dispatched(), vec![poke(), pay]);
    assert!(gov.timelock().queued_transactions().is_empty());
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Executed);
    assert!(matches!(
        gov.execute(id, &mut chain),
        Err(GovernanceError::InvalidState { .. })
    ));
}

#[test]
fn invalid_self_amendment_reverts() {
    let (mut gov, mut chain) = setup();
    let amend = GovernableParam::VotingPeriod
        .call(acct("governor"), 0)
        .unwrap();
    let id = passed_proposal(&mut gov, &chain, vec![amend], 490_000);
    gov.queue(id, &chain).unwrap();
    chain.advance(DELAY);
    assert!(matches!(
        gov.execute(id, &mut chain),
        Err(GovernanceError::ExecutionReverted { index: 0, .. })
    ));
    assert_eq!(gov.params().voting_period, 10);
}

#[test]
fn queued_proposal_expires_after_grace() {
    let (mut gov, mut chain) = setup();
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    gov.queue(id, &chain).unwrap();

    chain.advance(DELAY + GRACE);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Queued);
    chain.advance(1);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Expired);
    assert!(matches!(
        gov.execute(id, &mut chain),
        Err(GovernanceError::Timelock(TimelockError::StaleTransaction { .. }))
    ));
    assert!(chain.dispatched().is_empty());
}

#[test]
fn queue_rejects_identical_queued_action() {
    let (mut gov, chain) = setup();
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);

    // Someone else's identical action already sits in the timelock at the
    // same eta.
    let eta = gov.timelock().earliest_eta(chain.current_time());
    let now = chain.current_time();
    gov.timelock_mut()
        .queue_transaction(&acct("governor"), poke(), eta, now)
        .unwrap();

    assert!(matches!(gov.queue(id, &chain), Err(GovernanceError::AlreadyQueued)));
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Succeeded);
}

#[test]
fn queue_requires_timelock_admin() {
    let (mut gov, chain) = setup_full(params(), "deployer");
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    let err = gov.queue(id, &chain).unwrap_err();
    assert!(matches!(err, GovernanceError::Unauthorized { .. }));
    assert_eq!(err.class(), covenant_types::ErrorClass::Authorization);
}

// ── Cancel ──────────────────────────────────────────────────────────────

#[test]
fn cancel_twice_fails_and_leaves_state() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    gov.cancel(&acct("alice"), id, &chain).unwrap();
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Canceled);

    let before = gov.proposal(id).unwrap().clone();
    assert!(matches!(
        gov.cancel(&acct("alice"), id, &chain),
        Err(GovernanceError::AlreadyCanceled(1))
    ));
    assert_eq!(gov.proposal(id).unwrap(), &before);
}

#[test]
fn cancel_authority() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    assert!(matches!(
        gov.cancel(&acct("carol"), id, &chain),
        Err(GovernanceError::Unauthorized { .. })
    ));
    gov.cancel(&acct("guardian"), id, &chain).unwrap();
}

#[test]
fn anyone_cancels_when_proposer_drops_below_threshold() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    let h = chain.current_height();
    gov.ledger_mut()
        .transfer(&acct("alice"), &acct("dave"), 200_000, h)
        .unwrap();
    gov.cancel(&acct("carol"), id, &chain).unwrap();
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Canceled);
}

#[test]
fn proposer_stake_locked_in_own_vote_keeps_cancel_closed() {
    let (mut gov, chain) = setup();
    // alice keeps only 10_000 unlocked, below the 400_000 threshold.
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    gov.queue(id, &chain).unwrap();

    assert!(matches!(
        gov.cancel(&acct("carol"), id, &chain),
        Err(GovernanceError::Unauthorized { .. })
    ));
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Queued);
    assert_eq!(gov.timelock().queued_transactions().len(), 1);
}

#[test]
fn resolved_outcomes_cannot_be_canceled() {
    let (mut gov, chain) = setup();
    let defeated = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, defeated);
    gov.cast_vote(&acct("bob"), defeated, false, 900, &chain).unwrap();
    close_voting(&gov, &chain, defeated);
    assert_eq!(gov.state(defeated, &chain).unwrap(), ProposalState::Defeated);

    let supply = gov.ledger().total_supply();
    assert!(matches!(
        gov.refund(&acct("alice"), defeated, &chain),
        Err(GovernanceError::NothingToRefund)
    ));
    assert!(matches!(
        gov.cancel(&acct("alice"), defeated, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Defeated,
            ..
        })
    ));
    assert!(matches!(
        gov.refund(&acct("alice"), defeated, &chain),
        Err(GovernanceError::NothingToRefund)
    ));
    assert_eq!(gov.ledger().total_supply(), supply);

    // 100 raw is 10 votes, under the 600 quorum.
    let failed = passed_proposal(&mut gov, &chain, vec![poke()], 100);
    assert_eq!(gov.state(failed, &chain).unwrap(), ProposalState::QuorumFailed);
    assert!(matches!(
        gov.cancel(&acct("guardian"), failed, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::QuorumFailed,
            ..
        })
    ));
}

#[test]
fn expired_proposal_cannot_be_canceled() {
    let (mut gov, chain) = setup();
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    gov.queue(id, &chain).unwrap();
    chain.advance(DELAY + GRACE + 1);
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Expired);
    assert!(matches!(
        gov.cancel(&acct("alice"), id, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Expired,
            ..
        })
    ));
}

#[test]
fn cancel_queued_unqueues_and_pays_penalty_refund() {
    let (mut gov, chain) = setup();
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    gov.queue(id, &chain).unwrap();
    assert_eq!(gov.timelock().queued_transactions().len(), 1);

    gov.cancel(&acct("alice"), id, &chain).unwrap();
    assert!(gov.timelock().queued_transactions().is_empty());
    assert_eq!(gov.state(id, &chain).unwrap(), ProposalState::Canceled);

    let paid = gov.refund(&acct("alice"), id, &chain).unwrap();
    assert_eq!(paid, (490_000 + 400_000) * 3 / 4);
    assert_eq!(gov.ledger().locked_of(&acct("alice")), 0);
}

#[test]
fn executed_proposal_cannot_be_canceled() {
    let (mut gov, mut chain) = setup();
    let id = passed_proposal(&mut gov, &chain, vec![poke()], 490_000);
    gov.queue(id, &chain).unwrap();
    chain.advance(DELAY);
    gov.execute(id, &mut chain).unwrap();
    assert!(matches!(
        gov.cancel(&acct("guardian"), id, &chain),
        Err(GovernanceError::InvalidState {
            state: ProposalState::Executed,
            ..
        })
    ));
}

// ── Admin handoff and guardian ──────────────────────────────────────────

#[test]
fn timelock_handoff_to_governor() {
    let (mut gov, mut chain) = setup_full(params(), "deployer");
    let now = chain.current_time();
    let step = AdminHandoff::begin(gov.timelock_mut(), &acct("deployer"), &acct("governor"), now)
        .unwrap();
    assert!(matches!(step, HandoffStep::Queued(_)));
    let plan = step.plan().clone();
    assert_eq!(plan.eta.as_secs(), now.as_secs() + 180_000);

    assert!(matches!(
        gov.complete_admin_handoff(&acct("guardian"), &plan, &mut chain),
        Err(GovernanceError::Timelock(TimelockError::NotYetReady { .. }))
    ));

    chain.advance(180_000);
    AdminHandoff::execute_step(gov.timelock_mut(), &plan, &mut chain).unwrap();
    assert_eq!(gov.timelock().pending_admin(), Some(&acct("governor")));
    assert_eq!(gov.timelock().admin(), &acct("deployer"));

    assert!(matches!(
        gov.timelock_mut().accept_admin(&acct("mallory")),
        Err(TimelockError::Unauthorized { .. })
    ));
    assert!(matches!(
        gov.complete_admin_handoff(&acct("mallory"), &plan, &mut chain),
        Err(GovernanceError::Unauthorized { .. })
    ));

    gov.complete_admin_handoff(&acct("guardian"), &plan, &mut chain)
        .unwrap();
    assert_eq!(gov.timelock().admin(), &acct("governor"));
    assert_eq!(gov.timelock().pending_admin(), None);

    // Resuming a finished handoff is harmless.
    gov.complete_admin_handoff(&acct("guardian"), &plan, &mut chain)
        .unwrap();
}

#[test]
fn guardian_abdication() {
    let (mut gov, chain) = setup();
    assert!(gov.abdicate(&acct("alice")).is_err());
    gov.abdicate(&acct("guardian")).unwrap();
    assert_eq!(gov.guardian(), None);

    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    assert!(matches!(
        gov.cancel(&acct("guardian"), id, &chain),
        Err(GovernanceError::Unauthorized { .. })
    ));
}

// ── Read interface and persistence ──────────────────────────────────────

#[test]
fn proposal_view_tracks_viewer() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);

    let view = gov.proposal_view(id, Some(&acct("bob")), &chain).unwrap();
    assert_eq!(view.state, ProposalState::Active);
    assert!(view.eligible_to_vote);
    assert!(view.receipt.is_none());
    assert_eq!(view.description, "test proposal");

    gov.cast_vote(&acct("bob"), id, false, 2_500, &chain).unwrap();
    let view = gov.proposal_view(id, Some(&acct("bob")), &chain).unwrap();
    assert!(!view.eligible_to_vote);
    assert_eq!(view.receipt.as_ref().map(|r| r.votes), Some(50));
    assert_eq!(view.refundable, 0);

    close_voting(&gov, &chain, id);
    let view = gov.proposal_view(id, Some(&acct("bob")), &chain).unwrap();
    assert_eq!(view.state, ProposalState::Defeated);
    assert_eq!(view.refundable, 2_500);

    let anonymous = gov.proposal_view(id, None, &chain).unwrap();
    assert_eq!(anonymous.refundable, 0);
    assert!(!anonymous.eligible_to_vote);
    assert_eq!(gov.proposal_views(None, &chain).unwrap().len(), 1);
}

#[test]
fn state_survives_persistence() {
    let (mut gov, chain) = setup();
    let id = gov.propose(&acct("alice"), draft(vec![poke()]), &chain).unwrap();
    open_voting(&gov, &chain, id);
    gov.cast_vote(&acct("bob"), id, true, 10_000, &chain).unwrap();

    let bytes = gov.save_state().unwrap();
    let restored = Governor::load_state(&bytes).unwrap();
    assert_eq!(restored.proposal(id).unwrap(), gov.proposal(id).unwrap());
    assert_eq!(
        restored.state(id, &chain).unwrap(),
        gov.state(id, &chain).unwrap()
    );
    assert_eq!(restored.ledger().locked_of(&acct("bob")), 10_000);
    assert_eq!(restored.timelock().admin(), &acct("governor"));
    assert!(matches!(Governor::load_state(&[1, 2, 3]), Err(GovernanceError::Serialization(_))));
}

#[test]
fn unknown_proposal() {
    let (gov, chain) = setup();
    assert!(matches!(
        gov.state(7, &chain),
        Err(GovernanceError::ProposalNotFound(7))
    ));
}
