//! Subcommand implementations. Each returns the text to print.

use crate::config::CliConfig;
use crate::devnet::{DevChain, Deployment, LogEntry};
use anyhow::{bail, Context};
use covenant_governance::{GovernableParam, Governor, ProposalDraft, ProposalView};
use covenant_ledger::{LedgerSummary, VoteLedger};
use covenant_timelock::{
    AdminHandoff, HandoffPlan, HandoffProgress, HandoffStep, QueuedTransaction, Timelock,
};
use covenant_types::{
    AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, GovernanceParams, NetworkId,
    ProposalId, Timestamp,
};
use covenant_utils::{format_countdown, format_duration};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

pub const TIMELOCK_ADDRESS: &str = "timelock";
pub const GOVERNOR_ADDRESS: &str = "governor";

const HOUR: u64 = 3600;

// ── Deployment ─────────────────────────────────────────────────────────

/// Deploy the token ledger, timelock and governor, then hand the timelock
/// to the governor.
///
/// On a local network time is advanced past the handoff ETA and the switch
/// is completed in the same run. Otherwise the command needed to finish it
/// later is returned.
pub fn deploy(config: &CliConfig, genesis: Timestamp) -> anyhow::Result<(Deployment, String)> {
    let mut chain = DevChain::new(BlockHeight::new(1), genesis);
    let deployer = config.deployer.clone();
    info!(%deployer, network = config.network.as_str(), "deploying");

    let mut ledger = VoteLedger::new();
    let height = chain.current_height();
    ledger.mint(&deployer, config.initial_supply, height)?;
    ledger.delegate(&deployer, &deployer, height)?;
    chain.mine();

    let timelock = Timelock::new(
        AccountId::new(TIMELOCK_ADDRESS),
        deployer.clone(),
        config.timelock.clone(),
    )?;
    info!(address = TIMELOCK_ADDRESS, admin = %deployer, delay = config.timelock.minimum_delay, "timelock deployed");

    let governor_address = AccountId::new(GOVERNOR_ADDRESS);
    let mut governor = Governor::new(
        governor_address.clone(),
        deployer.clone(),
        config.governance.clone(),
        ledger,
        timelock,
    )?;
    info!(address = GOVERNOR_ADDRESS, guardian = %deployer, "governor deployed");
    chain.mine();

    let step = AdminHandoff::begin(
        governor.timelock_mut(),
        &deployer,
        &governor_address,
        chain.current_time(),
    )?;
    chain.mine();
    let plan = step.plan().clone();

    let mut out = String::new();
    writeln!(out, "Timelock deployed to: {TIMELOCK_ADDRESS}")?;
    writeln!(out, "Governor deployed to: {GOVERNOR_ADDRESS}")?;
    match step {
        HandoffStep::Queued(_) if config.network.is_local() => {
            let wait = plan.eta.remaining_from(chain.current_time()) + HOUR;
            chain.advance_secs(wait);
            writeln!(out, "Advanced {}.", format_duration(wait))?;
            governor.complete_admin_handoff(&deployer, &plan, &mut chain)?;
            chain.mine();
            writeln!(out, "Done performing timelock admin switch.")?;
        }
        HandoffStep::Queued(_) => {
            writeln!(out, "Queued setPendingAdmin on the timelock.")?;
            out.push_str(&switch_instructions(&plan));
        }
        HandoffStep::Manual(manual) => {
            warn!(reason = %manual.reason, "timelock admin switch needs manual completion");
            writeln!(out, "{}", manual.instructions())?;
            out.push_str(&switch_instructions(&plan));
        }
    }

    let deployment = Deployment {
        network: config.network,
        deployer,
        chain,
        governor,
        handoff: Some(plan),
    };
    Ok((deployment, out))
}

/// The command that finishes a pending timelock admin switch.
pub fn switch_instructions(plan: &HandoffPlan) -> String {
    format!(
        "---\nRun this after eta {} to complete the timelock admin switch:\n\n\
         covenant complete-admin-switch --target {} --value {} --signature \"{}\" --data 0x{} --eta {}\n---\n",
        plan.eta.as_secs(),
        plan.call.target,
        plan.call.value,
        plan.call.signature,
        hex::encode(&plan.call.data),
        plan.eta.as_secs(),
    )
}

/// Rebuild a handoff plan from the raw parameters printed at deploy time.
pub fn handoff_plan_from_args(
    deployment: &Deployment,
    target: AccountId,
    value: u128,
    signature: String,
    data: Vec<u8>,
    eta: u64,
) -> anyhow::Result<HandoffPlan> {
    let call = CallDescriptor::new(target, value, signature, data);
    let new_admin: AccountId = call
        .decode_args()
        .context("decoding setPendingAdmin argument")?;
    Ok(HandoffPlan {
        timelock: deployment.governor.timelock().address().clone(),
        new_admin,
        call,
        eta: Timestamp::new(eta),
    })
}

pub fn complete_admin_switch(
    deployment: &mut Deployment,
    caller: &AccountId,
    plan: &HandoffPlan,
) -> anyhow::Result<String> {
    let Deployment {
        governor, chain, ..
    } = deployment;
    governor.complete_admin_handoff(caller, plan, chain)?;
    chain.mine();
    Ok(format!(
        "Timelock admin is now {}.",
        governor.timelock().admin()
    ))
}

// ── Token setup ────────────────────────────────────────────────────────

pub fn mint(deployment: &mut Deployment, to: &AccountId, amount: u128) -> anyhow::Result<String> {
    let height = deployment.chain.current_height();
    deployment.governor.ledger_mut().mint(to, amount, height)?;
    deployment.chain.mine();
    Ok(format!(
        "Minted {amount} to {to}; balance {}.",
        deployment.governor.ledger().balance_of(to)
    ))
}

pub fn delegate(
    deployment: &mut Deployment,
    from: &AccountId,
    to: &AccountId,
) -> anyhow::Result<String> {
    let height = deployment.chain.current_height();
    deployment.governor.ledger_mut().delegate(from, to, height)?;
    deployment.chain.mine();
    Ok(format!(
        "{from} delegated to {to}; {to} now has {} votes.",
        deployment.governor.ledger().current_votes(to)
    ))
}

// ── Proposal lifecycle ─────────────────────────────────────────────────

/// Build a draft from parallel action arrays plus `name=value` parameter
/// amendments targeting the governor.
pub fn build_draft(
    description: String,
    targets: Vec<AccountId>,
    values: Vec<u128>,
    signatures: Vec<String>,
    calldatas: Vec<Vec<u8>>,
    amendments: &[String],
) -> anyhow::Result<ProposalDraft> {
    let mut draft = ProposalDraft {
        targets,
        values,
        signatures,
        calldatas,
        description,
    };
    for amendment in amendments {
        let (name, value) = amendment
            .split_once('=')
            .with_context(|| format!("amendment {amendment:?} must be name=value"))?;
        let param = GovernableParam::ALL
            .into_iter()
            .find(|p| p.name() == name.trim())
            .with_context(|| format!("unknown parameter {name:?}"))?;
        let value: u128 = value
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}"))?;
        draft = draft.action(param.call(AccountId::new(GOVERNOR_ADDRESS), value)?);
    }
    Ok(draft)
}

pub fn propose(
    deployment: &mut Deployment,
    proposer: &AccountId,
    draft: ProposalDraft,
) -> anyhow::Result<String> {
    let id = deployment
        .governor
        .propose(proposer, draft, &deployment.chain)?;
    deployment.chain.mine();
    let p = deployment.governor.proposal(id)?;
    Ok(format!(
        "Proposal {id} created; voting runs {} to {}.",
        p.start_block, p.end_block
    ))
}

pub fn vote(
    deployment: &mut Deployment,
    voter: &AccountId,
    id: ProposalId,
    support: bool,
    amount: u128,
) -> anyhow::Result<String> {
    let weight = deployment
        .governor
        .cast_vote(voter, id, support, amount, &deployment.chain)?;
    deployment.chain.mine();
    Ok(format!(
        "{voter} locked {amount} {} proposal {id} for {weight} votes.",
        if support { "for" } else { "against" }
    ))
}

pub fn queue(deployment: &mut Deployment, id: ProposalId) -> anyhow::Result<String> {
    let eta = deployment.governor.queue(id, &deployment.chain)?;
    deployment.chain.mine();
    Ok(format!(
        "Proposal {id} queued; executable {} (eta {}).",
        format_countdown(eta.as_secs(), deployment.chain.current_time().as_secs()),
        eta.as_secs()
    ))
}

pub fn execute(deployment: &mut Deployment, id: ProposalId) -> anyhow::Result<String> {
    let Deployment {
        governor, chain, ..
    } = deployment;
    let result = governor.execute(id, chain);
    // A reverted execution still consumed the proposal; keep the block.
    chain.mine();
    result?;
    Ok(format!("Proposal {id} executed."))
}

pub fn cancel(deployment: &mut Deployment, caller: &AccountId, id: ProposalId) -> anyhow::Result<String> {
    deployment.governor.cancel(caller, id, &deployment.chain)?;
    deployment.chain.mine();
    Ok(format!("Proposal {id} canceled."))
}

pub fn refund(deployment: &mut Deployment, caller: &AccountId, id: ProposalId) -> anyhow::Result<String> {
    let amount = deployment.governor.refund(caller, id, &deployment.chain)?;
    deployment.chain.mine();
    Ok(format!("Refunded {amount} to {caller}."))
}

pub fn advance(deployment: &mut Deployment, blocks: u64, hours: u64) -> anyhow::Result<String> {
    if blocks == 0 && hours == 0 {
        bail!("nothing to advance: pass --blocks and/or --hours");
    }
    if hours > 0 {
        deployment.chain.advance_secs(hours * HOUR);
    }
    deployment.chain.advance_blocks(blocks);
    Ok(format!(
        "Now at height {} time {}.",
        deployment.chain.current_height(),
        deployment.chain.current_time().as_secs()
    ))
}

// ── Reads ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TimelockOverview<'a> {
    address: &'a AccountId,
    admin: &'a AccountId,
    pending_admin: Option<&'a AccountId>,
    delay: u64,
    grace_period: u64,
    queued: Vec<&'a QueuedTransaction>,
}

#[derive(Serialize)]
struct HandoffOverview<'a> {
    plan: &'a HandoffPlan,
    progress: String,
    eta: String,
}

#[derive(Serialize)]
struct Overview<'a> {
    network: NetworkId,
    height: BlockHeight,
    time: Timestamp,
    governor: &'a AccountId,
    guardian: Option<&'a AccountId>,
    params: &'a GovernanceParams,
    timelock: TimelockOverview<'a>,
    handoff: Option<HandoffOverview<'a>>,
    ledger: LedgerSummary,
    proposals: Vec<ProposalView>,
    calls: &'a [LogEntry],
}

/// JSON for one proposal, or for the whole deployment.
pub fn show(
    deployment: &Deployment,
    id: Option<ProposalId>,
    voter: Option<&AccountId>,
) -> anyhow::Result<String> {
    let gov = &deployment.governor;
    let chain = &deployment.chain;
    if let Some(id) = id {
        return Ok(serde_json::to_string_pretty(
            &gov.proposal_view(id, voter, chain)?,
        )?);
    }

    let timelock = gov.timelock();
    let now = chain.current_time();
    let overview = Overview {
        network: deployment.network,
        height: chain.current_height(),
        time: now,
        governor: gov.address(),
        guardian: gov.guardian(),
        params: gov.params(),
        timelock: TimelockOverview {
            address: timelock.address(),
            admin: timelock.admin(),
            pending_admin: timelock.pending_admin(),
            delay: timelock.delay(),
            grace_period: timelock.grace_period(),
            queued: timelock.queued_transactions(),
        },
        handoff: deployment.handoff.as_ref().map(|plan| HandoffOverview {
            plan,
            progress: format!("{:?}", AdminHandoff::progress(timelock, plan, now)),
            eta: format_countdown(plan.eta.as_secs(), now.as_secs()),
        }),
        ledger: gov.ledger().summary(),
        proposals: gov.proposal_views(voter, chain)?,
        calls: chain.log(),
    };
    Ok(serde_json::to_string_pretty(&overview)?)
}

/// Current values of every governable parameter.
pub fn params(deployment: &Deployment) -> String {
    let gov = &deployment.governor;
    let mut out = String::new();
    for param in GovernableParam::ALL {
        let _ = writeln!(
            out,
            "{:<20} {:>12}   {}",
            param.name(),
            param.current(gov.params()),
            param.signature()
        );
    }
    let timelock = gov.timelock().params();
    let _ = writeln!(out, "{:<20} {:>12}   setDelay(uint256)", "timelock_delay", timelock.minimum_delay);
    let _ = writeln!(out, "{:<20} {:>12}   setGracePeriod(uint256)", "grace_period", timelock.grace_period);
    let _ = writeln!(out, "{:<20} {:>12}   setHandoffDelay(uint256)", "handoff_delay", timelock.handoff_delay);
    out
}

/// Whether the deploy-time handoff still needs finishing.
pub fn handoff_pending(deployment: &Deployment) -> bool {
    deployment.handoff.as_ref().is_some_and(|plan| {
        AdminHandoff::progress(
            deployment.governor.timelock(),
            plan,
            deployment.chain.current_time(),
        ) != HandoffProgress::Completed
    })
}
