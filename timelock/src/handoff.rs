//! Two-phase admin handoff orchestration.
//!
//! 1. The current admin queues `setPendingAdmin(new_admin)` with an ETA of
//!    `now + handoff_delay`.
//! 2. Once the ETA is reached, anyone executes it.
//! 3. The new admin calls `accept_admin`.
//!
//! When step 1 cannot be performed by the orchestrating caller (it is not the
//! admin, or the same call is already queued) the handoff degrades to a
//! [`ManualHandoff`]: the exact parameters are handed back so an operator can
//! perform the remaining steps out of band.

use crate::error::TimelockError;
use crate::queue::transaction_hash;
use crate::timelock::{Timelock, SET_PENDING_ADMIN};
use covenant_types::{AccountId, CallDescriptor, ExecutionEnvironment, Timestamp, TxHash};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::{info, warn};

/// Everything needed to finish a handoff.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPlan {
    pub timelock: AccountId,
    pub new_admin: AccountId,
    pub call: CallDescriptor,
    pub eta: Timestamp,
}

impl HandoffPlan {
    pub fn hash(&self) -> TxHash {
        transaction_hash(&self.call, self.eta)
    }
}

/// Outcome of [`AdminHandoff::begin`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandoffStep {
    /// The `setPendingAdmin` call is queued.
    Queued(HandoffPlan),
    /// Queueing failed; the operator has to finish by hand.
    Manual(ManualHandoff),
}

impl HandoffStep {
    pub fn plan(&self) -> &HandoffPlan {
        match self {
            Self::Queued(plan) => plan,
            Self::Manual(manual) => &manual.plan,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualHandoff {
    pub plan: HandoffPlan,
    pub reason: String,
}

impl ManualHandoff {
    /// Operator-facing instructions for finishing the handoff.
    pub fn instructions(&self) -> String {
        let plan = &self.plan;
        let mut out = String::new();
        let _ = writeln!(out, "Admin handoff must be completed manually ({}).", self.reason);
        let _ = writeln!(out, "After {} run executeTransaction on {} with:", plan.eta, plan.timelock);
        let _ = writeln!(out, "  target:    {}", plan.call.target);
        let _ = writeln!(out, "  value:     {}", plan.call.value);
        let _ = writeln!(out, "  signature: {}", plan.call.signature);
        let _ = writeln!(out, "  data:      0x{}", hex::encode(&plan.call.data));
        let _ = writeln!(out, "  eta:       {}", plan.eta.as_secs());
        let _ = write!(out, "then have {} call acceptAdmin.", plan.new_admin);
        out
    }
}

/// Where a handoff currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandoffProgress {
    /// Queued, ETA not reached.
    Waiting { ready_in: u64 },
    /// Queued and executable now.
    Ready,
    /// Queued but past its grace period.
    Stale,
    /// Pending admin is set; waiting for `accept_admin`.
    AwaitingAcceptance,
    /// The new admin holds authority.
    Completed,
    /// Not queued and not applied.
    NotQueued,
}

pub struct AdminHandoff;

impl AdminHandoff {
    /// Build the plan for handing `timelock` over to `new_admin`.
    pub fn plan(
        timelock: &Timelock,
        new_admin: &AccountId,
        now: Timestamp,
    ) -> Result<HandoffPlan, TimelockError> {
        let call = CallDescriptor::with_args(
            timelock.address().clone(),
            0,
            SET_PENDING_ADMIN,
            new_admin,
        )?;
        Ok(HandoffPlan {
            timelock: timelock.address().clone(),
            new_admin: new_admin.clone(),
            call,
            eta: now.saturating_add(timelock.params().handoff_delay),
        })
    }

    /// Queue the `setPendingAdmin` step. Failure to queue is not an error:
    /// it yields [`HandoffStep::Manual`] carrying the same plan.
    pub fn begin(
        timelock: &mut Timelock,
        caller: &AccountId,
        new_admin: &AccountId,
        now: Timestamp,
    ) -> Result<HandoffStep, TimelockError> {
        let plan = Self::plan(timelock, new_admin, now)?;
        match timelock.queue_transaction(caller, plan.call.clone(), plan.eta, now) {
            Ok(hash) => {
                info!(%hash, new_admin = %new_admin, eta = %plan.eta, "admin handoff queued");
                Ok(HandoffStep::Queued(plan))
            }
            Err(e) => {
                warn!(error = %e, "admin handoff could not be queued, manual completion required");
                Ok(HandoffStep::Manual(ManualHandoff {
                    plan,
                    reason: e.to_string(),
                }))
            }
        }
    }

    pub fn progress(timelock: &Timelock, plan: &HandoffPlan, now: Timestamp) -> HandoffProgress {
        if timelock.admin() == &plan.new_admin {
            return HandoffProgress::Completed;
        }
        if timelock.pending_admin() == Some(&plan.new_admin) {
            return HandoffProgress::AwaitingAcceptance;
        }
        if !timelock.is_queued(&plan.hash()) {
            return HandoffProgress::NotQueued;
        }
        if now < plan.eta {
            HandoffProgress::Waiting {
                ready_in: plan.eta.remaining_from(now),
            }
        } else if plan.eta.has_expired(timelock.grace_period(), now) {
            HandoffProgress::Stale
        } else {
            HandoffProgress::Ready
        }
    }

    /// Execute the queued step if it has not run yet. Returns the progress
    /// after the attempt; steps already performed are skipped.
    pub fn execute_step(
        timelock: &mut Timelock,
        plan: &HandoffPlan,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<HandoffProgress, TimelockError> {
        match Self::progress(timelock, plan, env.current_time()) {
            HandoffProgress::Ready => {
                timelock.execute_transaction(&plan.call, plan.eta, env)?;
                Ok(HandoffProgress::AwaitingAcceptance)
            }
            HandoffProgress::Waiting { .. } => Err(TimelockError::NotYetReady {
                eta: plan.eta,
                now: env.current_time(),
            }),
            HandoffProgress::Stale => Err(TimelockError::StaleTransaction {
                eta: plan.eta,
                expired_at: plan.eta.saturating_add(timelock.grace_period()),
            }),
            HandoffProgress::NotQueued => Err(TimelockError::NotQueued(plan.hash())),
            done => Ok(done),
        }
    }

    /// Finish the handoff on behalf of the new admin: execute the queued step
    /// (if still needed) and accept. Safe to call again after a partial run.
    pub fn complete(
        timelock: &mut Timelock,
        plan: &HandoffPlan,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<(), TimelockError> {
        match Self::execute_step(timelock, plan, env)? {
            HandoffProgress::Completed => {
                info!(admin = %plan.new_admin, "admin handoff already complete");
                Ok(())
            }
            _ => {
                timelock.accept_admin(&plan.new_admin)?;
                info!(admin = %plan.new_admin, "admin handoff complete");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_nullables::NullChain;
    use covenant_types::TimelockParams;

    fn setup() -> (Timelock, NullChain) {
        let tl = Timelock::new(
            AccountId::new("timelock"),
            AccountId::new("deployer"),
            TimelockParams::default(),
        )
        .unwrap();
        (tl, NullChain::default())
    }

    #[test]
    fn plan_uses_handoff_delay() {
        let (tl, chain) = setup();
        let plan = AdminHandoff::plan(&tl, &AccountId::new("gov"), chain.current_time()).unwrap();
        assert_eq!(plan.eta, chain.current_time().saturating_add(180_000));
        assert_eq!(plan.call.target, AccountId::new("timelock"));
        assert_eq!(plan.call.decode_args::<AccountId>().unwrap(), AccountId::new("gov"));
    }

    #[test]
    fn begin_without_authority_degrades_to_manual() {
        let (mut tl, chain) = setup();
        let step = AdminHandoff::begin(
            &mut tl,
            &AccountId::new("stranger"),
            &AccountId::new("gov"),
            chain.current_time(),
        )
        .unwrap();
        let HandoffStep::Manual(manual) = step else {
            panic!("expected manual handoff");
        };
        assert!(tl.queued_transactions().is_empty());
        let text = manual.instructions();
        assert!(text.contains("setPendingAdmin(address)"));
        assert!(text.contains(&manual.plan.eta.as_secs().to_string()));
        assert!(text.contains("gov"));
    }

    #[test]
    fn progress_walks_through_each_phase() {
        let (mut tl, mut chain) = setup();
        let gov = AccountId::new("gov");
        let step = AdminHandoff::begin(&mut tl, &AccountId::new("deployer"), &gov, chain.current_time())
            .unwrap();
        let plan = step.plan().clone();

        assert_eq!(
            AdminHandoff::progress(&tl, &plan, chain.current_time()),
            HandoffProgress::Waiting { ready_in: 180_000 }
        );
        assert!(matches!(
            AdminHandoff::complete(&mut tl, &plan, &mut chain),
            Err(TimelockError::NotYetReady { .. })
        ));

        chain.set_time(plan.eta.as_secs());
        assert_eq!(AdminHandoff::progress(&tl, &plan, chain.current_time()), HandoffProgress::Ready);

        AdminHandoff::execute_step(&mut tl, &plan, &mut chain).unwrap();
        assert_eq!(
            AdminHandoff::progress(&tl, &plan, chain.current_time()),
            HandoffProgress::AwaitingAcceptance
        );

        AdminHandoff::complete(&mut tl, &plan, &mut chain).unwrap();
        assert_eq!(tl.admin(), &gov);
        assert_eq!(AdminHandoff::progress(&tl, &plan, chain.current_time()), HandoffProgress::Completed);

        // Re-running after completion is a no-op.
        AdminHandoff::complete(&mut tl, &plan, &mut chain).unwrap();
    }

    #[test]
    fn stale_handoff_reports_stale() {
        let (mut tl, mut chain) = setup();
        let step = AdminHandoff::begin(
            &mut tl,
            &AccountId::new("deployer"),
            &AccountId::new("gov"),
            chain.current_time(),
        )
        .unwrap();
        let plan = step.plan().clone();
        chain.set_time(plan.eta.as_secs() + tl.grace_period() + 1);
        assert_eq!(AdminHandoff::progress(&tl, &plan, chain.current_time()), HandoffProgress::Stale);
        assert!(matches!(
            AdminHandoff::complete(&mut tl, &plan, &mut chain),
            Err(TimelockError::StaleTransaction { .. })
        ));
    }
}
