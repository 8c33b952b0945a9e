//! The timelock itself: admin-gated queue, ETA/grace window, self-calls.

use crate::error::TimelockError;
use crate::queue::{transaction_hash, QueuedTransaction};
use covenant_types::{
    AccountId, CallDescriptor, ExecutionEnvironment, Revert, TimelockParams, Timestamp, TxHash,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Signatures the timelock handles itself when a queued call targets its own
/// address.
pub const SET_PENDING_ADMIN: &str = "setPendingAdmin(address)";
pub const SET_DELAY: &str = "setDelay(uint256)";
pub const SET_GRACE_PERIOD: &str = "setGracePeriod(uint256)";
pub const SET_HANDOFF_DELAY: &str = "setHandoffDelay(uint256)";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Timelock {
    address: AccountId,
    admin: AccountId,
    pending_admin: Option<AccountId>,
    params: TimelockParams,
    queued: HashMap<TxHash, QueuedTransaction>,
}

impl Timelock {
    pub fn new(
        address: AccountId,
        admin: AccountId,
        params: TimelockParams,
    ) -> Result<Self, TimelockError> {
        params.validate()?;
        Ok(Self {
            address,
            admin,
            pending_admin: None,
            params,
            queued: HashMap::new(),
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn address(&self) -> &AccountId {
        &self.address
    }

    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    pub fn pending_admin(&self) -> Option<&AccountId> {
        self.pending_admin.as_ref()
    }

    pub fn params(&self) -> &TimelockParams {
        &self.params
    }

    pub fn delay(&self) -> u64 {
        self.params.minimum_delay
    }

    pub fn grace_period(&self) -> u64 {
        self.params.grace_period
    }

    pub fn is_queued(&self, hash: &TxHash) -> bool {
        self.queued.contains_key(hash)
    }

    pub fn queued_transaction(&self, hash: &TxHash) -> Option<&QueuedTransaction> {
        self.queued.get(hash)
    }

    /// All queued transactions, ordered by ETA.
    pub fn queued_transactions(&self) -> Vec<&QueuedTransaction> {
        let mut txs: Vec<_> = self.queued.values().collect();
        txs.sort_by(|a, b| a.eta.cmp(&b.eta).then(a.hash.as_bytes().cmp(b.hash.as_bytes())));
        txs
    }

    /// Earliest ETA a transaction queued at `now` may carry.
    pub fn earliest_eta(&self, now: Timestamp) -> Timestamp {
        now.saturating_add(self.params.minimum_delay)
    }

    // ── Queue / execute / cancel ────────────────────────────────────────

    pub fn queue_transaction(
        &mut self,
        caller: &AccountId,
        call: CallDescriptor,
        eta: Timestamp,
        now: Timestamp,
    ) -> Result<TxHash, TimelockError> {
        self.require_admin(caller)?;

        let earliest = self.earliest_eta(now);
        if eta < earliest {
            return Err(TimelockError::EtaTooSoon { eta, earliest });
        }

        let hash = transaction_hash(&call, eta);
        if self.queued.contains_key(&hash) {
            return Err(TimelockError::AlreadyQueued(hash));
        }

        info!(%hash, target = %call.target, signature = %call.signature, %eta, "transaction queued");
        self.queued.insert(
            hash,
            QueuedTransaction {
                hash,
                call,
                eta,
                queued_at: now,
            },
        );
        Ok(hash)
    }

    /// Execute a queued transaction. Anyone may call this once the ETA has
    /// passed and before the grace period ends.
    ///
    /// The entry is consumed before dispatch, so a reverted call is not
    /// retried and must be queued again.
    pub fn execute_transaction(
        &mut self,
        call: &CallDescriptor,
        eta: Timestamp,
        env: &mut dyn ExecutionEnvironment,
    ) -> Result<TxHash, TimelockError> {
        let hash = transaction_hash(call, eta);
        if !self.queued.contains_key(&hash) {
            return Err(TimelockError::NotQueued(hash));
        }

        let now = env.current_time();
        if now < eta {
            return Err(TimelockError::NotYetReady { eta, now });
        }
        if eta.has_expired(self.params.grace_period, now) {
            return Err(TimelockError::StaleTransaction {
                eta,
                expired_at: eta.saturating_add(self.params.grace_period),
            });
        }

        self.queued.remove(&hash);

        let outcome = if call.target == self.address {
            self.apply_self_call(call)
        } else {
            env.dispatch(call)
        };

        match outcome {
            Ok(()) => {
                info!(%hash, target = %call.target, signature = %call.signature, "transaction executed");
                Ok(hash)
            }
            Err(revert) => {
                warn!(%hash, reason = %revert, "transaction reverted");
                Err(TimelockError::ExecutionReverted {
                    hash,
                    reason: revert.reason,
                })
            }
        }
    }

    /// Remove a queued transaction. Canceling something that is not queued
    /// is a no-op.
    pub fn cancel_transaction(
        &mut self,
        caller: &AccountId,
        call: &CallDescriptor,
        eta: Timestamp,
    ) -> Result<TxHash, TimelockError> {
        self.require_admin(caller)?;
        let hash = transaction_hash(call, eta);
        if self.queued.remove(&hash).is_some() {
            info!(%hash, "transaction canceled");
        } else {
            debug!(%hash, "cancel of transaction that is not queued");
        }
        Ok(hash)
    }

    // ── Admin handoff ───────────────────────────────────────────────────

    /// Second phase of an admin handoff: the pending admin takes over.
    pub fn accept_admin(&mut self, caller: &AccountId) -> Result<(), TimelockError> {
        match &self.pending_admin {
            Some(pending) if pending == caller => {
                info!(old = %self.admin, new = %caller, "timelock admin accepted");
                self.admin = caller.clone();
                self.pending_admin = None;
                Ok(())
            }
            _ => Err(TimelockError::Unauthorized {
                caller: caller.clone(),
                required: "pending admin".into(),
            }),
        }
    }

    // ── Self-calls (only the timelock may invoke these) ─────────────────

    pub fn set_pending_admin(
        &mut self,
        caller: &AccountId,
        pending: AccountId,
    ) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        info!(%pending, "pending timelock admin set");
        self.pending_admin = Some(pending);
        Ok(())
    }

    pub fn set_delay(&mut self, caller: &AccountId, delay: u64) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        let max = self.params.maximum_delay.min(self.params.handoff_delay);
        if delay == 0 || delay > max {
            return Err(TimelockError::InvalidDelay { delay, min: 1, max });
        }
        info!(old = self.params.minimum_delay, new = delay, "timelock delay changed");
        self.params.minimum_delay = delay;
        Ok(())
    }

    pub fn set_grace_period(&mut self, caller: &AccountId, grace: u64) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        if grace == 0 {
            return Err(TimelockError::InvalidDelay {
                delay: grace,
                min: 1,
                max: u64::MAX,
            });
        }
        info!(old = self.params.grace_period, new = grace, "timelock grace period changed");
        self.params.grace_period = grace;
        Ok(())
    }

    pub fn set_handoff_delay(&mut self, caller: &AccountId, delay: u64) -> Result<(), TimelockError> {
        self.require_self(caller)?;
        if delay < self.params.minimum_delay {
            return Err(TimelockError::InvalidDelay {
                delay,
                min: self.params.minimum_delay,
                max: u64::MAX,
            });
        }
        info!(old = self.params.handoff_delay, new = delay, "handoff delay changed");
        self.params.handoff_delay = delay;
        Ok(())
    }

    fn apply_self_call(&mut self, call: &CallDescriptor) -> Result<(), Revert> {
        let me = self.address.clone();
        let result = match call.signature.as_str() {
            SET_PENDING_ADMIN => call
                .decode_args::<AccountId>()
                .map_err(TimelockError::from)
                .and_then(|pending| self.set_pending_admin(&me, pending)),
            SET_DELAY => call
                .decode_args::<u64>()
                .map_err(TimelockError::from)
                .and_then(|delay| self.set_delay(&me, delay)),
            SET_GRACE_PERIOD => call
                .decode_args::<u64>()
                .map_err(TimelockError::from)
                .and_then(|grace| self.set_grace_period(&me, grace)),
            SET_HANDOFF_DELAY => call
                .decode_args::<u64>()
                .map_err(TimelockError::from)
                .and_then(|delay| self.set_handoff_delay(&me, delay)),
            other => return Err(Revert::new(format!("timelock has no method {other}"))),
        };
        result.map_err(|e| Revert::new(e.to_string()))
    }

    fn require_admin(&self, caller: &AccountId) -> Result<(), TimelockError> {
        if caller != &self.admin {
            return Err(TimelockError::Unauthorized {
                caller: caller.clone(),
                required: "timelock admin".into(),
            });
        }
        Ok(())
    }

    fn require_self(&self, caller: &AccountId) -> Result<(), TimelockError> {
        if caller != &self.address {
            return Err(TimelockError::Unauthorized {
                caller: caller.clone(),
                required: "the timelock itself".into(),
            });
        }
        Ok(())
    }
}
