//! Nullable chain: deterministic height, time and call dispatch.

use covenant_types::{AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, Revert, Timestamp};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A deterministic execution environment for testing.
///
/// Height and time only advance when you tell them to. Dispatched calls are
/// recorded; calls to a target (or a signature) registered with
/// [`NullChain::reject_target`] / [`NullChain::reject_signature`] revert.
pub struct NullChain {
    height: Cell<u64>,
    time: Cell<u64>,
    dispatched: RefCell<Vec<CallDescriptor>>,
    rejected_targets: RefCell<HashMap<AccountId, String>>,
    rejected_signatures: RefCell<HashMap<String, String>>,
}

impl NullChain {
    pub fn new(initial_height: u64, initial_secs: u64) -> Self {
        Self {
            height: Cell::new(initial_height),
            time: Cell::new(initial_secs),
            dispatched: RefCell::new(Vec::new()),
            rejected_targets: RefCell::new(HashMap::new()),
            rejected_signatures: RefCell::new(HashMap::new()),
        }
    }

    /// Mine `blocks` empty blocks.
    pub fn advance_blocks(&self, blocks: u64) {
        self.height.set(self.height.get() + blocks);
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.time.set(self.time.get() + secs);
    }

    /// Set the time to a specific value. Must not move backwards.
    pub fn set_time(&self, secs: u64) {
        assert!(secs >= self.time.get(), "time must be monotonic");
        self.time.set(secs);
    }

    /// Make every call to `target` revert with `reason`.
    pub fn reject_target(&self, target: &AccountId, reason: &str) {
        self.rejected_targets
            .borrow_mut()
            .insert(target.clone(), reason.to_string());
    }

    /// Make every call with `signature` revert with `reason`.
    pub fn reject_signature(&self, signature: &str, reason: &str) {
        self.rejected_signatures
            .borrow_mut()
            .insert(signature.to_string(), reason.to_string());
    }

    /// All calls dispatched so far (for assertions), including reverted ones.
    pub fn dispatched(&self) -> Vec<CallDescriptor> {
        self.dispatched.borrow().clone()
    }

    /// Clear recorded calls and revert rules. Height and time are kept.
    pub fn reset(&self) {
        self.dispatched.borrow_mut().clear();
        self.rejected_targets.borrow_mut().clear();
        self.rejected_signatures.borrow_mut().clear();
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(1, 1_000_000)
    }
}

impl ExecutionEnvironment for NullChain {
    fn current_height(&self) -> BlockHeight {
        BlockHeight::new(self.height.get())
    }

    fn current_time(&self) -> Timestamp {
        Timestamp::new(self.time.get())
    }

    fn dispatch(&mut self, call: &CallDescriptor) -> Result<(), Revert> {
        self.dispatched.borrow_mut().push(call.clone());
        if let Some(reason) = self.rejected_targets.borrow().get(&call.target) {
            return Err(Revert::new(reason.clone()));
        }
        if let Some(reason) = self.rejected_signatures.borrow().get(&call.signature) {
            return Err(Revert::new(reason.clone()));
        }
        Ok(())
    }
}
