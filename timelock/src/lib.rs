//! Timelock coordinator.
//!
//! Admin-queued transactions become executable at their ETA and stay
//! executable for a grace period, after which they are stale and must be
//! queued again. Execution consumes the queued entry whether or not the
//! dispatched call succeeds (at-most-once).
//!
//! Admin authority changes in two phases: a queued `setPendingAdmin` call
//! names the successor, and the successor must call `accept_admin`.
//! [`AdminHandoff`] drives that flow and falls back to a manual plan when a
//! step cannot be performed automatically.

pub mod error;
pub mod handoff;
pub mod queue;
pub mod timelock;

pub use error::TimelockError;
pub use handoff::{AdminHandoff, HandoffPlan, HandoffProgress, HandoffStep, ManualHandoff};
pub use queue::{transaction_hash, QueuedTransaction};
pub use timelock::Timelock;
