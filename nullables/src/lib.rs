//! Nullable infrastructure for deterministic testing.
//!
//! The protocol core only touches the outside world through
//! [`ExecutionEnvironment`](covenant_types::ExecutionEnvironment). This crate
//! provides a test-friendly implementation that:
//! - Returns deterministic heights and timestamps
//! - Can be controlled programmatically
//! - Records dispatched calls instead of executing them
//!
//! Usage: swap a real environment for [`NullChain`] in tests.

pub mod chain;

pub use chain::NullChain;
