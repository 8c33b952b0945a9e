//! Fundamental types for the covenant governance protocol.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! accounts, hashes, time and height counters, call descriptors, protocol
//! parameters, and the execution-environment collaborator trait.

pub mod address;
pub mod call;
pub mod env;
pub mod error;
pub mod hash;
pub mod network;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use call::{decode_args, encode_args, CallDescriptor};
pub use env::{ExecutionEnvironment, Revert};
pub use error::{ErrorClass, TypeError};
pub use hash::TxHash;
pub use network::NetworkId;
pub use params::{GovernanceParams, Ratio, TimelockParams};
pub use time::{BlockHeight, Timestamp};

/// Proposal identifier. The first proposal is 1.
pub type ProposalId = u64;
