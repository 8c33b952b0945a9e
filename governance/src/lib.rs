//! Proposal engine for the covenant governance protocol.
//!
//! Lifecycle: Pending → Active → {Canceled | Defeated | QuorumFailed | Succeeded}
//! → Queued → {Executed | Expired}. State is always derived from stored
//! fields plus the current height and time, never cached.
//!
//! Votes are quadratic: locking `n` stake yields `floor(sqrt(n))` weight.
//! Locked stake is returned through `refund` once the proposal resolves, and
//! the proposer is paid a bonus or a penalty-reduced amount depending on the
//! outcome.

pub mod engine;
pub mod error;
pub mod events;
pub mod params;
pub mod proposal;
pub mod refund;
mod router;
pub mod tally;
pub mod view;

pub use engine::Governor;
pub use error::GovernanceError;
pub use events::GovernanceEvent;
pub use params::GovernableParam;
pub use proposal::{Proposal, ProposalDraft, ProposalState, Receipt, MAX_ACTIONS};
pub use refund::{RefundKind, RefundQuote};
pub use tally::{isqrt, resolve, vote_weight, Outcome};
pub use view::{ProposalDetails, ProposalView};
