//! Network identifier.

use serde::{Deserialize, Serialize};

/// Which kind of network a deployment targets.
///
/// Local networks let the operator advance time, so multi-step flows such as
/// the admin handoff can be completed in one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    /// A shared network where time only moves forward on its own.
    Live,
    /// Local development network.
    Local,
}

impl NetworkId {
    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Local => "local",
        }
    }

    /// Whether the operator controls time on this network.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}
