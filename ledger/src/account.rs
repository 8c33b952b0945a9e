//! Per-account balance record.

use serde::{Deserialize, Serialize};

/// Balance of one account. `locked` is always part of `balance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: u128,
    pub locked: u128,
}

impl AccountBalance {
    /// The part of the balance that is not locked.
    pub fn available(&self) -> u128 {
        self.balance - self.locked
    }

    pub fn is_empty(&self) -> bool {
        self.balance == 0
    }
}
