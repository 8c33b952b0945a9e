//! Quadratic vote weighting and outcome resolution.

use serde::{Deserialize, Serialize};

/// `floor(sqrt(n))` by Newton's method.
pub fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = x / 2 + 1;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Weight granted for locking `raw` stake.
pub fn vote_weight(raw: u128) -> u128 {
    isqrt(raw)
}

/// How a proposal resolved once its voting window closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Defeated,
    QuorumFailed,
    Succeeded,
}

/// Ties resolve to `Defeated`.
pub fn resolve(for_votes: u128, against_votes: u128, quorum: u128) -> Outcome {
    if for_votes <= against_votes {
        Outcome::Defeated
    } else if for_votes < quorum {
        Outcome::QuorumFailed
    } else {
        Outcome::Succeeded
    }
}
