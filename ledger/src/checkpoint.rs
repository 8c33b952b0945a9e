//! Vote checkpoints: per-account history of voting power by block height.
//!
//! Reads at a height return the value recorded by the last write at or below
//! that height. Writes within the same block overwrite the block's checkpoint.

use crate::error::LedgerError;
use covenant_types::BlockHeight;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub from_height: BlockHeight,
    pub votes: u128,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoints {
    entries: Vec<Checkpoint>,
}

impl Checkpoints {
    /// Votes after the most recent write.
    pub fn latest(&self) -> u128 {
        self.entries.last().map(|c| c.votes).unwrap_or(0)
    }

    /// Votes as of `height` (binary search over the history).
    pub fn at(&self, height: BlockHeight) -> u128 {
        let idx = self.entries.partition_point(|c| c.from_height <= height);
        if idx == 0 {
            0
        } else {
            self.entries[idx - 1].votes
        }
    }

    /// Record `votes` as the value from `height` onwards.
    pub fn write(&mut self, height: BlockHeight, votes: u128) -> Result<(), LedgerError> {
        match self.entries.last_mut() {
            Some(last) if last.from_height == height => {
                last.votes = votes;
            }
            Some(last) if last.from_height > height => {
                return Err(LedgerError::HeightRegression {
                    last: last.from_height,
                    attempted: height,
                });
            }
            _ => self.entries.push(Checkpoint {
                from_height: height,
                votes,
            }),
        }
        Ok(())
    }

    /// Height of the most recent write.
    pub fn last_height(&self) -> Option<BlockHeight> {
        self.entries.last().map(|c| c.from_height)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
