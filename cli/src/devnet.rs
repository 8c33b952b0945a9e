//! File-backed local devnet.
//!
//! [`DevChain`] is the execution environment: a height and time counter and
//! an append-only log of every call dispatched to an external target.
//! [`Deployment`] bundles it with the governor and is what the state file
//! holds.

use anyhow::Context;
use covenant_governance::Governor;
use covenant_timelock::HandoffPlan;
use covenant_types::{
    AccountId, BlockHeight, CallDescriptor, ExecutionEnvironment, NetworkId, Revert, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Seconds between mined blocks.
pub const BLOCK_TIME_SECS: u64 = 13;

/// One dispatched call, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub height: BlockHeight,
    pub time: Timestamp,
    pub call: CallDescriptor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevChain {
    height: BlockHeight,
    time: Timestamp,
    log: Vec<LogEntry>,
}

impl DevChain {
    pub fn new(height: BlockHeight, time: Timestamp) -> Self {
        Self {
            height,
            time,
            log: Vec::new(),
        }
    }

    /// Mine one block.
    pub fn mine(&mut self) {
        self.height = self.height.next();
        self.time = self.time.saturating_add(BLOCK_TIME_SECS);
    }

    pub fn advance_blocks(&mut self, blocks: u64) {
        for _ in 0..blocks {
            self.mine();
        }
        debug!(height = %self.height, "advanced blocks");
    }

    /// Jump time forward by `secs`, then mine a block.
    pub fn advance_secs(&mut self, secs: u64) {
        self.time = self.time.saturating_add(secs);
        self.mine();
        debug!(time = %self.time, "advanced time");
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
}

impl ExecutionEnvironment for DevChain {
    fn current_height(&self) -> BlockHeight {
        self.height
    }

    fn current_time(&self) -> Timestamp {
        self.time
    }

    fn dispatch(&mut self, call: &CallDescriptor) -> Result<(), Revert> {
        info!(target = %call.target, signature = %call.signature, "call dispatched");
        self.log.push(LogEntry {
            height: self.height,
            time: self.time,
            call: call.clone(),
        });
        Ok(())
    }
}

/// Everything the state file holds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deployment {
    pub network: NetworkId,
    pub deployer: AccountId,
    pub chain: DevChain,
    pub governor: Governor,
    /// The timelock handoff started at deploy time, kept so it can be
    /// finished later.
    pub handoff: Option<HandoffPlan>,
}

impl Deployment {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path).with_context(|| {
            format!("reading state {} (run `covenant deploy` first)", path.display())
        })?;
        bincode::deserialize(&bytes).with_context(|| format!("decoding state {}", path.display()))
    }

    /// Write the state file atomically: a temp file in the same directory is
    /// renamed over the target.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = bincode::serialize(self).context("encoding state")?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)
            .with_context(|| format!("writing state {}", path.display()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "state saved");
        Ok(())
    }
}
