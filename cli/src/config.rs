//! Deployment configuration with TOML file support.

use anyhow::Context;
use covenant_types::{AccountId, GovernanceParams, NetworkId, TimelockParams};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a covenant deployment.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// `local` lets `deploy` advance time and finish the admin handoff itself.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Tokens minted to the deployer at deployment.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u128,

    /// Deploying account. Becomes the guardian and the initial timelock admin.
    #[serde(default = "default_deployer")]
    pub deployer: AccountId,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default)]
    pub governance: GovernanceParams,

    #[serde(default)]
    pub timelock: TimelockParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Local
}

fn default_initial_supply() -> u128 {
    10_000_000
}

fn default_deployer() -> AccountId {
    AccountId::new("deployer")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse configuration from a TOML string and validate the parameters.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.governance.validate()?;
        config.timelock.validate()?;
        Ok(config)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            initial_supply: default_initial_supply(),
            deployer: default_deployer(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            governance: GovernanceParams::default(),
            timelock: TimelockParams::default(),
        }
    }
}
