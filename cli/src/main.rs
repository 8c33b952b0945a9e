//! covenant: deploy and drive the governance protocol on a file-backed
//! devnet.

use anyhow::{bail, Context};
use clap::Parser;
use covenant_cli::commands;
use covenant_cli::config::CliConfig;
use covenant_cli::devnet::Deployment;
use covenant_types::{AccountId, NetworkId, ProposalId, Timestamp};
use covenant_utils::{init_logging, LogFormat};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "covenant", about = "Quadratic-voting governance with a timelocked executor")]
struct Cli {
    /// State file holding the deployment.
    #[arg(long, default_value = "./covenant_state.bin", env = "COVENANT_STATE")]
    state: PathBuf,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "COVENANT_CONFIG")]
    config: Option<PathBuf>,

    /// Network for `deploy`: "live" or "local".
    #[arg(long, env = "COVENANT_NETWORK")]
    network: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COVENANT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COVENANT_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Support {
    For,
    Against,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Deploy ledger, timelock and governor, and start the admin handoff.
    Deploy {
        /// Overwrite an existing state file.
        #[arg(long)]
        force: bool,
    },

    /// Finish the timelock admin switch printed by `deploy`.
    CompleteAdminSwitch {
        #[arg(long)]
        target: AccountId,
        #[arg(long, default_value_t = 0)]
        value: u128,
        #[arg(long)]
        signature: String,
        /// Hex calldata, `0x` prefix optional.
        #[arg(long, value_parser = parse_hex)]
        data: HexBytes,
        #[arg(long)]
        eta: u64,
        /// Defaults to the deployer.
        #[arg(long)]
        caller: Option<AccountId>,
    },

    /// Mint tokens.
    Mint {
        #[arg(long)]
        to: AccountId,
        #[arg(long)]
        amount: u128,
    },

    /// Delegate voting power.
    Delegate {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        to: AccountId,
    },

    /// Create a proposal from actions and/or parameter amendments.
    Propose {
        #[arg(long)]
        from: AccountId,
        #[arg(long = "target")]
        targets: Vec<AccountId>,
        #[arg(long = "value")]
        values: Vec<u128>,
        #[arg(long = "signature")]
        signatures: Vec<String>,
        #[arg(long = "data", value_parser = parse_hex)]
        calldatas: Vec<HexBytes>,
        /// Governor parameter change, e.g. `quorum_votes=500000`.
        #[arg(long = "amend")]
        amendments: Vec<String>,
        #[arg(long)]
        description: String,
    },

    /// Lock tokens behind a vote.
    Vote {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        id: ProposalId,
        #[arg(long, value_enum)]
        support: Support,
        #[arg(long)]
        amount: u128,
    },

    /// Queue a succeeded proposal in the timelock.
    Queue {
        #[arg(long)]
        id: ProposalId,
    },

    /// Execute a queued proposal after its ETA.
    Execute {
        #[arg(long)]
        id: ProposalId,
    },

    /// Cancel a proposal.
    Cancel {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        id: ProposalId,
    },

    /// Reclaim locked tokens from a resolved proposal.
    Refund {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        id: ProposalId,
    },

    /// Move the devnet forward.
    Advance {
        #[arg(long, default_value_t = 0)]
        blocks: u64,
        #[arg(long, default_value_t = 0)]
        hours: u64,
    },

    /// Print the deployment, or one proposal, as JSON.
    Show {
        id: Option<ProposalId>,
        /// Include this account's receipt and refund eligibility.
        #[arg(long)]
        voter: Option<AccountId>,
    },

    /// Print governable parameter values.
    Params,
}

/// Calldata given on the command line as hex.
#[derive(Clone, Debug)]
struct HexBytes(Vec<u8>);

fn parse_hex(s: &str) -> Result<HexBytes, String> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map(HexBytes)
        .map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(network) = cli.network.as_deref() {
        config.network = match network.to_lowercase().as_str() {
            "live" => NetworkId::Live,
            "local" => NetworkId::Local,
            other => bail!("unknown network {other:?} (expected live or local)"),
        };
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    if let Err(e) = init_logging(format, &config.log_level) {
        eprintln!("logging already initialised: {e}");
    }

    let output = match cli.command {
        Command::Deploy { force } => {
            if cli.state.exists() && !force {
                bail!(
                    "state file {} exists; pass --force to redeploy",
                    cli.state.display()
                );
            }
            let genesis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("system clock before unix epoch")?
                .as_secs();
            let (mut deployment, output) = commands::deploy(&config, Timestamp::new(genesis))?;
            finish(&mut deployment, &cli.state)?;
            output
        }
        Command::Show { id, voter } => {
            let deployment = Deployment::load(&cli.state)?;
            commands::show(&deployment, id, voter.as_ref())?
        }
        Command::Params => commands::params(&Deployment::load(&cli.state)?),
        command => {
            let mut deployment = Deployment::load(&cli.state)?;
            if commands::handoff_pending(&deployment)
                && !matches!(command, Command::CompleteAdminSwitch { .. } | Command::Advance { .. })
            {
                tracing::warn!("timelock admin switch not completed; queue and execute will fail");
            }
            // Failed commands can still leave state behind (a reverted
            // execute consumes the proposal), so save before reporting.
            let result = run(&mut deployment, command);
            finish(&mut deployment, &cli.state)?;
            result?
        }
    };

    println!("{}", output.trim_end());
    Ok(())
}

fn run(deployment: &mut Deployment, command: Command) -> anyhow::Result<String> {
    match command {
        Command::CompleteAdminSwitch {
            target,
            value,
            signature,
            data,
            eta,
            caller,
        } => {
            let plan = commands::handoff_plan_from_args(
                deployment, target, value, signature, data.0, eta,
            )?;
            let caller = caller.unwrap_or_else(|| deployment.deployer.clone());
            commands::complete_admin_switch(deployment, &caller, &plan)
        }
        Command::Mint { to, amount } => commands::mint(deployment, &to, amount),
        Command::Delegate { from, to } => commands::delegate(deployment, &from, &to),
        Command::Propose {
            from,
            targets,
            values,
            signatures,
            calldatas,
            amendments,
            description,
        } => {
            let draft = commands::build_draft(
                description,
                targets,
                values,
                signatures,
                calldatas.into_iter().map(|d| d.0).collect(),
                &amendments,
            )?;
            commands::propose(deployment, &from, draft)
        }
        Command::Vote {
            from,
            id,
            support,
            amount,
        } => commands::vote(deployment, &from, id, matches!(support, Support::For), amount),
        Command::Queue { id } => commands::queue(deployment, id),
        Command::Execute { id } => commands::execute(deployment, id),
        Command::Cancel { from, id } => commands::cancel(deployment, &from, id),
        Command::Refund { from, id } => commands::refund(deployment, &from, id),
        Command::Advance { blocks, hours } => commands::advance(deployment, blocks, hours),
        Command::Deploy { .. } | Command::Show { .. } | Command::Params => {
            bail!("command does not modify the deployment")
        }
    }
}

/// Log pending governor events and persist the state.
fn finish(deployment: &mut Deployment, state: &std::path::Path) -> anyhow::Result<()> {
    for event in deployment.governor.drain_events() {
        tracing::info!(?event, "governance event");
    }
    deployment.save(state)
}
