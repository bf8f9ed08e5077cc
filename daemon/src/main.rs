//! Vigil daemon: operator entry point for a control-plane event log.

use clap::Parser;
use std::path::PathBuf;

use vigil_node::{ControlPlane, NodeConfig, Projection, ProjectionSummary, RoleRegistry};
use vigil_store::{EventStore, FileEventStore};
use vigil_types::SystemClock;
use vigil_utils::{format_amount, format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "vigil-daemon", about = "Vigil control-plane daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "VIGIL_CONFIG")]
    config: Option<PathBuf>,

    /// Event log path (defaults to the config file's value).
    #[arg(long, env = "VIGIL_EVENT_LOG")]
    event_log: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VIGIL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VIGIL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the effective configuration as TOML.
    Config,
    /// Validate the configuration and verify the event log's hash chain.
    Check,
    /// Create the event log and record the configured roles.
    Init,
    /// Rebuild state from the event log and print a summary.
    Replay {
        /// Emit the summary as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)?,
        None => NodeConfig::default(),
    };
    if let Some(path) = &cli.event_log {
        config.event_log = path.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level).map_err(anyhow::Error::msg)?;
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Check => {
            config.validate()?;
            let records = FileEventStore::open(&config.event_log).load()?;
            let summary = Projection::replay(&records)?.summary();
            tracing::info!(records = summary.records, head = %summary.head_hash, "event log verified");
            let gov = &config.params.governance;
            println!(
                "config ok; voting {} + timelock {}; {} records verified",
                format_duration(gov.voting_period_secs),
                format_duration(gov.timelock_delay_secs),
                summary.records
            );
        }
        Command::Init => {
            if let Some(parent) = config.event_log.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let plane = ControlPlane::new(
                &config,
                SystemClock,
                FileEventStore::open(&config.event_log),
                RoleRegistry::new(),
            )?;
            tracing::info!(
                path = %config.event_log.display(),
                records = plane.event_count(),
                "event log initialized"
            );
        }
        Command::Replay { json } => {
            let records = FileEventStore::open(&config.event_log).load()?;
            let summary = Projection::replay(&records)?.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &ProjectionSummary) {
    println!("records:        {}", summary.records);
    println!("head:           {}", summary.head_hash);
    println!("total supply:   {}", format_amount(summary.total_supply));
    println!("total burned:   {}", format_amount(summary.total_burned));
    println!("escrow:         {}", format_amount(summary.escrow));
    println!("pool available: {}", format_amount(summary.pool_available));
    println!("pending:        {}", format_amount(summary.pending_rewards));
    println!("accounts:       {}", summary.accounts);
    println!("stakes:         {}", summary.stakes.len());
    println!("alerts:         {}", summary.alerts.len());
    println!("proposals:      {}", summary.proposals.len());
    for (name, value) in &summary.parameters {
        println!("param {name} = {value}");
    }
}
