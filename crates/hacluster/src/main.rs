//! hacluster command-line tool
//!
//! Validates HA cluster configuration, registers the assembled descriptor,
//! lists strategy catalogs, previews reactivation schedules and manages the
//! local item store.

use anyhow::Context;
use clap::{Parser, Subcommand};
use hacluster_config::paths::default_logs_dir;
use hacluster_logging::{init_logging, LogConfig};
use hacluster_strategies::{StrategyKind, StrategyRegistry};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "hacluster", version, about = "HA database cluster configuration tool")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Also write a daily log file under $HACLUSTER_HOME/logs
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a cluster config and register the assembled cluster
    Check {
        /// Config file (default: $HACLUSTER_CONFIG or $HACLUSTER_HOME/cluster.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter cluster config
    Init {
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List built-in strategies
    Strategies {
        /// Only this kind (balancer, metadata-cache, state-persistence, synchronization)
        #[arg(short, long)]
        kind: Option<StrategyKind>,

        #[arg(long)]
        json: bool,
    },

    /// Show upcoming reactivation times
    Schedule {
        /// Cron expression (default: the config's reactivation_schedule)
        #[arg(short, long)]
        expr: Option<String>,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of fire times to show
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        #[arg(long)]
        json: bool,
    },

    /// Manage records in the local item store
    Item {
        /// Item database (default: $HACLUSTER_HOME/items.sqlite3)
        #[arg(long, global = true)]
        db: Option<PathBuf>,

        #[command(subcommand)]
        action: cli::item::ItemAction,
    },
}

fn command_wants_json(cmd: &Commands) -> bool {
    use cli::item::ItemAction;
    match cmd {
        Commands::Check { json, .. }
        | Commands::Strategies { json, .. }
        | Commands::Schedule { json, .. } => *json,
        Commands::Item { action, .. } => matches!(
            action,
            ItemAction::Add { json: true, .. }
                | ItemAction::List { json: true }
                | ItemAction::Get { json: true, .. }
        ),
        Commands::Init { .. } => false,
    }
}

fn run_command(command: Commands) -> anyhow::Result<()> {
    StrategyRegistry::try_builtin().context("Failed to load built-in strategy catalogs")?;

    match command {
        Commands::Check { config, json } => cli::check::run(cli::check::CheckArgs { config, json }),
        Commands::Init { config, force } => cli::init::run(cli::init::InitArgs { config, force }),
        Commands::Strategies { kind, json } => {
            cli::strategies::run(cli::strategies::StrategiesArgs { kind, json })
        }
        Commands::Schedule {
            expr,
            config,
            count,
            json,
        } => cli::schedule::run(cli::schedule::ScheduleArgs {
            expr,
            config,
            count,
            json,
        }),
        Commands::Item { db, action } => cli::item::run(cli::item::ItemArgs { db, action }),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    // Hold the guard until exit so buffered file logs are flushed.
    let _log_guard = match init_logging(LogConfig {
        app_name: "hacluster",
        verbose: cli.verbose,
        log_dir: cli.log_file.then(default_logs_dir),
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else if err.downcast_ref::<cli::error::HelpfulError>().is_some() {
                eprint!("{}", err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
