use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use windex::cli::setup::setup;
use windex::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for windex::AppCommand {
    fn from(cmd: Commands) -> windex::AppCommand {
        match cmd {
            Commands::Show => windex::AppCommand::Show,
            Commands::Refresh => windex::AppCommand::Refresh,
            Commands::Rebalance => windex::AppCommand::Rebalance,
            Commands::SetWeights { weights } => windex::AppCommand::SetWeights { weights },
            Commands::Mint { holder, amount } => windex::AppCommand::Mint { holder, amount },
            Commands::Burn { holder, amount } => windex::AppCommand::Burn { holder, amount },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display weights, cached prices and index value
    Show,
    /// Fetch fresh prices into the cache
    Refresh,
    /// Recompute weights from cached prices and balances
    Rebalance,
    /// Assign weights by hand, in basis points that sum to 10000
    SetWeights {
        /// Comma separated weights in asset order, e.g. 6000,4000
        weights: String,
    },
    /// Issue index shares to a holder
    Mint {
        holder: String,
        /// Share amount as a decimal, e.g. 1.5
        amount: String,
    },
    /// Retire index shares from a holder
    Burn {
        holder: String,
        /// Share amount as a decimal, e.g. 1.5
        amount: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => windex::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
