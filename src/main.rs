//! powctl: proof-of-work difficulty tool
//!
//! A command-line interface for inspecting compact targets, checking
//! proof of work and computing the next required target of a header chain.

use clap::{Parser, Subcommand};
use pow_engine::cli;
use pow_engine::core::Network;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "powctl")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Proof-of-work difficulty engine", long_about = None)]
struct Cli {
    /// Network whose parameters to use (main, testnet, regtest)
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// JSON config file selecting a network and parameter overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the consensus parameters in use
    Params,

    /// Expand a compact target
    Decode {
        /// Compact bits as hex (e.g. 1d00ffff)
        bits: String,
    },

    /// Compress a target to compact form
    Encode {
        /// Target as big-endian hex
        target: String,
    },

    /// Check a block hash against a compact target
    Check {
        /// Block hash as displayed hex
        #[arg(long)]
        hash: String,

        /// Claimed compact bits as hex
        #[arg(short, long)]
        bits: String,
    },

    /// Compute the target required of the next block
    Next {
        /// JSON file with the header chain, parents first
        #[arg(long)]
        headers: PathBuf,

        /// Candidate block time (Unix seconds, defaults to now)
        #[arg(short, long)]
        time: Option<i64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = cli::load_config(cli.config.as_deref(), cli.network)?;

    match cli.command {
        Commands::Params => {
            cli::cmd_params(&config)?;
        }

        Commands::Decode { bits } => {
            let params = config.resolve()?;
            cli::cmd_decode(&params, &bits)?;
        }

        Commands::Encode { target } => {
            cli::cmd_encode(&target)?;
        }

        Commands::Check { hash, bits } => {
            let params = config.resolve()?;
            cli::cmd_check(&params, &hash, &bits)?;
        }

        Commands::Next { headers, time } => {
            let params = config.resolve()?;
            cli::cmd_next(&params, &headers, time)?;
        }
    }

    Ok(())
}
