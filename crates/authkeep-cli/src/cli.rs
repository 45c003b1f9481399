//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::session::SessionCommand;

/// Sign in to an API and call it with automatically refreshed tokens.
#[derive(Parser, Debug)]
#[command(name = "authkeep")]
#[command(author, version = env!("AUTHKEEP_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to connect and where to keep credentials.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL
    #[arg(
        long,
        global = true,
        env = "AUTHKEEP_API_URL",
        default_value = "http://localhost:3000"
    )]
    pub api: String,

    /// Directory holding stored credentials [default: platform data dir]
    #[arg(long, global = true, env = "AUTHKEEP_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Timeout for each network call, in milliseconds
    #[arg(long, global = true, default_value_t = authkeep_core::config::DEFAULT_REQUEST_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign-in and authenticated request operations
    Session(SessionCommand),
}
