//! Command-line definition.

use clap::{Parser, Subcommand};
use credvault::present::DEFAULT_SECRET_LENGTH;

#[derive(Debug, Parser)]
#[command(name = "keytool", version, about = "Master-secret and envelope tooling for credvault")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Tracing log level (logs go to stderr).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a random master secret.
    Generate {
        /// Length in characters.
        #[arg(short, long, default_value_t = DEFAULT_SECRET_LENGTH)]
        length: usize,
    },
    /// Check the strength of a master secret read from stdin.
    Check,
    /// Print the key version of each envelope read from stdin (one per line).
    Inspect,
    /// Re-encrypt envelopes read from stdin under a target key version.
    ///
    /// Master secrets are loaded from the CREDVAULT_* environment variables.
    Rotate {
        /// Target key version. Defaults to CREDVAULT_CURRENT_KEY_VERSION.
        #[arg(long)]
        to: Option<u32>,
    },
}
