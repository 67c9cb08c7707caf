//! `keytool` — operator CLI for credvault.
//!
//! - `generate`: print a new random master secret.
//! - `check`: grade a master secret read from stdin.
//! - `inspect`: report key versions of envelopes read from stdin.
//! - `rotate`: re-encrypt envelopes from stdin under a target version.

mod cli;
mod commands;
mod telemetry;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use credvault::config::Config;
use credvault::CredentialCipher;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Generate { length } => commands::generate(length, &mut stdout)?,
        Command::Check => {
            if !commands::check(&mut stdin.lock(), &mut stdout)? {
                stdout.flush()?;
                std::process::exit(1);
            }
        }
        Command::Inspect => commands::inspect(stdin.lock(), &mut stdout)?,
        Command::Rotate { to } => {
            let cfg = Config::from_env().context("rotation needs CREDVAULT_* configuration")?;
            let keys = cfg.key_ring()?;
            let target = to.unwrap_or_else(|| keys.current_version());
            keys.encryption_key(target)
                .with_context(|| format!("target key version {target} is unusable"))?;

            let cipher = CredentialCipher::new(keys);
            let summary = commands::rotate(&cipher, target, stdin.lock(), &mut stdout).await?;
            stdout.flush()?;
            eprintln!(
                "rotated {}, unchanged {}, failed {}",
                summary.rotated, summary.unchanged, summary.failed
            );
            if summary.failed > 0 {
                anyhow::bail!("{} envelope(s) could not be rotated", summary.failed);
            }
        }
    }
    stdout.flush()?;
    Ok(())
}
