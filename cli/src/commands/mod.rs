//! CLI command definitions and dispatch.

mod inspect;
mod reissue;
mod version;

use clap::{Parser, Subcommand};
use keybox_core::{LogLevel, RewriteConfig};

/// Keybox - re-issue Android key attestation certificates.
#[derive(Parser)]
#[command(name = "keybox", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Command {
    /// Re-issue an attestation leaf certificate with keybox key material
    Reissue(reissue::ReissueArgs),
    /// Print the attestation extension of a certificate as JSON
    Inspect(inspect::InspectArgs),
    /// Show version information
    Version(version::VersionArgs),
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    ///
    /// Taken from the `--config` file of `reissue` when one is given and
    /// readable, otherwise `warn`.
    pub fn default_log_level(&self) -> LogLevel {
        match &self.command {
            Command::Reissue(args) => args
                .config
                .as_deref()
                .and_then(|path| RewriteConfig::load(path).ok())
                .map(|config| config.log_level)
                .unwrap_or(LogLevel::Warn),
            _ => LogLevel::Warn,
        }
    }
}

/// Dispatch a parsed CLI to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Reissue(args) => reissue::execute(args),
        Command::Inspect(args) => inspect::execute(args),
        Command::Version(args) => version::execute(args),
    }
}
