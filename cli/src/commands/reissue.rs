//! `keybox reissue` command - re-issue an attestation leaf with keybox material.
//!
//! Runs the same fail-open pipeline a keystore hook would: when the leaf
//! cannot be rewritten the original bytes are written back out and the
//! report says why.

use std::path::{Path, PathBuf};

use clap::Args;
use keybox_core::{KeyEntryResponse, RewriteConfig};
use keybox_runtime::{process_with_outcome, Keybox, RewriteOutcome};

use crate::input::read_certificate;

#[derive(Args)]
pub struct ReissueArgs {
    /// Leaf certificate to re-issue (DER or PEM)
    #[arg(long)]
    pub leaf: PathBuf,

    /// Keybox file with substitute key material (YAML or JSON)
    #[arg(long)]
    pub keybox: PathBuf,

    /// Output path for the resulting leaf certificate (DER)
    #[arg(long)]
    pub out: PathBuf,

    /// Output path for the substitute certificate chain (concatenated DER)
    #[arg(long)]
    pub chain_out: Option<PathBuf>,

    /// Rewrite configuration file (YAML or JSON).
    /// Defaults to the KEYBOX_DISABLE_ATTESTATION_REWRITE environment variable.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

/// JSON report for the reissue command.
#[derive(Debug, serde::Serialize)]
struct ReissueOutput {
    /// Outcome label (`rewritten`, `not_attested`, `failed`, ...)
    outcome: &'static str,
    /// Failure detail when the outcome is `failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    /// Where the leaf was written
    certificate: String,
    /// Size of the written leaf in bytes
    certificate_size: usize,
    /// Where the chain was written, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<String>,
    /// Size of the written chain in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    chain_size: Option<usize>,
}

pub fn execute(args: ReissueArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output = run(&args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(args: &ReissueArgs) -> Result<ReissueOutput, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => RewriteConfig::load(path)?,
        None => RewriteConfig::from_env(),
    };
    let keybox = Keybox::load(&args.keybox)?;
    let leaf = read_certificate(&args.leaf)?;

    let (response, outcome) =
        process_with_outcome(KeyEntryResponse::with_certificate(leaf), &config, &keybox);

    let certificate = response
        .certificate()
        .ok_or("Response lost its leaf certificate")?;
    write_file(&args.out, certificate)?;

    let (chain, chain_size) = match (&args.chain_out, response.certificate_chain()) {
        (Some(path), Some(chain)) => {
            write_file(path, chain)?;
            (Some(path.display().to_string()), Some(chain.len()))
        }
        (Some(path), None) => {
            tracing::warn!(
                path = %path.display(),
                outcome = outcome.as_str(),
                "No substitute chain to write"
            );
            (None, None)
        }
        (None, _) => (None, None),
    };

    let error = match &outcome {
        RewriteOutcome::Failed(e) => Some(e.to_string()),
        _ => None,
    };

    Ok(ReissueOutput {
        outcome: outcome.as_str(),
        error,
        certificate: args.out.display().to_string(),
        certificate_size: certificate.len(),
        chain,
        chain_size,
    })
}

fn write_file(path: &Path, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::write(path, data)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}
