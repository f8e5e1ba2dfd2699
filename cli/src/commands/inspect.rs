//! `keybox inspect` command - print the attestation extension of a certificate.

use std::path::PathBuf;

use clap::Args;
use keybox_runtime::{algorithm_of, parse_certificate, AttestationSummary};

use crate::input::read_certificate;

#[derive(Args)]
pub struct InspectArgs {
    /// Certificate to inspect (DER or PEM)
    pub certificate: PathBuf,
}

/// JSON output for the inspect command.
#[derive(Debug, serde::Serialize)]
struct InspectOutput {
    subject: String,
    issuer: String,
    /// Serial number (hex-encoded)
    serial: String,
    /// Signature algorithm OID
    signature_algorithm: String,
    /// Public key family (`EC` / `RSA`)
    key_algorithm: String,
    attestation: AttestationSummary,
}

pub fn execute(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output = inspect(&read_certificate(&args.certificate)?)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn inspect(der: &[u8]) -> Result<InspectOutput, Box<dyn std::error::Error>> {
    let cert = parse_certificate(der)?;
    let tbs = &cert.tbs_certificate;

    Ok(InspectOutput {
        subject: tbs.subject.to_string(),
        issuer: tbs.issuer.to_string(),
        serial: hex::encode(tbs.serial_number.as_bytes()),
        signature_algorithm: cert.signature_algorithm.oid.to_string(),
        key_algorithm: algorithm_of(&cert)?.to_string(),
        attestation: AttestationSummary::from_certificate(&cert)?,
    })
}
