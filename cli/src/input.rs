//! Reading certificate files given on the command line.

use std::path::Path;

use keybox_runtime::decode_key_or_cert;

/// Read a certificate file as DER, unwrapping PEM armor if present.
///
/// The bytes are not validated as a certificate; that is left to the engine
/// so a malformed leaf still goes through the fail-open path.
pub fn read_certificate(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    if !is_pem(&bytes) {
        return Ok(bytes);
    }

    let text = std::str::from_utf8(&bytes)
        .map_err(|e| format!("{} is not valid PEM: {}", path.display(), e))?;
    Ok(decode_key_or_cert(text)?)
}

fn is_pem(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|&first| first == b'-')
        .unwrap_or(false)
}
