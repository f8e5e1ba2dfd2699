//! PEM/Base64 decoding and key/certificate parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use der::Decode;
use keybox_core::error::{KeyboxError, Result};
use keybox_core::KeyAlgorithm;
use x509_cert::Certificate;

use crate::signer::PrivateKey;

const ARMOR_PREFIX: &str = "-----";

/// Decode a PEM block or bare Base64 body into DER bytes.
///
/// Every `-----...-----` armor line is dropped along with all whitespace, so
/// concatenated or oddly wrapped input still decodes as a single body.
pub fn decode_key_or_cert(text: &str) -> Result<Vec<u8>> {
    let body = strip_armor(text);
    if body.is_empty() {
        return Err(KeyboxError::DecodeError("Empty PEM body".to_string()));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| KeyboxError::DecodeError(format!("Invalid base64: {}", e)))
}

fn strip_armor(text: &str) -> String {
    let mut body = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(ARMOR_PREFIX) {
        body.push_str(&rest[..start]);
        let after_open = &rest[start + ARMOR_PREFIX.len()..];
        rest = match after_open.find(ARMOR_PREFIX) {
            Some(end) => &after_open[end + ARMOR_PREFIX.len()..],
            None => "",
        };
    }
    body.push_str(rest);
    body.retain(|c| !c.is_whitespace());
    body
}

/// Parse DER private key bytes for the named algorithm family.
///
/// EC keys are SEC1 `ECPrivateKey` structures, RSA keys are PKCS#8.
pub fn parse_private_key(bytes: &[u8], algorithm: &str) -> Result<PrivateKey> {
    match algorithm.parse::<KeyAlgorithm>()? {
        KeyAlgorithm::Ec => PrivateKey::from_sec1_der(bytes),
        KeyAlgorithm::Rsa => PrivateKey::from_pkcs8_der(bytes),
    }
}

/// Parse a certificate given as DER bytes or PEM text.
pub fn parse_certificate(bytes: &[u8]) -> Result<Certificate> {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.starts_with(ARMOR_PREFIX.as_bytes()) {
        let text = std::str::from_utf8(trimmed)
            .map_err(|e| KeyboxError::DecodeError(format!("PEM is not UTF-8: {}", e)))?;
        return parse_certificate_text(text);
    }

    Certificate::from_der(bytes)
        .map_err(|e| KeyboxError::DecodeError(format!("Invalid certificate: {}", e)))
}

/// Parse a PEM or Base64 certificate string.
pub fn parse_certificate_text(text: &str) -> Result<Certificate> {
    let der = decode_key_or_cert(text)?;
    Certificate::from_der(&der)
        .map_err(|e| KeyboxError::DecodeError(format!("Invalid certificate: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::Encode;

    const EC_LEAF: &str = include_str!("../tests/fixtures/ec_leaf.pem");
    const EC_KEY: &str = include_str!("../tests/fixtures/ec_key.pem");
    const RSA_KEY: &str = include_str!("../tests/fixtures/rsa_key.pem");

    #[test]
    fn test_decode_pem_block() {
        let pem = "-----BEGIN TEST-----\nAAEC\nAwQ=\n-----END TEST-----\n";
        assert_eq!(decode_key_or_cert(pem).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_bare_base64() {
        assert_eq!(decode_key_or_cert("  AAEC AwQ=  ").unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_crlf_line_endings() {
        let pem = "-----BEGIN TEST-----\r\nAAEC\r\nAwQ=\r\n-----END TEST-----\r\n";
        assert_eq!(decode_key_or_cert(pem).unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_decode_empty_body() {
        let err = decode_key_or_cert("-----BEGIN TEST-----\n-----END TEST-----").unwrap_err();
        assert!(matches!(err, KeyboxError::DecodeError(_)));
        assert!(decode_key_or_cert("   ").is_err());
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_key_or_cert("not*base64").unwrap_err();
        assert!(matches!(err, KeyboxError::DecodeError(_)));
    }

    #[test]
    fn test_parse_ec_private_key() {
        let der = decode_key_or_cert(EC_KEY).unwrap();
        let key = parse_private_key(&der, "EC").unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ec);

        let lower = parse_private_key(&der, "ec").unwrap();
        assert_eq!(lower.algorithm(), KeyAlgorithm::Ec);
    }

    #[test]
    fn test_parse_rsa_private_key() {
        let der = decode_key_or_cert(RSA_KEY).unwrap();
        let key = parse_private_key(&der, "RSA").unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Rsa);
    }

    #[test]
    fn test_parse_private_key_wrong_family() {
        let der = decode_key_or_cert(RSA_KEY).unwrap();
        assert!(matches!(
            parse_private_key(&der, "EC"),
            Err(KeyboxError::DecodeError(_))
        ));
    }

    #[test]
    fn test_parse_private_key_unknown_algorithm() {
        let der = decode_key_or_cert(EC_KEY).unwrap();
        assert!(matches!(
            parse_private_key(&der, "DSA"),
            Err(KeyboxError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_parse_certificate_pem_and_der() {
        let from_pem = parse_certificate(EC_LEAF.as_bytes()).unwrap();
        let der = from_pem.to_der().unwrap();
        let from_der = parse_certificate(&der).unwrap();
        assert_eq!(from_pem, from_der);
        assert!(from_der
            .tbs_certificate
            .subject
            .to_string()
            .contains("CN=Keybox EC Attestation"));
    }

    #[test]
    fn test_parse_certificate_garbage() {
        assert!(matches!(
            parse_certificate(&[0x30, 0x03, 0x02, 0x01, 0x01]),
            Err(KeyboxError::DecodeError(_))
        ));
    }
}
