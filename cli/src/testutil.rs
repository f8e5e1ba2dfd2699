//! Shared helpers for unit tests.

use std::path::{Path, PathBuf};

/// Write a self-signed P-256 attestation leaf into `dir` and return its path.
pub fn attested_leaf(dir: &Path) -> PathBuf {
    use rcgen::{CertificateParams, CustomExtension, KeyPair, PKCS_ECDSA_P256_SHA256};

    // [704] { OCTET STRING(32), BOOLEAN FALSE, ENUMERATED 1 } in an
    // 8-element key description
    let mut rot = vec![0x30, 0x28, 0x04, 0x20];
    rot.extend_from_slice(&[0x5a; 32]);
    rot.extend_from_slice(&[0x01, 0x01, 0x00, 0x0a, 0x01, 0x01]);
    let mut tee = vec![0xBF, 0x85, 0x40, rot.len() as u8];
    tee.extend_from_slice(&rot);

    let mut body = vec![
        0x02, 0x01, 0x04, 0x0a, 0x01, 0x01, 0x02, 0x01, 0x04, 0x0a, 0x01, 0x01, 0x04, 0x00,
        0x04, 0x00, 0x30, 0x00, 0x30,
    ];
    body.push(tee.len() as u8);
    body.extend_from_slice(&tee);
    let mut payload = vec![0x30, body.len() as u8];
    payload.extend_from_slice(&body);

    let key = KeyPair::generate_for(&PKCS_ECDSA_P256_SHA256).unwrap();
    let mut params = CertificateParams::new(vec!["device.example".to_string()]).unwrap();
    params.custom_extensions.push(CustomExtension::from_oid_content(
        &[1, 3, 6, 1, 4, 1, 11129, 2, 1, 17],
        payload,
    ));
    let cert = params.self_signed(&key).unwrap();

    let path = dir.join("attested.der");
    std::fs::write(&path, cert.der()).unwrap();
    path
}
