//! Construction and signing of the re-issued leaf certificate.

use der::asn1::BitString;
use der::Encode;
use keybox_core::error::{KeyboxError, Result};
use x509_cert::certificate::{Certificate, TbsCertificate, Version};
use x509_cert::ext::Extension;

use crate::attestation::KEY_ATTESTATION_OID;
use crate::signer::{PrivateKey, SignatureScheme};

/// Build and sign a copy of `original` carrying `attestation` in place of
/// its attestation extension.
///
/// Subject, serial number, validity and public key come from `original`;
/// the issuer is the subject of `naming`. The signature algorithm identifier
/// is copied from `original` and must suit `key`. Returns the DER encoding.
pub fn reissue(
    original: &Certificate,
    attestation: Extension,
    key: &PrivateKey,
    naming: &Certificate,
) -> Result<Vec<u8>> {
    let source = &original.tbs_certificate;
    let signature_algorithm = original.signature_algorithm.clone();
    let scheme = SignatureScheme::from_oid(signature_algorithm.oid)?;

    let mut extensions = Vec::with_capacity(source.extensions.as_ref().map_or(1, Vec::len));
    extensions.push(attestation);
    extensions.extend(
        source
            .extensions
            .iter()
            .flatten()
            .filter(|ext| ext.extn_id != KEY_ATTESTATION_OID)
            .cloned(),
    );

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: source.serial_number.clone(),
        signature: signature_algorithm.clone(),
        issuer: naming.tbs_certificate.subject.clone(),
        validity: source.validity.clone(),
        subject: source.subject.clone(),
        subject_public_key_info: source.subject_public_key_info.clone(),
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    let tbs_der = tbs_certificate.to_der().map_err(|e| {
        KeyboxError::SigningError(format!("Failed to encode TBS certificate: {}", e))
    })?;
    let signature = key.sign(scheme, &tbs_der)?;

    let certificate = Certificate {
        tbs_certificate,
        signature_algorithm,
        signature: BitString::new(0, signature).map_err(|e| {
            KeyboxError::SigningError(format!("Failed to build signature bit string: {}", e))
        })?,
    };

    certificate.to_der().map_err(|e| {
        KeyboxError::SigningError(format!("Failed to encode certificate: {}", e))
    })
}

/// Concatenated DER encodings of `chain`, in order.
pub fn assemble_chain(chain: &[Certificate]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for cert in chain {
        let der = cert.to_der().map_err(|e| {
            KeyboxError::SerializationError(format!("Failed to encode chain certificate: {}", e))
        })?;
        out.extend_from_slice(&der);
    }
    Ok(out)
}
