//! Key Description payload of the key attestation extension.

use const_oid::ObjectIdentifier;
use der::asn1::{Any, OctetString};
use der::{Decode, Encode, Tag, Tagged};
use keybox_core::error::{KeyboxError, Result};
use x509_cert::ext::Extension;
use x509_cert::Certificate;

use super::root_of_trust::RootOfTrust;
use super::tagged::{decode_entries, encode_entries, TeeEntry};

/// Android key attestation extension.
pub const KEY_ATTESTATION_OID: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.11129.2.1.17");

/// Minimum number of top-level Key Description elements.
pub const KEY_DESCRIPTION_MIN_ELEMENTS: usize = 8;

/// Position of the TEE-enforced authorization list.
pub const TEE_ENFORCED_INDEX: usize = 7;

/// Position of the software-enforced authorization list.
pub const SOFTWARE_ENFORCED_INDEX: usize = 6;

/// Top-level Key Description with its TEE-enforced list split into entries.
///
/// Every element other than the TEE-enforced list is kept as decoded so it
/// re-encodes to the same bytes.
#[derive(Debug, Clone)]
pub struct KeyDescription {
    pub elements: Vec<Any>,
    pub tee_enforced: Vec<TeeEntry>,
}

impl KeyDescription {
    pub fn from_der(payload: &[u8]) -> Result<Self> {
        let elements = Vec::<Any>::from_der(payload).map_err(|e| {
            KeyboxError::MalformedAttestationSequence(format!(
                "Key description is not a sequence: {}",
                e
            ))
        })?;

        if elements.len() < KEY_DESCRIPTION_MIN_ELEMENTS {
            return Err(KeyboxError::MalformedAttestationSequence(format!(
                "Key description has {} elements, expected at least {}",
                elements.len(),
                KEY_DESCRIPTION_MIN_ELEMENTS
            )));
        }

        let tee_enforced = authorization_list(&elements[TEE_ENFORCED_INDEX])?;
        Ok(Self {
            elements,
            tee_enforced,
        })
    }
}

/// Find the attestation extension of `cert`.
pub fn find_extension(cert: &Certificate) -> Option<&Extension> {
    cert.tbs_certificate
        .extensions
        .as_deref()
        .and_then(|exts| exts.iter().find(|ext| ext.extn_id == KEY_ATTESTATION_OID))
}

/// Like [`find_extension`], failing with `ExtensionNotFound`.
pub fn require_extension(cert: &Certificate) -> Result<&Extension> {
    find_extension(cert).ok_or(KeyboxError::ExtensionNotFound)
}

/// Parse the extension payload and split its TEE-enforced list.
pub fn parse_tee_enforced(extension: &Extension) -> Result<KeyDescription> {
    KeyDescription::from_der(extension.extn_value.as_bytes())
}

/// Entries of an authorization list element.
pub(crate) fn authorization_list(element: &Any) -> Result<Vec<TeeEntry>> {
    if element.tag() != Tag::Sequence {
        return Err(KeyboxError::MalformedAttestationSequence(format!(
            "Authorization list has tag {}, expected SEQUENCE",
            element.tag()
        )));
    }
    decode_entries(element.value())
}

/// Build the replacement attestation extension.
///
/// The TEE-enforced list becomes `remaining` followed by the new root of
/// trust; all other top-level elements are written back unchanged.
pub fn rebuild_extension(
    remaining: Vec<TeeEntry>,
    root_of_trust: RootOfTrust,
    elements: &[Any],
) -> Result<Extension> {
    if elements.len() < KEY_DESCRIPTION_MIN_ELEMENTS {
        return Err(KeyboxError::MalformedAttestationSequence(format!(
            "Key description has {} elements, expected at least {}",
            elements.len(),
            KEY_DESCRIPTION_MIN_ELEMENTS
        )));
    }

    let mut entries = remaining;
    entries.push(TeeEntry::RootOfTrust(root_of_trust));
    let content = encode_entries(&entries)?;

    let mut elements = elements.to_vec();
    elements[TEE_ENFORCED_INDEX] = Any::new(Tag::Sequence, content).map_err(encode_error)?;

    let payload = elements.to_der().map_err(encode_error)?;
    Ok(Extension {
        extn_id: KEY_ATTESTATION_OID,
        critical: false,
        extn_value: OctetString::new(payload).map_err(encode_error)?,
    })
}

fn encode_error(e: der::Error) -> KeyboxError {
    KeyboxError::MalformedAttestationSequence(format!("Failed to encode key description: {}", e))
}
