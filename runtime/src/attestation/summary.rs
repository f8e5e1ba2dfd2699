//! Read-only view of an attestation extension for inspection.

use der::asn1::Any;
use der::{Decode, Encode, Enumerated};
use keybox_core::error::{KeyboxError, Result};
use serde::Serialize;
use x509_cert::Certificate;

use super::extension::{
    authorization_list, require_extension, KeyDescription, SOFTWARE_ENFORCED_INDEX,
};
use super::root_of_trust::{RootOfTrust, VerifiedBootState};
use super::tagged::TeeEntry;

/// Security level of the attestation or keymaster implementation.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumerated, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    Software = 0,
    TrustedEnvironment = 1,
    StrongBox = 2,
}

/// Root of trust with byte fields rendered as hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RootOfTrustSummary {
    pub verified_boot_key: String,
    pub device_locked: bool,
    pub verified_boot_state: VerifiedBootState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_boot_hash: Option<String>,
}

impl From<&RootOfTrust> for RootOfTrustSummary {
    fn from(rot: &RootOfTrust) -> Self {
        Self {
            verified_boot_key: hex::encode(rot.verified_boot_key.as_bytes()),
            device_locked: rot.device_locked,
            verified_boot_state: rot.verified_boot_state,
            verified_boot_hash: rot
                .verified_boot_hash
                .as_ref()
                .map(|hash| hex::encode(hash.as_bytes())),
        }
    }
}

/// Decoded headline fields of a Key Description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttestationSummary {
    pub attestation_version: u32,
    pub attestation_security_level: SecurityLevel,
    pub keymaster_version: u32,
    pub keymaster_security_level: SecurityLevel,
    pub attestation_challenge: String,
    pub software_enforced_tags: Vec<u32>,
    pub tee_enforced_tags: Vec<u32>,
    pub root_of_trust: Option<RootOfTrustSummary>,
}

impl AttestationSummary {
    pub fn from_certificate(cert: &Certificate) -> Result<Self> {
        let extension = require_extension(cert)?;
        Self::from_key_description(&KeyDescription::from_der(extension.extn_value.as_bytes())?)
    }

    pub fn from_key_description(description: &KeyDescription) -> Result<Self> {
        let elements = &description.elements;
        let software_enforced = authorization_list(&elements[SOFTWARE_ENFORCED_INDEX])?;

        let root_of_trust = description.tee_enforced.iter().find_map(|entry| match entry {
            TeeEntry::RootOfTrust(rot) => Some(RootOfTrustSummary::from(rot)),
            TeeEntry::Opaque { .. } => None,
        });

        Ok(Self {
            attestation_version: element(elements, 0)?,
            attestation_security_level: element(elements, 1)?,
            keymaster_version: element(elements, 2)?,
            keymaster_security_level: element(elements, 3)?,
            attestation_challenge: hex::encode(element::<der::asn1::OctetString>(elements, 4)?.as_bytes()),
            software_enforced_tags: software_enforced.iter().map(TeeEntry::tag).collect(),
            tee_enforced_tags: description.tee_enforced.iter().map(TeeEntry::tag).collect(),
            root_of_trust,
        })
    }
}

fn element<T: for<'a> Decode<'a>>(elements: &[Any], index: usize) -> Result<T> {
    let malformed = |e: der::Error| {
        KeyboxError::MalformedAttestationSequence(format!("Element {} is invalid: {}", index, e))
    };
    let encoded = elements[index].to_der().map_err(malformed)?;
    T::from_der(&encoded).map_err(malformed)
}
