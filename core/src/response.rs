//! Key entry response exchanged with the caller.
//!
//! Mirrors the shape a keystore returns for a key lookup: metadata carrying
//! the DER leaf certificate and the concatenated DER chain behind it.

use serde::{Deserialize, Serialize};

/// Response to a key entry lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntryResponse {
    /// Key metadata, absent when the keystore returned nothing.
    #[serde(default)]
    pub metadata: Option<KeyMetadata>,
}

/// Certificate fields of a key entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// DER-encoded leaf certificate.
    #[serde(default)]
    pub certificate: Option<Vec<u8>>,
    /// Concatenated DER encodings of the certificates above the leaf.
    #[serde(default)]
    pub certificate_chain: Option<Vec<u8>>,
}

impl KeyEntryResponse {
    /// Response carrying a leaf certificate and no chain.
    pub fn with_certificate(certificate: Vec<u8>) -> Self {
        Self {
            metadata: Some(KeyMetadata {
                certificate: Some(certificate),
                certificate_chain: None,
            }),
        }
    }

    /// The leaf certificate, if any.
    pub fn certificate(&self) -> Option<&[u8]> {
        self.metadata.as_ref()?.certificate.as_deref()
    }

    /// The certificate chain, if any.
    pub fn certificate_chain(&self) -> Option<&[u8]> {
        self.metadata.as_ref()?.certificate_chain.as_deref()
    }
}
