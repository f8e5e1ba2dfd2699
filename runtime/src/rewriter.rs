//! Orchestration of a single rewrite with fail-open semantics.
//!
//! Every failure after the input checks is logged and the caller's response
//! is handed back untouched. A partially rewritten response is never
//! returned.

use std::sync::Arc;

use const_oid::db::rfc5912::{ID_EC_PUBLIC_KEY, RSA_ENCRYPTION};
use keybox_core::error::{KeyboxError, Result};
use keybox_core::{KeyAlgorithm, KeyEntryResponse, KeyMaterialProvider, KeyMetadata, RewriteConfig};
use rand::rngs::OsRng;
use x509_cert::Certificate;

use crate::attestation::{
    extract_root_of_trust, parse_tee_enforced, rebuild_extension, rebuild_root_of_trust,
    require_extension,
};
use crate::codec::parse_certificate;
use crate::keybox::KeyMaterial;
use crate::reissue::{assemble_chain, reissue};

/// Why a response was or was not rewritten.
#[derive(Debug)]
pub enum RewriteOutcome {
    Rewritten,
    Disabled,
    ProviderUnavailable,
    NoCertificate,
    NotAttested,
    Failed(KeyboxError),
}

impl RewriteOutcome {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten)
    }

    /// Short label for reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rewritten => "rewritten",
            Self::Disabled => "disabled",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::NoCertificate => "no_certificate",
            Self::NotAttested => "not_attested",
            Self::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Display for RewriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Failed(e) => write!(f, "failed: {}", e),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Re-issued leaf and the substitute chain that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenLeaf {
    pub certificate: Vec<u8>,
    pub certificate_chain: Vec<u8>,
}

/// Rewrite the leaf certificate of `response`, or return it unchanged.
pub fn process(
    response: KeyEntryResponse,
    config: &RewriteConfig,
    provider: &dyn KeyMaterialProvider,
) -> KeyEntryResponse {
    process_with_outcome(response, config, provider).0
}

/// Like [`process`], also reporting what happened.
pub fn process_with_outcome(
    response: KeyEntryResponse,
    config: &RewriteConfig,
    provider: &dyn KeyMaterialProvider,
) -> (KeyEntryResponse, RewriteOutcome) {
    if config.disable_attestation_rewrite {
        tracing::debug!("Attestation rewrite disabled by configuration");
        return (response, RewriteOutcome::Disabled);
    }
    if !provider.is_available() {
        tracing::debug!("No substitute key material configured");
        return (response, RewriteOutcome::ProviderUnavailable);
    }

    let leaf = match response.certificate() {
        Some(leaf) => leaf,
        None => {
            tracing::debug!("Key entry has no leaf certificate");
            return (response, RewriteOutcome::NoCertificate);
        }
    };

    match rewrite_leaf(leaf, provider) {
        Ok(rewritten) => {
            tracing::info!(
                original_size = leaf.len(),
                certificate_size = rewritten.certificate.len(),
                chain_size = rewritten.certificate_chain.len(),
                "Re-issued attestation certificate"
            );
            let metadata = KeyMetadata {
                certificate: Some(rewritten.certificate),
                certificate_chain: Some(rewritten.certificate_chain),
            };
            (
                KeyEntryResponse {
                    metadata: Some(metadata),
                },
                RewriteOutcome::Rewritten,
            )
        }
        Err(KeyboxError::ExtensionNotFound) => {
            tracing::debug!("Leaf certificate carries no attestation extension");
            (response, RewriteOutcome::NotAttested)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Attestation rewrite failed, returning original response");
            (response, RewriteOutcome::Failed(e))
        }
    }
}

/// Re-issue a DER or PEM leaf certificate with substitute key material.
///
/// Fails with `ExtensionNotFound` when the leaf is not an attestation
/// certificate.
pub fn rewrite_leaf(leaf: &[u8], provider: &dyn KeyMaterialProvider) -> Result<RewrittenLeaf> {
    let original = parse_certificate(leaf)?;
    let extension = require_extension(&original)?;

    let algorithm = algorithm_of(&original)?;
    let material = KeyMaterial::load(provider, algorithm)?;

    let description = parse_tee_enforced(extension)?;
    let (root_of_trust, remaining) = extract_root_of_trust(description.tee_enforced)?;
    let replacement = rebuild_root_of_trust(Some(&root_of_trust), &mut OsRng)?;
    let rewritten = rebuild_extension(remaining, replacement, &description.elements)?;

    let certificate = reissue(
        &original,
        rewritten,
        &material.private_key,
        material.naming_leaf(),
    )?;
    let certificate_chain = assemble_chain(&material.chain)?;

    Ok(RewrittenLeaf {
        certificate,
        certificate_chain,
    })
}

/// Algorithm family of the certificate's subject public key.
pub fn algorithm_of(cert: &Certificate) -> Result<KeyAlgorithm> {
    let oid = cert
        .tbs_certificate
        .subject_public_key_info
        .algorithm
        .oid;
    match oid {
        ID_EC_PUBLIC_KEY => Ok(KeyAlgorithm::Ec),
        RSA_ENCRYPTION => Ok(KeyAlgorithm::Rsa),
        other => Err(KeyboxError::UnsupportedAlgorithm(format!(
            "Public key algorithm {}",
            other
        ))),
    }
}

/// Rewriter bound to a configuration and a shared provider.
#[derive(Clone)]
pub struct AttestationRewriter {
    config: RewriteConfig,
    provider: Arc<dyn KeyMaterialProvider>,
}

impl AttestationRewriter {
    pub fn new(config: RewriteConfig, provider: Arc<dyn KeyMaterialProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    pub fn process(&self, response: KeyEntryResponse) -> KeyEntryResponse {
        process(response, &self.config, self.provider.as_ref())
    }

    pub fn process_with_outcome(
        &self,
        response: KeyEntryResponse,
    ) -> (KeyEntryResponse, RewriteOutcome) {
        process_with_outcome(response, &self.config, self.provider.as_ref())
    }
}

impl std::fmt::Debug for AttestationRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttestationRewriter")
            .field("config", &self.config)
            .field("available", &self.provider.is_available())
            .finish()
    }
}
