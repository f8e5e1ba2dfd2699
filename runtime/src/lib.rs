//! Keybox Runtime - attestation certificate re-issuance engine.
//!
//! Takes a key attestation leaf produced by a real keystore, rewrites the
//! root of trust inside its attestation extension and re-signs it with
//! substitute key material. Any failure leaves the caller's response as it
//! was.

pub mod attestation;
pub mod codec;
pub mod keybox;
pub mod reissue;
pub mod rewriter;
pub mod signer;

#[cfg(test)]
mod testutil;

// Re-export common types
pub use attestation::{AttestationSummary, KeyDescription, RootOfTrust, TeeEntry, VerifiedBootState};
pub use codec::{decode_key_or_cert, parse_certificate, parse_certificate_text, parse_private_key};
pub use keybox::{KeyMaterial, Keybox, KeyboxEntry};
pub use reissue::{assemble_chain, reissue};
pub use rewriter::{
    algorithm_of, process, process_with_outcome, rewrite_leaf, AttestationRewriter,
    RewriteOutcome, RewrittenLeaf,
};
pub use signer::{EcCurve, EcSigningKey, PrivateKey, SignatureScheme};

/// Keybox runtime version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
