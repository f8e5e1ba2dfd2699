//! Typed view of the Android key attestation extension.
//!
//! ```asn1
//! KeyDescription ::= SEQUENCE {
//!     attestationVersion         INTEGER,
//!     attestationSecurityLevel   SecurityLevel,
//!     keyMintVersion             INTEGER,
//!     keyMintSecurityLevel       SecurityLevel,
//!     attestationChallenge       OCTET STRING,
//!     uniqueId                   OCTET STRING,
//!     softwareEnforced           AuthorizationList,
//!     hardwareEnforced           AuthorizationList,
//! }
//! ```

mod extension;
mod root_of_trust;
mod summary;
mod tagged;

pub use extension::{
    find_extension, parse_tee_enforced, rebuild_extension, require_extension, KeyDescription,
    KEY_ATTESTATION_OID, TEE_ENFORCED_INDEX,
};
pub use root_of_trust::{
    extract_root_of_trust, rebuild_root_of_trust, RootOfTrust, VerifiedBootState, BOOT_DIGEST_LEN,
};
pub use summary::{AttestationSummary, RootOfTrustSummary, SecurityLevel};
pub use tagged::{decode_entries, encode_entries, TeeEntry, ROOT_OF_TRUST_TAG};

#[cfg(test)]
pub(crate) use tagged::ExplicitTagged;
