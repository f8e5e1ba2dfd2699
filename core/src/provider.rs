//! Key material provider interface.
//!
//! A provider hands out substitute key material (a private key and its
//! certificate chain) per algorithm family. Material is returned as PEM or
//! bare Base64 text; decoding happens in the runtime codec.

use serde::{Deserialize, Serialize};

use crate::error::{KeyboxError, Result};

/// Key algorithm family of an attestation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyAlgorithm {
    Ec,
    Rsa,
}

impl KeyAlgorithm {
    /// Canonical algorithm name (`EC` / `RSA`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ec => "EC",
            Self::Rsa => "RSA",
        }
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyAlgorithm {
    type Err = KeyboxError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ec") {
            Ok(Self::Ec)
        } else if s.eq_ignore_ascii_case("rsa") {
            Ok(Self::Rsa)
        } else {
            Err(KeyboxError::UnsupportedAlgorithm(s.to_string()))
        }
    }
}

/// Source of substitute key material.
///
/// Implementations must be safe to share across threads; the engine may be
/// invoked concurrently from independent callers.
pub trait KeyMaterialProvider: Send + Sync {
    /// Whether any substitute key material is configured.
    fn is_available(&self) -> bool;

    /// PEM or Base64 encoded private key for `algorithm`.
    fn private_key(&self, algorithm: KeyAlgorithm) -> Result<String>;

    /// PEM or Base64 encoded certificate chain for `algorithm`, leaf first.
    fn certificate_chain(&self, algorithm: KeyAlgorithm) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_from_str_case_insensitive() {
        assert_eq!("EC".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Ec);
        assert_eq!("ec".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Ec);
        assert_eq!("RSA".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Rsa);
        assert_eq!("Rsa".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Rsa);
    }

    #[test]
    fn test_algorithm_from_str_unsupported() {
        let err = "DSA".parse::<KeyAlgorithm>().unwrap_err();
        assert!(matches!(err, KeyboxError::UnsupportedAlgorithm(ref name) if name == "DSA"));
    }

    #[test]
    fn test_algorithm_display() {
        assert_eq!(KeyAlgorithm::Ec.to_string(), "EC");
        assert_eq!(KeyAlgorithm::Rsa.to_string(), "RSA");
    }

    #[test]
    fn test_algorithm_serde_roundtrip() {
        let json = serde_json::to_string(&KeyAlgorithm::Ec).unwrap();
        assert_eq!(json, "\"ec\"");
        let parsed: KeyAlgorithm = serde_json::from_str("\"rsa\"").unwrap();
        assert_eq!(parsed, KeyAlgorithm::Rsa);
    }

    struct NoKeys;

    impl KeyMaterialProvider for NoKeys {
        fn is_available(&self) -> bool {
            false
        }

        fn private_key(&self, algorithm: KeyAlgorithm) -> Result<String> {
            Err(KeyboxError::ProviderUnavailable(format!("no {} key", algorithm)))
        }

        fn certificate_chain(&self, algorithm: KeyAlgorithm) -> Result<Vec<String>> {
            Err(KeyboxError::ProviderUnavailable(format!("no {} chain", algorithm)))
        }
    }

    #[test]
    fn test_provider_is_object_safe() {
        let provider: Box<dyn KeyMaterialProvider> = Box::new(NoKeys);
        assert!(!provider.is_available());
        assert!(provider.private_key(KeyAlgorithm::Ec).is_err());
        assert!(provider.certificate_chain(KeyAlgorithm::Rsa).is_err());
    }
}
