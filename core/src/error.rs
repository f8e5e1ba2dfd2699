use thiserror::Error;

/// Keybox error types
#[derive(Error, Debug)]
pub enum KeyboxError {
    /// PEM armor or Base64 body could not be decoded
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Key algorithm family other than EC or RSA
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Certificate carries no key attestation extension
    #[error("Key attestation extension not found")]
    ExtensionNotFound,

    /// Attestation payload does not have the expected ASN.1 shape
    #[error("Malformed attestation sequence: {0}")]
    MalformedAttestationSequence(String),

    /// TEE-enforced authorization list has no root of trust entry
    #[error("Root of trust not found in TEE-enforced authorization list")]
    MissingRootOfTrust,

    /// Signature generation failed
    #[error("Signing error: {0}")]
    SigningError(String),

    /// Substitute key material is not configured
    #[error("Key material provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for KeyboxError {
    fn from(err: serde_json::Error) -> Self {
        KeyboxError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for KeyboxError {
    fn from(err: serde_yaml::Error) -> Self {
        KeyboxError::SerializationError(err.to_string())
    }
}

/// Result type alias for keybox operations
pub type Result<T> = std::result::Result<T, KeyboxError>;
