//! Substitute signing keys.
//!
//! EC keys arrive as SEC1 `ECPrivateKey` structures and sign through the
//! `p256`/`p384` ECDSA implementations over a digest chosen by the
//! certificate's signature scheme, so any curve can produce any ECDSA hash
//! variant. RSA keys arrive as PKCS#8 and sign through ring.

use const_oid::db::rfc5912::{
    ECDSA_WITH_SHA_256, ECDSA_WITH_SHA_384, ECDSA_WITH_SHA_512, SECP_256_R_1, SECP_384_R_1,
    SHA_256_WITH_RSA_ENCRYPTION, SHA_384_WITH_RSA_ENCRYPTION, SHA_512_WITH_RSA_ENCRYPTION,
};
use der::Decode;
use keybox_core::error::{KeyboxError, Result};
use keybox_core::KeyAlgorithm;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{self, RsaEncoding, RsaKeyPair};
use sec1::EcPrivateKey;
use spki::ObjectIdentifier;

/// Named curves accepted for EC substitute keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
}

impl EcCurve {
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self> {
        match oid {
            SECP_256_R_1 => Ok(Self::P256),
            SECP_384_R_1 => Ok(Self::P384),
            other => Err(KeyboxError::UnsupportedAlgorithm(format!(
                "EC curve {}",
                other
            ))),
        }
    }

    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            Self::P256 => SECP_256_R_1,
            Self::P384 => SECP_384_R_1,
        }
    }
}

/// Certificate signature schemes the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    EcdsaSha256,
    EcdsaSha384,
    EcdsaSha512,
    RsaPkcs1Sha256,
    RsaPkcs1Sha384,
    RsaPkcs1Sha512,
}

impl SignatureScheme {
    /// Resolve the scheme named by a certificate's signature algorithm OID.
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self> {
        match oid {
            ECDSA_WITH_SHA_256 => Ok(Self::EcdsaSha256),
            ECDSA_WITH_SHA_384 => Ok(Self::EcdsaSha384),
            ECDSA_WITH_SHA_512 => Ok(Self::EcdsaSha512),
            SHA_256_WITH_RSA_ENCRYPTION => Ok(Self::RsaPkcs1Sha256),
            SHA_384_WITH_RSA_ENCRYPTION => Ok(Self::RsaPkcs1Sha384),
            SHA_512_WITH_RSA_ENCRYPTION => Ok(Self::RsaPkcs1Sha512),
            other => Err(KeyboxError::SigningError(format!(
                "Unsupported signature algorithm {}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EcdsaSha256 => "SHA256withECDSA",
            Self::EcdsaSha384 => "SHA384withECDSA",
            Self::EcdsaSha512 => "SHA512withECDSA",
            Self::RsaPkcs1Sha256 => "SHA256withRSA",
            Self::RsaPkcs1Sha384 => "SHA384withRSA",
            Self::RsaPkcs1Sha512 => "SHA512withRSA",
        }
    }

    /// Message digest of an ECDSA scheme, `None` for RSA schemes.
    fn ecdsa_digest(&self) -> Option<&'static digest::Algorithm> {
        match self {
            Self::EcdsaSha256 => Some(&digest::SHA256),
            Self::EcdsaSha384 => Some(&digest::SHA384),
            Self::EcdsaSha512 => Some(&digest::SHA512),
            _ => None,
        }
    }

    fn rsa_encoding(&self) -> Result<&'static dyn RsaEncoding> {
        match self {
            Self::RsaPkcs1Sha256 => Ok(&signature::RSA_PKCS1_SHA256),
            Self::RsaPkcs1Sha384 => Ok(&signature::RSA_PKCS1_SHA384),
            Self::RsaPkcs1Sha512 => Ok(&signature::RSA_PKCS1_SHA512),
            scheme => Err(KeyboxError::SigningError(format!(
                "RSA key cannot produce {} signatures",
                scheme.name()
            ))),
        }
    }
}

/// ECDSA signing key on one of the supported curves.
pub enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

impl EcSigningKey {
    /// Signing key for a big-endian private scalar.
    pub fn from_scalar(curve: EcCurve, scalar: &[u8]) -> Result<Self> {
        let invalid = |e: p256::elliptic_curve::Error| {
            KeyboxError::DecodeError(format!("Invalid EC private scalar: {}", e))
        };

        match curve {
            EcCurve::P256 => {
                let secret = p256::SecretKey::from_slice(scalar).map_err(invalid)?;
                Ok(Self::P256(secret.into()))
            }
            EcCurve::P384 => {
                let secret = p384::SecretKey::from_slice(scalar).map_err(invalid)?;
                Ok(Self::P384(secret.into()))
            }
        }
    }

    pub fn curve(&self) -> EcCurve {
        match self {
            Self::P256(_) => EcCurve::P256,
            Self::P384(_) => EcCurve::P384,
        }
    }

    /// Whether `point` is this key's public point, compressed or not.
    fn matches_public_point(&self, point: &[u8]) -> bool {
        match self {
            Self::P256(key) => {
                let public = key.verifying_key();
                point == public.to_encoded_point(false).as_bytes()
                    || point == public.to_encoded_point(true).as_bytes()
            }
            Self::P384(key) => {
                let public = key.verifying_key();
                point == public.to_encoded_point(false).as_bytes()
                    || point == public.to_encoded_point(true).as_bytes()
            }
        }
    }

    /// DER `ECDSA-Sig-Value` over an already computed message digest.
    fn sign_prehash(&self, prehash: &[u8]) -> Result<Vec<u8>> {
        let failed =
            |e: p256::ecdsa::Error| KeyboxError::SigningError(format!("ECDSA signing failed: {}", e));

        match self {
            Self::P256(key) => {
                let sig: p256::ecdsa::Signature = key.sign_prehash(prehash).map_err(failed)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
            Self::P384(key) => {
                let sig: p384::ecdsa::Signature = key.sign_prehash(prehash).map_err(failed)?;
                Ok(sig.to_der().as_bytes().to_vec())
            }
        }
    }
}

/// A substitute private key ready for signing.
pub enum PrivateKey {
    Ec(EcSigningKey),
    Rsa(RsaKeyPair),
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ec(key) => f
                .debug_struct("PrivateKey::Ec")
                .field("curve", &key.curve())
                .finish(),
            Self::Rsa(key_pair) => f
                .debug_struct("PrivateKey::Rsa")
                .field("modulus_len", &key_pair.public().modulus_len())
                .finish(),
        }
    }
}

impl PrivateKey {
    /// Load an EC key from a DER-encoded SEC1 `ECPrivateKey`.
    ///
    /// The curve comes from the structure's parameters. When a public key is
    /// present it must match the private scalar.
    pub fn from_sec1_der(bytes: &[u8]) -> Result<Self> {
        let ec = EcPrivateKey::from_der(bytes)
            .map_err(|e| KeyboxError::DecodeError(format!("Invalid EC private key: {}", e)))?;

        let curve_oid = ec
            .parameters
            .and_then(|params| params.named_curve())
            .ok_or_else(|| {
                KeyboxError::DecodeError("EC private key does not name its curve".to_string())
            })?;
        let curve = EcCurve::from_oid(curve_oid)?;
        let key = EcSigningKey::from_scalar(curve, ec.private_key)?;

        if let Some(point) = ec.public_key {
            if !key.matches_public_point(point) {
                return Err(KeyboxError::DecodeError(
                    "EC public key does not match the private key".to_string(),
                ));
            }
        }

        Ok(Self::Ec(key))
    }

    /// Load an RSA key from a DER-encoded PKCS#8 `PrivateKeyInfo`.
    pub fn from_pkcs8_der(bytes: &[u8]) -> Result<Self> {
        RsaKeyPair::from_pkcs8(bytes)
            .map(Self::Rsa)
            .map_err(|e| KeyboxError::DecodeError(format!("RSA private key rejected: {}", e)))
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Ec(_) => KeyAlgorithm::Ec,
            Self::Rsa(_) => KeyAlgorithm::Rsa,
        }
    }

    /// Sign `message` with `scheme`, returning the signature as it appears in
    /// an X.509 certificate (DER `ECDSA-Sig-Value` for EC, raw for RSA).
    ///
    /// EC keys accept every ECDSA scheme regardless of curve size.
    pub fn sign(&self, scheme: SignatureScheme, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Ec(key) => {
                let algorithm = scheme.ecdsa_digest().ok_or_else(|| {
                    KeyboxError::SigningError(format!(
                        "EC key cannot produce {} signatures",
                        scheme.name()
                    ))
                })?;
                key.sign_prehash(digest::digest(algorithm, message).as_ref())
            }
            Self::Rsa(key_pair) => {
                let encoding = scheme.rsa_encoding()?;
                let rng = SystemRandom::new();
                let mut sig = vec![0u8; key_pair.public().modulus_len()];
                key_pair.sign(encoding, &rng, message, &mut sig).map_err(|_| {
                    KeyboxError::SigningError(format!("{} signing failed", scheme.name()))
                })?;
                Ok(sig)
            }
        }
    }
}
