//! Root of trust record.
//!
//! ```asn1
//! RootOfTrust ::= SEQUENCE {
//!     verifiedBootKey            OCTET STRING,
//!     deviceLocked               BOOLEAN,
//!     verifiedBootState          VerifiedBootState,
//!     verifiedBootHash           OCTET STRING,   -- absent before KeyMint 4
//! }
//! ```

use der::asn1::{Any, OctetString};
use der::{
    DecodeValue, Encode, EncodeValue, Enumerated, FixedTag, Header, Length, Reader, Tag, Tagged,
    Writer,
};
use keybox_core::error::{KeyboxError, Result};
use rand::{CryptoRng, RngCore};
use serde::Serialize;

use super::tagged::TeeEntry;

/// Length of the generated verified boot key and hash.
pub const BOOT_DIGEST_LEN: usize = 32;

/// Verified boot state as ASN.1 ENUMERATED.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enumerated, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifiedBootState {
    Verified = 0,
    SelfSigned = 1,
    Unverified = 2,
    Failed = 3,
}

/// Decoded root of trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootOfTrust {
    pub verified_boot_key: OctetString,
    pub device_locked: bool,
    pub verified_boot_state: VerifiedBootState,
    pub verified_boot_hash: Option<OctetString>,
}

impl FixedTag for RootOfTrust {
    const TAG: Tag = Tag::Sequence;
}

impl<'a> DecodeValue<'a> for RootOfTrust {
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> der::Result<Self> {
        reader.read_nested(header.length, |reader| {
            let verified_boot_key = reader.decode()?;
            let device_locked = reader.decode()?;
            let verified_boot_state = reader.decode()?;

            // Keep the hash only when it is an OCTET STRING; anything else in
            // that position is treated as absent.
            let verified_boot_hash = match reader.decode::<Option<Any>>()? {
                Some(any) if any.tag() == Tag::OctetString => {
                    Some(OctetString::new(any.value())?)
                }
                _ => None,
            };
            while !reader.is_finished() {
                reader.decode::<Any>()?;
            }

            Ok(Self {
                verified_boot_key,
                device_locked,
                verified_boot_state,
                verified_boot_hash,
            })
        })
    }
}

impl EncodeValue for RootOfTrust {
    fn value_len(&self) -> der::Result<Length> {
        let hash_len = match &self.verified_boot_hash {
            Some(hash) => hash.encoded_len()?,
            None => Length::ZERO,
        };
        self.verified_boot_key.encoded_len()?
            + self.device_locked.encoded_len()?
            + self.verified_boot_state.encoded_len()?
            + hash_len
    }

    fn encode_value(&self, writer: &mut impl Writer) -> der::Result<()> {
        self.verified_boot_key.encode(writer)?;
        self.device_locked.encode(writer)?;
        self.verified_boot_state.encode(writer)?;
        if let Some(hash) = &self.verified_boot_hash {
            hash.encode(writer)?;
        }
        Ok(())
    }
}

/// Remove the root of trust from `entries`.
///
/// Returns it together with every other entry in original order. When the
/// list carries more than one, the first is returned and the rest dropped.
pub fn extract_root_of_trust(entries: Vec<TeeEntry>) -> Result<(RootOfTrust, Vec<TeeEntry>)> {
    let mut found = None;
    let mut remaining = Vec::with_capacity(entries.len());

    for entry in entries {
        match entry {
            TeeEntry::RootOfTrust(rot) => {
                if found.is_none() {
                    found = Some(rot);
                }
            }
            other => remaining.push(other),
        }
    }

    found
        .map(|rot| (rot, remaining))
        .ok_or(KeyboxError::MissingRootOfTrust)
}

/// Build the replacement root of trust.
///
/// The boot key is always fresh random bytes, the device is reported locked
/// with a verified boot state, and the boot hash is carried over from
/// `original` when it has one.
pub fn rebuild_root_of_trust<R: RngCore + CryptoRng>(
    original: Option<&RootOfTrust>,
    rng: &mut R,
) -> Result<RootOfTrust> {
    let verified_boot_key = random_octets(rng)?;

    let verified_boot_hash = match original.and_then(|rot| rot.verified_boot_hash.clone()) {
        Some(hash) => hash,
        None => random_octets(rng)?,
    };

    Ok(RootOfTrust {
        verified_boot_key,
        device_locked: true,
        verified_boot_state: VerifiedBootState::Verified,
        verified_boot_hash: Some(verified_boot_hash),
    })
}

fn random_octets<R: RngCore + CryptoRng>(rng: &mut R) -> Result<OctetString> {
    let mut bytes = vec![0u8; BOOT_DIGEST_LEN];
    rng.fill_bytes(&mut bytes);
    OctetString::new(bytes).map_err(|e| {
        KeyboxError::MalformedAttestationSequence(format!("Failed to build octet string: {}", e))
    })
}
