//! Context-tagged entries of an authorization list.
//!
//! Authorization list entries are EXPLICIT context-specific tags whose
//! numbers run well past 30 (root of trust is `[704]`). The `der` crate
//! rejects high tag numbers, so entries are split and written by hand here.
//! Only the root of trust is decoded; every other entry is carried as its
//! original TLV bytes.

use der::{Decode, Encode, Length, Reader, SliceReader, Writer};
use keybox_core::error::{KeyboxError, Result};

use super::root_of_trust::RootOfTrust;

/// Tag number of the root of trust entry.
pub const ROOT_OF_TRUST_TAG: u32 = 704;

/// Identifier octet bits: context-specific class, constructed.
const CONTEXT_CONSTRUCTED: u8 = 0b1010_0000;
const CLASS_MASK: u8 = 0b1100_0000;
const CONTEXT_CLASS: u8 = 0b1000_0000;
const CONSTRUCTED_FLAG: u8 = 0b0010_0000;
const HIGH_TAG_FORM: u8 = 0b0001_1111;

/// One entry of the TEE-enforced authorization list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeeEntry {
    /// `[704] RootOfTrust`
    RootOfTrust(RootOfTrust),
    /// Any other tag, kept as its complete original encoding.
    Opaque { tag: u32, encoded: Vec<u8> },
}

impl TeeEntry {
    pub fn tag(&self) -> u32 {
        match self {
            Self::RootOfTrust(_) => ROOT_OF_TRUST_TAG,
            Self::Opaque { tag, .. } => *tag,
        }
    }

    /// DER encoding of the complete tagged entry.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        match self {
            Self::RootOfTrust(rot) => ExplicitTagged::new(ROOT_OF_TRUST_TAG, rot)
                .to_der()
                .map_err(|e| {
                    KeyboxError::MalformedAttestationSequence(format!(
                        "Failed to encode root of trust: {}",
                        e
                    ))
                }),
            Self::Opaque { encoded, .. } => Ok(encoded.clone()),
        }
    }
}

/// Split the content octets of an authorization list SEQUENCE into entries.
pub fn decode_entries(content: &[u8]) -> Result<Vec<TeeEntry>> {
    let mut reader = SliceReader::new(content).map_err(malformed)?;
    let mut entries = Vec::new();

    while !reader.is_finished() {
        let start = usize::try_from(reader.position()).map_err(malformed)?;
        let (tag, inner) = read_tagged(&mut reader)?;
        let end = usize::try_from(reader.position()).map_err(malformed)?;

        let entry = if tag == ROOT_OF_TRUST_TAG {
            TeeEntry::RootOfTrust(RootOfTrust::from_der(inner).map_err(|e| {
                KeyboxError::MalformedAttestationSequence(format!(
                    "Root of trust is not a valid sequence: {}",
                    e
                ))
            })?)
        } else {
            TeeEntry::Opaque {
                tag,
                encoded: content[start..end].to_vec(),
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Concatenated DER encodings of `entries`, in order.
pub fn encode_entries(entries: &[TeeEntry]) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    for entry in entries {
        content.extend_from_slice(&entry.to_der()?);
    }
    Ok(content)
}

/// Read one explicitly tagged entry, returning its tag number and content.
fn read_tagged<'a>(reader: &mut SliceReader<'a>) -> Result<(u32, &'a [u8])> {
    let identifier = reader.read_byte().map_err(malformed)?;
    if identifier & CLASS_MASK != CONTEXT_CLASS || identifier & CONSTRUCTED_FLAG == 0 {
        return Err(KeyboxError::MalformedAttestationSequence(format!(
            "Entry identifier 0x{:02x} is not a context-specific tagged object",
            identifier
        )));
    }

    let tag = if identifier & HIGH_TAG_FORM == HIGH_TAG_FORM {
        read_high_tag_number(reader)?
    } else {
        u32::from(identifier & HIGH_TAG_FORM)
    };

    let length = Length::decode(reader).map_err(malformed)?;
    let inner = reader.read_slice(length).map_err(malformed)?;
    Ok((tag, inner))
}

/// Base-128 tag number following a high-tag-form identifier octet.
fn read_high_tag_number(reader: &mut SliceReader<'_>) -> Result<u32> {
    let mut tag: u32 = 0;
    for _ in 0..4 {
        let byte = reader.read_byte().map_err(malformed)?;
        tag = (tag << 7) | u32::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok(tag);
        }
    }
    Err(KeyboxError::MalformedAttestationSequence(
        "Tag number does not fit in 28 bits".to_string(),
    ))
}

fn malformed(e: der::Error) -> KeyboxError {
    KeyboxError::MalformedAttestationSequence(e.to_string())
}

/// `[tag] EXPLICIT` wrapper that supports tag numbers above 30.
pub(crate) struct ExplicitTagged<'a, T: Encode> {
    tag: u32,
    value: &'a T,
}

impl<'a, T: Encode> ExplicitTagged<'a, T> {
    pub(crate) fn new(tag: u32, value: &'a T) -> Self {
        Self { tag, value }
    }

    fn identifier(&self) -> Vec<u8> {
        if self.tag < u32::from(HIGH_TAG_FORM) {
            return vec![CONTEXT_CONSTRUCTED | self.tag as u8];
        }

        let mut groups = Vec::with_capacity(5);
        let mut rest = self.tag;
        groups.push((rest & 0x7f) as u8);
        rest >>= 7;
        while rest > 0 {
            groups.push(0x80 | (rest & 0x7f) as u8);
            rest >>= 7;
        }
        groups.push(CONTEXT_CONSTRUCTED | HIGH_TAG_FORM);
        groups.reverse();
        groups
    }
}

impl<T: Encode> Encode for ExplicitTagged<'_, T> {
    fn encoded_len(&self) -> der::Result<Length> {
        let inner_len = self.value.encoded_len()?;
        Length::try_from(self.identifier().len())? + inner_len.encoded_len()? + inner_len
    }

    fn encode(&self, writer: &mut impl Writer) -> der::Result<()> {
        writer.write(&self.identifier())?;
        self.value.encoded_len()?.encode(writer)?;
        self.value.encode(writer)
    }
}
