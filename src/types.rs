//! Core value types shared across the crate: addresses, public keys, and
//! the hex/byte helpers the wire format is built on.
//!
//! Everything the protocol puts on the wire is a minimal big-endian byte
//! string inside an RLP list. These types keep the byte form canonical at
//! construction time so the codec never has to re-normalize.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

/// Decodes a hex string into bytes, tolerating a `0x` prefix and odd-length
/// input. An odd-length string gets a leading zero inserted before the
/// existing content, never appended -- `0x1` means `0x01`.
pub fn bytes_from_hex(input: &str) -> Result<Vec<u8>, ValidationError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let normalized;
    let digits = if stripped.len() % 2 == 1 {
        normalized = format!("0{stripped}");
        normalized.as_str()
    } else {
        stripped
    };
    hex::decode(digits).map_err(|_| ValidationError::MalformedHex {
        input: input.to_string(),
    })
}

/// Encodes bytes as a `0x`-prefixed lowercase hex string. Empty input
/// encodes as `"0x"`.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Strips leading zero bytes, yielding the minimal big-endian form RLP
/// expects for quantities. All-zero input collapses to the empty string.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Minimal big-endian byte form of a `u64`. Zero encodes as empty.
pub fn u64_to_bytes(value: u64) -> Vec<u8> {
    trim_leading_zeros(&value.to_be_bytes()).to_vec()
}

/// Parses a minimal big-endian byte string back into a `u64`.
/// Empty input is zero.
pub fn u64_from_bytes(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > 8 {
        return None;
    }
    let mut buf = [0u8; 8];
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Some(u64::from_be_bytes(buf))
}

/// Keccak-256, the hash everything on the wire is identified by.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte account address.
///
/// Stored as raw bytes; displayed as `0x`-prefixed lowercase hex. The zero
/// address doubles as the "not yet known" placeholder in wire forms that
/// must carry an address slot regardless (fee payer on a half-signed
/// fee-delegated transaction, sender on a decoded legacy transaction).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero placeholder address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Wraps raw address bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parses a `0x`-prefixed (or bare) 40-digit hex address.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        let bytes = bytes_from_hex(input)?;
        Self::from_slice(&bytes).ok_or_else(|| ValidationError::MalformedAddress {
            input: input.to_string(),
        })
    }

    /// Builds an address from a byte slice, returning `None` unless it is
    /// exactly 20 bytes.
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 20] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex form.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// `true` for the all-zero placeholder.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A secp256k1 public key in 33-byte compressed form.
///
/// The compressed form is what account keys embed on the wire; the
/// uncompressed form only ever appears transiently for address derivation.
/// Construction always goes through curve validation -- a `PublicKey`
/// that exists is a valid point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 33]);

impl PublicKey {
    /// Validates and wraps a key given in compressed (33-byte) or
    /// uncompressed (65-byte) form.
    pub fn from_slice(slice: &[u8]) -> Result<Self, ValidationError> {
        let key = secp256k1::PublicKey::from_slice(slice)
            .map_err(|_| ValidationError::MalformedPublicKey {
                input: to_hex(slice),
            })?;
        Ok(Self(key.serialize()))
    }

    /// Parses a hex public key, compressed or uncompressed, `0x` optional.
    pub fn from_hex(input: &str) -> Result<Self, ValidationError> {
        let bytes = bytes_from_hex(input)?;
        Self::from_slice(&bytes)
    }

    /// Compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// `0x`-prefixed compressed hex form.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Derives the account address: the last 20 bytes of the keccak256 of
    /// the uncompressed point (tag byte dropped).
    pub fn to_address(&self) -> Address {
        // The stored bytes were validated at construction; re-parsing
        // cannot fail for a key that exists.
        let uncompressed = match secp256k1::PublicKey::from_slice(&self.0) {
            Ok(key) => key.serialize_uncompressed(),
            Err(_) => return Address::ZERO,
        };
        let digest = keccak256(&uncompressed[1..]);
        Address::from_slice(&digest[12..]).unwrap_or(Address::ZERO)
    }
}

impl From<secp256k1::PublicKey> for PublicKey {
    fn from(key: secp256k1::PublicKey) -> Self {
        Self(key.serialize())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}…)", &self.to_hex()[..18])
    }
}

impl Serialize for PublicKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Serde helpers for hex-encoded byte fields
// ---------------------------------------------------------------------------

/// Serializes optional byte payloads as `0x…` hex strings, the way every
/// client-facing JSON form represents binary transaction fields.
pub(crate) mod serde_hex_opt {
    use super::{bytes_from_hex, to_hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_some(&to_hex(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        value
            .map(|s| bytes_from_hex(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
