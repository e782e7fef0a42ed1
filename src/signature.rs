//! The canonical `(v, r, s)` signature value type.
//!
//! Components are stored as minimal big-endian byte strings -- exactly the
//! form the RLP codec writes -- and exposed as `0x`-prefixed, even-length
//! hex on the way out. A distinguished empty sentinel `(0x01, 0x, 0x)`
//! stands for "not yet signed" and is filtered out of any final encoding
//! that carries at least one real signature.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::types::{bytes_from_hex, to_hex, trim_leading_zeros};

/// One ECDSA signature as it appears on the wire.
///
/// `v` carries either a bare recovery id or the chain-id-derived
/// replay-protection value (`chain_id * 2 + 35 + recovery_id`); `r` and
/// `s` are the curve scalars. All three are minimal big-endian -- leading
/// zeros are trimmed at construction so equality and encoding agree.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignatureData {
    #[serde(with = "serde_component")]
    v: Vec<u8>,
    #[serde(with = "serde_component")]
    r: Vec<u8>,
    #[serde(with = "serde_component")]
    s: Vec<u8>,
}

impl SignatureData {
    /// The "not yet signed" sentinel: `(v=0x01, r=0x, s=0x)`.
    pub fn empty() -> Self {
        Self {
            v: vec![0x01],
            r: Vec::new(),
            s: Vec::new(),
        }
    }

    /// Builds a signature from raw component bytes, trimming to minimal
    /// big-endian form.
    pub fn new(v: impl AsRef<[u8]>, r: impl AsRef<[u8]>, s: impl AsRef<[u8]>) -> Self {
        Self {
            v: trim_leading_zeros(v.as_ref()).to_vec(),
            r: trim_leading_zeros(r.as_ref()).to_vec(),
            s: trim_leading_zeros(s.as_ref()).to_vec(),
        }
    }

    /// Builds a signature from three hex strings (`0x` optional,
    /// odd-length tolerated).
    pub fn from_hex(v: &str, r: &str, s: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(
            bytes_from_hex(v)?,
            bytes_from_hex(r)?,
            bytes_from_hex(s)?,
        ))
    }

    /// Decomposes a raw concatenated `r ‖ s ‖ v` signature string.
    ///
    /// Accepts 65 bytes (one-byte `v`) or 66 bytes (two-byte `v`, the form
    /// replay-protected values of large chain ids produce).
    pub fn from_raw(raw: &[u8]) -> Result<Self, ValidationError> {
        if raw.len() != 65 && raw.len() != 66 {
            return Err(ValidationError::MalformedHex {
                input: to_hex(raw),
            });
        }
        Ok(Self::new(&raw[64..], &raw[..32], &raw[32..64]))
    }

    /// Decomposes a hex-encoded raw `r ‖ s ‖ v` signature string.
    pub fn from_raw_hex(raw: &str) -> Result<Self, ValidationError> {
        Self::from_raw(&bytes_from_hex(raw)?)
    }

    /// Minimal big-endian `v` bytes.
    pub fn v(&self) -> &[u8] {
        &self.v
    }

    /// Minimal big-endian `r` bytes.
    pub fn r(&self) -> &[u8] {
        &self.r
    }

    /// Minimal big-endian `s` bytes.
    pub fn s(&self) -> &[u8] {
        &self.s
    }

    /// `0x`-prefixed, even-length hex form of `v`.
    pub fn v_hex(&self) -> String {
        to_hex(&self.v)
    }

    /// `0x`-prefixed, even-length hex form of `r`.
    pub fn r_hex(&self) -> String {
        to_hex(&self.r)
    }

    /// `0x`-prefixed, even-length hex form of `s`.
    pub fn s_hex(&self) -> String {
        to_hex(&self.s)
    }

    /// The `[v, r, s]` triple, ready for RLP list embedding.
    pub fn encode(&self) -> [&[u8]; 3] {
        [&self.v, &self.r, &self.s]
    }

    /// `true` for the "not yet signed" sentinel.
    pub fn is_empty(&self) -> bool {
        self.v == [0x01] && self.r.is_empty() && self.s.is_empty()
    }
}

impl Default for SignatureData {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for SignatureData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "SignatureData(empty)")
        } else {
            write!(
                f,
                "SignatureData(v={}, r={}, s={})",
                self.v_hex(),
                self.r_hex(),
                self.s_hex()
            )
        }
    }
}

mod serde_component {
    use crate::types::{bytes_from_hex, to_hex};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        bytes_from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sentinel_shape() {
        let sig = SignatureData::empty();
        assert!(sig.is_empty());
        assert_eq!(sig.v_hex(), "0x01");
        assert_eq!(sig.r_hex(), "0x");
        assert_eq!(sig.s_hex(), "0x");
    }

    #[test]
    fn construction_trims_leading_zeros() {
        let sig = SignatureData::new([0x00, 0x1b], [0x00, 0x00, 0xaa], [0xbb]);
        assert_eq!(sig.v(), &[0x1b]);
        assert_eq!(sig.r(), &[0xaa]);
        assert_eq!(sig.s(), &[0xbb]);
    }

    #[test]
    fn odd_length_hex_pads_in_front() {
        // "0xfea" must read as 0x0fea, not 0xfea0.
        let sig = SignatureData::from_hex("0xfea", "0x1", "0x2").unwrap();
        assert_eq!(sig.v(), &[0x0f, 0xea]);
        assert_eq!(sig.v_hex(), "0x0fea");
    }

    #[test]
    fn raw_65_byte_decomposition() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x11u8; 32]); // r
        raw.extend_from_slice(&[0x22u8; 32]); // s
        raw.push(0x1c); // v
        let sig = SignatureData::from_raw(&raw).unwrap();
        assert_eq!(sig.r(), &[0x11u8; 32][..]);
        assert_eq!(sig.s(), &[0x22u8; 32][..]);
        assert_eq!(sig.v(), &[0x1c]);
    }

    #[test]
    fn raw_66_byte_decomposition() {
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0x11u8; 32]);
        raw.extend_from_slice(&[0x22u8; 32]);
        raw.extend_from_slice(&[0x0f, 0xea]); // two-byte v
        let sig = SignatureData::from_raw(&raw).unwrap();
        assert_eq!(sig.v(), &[0x0f, 0xea]);
    }

    #[test]
    fn raw_rejects_other_lengths() {
        assert!(SignatureData::from_raw(&[0u8; 64]).is_err());
        assert!(SignatureData::from_raw(&[0u8; 67]).is_err());
    }

    #[test]
    fn copy_equality() {
        let a = SignatureData::from_hex("0x0fea", "0xaabb", "0xccdd").unwrap();
        let b = a.clone();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn serde_roundtrip_as_hex_strings() {
        let sig = SignatureData::from_hex("0x0fea", "0xaabb", "0xccdd").unwrap();
        let json = serde_json::to_string(&sig).unwrap();
        assert!(json.contains("\"0x0fea\""));
        let back: SignatureData = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
    }
}
