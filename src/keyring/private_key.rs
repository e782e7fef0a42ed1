//! The secp256k1 private key wrapper: generation, parsing, address
//! derivation, and recoverable ECDSA signing.
//!
//! ## Security considerations
//!
//! - Key generation uses the OS CSPRNG (`OsRng`). If your OS RNG is
//!   broken, you have bigger problems than this library.
//! - Key bytes are never logged and never appear in `Debug` output.
//!   If you add logging to this module, you will be asked to leave.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, SecretKey, SECP256K1};
use std::fmt;

use crate::error::KeyringError;
use crate::signature::SignatureData;
use crate::types::{bytes_from_hex, u64_from_bytes, u64_to_bytes, Address, PublicKey};

/// A single secp256k1 signing key.
///
/// This is the atomic unit of signing authority. Whoever holds it can
/// produce signatures for any role the matching account key grants it.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(SecretKey);

impl PrivateKey {
    /// Generates a fresh key from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self(SecretKey::new(&mut OsRng))
    }

    /// Parses a 32-byte hex private key, `0x` optional.
    pub fn from_hex(input: &str) -> Result<Self, KeyringError> {
        let bytes = bytes_from_hex(input).map_err(|_| KeyringError::InvalidPrivateKey)?;
        Self::from_slice(&bytes)
    }

    /// Wraps raw 32-byte secret scalar material.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyringError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyringError::InvalidPrivateKey)?;
        Ok(Self(secret))
    }

    /// The matching public key, compressed.
    pub fn public_key(&self) -> PublicKey {
        secp256k1::PublicKey::from_secret_key(SECP256K1, &self.0).into()
    }

    /// The address this key derives under the legacy rule:
    /// `keccak256(uncompressed pubkey)[12..]`.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Exports the raw secret as `0x`-prefixed hex. Handle with care.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.secret_bytes()))
    }

    /// Signs a 32-byte message hash, producing a replay-protected
    /// signature: `v = chain_id * 2 + 35 + recovery_id`.
    pub fn sign(&self, hash: &[u8; 32], chain_id: u64) -> Result<SignatureData, KeyringError> {
        let message = Message::from_digest_slice(hash)
            .map_err(|e| KeyringError::Signing(e.to_string()))?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.0);
        let (recovery_id, compact) = signature.serialize_compact();
        let v = chain_id * 2 + 35 + recovery_id.to_i32() as u64;
        Ok(SignatureData::new(
            u64_to_bytes(v),
            &compact[..32],
            &compact[32..],
        ))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        write!(f, "PrivateKey(address={})", self.address())
    }
}

/// Recovers the public key that produced `signature` over `hash`.
///
/// The recovery id is unpacked from the replay-protected `v`
/// (`chain_id * 2 + 35 + id`); bare 27/28 values are accepted too.
pub fn recover(
    hash: &[u8; 32],
    signature: &SignatureData,
    chain_id: u64,
) -> Result<PublicKey, KeyringError> {
    let v = u64_from_bytes(signature.v())
        .ok_or_else(|| KeyringError::Recovery("v does not fit in 64 bits".into()))?;
    let replay_base = chain_id * 2 + 35;
    let id = if v >= replay_base {
        v - replay_base
    } else if v >= 27 {
        v - 27
    } else {
        v
    };
    let recovery_id = RecoveryId::from_i32(id as i32)
        .map_err(|e| KeyringError::Recovery(e.to_string()))?;

    let mut compact = [0u8; 64];
    let r = signature.r();
    let s = signature.s();
    if r.len() > 32 || s.len() > 32 {
        return Err(KeyringError::Recovery("r/s longer than 32 bytes".into()));
    }
    compact[32 - r.len()..32].copy_from_slice(r);
    compact[64 - s.len()..].copy_from_slice(s);

    let recoverable = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| KeyringError::Recovery(e.to_string()))?;
    let message = Message::from_digest_slice(hash)
        .map_err(|e| KeyringError::Recovery(e.to_string()))?;
    let recovered = SECP256K1
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| KeyringError::Recovery(e.to_string()))?;
    Ok(recovered.into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
