//! Keyrings: the private-key-side mirror of the account-key model.
//!
//! An account key describes which public keys may authorize what. A
//! keyring holds the matching private keys, bound to the address they
//! sign for. The address is explicit and authoritative: after an
//! account update it no longer derives from any of the keys, so it is
//! carried, never recomputed.
//!
//! Three shapes, mirroring the on-chain model:
//!
//! - [`Keyring::Single`]: one key for everything.
//! - [`Keyring::Multiple`]: several keys, all serving every role.
//! - [`Keyring::RoleBased`]: distinct key lists per role, with the
//!   transaction role as fallback for roles left empty.

pub mod private_key;

pub use private_key::{recover, PrivateKey};

use std::borrow::Cow;

use crate::account::{
    AccountKey, KeyRole, RoleBasedKey, WeightedMultiSigKey, WeightedPublicKey,
};
use crate::error::{KeyModelError, KeyringError};
use crate::signature::SignatureData;
use crate::types::Address;

// ---------------------------------------------------------------------------
// Keyring
// ---------------------------------------------------------------------------

/// A set of private keys bound to one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyring {
    /// One key serving every role.
    Single { address: Address, key: PrivateKey },

    /// Several keys, each serving every role.
    Multiple {
        address: Address,
        keys: Vec<PrivateKey>,
    },

    /// Distinct key lists for the transaction, update, and fee-payer
    /// roles. A role's list may be empty; signing then falls back to
    /// the transaction role's keys.
    RoleBased {
        address: Address,
        keys: [Vec<PrivateKey>; KeyRole::COUNT],
    },
}

impl Keyring {
    /// The address this keyring signs for.
    pub fn address(&self) -> Address {
        match self {
            Keyring::Single { address, .. }
            | Keyring::Multiple { address, .. }
            | Keyring::RoleBased { address, .. } => *address,
        }
    }

    /// The keys that serve `role`.
    ///
    /// For single and multiple keyrings every role maps to the same
    /// keys. For role-based keyrings an empty role falls back to the
    /// transaction role; if that is empty too, the role is unusable.
    pub fn keys_for_role(&self, role: KeyRole) -> Result<&[PrivateKey], KeyringError> {
        match self {
            Keyring::Single { key, .. } => Ok(std::slice::from_ref(key)),
            Keyring::Multiple { keys, .. } => Ok(keys),
            Keyring::RoleBased { keys, .. } => {
                let selected = &keys[role.index()];
                if !selected.is_empty() {
                    return Ok(selected);
                }
                let fallback = &keys[KeyRole::Transaction.index()];
                if !fallback.is_empty() {
                    Ok(fallback)
                } else {
                    Err(KeyringError::EmptyRole { role })
                }
            }
        }
    }

    /// Signs `hash` with the keys serving `role`.
    ///
    /// With `index: None` every key of the role signs and all
    /// signatures are returned in key order. With `Some(i)` only the
    /// i-th key signs.
    pub fn sign(
        &self,
        hash: &[u8; 32],
        chain_id: u64,
        role: KeyRole,
        index: Option<usize>,
    ) -> Result<Vec<SignatureData>, KeyringError> {
        let keys = self.keys_for_role(role)?;
        match index {
            None => keys.iter().map(|key| key.sign(hash, chain_id)).collect(),
            Some(i) => {
                let key = keys.get(i).ok_or(KeyringError::IndexOutOfRange {
                    index: i,
                    len: keys.len(),
                })?;
                Ok(vec![key.sign(hash, chain_id)?])
            }
        }
    }

    /// Derives the account key this keyring's public keys would install
    /// on chain via an account update.
    ///
    /// - Single keyrings become [`AccountKey::Public`].
    /// - Multiple keyrings become a weighted multisig; `options`
    ///   supplies threshold and weights, defaulting to threshold 1 and
    ///   weight 1 each.
    /// - Role-based keyrings become a role-based key. Each non-empty
    ///   role becomes a public or multisig key; empty roles are left
    ///   absent (no fallback is materialized on chain).
    pub fn to_account(
        &self,
        options: Option<&MultiSigOptions>,
    ) -> Result<AccountKey, KeyModelError> {
        match self {
            Keyring::Single { key, .. } => Ok(AccountKey::Public(key.public_key())),
            Keyring::Multiple { keys, .. } => {
                Ok(AccountKey::WeightedMultiSig(multisig_from_keys(keys, options)?))
            }
            Keyring::RoleBased { keys, .. } => {
                let mut roles: [Option<AccountKey>; KeyRole::COUNT] = [None, None, None];
                for role in KeyRole::all() {
                    let role_keys = &keys[role.index()];
                    roles[role.index()] = match role_keys.len() {
                        0 => None,
                        1 => Some(AccountKey::Public(role_keys[0].public_key())),
                        _ => Some(AccountKey::WeightedMultiSig(multisig_from_keys(
                            role_keys, options,
                        )?)),
                    };
                }
                let [transaction, update, fee_payer] = roles;
                Ok(AccountKey::RoleBased(RoleBasedKey::new(
                    transaction,
                    update,
                    fee_payer,
                )?))
            }
        }
    }
}

/// Threshold and per-key weights for [`Keyring::to_account`] on
/// multi-key keyrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigOptions {
    pub threshold: u32,
    pub weights: Vec<u32>,
}

fn multisig_from_keys(
    keys: &[PrivateKey],
    options: Option<&MultiSigOptions>,
) -> Result<WeightedMultiSigKey, KeyModelError> {
    let (threshold, weights): (u32, Cow<'_, [u32]>) = match options {
        Some(opts) => (opts.threshold, Cow::Borrowed(&opts.weights)),
        None => (1, Cow::Owned(vec![1; keys.len()])),
    };
    if weights.len() != keys.len() {
        return Err(KeyModelError::WeightCountMismatch {
            weights: weights.len(),
            keys: keys.len(),
        });
    }
    let weighted = keys
        .iter()
        .zip(weights.iter())
        .map(|(key, &weight)| WeightedPublicKey {
            weight,
            key: key.public_key(),
        })
        .collect();
    WeightedMultiSigKey::new(threshold, weighted)
}

// ---------------------------------------------------------------------------
// Factories
// ---------------------------------------------------------------------------

/// Generates a fresh single keyring with a random key.
pub fn generate() -> Keyring {
    let key = PrivateKey::generate();
    Keyring::Single {
        address: key.address(),
        key,
    }
}

/// Builds a single keyring from a hex private key; the address derives
/// from the key.
pub fn from_private_key(private_key: &str) -> Result<Keyring, KeyringError> {
    let key = PrivateKey::from_hex(private_key)?;
    Ok(Keyring::Single {
        address: key.address(),
        key,
    })
}

/// Builds a single keyring from a wallet-key string:
/// `0x<64-hex private key>0x00<0x-prefixed address>`.
///
/// The embedded address is taken as-is, which is the whole point of the
/// format: it carries decoupled key/address pairs that exist after an
/// account update.
pub fn from_wallet_key(wallet_key: &str) -> Result<Keyring, KeyringError> {
    // 0x + 64 key chars + "0x00" + 0x + 40 address chars.
    if wallet_key.len() != 112 || !wallet_key.starts_with("0x") {
        return Err(KeyringError::MalformedWalletKey);
    }
    let key_part = &wallet_key[..66];
    if &wallet_key[66..70] != "0x00" {
        return Err(KeyringError::MalformedWalletKey);
    }
    let address_part = &wallet_key[70..];
    let key = PrivateKey::from_hex(key_part)?;
    let address =
        Address::from_hex(address_part).map_err(|_| KeyringError::MalformedWalletKey)?;
    Ok(Keyring::Single { address, key })
}

/// Builds a single keyring with an explicit, possibly decoupled address.
pub fn with_single_key(address: Address, key: PrivateKey) -> Keyring {
    Keyring::Single { address, key }
}

/// Builds a multiple keyring. At least one key is required.
pub fn with_keys(address: Address, keys: Vec<PrivateKey>) -> Result<Keyring, KeyringError> {
    if keys.is_empty() {
        return Err(KeyringError::NoKeys);
    }
    Ok(Keyring::Multiple { address, keys })
}

/// Builds a role-based keyring from per-role key lists. At least one
/// role must be non-empty.
pub fn with_role_keys(
    address: Address,
    keys: [Vec<PrivateKey>; KeyRole::COUNT],
) -> Result<Keyring, KeyringError> {
    if keys.iter().all(|role| role.is_empty()) {
        return Err(KeyringError::NoKeys);
    }
    Ok(Keyring::RoleBased { address, keys })
}

// ---------------------------------------------------------------------------
// AsKeyring
// ---------------------------------------------------------------------------

/// Anything the signing API accepts as a keyring: a [`Keyring`] itself,
/// a hex private key string, or a wallet-key string.
pub trait AsKeyring {
    fn resolve_keyring(&self) -> Result<Cow<'_, Keyring>, KeyringError>;
}

impl AsKeyring for Keyring {
    fn resolve_keyring(&self) -> Result<Cow<'_, Keyring>, KeyringError> {
        Ok(Cow::Borrowed(self))
    }
}

impl AsKeyring for str {
    fn resolve_keyring(&self) -> Result<Cow<'_, Keyring>, KeyringError> {
        // A bare private key is at most 66 chars with its 0x prefix;
        // anything longer must be a wallet key.
        let keyring = if self.len() > 66 {
            from_wallet_key(self)?
        } else {
            from_private_key(self)?
        };
        Ok(Cow::Owned(keyring))
    }
}

impl AsKeyring for String {
    fn resolve_keyring(&self) -> Result<Cow<'_, Keyring>, KeyringError> {
        self.as_str().resolve_keyring()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
