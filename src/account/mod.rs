//! # Account Key Model
//!
//! What key material authorizes an on-chain account. An account's address
//! and its keys are decoupled on this chain: the account key registered
//! on-chain decides which signatures the node accepts, independent of the
//! address the account happens to sit at.
//!
//! The model is a tagged union ([`AccountKey`]) with exhaustive matching
//! everywhere it is consumed -- there is no structural duck typing to get
//! wrong. Invariants (positive weights, satisfiable thresholds, no nested
//! role-based keys) are enforced at construction; a value that exists is
//! valid.

pub mod codec;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::KeyModelError;
use crate::types::PublicKey;

/// The chain accepts at most this many keys in one weighted multisig key.
pub const MAX_WEIGHTED_KEYS: usize = 10;

// ---------------------------------------------------------------------------
// KeyRole
// ---------------------------------------------------------------------------

/// Which key set a signature is produced with.
///
/// Role-based accounts hold independent keys per role; every other account
/// shape serves all three roles with the same keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRole {
    /// General transaction signing.
    Transaction = 0,
    /// Authorizes account-key changes.
    Update = 1,
    /// Authorizes fee-payer co-signing.
    FeePayer = 2,
}

impl KeyRole {
    /// Number of roles.
    pub const COUNT: usize = 3;

    /// All roles, in wire order.
    pub fn all() -> [KeyRole; 3] {
        [KeyRole::Transaction, KeyRole::Update, KeyRole::FeePayer]
    }

    /// Index into per-role arrays, matching the wire order.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transaction => write!(f, "transaction"),
            Self::Update => write!(f, "update"),
            Self::FeePayer => write!(f, "fee-payer"),
        }
    }
}

// ---------------------------------------------------------------------------
// WeightedMultiSigKey
// ---------------------------------------------------------------------------

/// One `(weight, public key)` entry of a weighted multisig key.
///
/// The wire encodes weight before public key inside each entry; the field
/// order here matches so nobody has to remember to swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPublicKey {
    pub weight: u32,
    pub key: PublicKey,
}

impl WeightedPublicKey {
    pub fn new(weight: u32, key: PublicKey) -> Self {
        Self { weight, key }
    }
}

/// A threshold key: signatures are accepted once the weights of the
/// signing keys sum to at least `threshold`.
///
/// Construction fails for any configuration that could never be satisfied,
/// so satisfiability never needs re-checking at signing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedMultiSigKey {
    threshold: u32,
    keys: Vec<WeightedPublicKey>,
}

impl WeightedMultiSigKey {
    /// Validates and builds a weighted multisig key.
    ///
    /// Rules: at least one key, at most [`MAX_WEIGHTED_KEYS`], every weight
    /// positive, `threshold` positive, and `sum(weights) >= threshold`.
    pub fn new(threshold: u32, keys: Vec<WeightedPublicKey>) -> Result<Self, KeyModelError> {
        if keys.is_empty() {
            return Err(KeyModelError::NoKeys);
        }
        if keys.len() > MAX_WEIGHTED_KEYS {
            return Err(KeyModelError::TooManyKeys {
                max: MAX_WEIGHTED_KEYS,
                got: keys.len(),
            });
        }
        if threshold == 0 {
            return Err(KeyModelError::ZeroThreshold);
        }
        if keys.iter().any(|k| k.weight == 0) {
            return Err(KeyModelError::ZeroWeight);
        }
        let weight_sum: u64 = keys.iter().map(|k| u64::from(k.weight)).sum();
        if weight_sum < u64::from(threshold) {
            return Err(KeyModelError::UnsatisfiableThreshold {
                weight_sum,
                threshold,
            });
        }
        Ok(Self { threshold, keys })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// The ordered `(weight, key)` entries.
    pub fn keys(&self) -> &[WeightedPublicKey] {
        &self.keys
    }

    pub fn weight_sum(&self) -> u64 {
        self.keys.iter().map(|k| u64::from(k.weight)).sum()
    }
}

// ---------------------------------------------------------------------------
// RoleBasedKey
// ---------------------------------------------------------------------------

/// Per-role key assignment. Each role is independently optional; an absent
/// role means "this role cannot sign" (no fallback at the account level,
/// except for the documented default-key lookup).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBasedKey {
    roles: [Option<Box<AccountKey>>; 3],
}

impl RoleBasedKey {
    /// Validates and builds a role-based key.
    ///
    /// At least one role must be present, and no role may itself be
    /// role-based -- the model is one level deep by definition.
    pub fn new(
        transaction: Option<AccountKey>,
        update: Option<AccountKey>,
        fee_payer: Option<AccountKey>,
    ) -> Result<Self, KeyModelError> {
        let roles = [transaction, update, fee_payer];
        if roles.iter().all(Option::is_none) {
            return Err(KeyModelError::EmptyRoles);
        }
        if roles
            .iter()
            .flatten()
            .any(|k| matches!(k, AccountKey::RoleBased(_)))
        {
            return Err(KeyModelError::NestedRoleBased);
        }
        Ok(Self {
            roles: roles.map(|r| r.map(Box::new)),
        })
    }

    /// The key assigned to `role`, if any.
    pub fn role(&self, role: KeyRole) -> Option<&AccountKey> {
        self.roles[role.index()].as_deref()
    }

    /// Partial merge: every role present in `patch` overwrites the
    /// corresponding role here; absent roles are left untouched.
    ///
    /// This is deliberately non-total -- pass only the roles you intend to
    /// change. A patch cannot remove a role, only replace it.
    pub fn merge(&mut self, patch: RoleBasedKey) {
        for (slot, incoming) in self.roles.iter_mut().zip(patch.roles) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }
    }

    /// Highest present role index plus one -- the number of wire slots the
    /// codec emits (trailing absent roles are omitted).
    pub(crate) fn wire_len(&self) -> usize {
        self.roles
            .iter()
            .rposition(Option::is_some)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// AccountKey
// ---------------------------------------------------------------------------

/// What authorizes an account, as registered on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKey {
    /// The account's key is derived from its address by the legacy rule.
    Legacy,
    /// No key is valid -- every transaction signature must fail. Used to
    /// permanently disable an account.
    Disabled,
    /// A single public key.
    Public(PublicKey),
    /// A weighted threshold key.
    WeightedMultiSig(WeightedMultiSigKey),
    /// Independent keys per role.
    RoleBased(RoleBasedKey),
}

impl AccountKey {
    /// `true` for the shapes that actually carry key material; `false` for
    /// `Legacy` and `Disabled`, which are rules rather than keys.
    pub fn has_key_material(&self) -> bool {
        matches!(
            self,
            AccountKey::Public(_) | AccountKey::WeightedMultiSig(_) | AccountKey::RoleBased(_)
        )
    }

    /// The representative public key.
    ///
    /// `Public` returns its key; a multisig returns its first configured
    /// key; a role-based key returns its transaction role's default key,
    /// falling back to the update role then the fee-payer role. `Legacy`
    /// and `Disabled` hold no key material.
    pub fn default_key(&self) -> Result<&PublicKey, KeyModelError> {
        match self {
            AccountKey::Public(key) => Ok(key),
            AccountKey::WeightedMultiSig(multi) => Ok(&multi.keys()[0].key),
            AccountKey::RoleBased(roles) => KeyRole::all()
                .iter()
                .find_map(|role| roles.role(*role))
                .ok_or(KeyModelError::EmptyRoles)?
                .default_key(),
            AccountKey::Legacy | AccountKey::Disabled => Err(KeyModelError::NoKeyMaterial),
        }
    }

    /// Every stored public key, in wire order. Shape is flattened; use
    /// [`AccountKey::role_key`] when the role structure matters.
    pub fn keys(&self) -> Vec<&PublicKey> {
        match self {
            AccountKey::Public(key) => vec![key],
            AccountKey::WeightedMultiSig(multi) => {
                multi.keys().iter().map(|entry| &entry.key).collect()
            }
            AccountKey::RoleBased(roles) => KeyRole::all()
                .iter()
                .filter_map(|role| roles.role(*role))
                .flat_map(|key| key.keys())
                .collect(),
            AccountKey::Legacy | AccountKey::Disabled => Vec::new(),
        }
    }

    /// The key that authorizes `role`.
    ///
    /// Flat shapes (`Public`, `WeightedMultiSig`) serve every role with
    /// themselves. A role-based key returns exactly the requested role --
    /// an absent update or fee-payer role means that role cannot sign,
    /// and there is no fallback.
    pub fn role_key(&self, role: KeyRole) -> Result<&AccountKey, KeyModelError> {
        match self {
            AccountKey::Public(_) | AccountKey::WeightedMultiSig(_) => Ok(self),
            AccountKey::RoleBased(roles) => roles
                .role(role)
                .ok_or(KeyModelError::RoleUnavailable { role }),
            AccountKey::Legacy | AccountKey::Disabled => Err(KeyModelError::NoKeyMaterial),
        }
    }

    /// Replaces this key with `new_key`.
    ///
    /// When both sides are role-based this is the partial merge of
    /// [`RoleBasedKey::merge`]: only roles present in `new_key` are
    /// overwritten. Every other combination is a wholesale replacement.
    pub fn update(&mut self, new_key: AccountKey) {
        match (self, new_key) {
            (AccountKey::RoleBased(current), AccountKey::RoleBased(patch)) => {
                current.merge(patch);
            }
            (slot, other) => *slot = other,
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Legacy => write!(f, "Legacy"),
            AccountKey::Disabled => write!(f, "Disabled"),
            AccountKey::Public(_) => write!(f, "Public"),
            AccountKey::WeightedMultiSig(multi) => write!(
                f,
                "WeightedMultiSig({} keys, threshold {})",
                multi.keys().len(),
                multi.threshold()
            ),
            AccountKey::RoleBased(roles) => {
                let present: Vec<String> = KeyRole::all()
                    .iter()
                    .filter(|r| roles.role(**r).is_some())
                    .map(|r| r.to_string())
                    .collect();
                write!(f, "RoleBased({})", present.join(", "))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
