//! Error taxonomy for the transaction protocol.
//!
//! Every error here reflects a caller-supplied invariant violation, not a
//! transient condition -- there is no retryable class in this crate.
//! Retries belong to whatever RPC layer sits in front of the
//! [`ChainDataProvider`](crate::provider::ChainDataProvider). All errors
//! are raised synchronously at the point of detection and abort the call
//! with no partial state mutation.

use thiserror::Error;

use crate::account::KeyRole;

/// Field-level construction and input validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field this transaction type requires was not provided.
    #[error("{tx_type} requires the `{field}` field")]
    MissingField {
        tx_type: &'static str,
        field: &'static str,
    },

    /// A field was provided that is not legal for this transaction type.
    #[error("`{field}` is not a valid field for {tx_type}")]
    ForbiddenField {
        tx_type: &'static str,
        field: &'static str,
    },

    /// Input is not a well-formed 20-byte hex address.
    #[error("malformed address: {input}")]
    MalformedAddress { input: String },

    /// Input is not a valid compressed or uncompressed secp256k1 point.
    #[error("malformed public key: {input}")]
    MalformedPublicKey { input: String },

    /// Input is not decodable hex.
    #[error("malformed hex string: {input}")]
    MalformedHex { input: String },

    /// Fee ratio outside the inclusive `[1, 99]` range.
    #[error("fee ratio must be in 1..=99, got {value}")]
    FeeRatioOutOfRange { value: u64 },
}

/// Violations of the account-key model's structural invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyModelError {
    /// A role-based key with every role absent authorizes nothing.
    #[error("role-based key defines no roles")]
    EmptyRoles,

    /// Role-based keys are one level deep by definition.
    #[error("role-based keys cannot nest another role-based key")]
    NestedRoleBased,

    /// A weighted multisig key with no entries.
    #[error("weighted multisig requires at least one key")]
    NoKeys,

    /// More keys than the chain accepts in one multisig key.
    #[error("weighted multisig supports at most {max} keys, got {got}")]
    TooManyKeys { max: usize, got: usize },

    /// Every weight must be a positive integer.
    #[error("key weights must be positive")]
    ZeroWeight,

    /// The number of supplied weights does not match the number of keys.
    #[error("{weights} weight(s) supplied for {keys} key(s)")]
    WeightCountMismatch { weights: usize, keys: usize },

    /// The threshold must be a positive integer.
    #[error("multisig threshold must be positive")]
    ZeroThreshold,

    /// No combination of keys can ever reach the threshold.
    #[error("unsatisfiable threshold: weights sum to {weight_sum}, threshold is {threshold}")]
    UnsatisfiableThreshold { weight_sum: u64, threshold: u32 },

    /// The requested role is absent and this context defines no fallback.
    #[error("account key defines no {role} role")]
    RoleUnavailable { role: KeyRole },

    /// Legacy and disabled keys hold no key material to return.
    #[error("this account key holds no key material")]
    NoKeyMaterial,
}

/// Failures of the keyring (private key) layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyringError {
    /// Input is not a valid 32-byte secp256k1 secret scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// Input does not follow the `0x<key>0x00 0x<address>` wallet-key layout.
    #[error("malformed wallet key string")]
    MalformedWalletKey,

    /// A keyring needs at least one key.
    #[error("keyring requires at least one key")]
    NoKeys,

    /// An explicit signing index past the end of the selected role's keys.
    #[error("signing index {index} out of range for a role with {len} key(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The selected role (and its fallback) holds no keys.
    #[error("no keys configured for the {role} role")]
    EmptyRole { role: KeyRole },

    /// The ECDSA backend rejected the operation.
    #[error("signing failed: {0}")]
    Signing(String),

    /// A signature did not resolve to a public key under recovery.
    #[error("public key recovery failed: {0}")]
    Recovery(String),

    /// The wallet already holds a keyring for this address.
    #[error("a keyring for {address} already exists in the wallet")]
    DuplicateAddress { address: String },

    /// The wallet holds no keyring for this address.
    #[error("no keyring for {address} in the wallet")]
    UnknownAddress { address: String },
}

/// Failures reported by an external chain-data provider.
///
/// Opaque by design: transport details belong to the RPC layer, and the
/// core only needs to know the fill step did not complete.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("chain data provider error: {0}")]
pub struct ProviderError(pub String);

/// Top-level error for transaction operations.
///
/// Aggregates the per-concern enums above and adds the failures that only
/// exist at the transaction level: address reconciliation, undefined
/// fields at hash/encode time, wire decoding, and combination mismatches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    KeyModel(#[from] KeyModelError),

    #[error(transparent)]
    Keyring(#[from] KeyringError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The signing keyring's address does not match the transaction's
    /// `from` (sender path) or `feePayer` (fee-payer path). Never
    /// silently corrected.
    #[error("{role} address mismatch: keyring is {keyring}, transaction expects {expected}")]
    AddressMismatch {
        role: &'static str,
        keyring: String,
        expected: String,
    },

    /// Hashing or encoding was attempted while a required field is still
    /// unset. Fill the transaction first.
    #[error("`{field}` is undefined; fill the transaction before hashing or encoding")]
    UndefinedField { field: &'static str },

    /// A decoded raw transaction's body differs from the accumulating
    /// transaction. No partial merge occurs.
    #[error("cannot combine: `{field}` differs from the accumulated transaction")]
    CombineMismatch { field: &'static str },

    /// The leading byte names no known transaction type.
    #[error("unknown transaction type tag {tag:#04x}")]
    UnknownTypeTag { tag: u8 },

    /// The RLP payload does not match any known shape.
    #[error("malformed transaction encoding: {0}")]
    Decode(#[from] rlp::DecoderError),

    /// The operation is defined only for other transaction types
    /// (e.g. fee-payer signing on a non-fee-delegated type).
    #[error("{op} is not supported by {tx_type}")]
    Unsupported {
        op: &'static str,
        tx_type: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        let err = ValidationError::MissingField {
            tx_type: "ValueTransfer",
            field: "to",
        };
        assert_eq!(err.to_string(), "ValueTransfer requires the `to` field");

        let err = TransactionError::UndefinedField { field: "nonce" };
        assert!(err.to_string().contains("`nonce`"));
    }

    #[test]
    fn taxonomy_converts_into_top_level() {
        fn takes_tx_error(e: impl Into<TransactionError>) -> TransactionError {
            e.into()
        }
        let e = takes_tx_error(ValidationError::FeeRatioOutOfRange { value: 100 });
        assert!(matches!(e, TransactionError::Validation(_)));

        let e = takes_tx_error(KeyModelError::EmptyRoles);
        assert!(matches!(e, TransactionError::KeyModel(_)));

        let e = takes_tx_error(KeyringError::InvalidPrivateKey);
        assert!(matches!(e, TransactionError::Keyring(_)));
    }

    #[test]
    fn threshold_error_carries_both_sides() {
        let err = KeyModelError::UnsatisfiableThreshold {
            weight_sum: 3,
            threshold: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('5'));
    }
}
