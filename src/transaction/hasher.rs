//! Transaction hashing: every hash in the protocol is a Keccak-256 over
//! one of the three canonical encodings.
//!
//! - [`hash_for_signature`]: what the sender's keys sign.
//! - [`hash_for_fee_payer_signature`]: what the fee payer's keys sign.
//! - [`transaction_hash`]: identifies the submitted transaction.
//! - [`sender_tx_hash`]: identifies the sender's part alone, stable
//!   across fee-payer co-signing.
//!
//! [`hash_for_signature`]: Transaction::hash_for_signature
//! [`hash_for_fee_payer_signature`]: Transaction::hash_for_fee_payer_signature
//! [`transaction_hash`]: Transaction::transaction_hash
//! [`sender_tx_hash`]: Transaction::sender_tx_hash

use crate::error::TransactionError;
use crate::transaction::builder::Transaction;
use crate::types::keccak256;

impl Transaction {
    /// The 32-byte digest the sender signs.
    pub fn hash_for_signature(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.encoding_for_signature()?))
    }

    /// The 32-byte digest the fee payer signs.
    pub fn hash_for_fee_payer_signature(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.encoding_for_fee_payer_signature()?))
    }

    /// The hash of the final wire encoding.
    pub fn transaction_hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.rlp_encoding()?))
    }

    /// The hash of the sender's part, independent of any fee-payer
    /// signatures attached later.
    pub fn sender_tx_hash(&self) -> Result<[u8; 32], TransactionError> {
        Ok(keccak256(&self.sender_encoding()?))
    }
}
