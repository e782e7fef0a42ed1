//! An in-memory keyring collection, indexed by address.
//!
//! The wallet is bookkeeping, not custody: it holds keyrings the
//! application already has and routes signing requests to the right
//! one. Persistence and encryption at rest are the application's
//! problem.

use std::collections::HashMap;

use crate::error::{KeyringError, TransactionError};
use crate::keyring::Keyring;
use crate::transaction::Transaction;
use crate::types::Address;

/// A set of keyrings, one per address.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    keyrings: HashMap<Address, Keyring>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a keyring under its own address. One keyring per address.
    pub fn add(&mut self, keyring: Keyring) -> Result<Address, KeyringError> {
        let address = keyring.address();
        if self.keyrings.contains_key(&address) {
            return Err(KeyringError::DuplicateAddress {
                address: address.to_hex(),
            });
        }
        self.keyrings.insert(address, keyring);
        Ok(address)
    }

    /// Removes and returns the keyring for `address`, if present.
    pub fn remove(&mut self, address: &Address) -> Option<Keyring> {
        self.keyrings.remove(address)
    }

    pub fn get(&self, address: &Address) -> Option<&Keyring> {
        self.keyrings.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.keyrings.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.keyrings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyrings.is_empty()
    }

    /// Signs `transaction` as the sender with the keyring stored for
    /// `address`.
    pub fn sign(
        &self,
        address: &Address,
        transaction: &mut Transaction,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        let keyring = self.require(address)?;
        transaction.sign(keyring, index)
    }

    /// Signs `transaction` as the fee payer with the keyring stored for
    /// `address`.
    pub fn sign_as_fee_payer(
        &self,
        address: &Address,
        transaction: &mut Transaction,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        let keyring = self.require(address)?;
        transaction.sign_as_fee_payer(keyring, index)
    }

    fn require(&self, address: &Address) -> Result<&Keyring, KeyringError> {
        self.keyrings
            .get(address)
            .ok_or_else(|| KeyringError::UnknownAddress {
                address: address.to_hex(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring;
    use crate::transaction::TxType;

    #[test]
    fn add_get_remove() {
        let mut wallet = Wallet::new();
        let keyring = keyring::generate();
        let address = wallet.add(keyring.clone()).unwrap();
        assert_eq!(wallet.len(), 1);
        assert_eq!(wallet.get(&address), Some(&keyring));

        assert_eq!(
            wallet.add(keyring.clone()),
            Err(KeyringError::DuplicateAddress {
                address: address.to_hex()
            })
        );

        assert_eq!(wallet.remove(&address), Some(keyring));
        assert!(wallet.is_empty());
    }

    #[test]
    fn routes_signing_to_the_stored_keyring() {
        let mut wallet = Wallet::new();
        let keyring = keyring::generate();
        let address = wallet.add(keyring).unwrap();

        let mut tx = Transaction::builder(TxType::ValueTransfer)
            .from(address)
            .to(Address::new([0x02; 20]))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        wallet.sign(&address, &mut tx, None).unwrap();
        assert!(tx.is_signed());
    }

    #[test]
    fn unknown_address_is_an_error() {
        let wallet = Wallet::new();
        let stranger = Address::new([0x09; 20]);
        let mut tx = Transaction::builder(TxType::Cancel)
            .from(stranger)
            .gas(21_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        assert!(matches!(
            wallet.sign(&stranger, &mut tx, None).unwrap_err(),
            TransactionError::Keyring(KeyringError::UnknownAddress { .. })
        ));
    }
}
