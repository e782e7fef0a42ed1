//! The signing protocol: role selection, address reconciliation, and
//! signature attachment for both signing parties.
//!
//! Signing is synchronous and offline. The async [`fill`] step fetches
//! chain-derived fields first; [`fill_and_sign`] composes the two for
//! the common case.
//!
//! Every signing call is atomic: the transaction is only mutated once
//! every fallible step has succeeded.
//!
//! [`fill`]: Transaction::fill
//! [`fill_and_sign`]: Transaction::fill_and_sign

use tracing::debug;

use crate::account::KeyRole;
use crate::error::TransactionError;
use crate::keyring::AsKeyring;
use crate::provider::ChainDataProvider;
use crate::transaction::builder::Transaction;

impl Transaction {
    /// Signs as the sender with every key the keyring holds for the
    /// relevant role, or with a single key when `index` is given.
    ///
    /// Account updates select the keyring's update role; everything
    /// else selects the transaction role. A zero `from` adopts the
    /// keyring's address; a non-matching one is an error, never
    /// silently rewritten.
    pub fn sign<K: AsKeyring + ?Sized>(
        &mut self,
        keyring: &K,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        self.sign_with_hasher(keyring, index, Transaction::hash_for_signature)
    }

    /// [`sign`](Self::sign) with a caller-supplied hash function, for
    /// flows that sign a transformed digest (hardware signers, test
    /// vectors with fixed hashes).
    pub fn sign_with_hasher<K, H>(
        &mut self,
        keyring: &K,
        index: Option<usize>,
        hasher: H,
    ) -> Result<(), TransactionError>
    where
        K: AsKeyring + ?Sized,
        H: Fn(&Transaction) -> Result<[u8; 32], TransactionError>,
    {
        let keyring = keyring.resolve_keyring()?;
        let chain_id = self
            .chain_id()
            .ok_or(TransactionError::UndefinedField { field: "chainId" })?;

        let from = if self.from().is_zero() {
            keyring.address()
        } else if self.from() == keyring.address() {
            self.from()
        } else {
            return Err(TransactionError::AddressMismatch {
                role: "sender",
                keyring: keyring.address().to_hex(),
                expected: self.from().to_hex(),
            });
        };

        let role = if self.tx_type().is_account_update() {
            KeyRole::Update
        } else {
            KeyRole::Transaction
        };

        // Hash against the adopted sender without touching self yet.
        let mut candidate = self.clone();
        candidate.set_from(from);
        let hash = hasher(&candidate)?;
        let signatures = keyring.sign(&hash, chain_id, role, index)?;

        self.set_from(from);
        let count = signatures.len();
        self.append_signatures(signatures);
        debug!(
            tx_type = %self.tx_type(),
            from = %from,
            role = %role,
            signatures = count,
            "signed as sender"
        );
        Ok(())
    }

    /// Signs as the fee payer with the keyring's fee-payer role keys.
    ///
    /// Only fee-delegated types accept this. An unset `feePayer`
    /// adopts the keyring's address; a non-matching one is an error.
    pub fn sign_as_fee_payer<K: AsKeyring + ?Sized>(
        &mut self,
        keyring: &K,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        self.sign_as_fee_payer_with_hasher(
            keyring,
            index,
            Transaction::hash_for_fee_payer_signature,
        )
    }

    /// [`sign_as_fee_payer`](Self::sign_as_fee_payer) with a
    /// caller-supplied hash function.
    pub fn sign_as_fee_payer_with_hasher<K, H>(
        &mut self,
        keyring: &K,
        index: Option<usize>,
        hasher: H,
    ) -> Result<(), TransactionError>
    where
        K: AsKeyring + ?Sized,
        H: Fn(&Transaction) -> Result<[u8; 32], TransactionError>,
    {
        if !self.tx_type().is_fee_delegated() {
            return Err(TransactionError::Unsupported {
                op: "fee-payer signing",
                tx_type: self.tx_type().name(),
            });
        }
        let keyring = keyring.resolve_keyring()?;
        let chain_id = self
            .chain_id()
            .ok_or(TransactionError::UndefinedField { field: "chainId" })?;

        let fee_payer = match self.fee_payer() {
            None => keyring.address(),
            Some(existing) if existing == keyring.address() => existing,
            Some(existing) => {
                return Err(TransactionError::AddressMismatch {
                    role: "fee payer",
                    keyring: keyring.address().to_hex(),
                    expected: existing.to_hex(),
                })
            }
        };

        let mut candidate = self.clone();
        candidate.set_fee_payer(fee_payer)?;
        let hash = hasher(&candidate)?;
        let signatures = keyring.sign(&hash, chain_id, KeyRole::FeePayer, index)?;

        self.set_fee_payer(fee_payer)?;
        let count = signatures.len();
        self.append_fee_payer_signatures(signatures)?;
        debug!(
            tx_type = %self.tx_type(),
            fee_payer = %fee_payer,
            signatures = count,
            "signed as fee payer"
        );
        Ok(())
    }

    /// Fetches chain-derived fields that are still unset. Fields the
    /// caller already provided are left alone.
    pub async fn fill(&mut self, provider: &dyn ChainDataProvider) -> Result<(), TransactionError> {
        if self.chain_id().is_none() {
            let chain_id = provider.chain_id().await?;
            self.set_chain_id(chain_id);
        }
        if self.gas_price().is_none() {
            let gas_price = provider.gas_price().await?;
            self.set_gas_price(gas_price);
        }
        if self.nonce().is_none() {
            let from = self.from();
            let nonce = provider.transaction_count(&from).await?;
            self.set_nonce(nonce);
        }
        Ok(())
    }

    /// [`fill`](Self::fill) then [`sign`](Self::sign).
    pub async fn fill_and_sign<K: AsKeyring + ?Sized>(
        &mut self,
        provider: &dyn ChainDataProvider,
        keyring: &K,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        self.fill(provider).await?;
        self.sign(keyring, index)
    }

    /// [`fill`](Self::fill) then
    /// [`sign_as_fee_payer`](Self::sign_as_fee_payer).
    pub async fn fill_and_sign_as_fee_payer<K: AsKeyring + ?Sized>(
        &mut self,
        provider: &dyn ChainDataProvider,
        keyring: &K,
        index: Option<usize>,
    ) -> Result<(), TransactionError> {
        self.fill(provider).await?;
        self.sign_as_fee_payer(keyring, index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
