//! Multi-party signature combination.
//!
//! Each participant in a multisig or fee-delegated flow signs their own
//! copy of the transaction and ships the raw encoding. Combination
//! folds those copies back into one transaction, verifying first that
//! every copy describes the same transaction body. Validation runs over
//! the whole batch before anything is merged, so a mismatch anywhere
//! leaves the accumulating transaction untouched.

use primitive_types::U256;

use crate::error::TransactionError;
use crate::signature::SignatureData;
use crate::transaction::builder::Transaction;
use crate::transaction::tx_type::TxType;
use crate::types::Address;

impl Transaction {
    /// Merges the signatures of independently signed copies of this
    /// transaction and returns the combined raw encoding.
    ///
    /// Fields only some copies know get adopted: an unset `feePayer`,
    /// `nonce`, or `gasPrice` takes the decoded value, and every copy
    /// must agree on it. Any other difference in the body is a
    /// [`CombineMismatch`](TransactionError::CombineMismatch).
    /// Duplicate signatures are kept once.
    pub fn combine_signed_raw_transactions<S: AsRef<str>>(
        &mut self,
        raw_transactions: &[S],
    ) -> Result<String, TransactionError> {
        if self.tx_type() == TxType::Legacy {
            return Err(TransactionError::Unsupported {
                op: "signature combination",
                tx_type: "Legacy",
            });
        }

        // Adoption candidates, committed only after the whole batch
        // validates.
        let mut nonce: Option<u64> = self.nonce();
        let mut gas_price: Option<U256> = self.gas_price();
        let mut fee_payer: Option<Address> = self.fee_payer();

        let mut incoming: Vec<SignatureData> = Vec::new();
        let mut incoming_fee_payer: Vec<SignatureData> = Vec::new();

        for raw in raw_transactions {
            let other = Transaction::from_raw_transaction(raw.as_ref())?;

            if other.tx_type() != self.tx_type() {
                return Err(TransactionError::CombineMismatch { field: "txType" });
            }
            if other.from() != self.from() {
                return Err(TransactionError::CombineMismatch { field: "from" });
            }
            if other.gas() != self.gas() {
                return Err(TransactionError::CombineMismatch { field: "gas" });
            }
            if other.to() != self.to() {
                return Err(TransactionError::CombineMismatch { field: "to" });
            }
            if other.value() != self.value() {
                return Err(TransactionError::CombineMismatch { field: "value" });
            }
            if other.input() != self.input() {
                return Err(TransactionError::CombineMismatch { field: "input" });
            }
            if other.human_readable() != self.human_readable() {
                return Err(TransactionError::CombineMismatch {
                    field: "humanReadable",
                });
            }
            if other.code_format() != self.code_format() {
                return Err(TransactionError::CombineMismatch { field: "codeFormat" });
            }
            if other.account() != self.account() {
                return Err(TransactionError::CombineMismatch { field: "account" });
            }
            if other.fee_ratio() != self.fee_ratio() {
                return Err(TransactionError::CombineMismatch { field: "feeRatio" });
            }

            match (nonce, other.nonce()) {
                (Some(mine), Some(theirs)) if mine != theirs => {
                    return Err(TransactionError::CombineMismatch { field: "nonce" })
                }
                (None, theirs) => nonce = theirs,
                _ => {}
            }
            match (gas_price, other.gas_price()) {
                (Some(mine), Some(theirs)) if mine != theirs => {
                    return Err(TransactionError::CombineMismatch { field: "gasPrice" })
                }
                (None, theirs) => gas_price = theirs,
                _ => {}
            }
            match (fee_payer, other.fee_payer()) {
                (Some(mine), Some(theirs)) if mine != theirs => {
                    return Err(TransactionError::CombineMismatch { field: "feePayer" })
                }
                (None, theirs) => fee_payer = theirs,
                _ => {}
            }

            incoming.extend(other.signatures().iter().cloned());
            incoming_fee_payer.extend(other.fee_payer_signatures().iter().cloned());
        }

        // Everything validated; commit.
        if let Some(nonce) = nonce {
            self.set_nonce(nonce);
        }
        if let Some(gas_price) = gas_price {
            self.set_gas_price(gas_price);
        }
        if let Some(fee_payer) = fee_payer {
            self.set_fee_payer(fee_payer)?;
        }
        self.append_signatures(dedup_against(self.signatures(), incoming));
        if self.tx_type().is_fee_delegated() {
            let fresh = dedup_against(self.fee_payer_signatures(), incoming_fee_payer);
            if !fresh.is_empty() {
                self.append_fee_payer_signatures(fresh)?;
            }
        }

        self.raw_transaction()
    }
}

/// Keeps the first occurrence of each signature not already attached.
fn dedup_against(existing: &[SignatureData], incoming: Vec<SignatureData>) -> Vec<SignatureData> {
    let mut fresh: Vec<SignatureData> = Vec::with_capacity(incoming.len());
    for sig in incoming {
        if sig.is_empty() || existing.contains(&sig) || fresh.contains(&sig) {
            continue;
        }
        fresh.push(sig);
    }
    fresh
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyring::{self, PrivateKey};

    fn key(seed: u8) -> PrivateKey {
        PrivateKey::from_slice(&[seed; 32]).unwrap()
    }

    fn unsigned(from: Address) -> Transaction {
        Transaction::builder(TxType::FeeDelegatedValueTransfer)
            .from(from)
            .to(Address::new([0x02; 20]))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap()
    }

    #[test]
    fn merges_multisig_signatures_in_input_order() {
        let address = Address::new([0x0a; 20]);
        let alice = keyring::with_single_key(address, key(0x11));
        let bob = keyring::with_single_key(address, key(0x22));

        let mut a = unsigned(address);
        a.sign(&alice, None).unwrap();
        let mut b = unsigned(address);
        b.sign(&bob, None).unwrap();

        let mut combined = unsigned(address);
        let raw = combined
            .combine_signed_raw_transactions(&[
                a.raw_transaction().unwrap(),
                b.raw_transaction().unwrap(),
            ])
            .unwrap();

        assert_eq!(combined.signatures().len(), 2);
        assert_eq!(combined.signatures()[0], a.signatures()[0]);
        assert_eq!(combined.signatures()[1], b.signatures()[0]);
        assert_eq!(raw, combined.raw_transaction().unwrap());
    }

    #[test]
    fn duplicate_signatures_collapse() {
        let address = Address::new([0x0a; 20]);
        let alice = keyring::with_single_key(address, key(0x11));
        let mut a = unsigned(address);
        a.sign(&alice, None).unwrap();
        let raw = a.raw_transaction().unwrap();

        let mut combined = unsigned(address);
        combined
            .combine_signed_raw_transactions(&[raw.clone(), raw])
            .unwrap();
        assert_eq!(combined.signatures().len(), 1);
    }

    #[test]
    fn adopts_fee_payer_from_a_co_signed_copy() {
        let address = Address::new([0x0a; 20]);
        let sender = keyring::with_single_key(address, key(0x11));
        let payer = keyring::generate();

        let mut sender_copy = unsigned(address);
        sender_copy.sign(&sender, None).unwrap();

        let mut payer_copy = unsigned(address);
        payer_copy.sign_as_fee_payer(&payer, None).unwrap();

        let mut combined = unsigned(address);
        combined
            .combine_signed_raw_transactions(&[
                sender_copy.raw_transaction().unwrap(),
                payer_copy.raw_transaction().unwrap(),
            ])
            .unwrap();

        assert_eq!(combined.fee_payer(), Some(payer.address()));
        assert_eq!(combined.signatures().len(), 1);
        assert_eq!(combined.fee_payer_signatures().len(), 1);
    }

    #[test]
    fn body_mismatch_rejects_and_leaves_accumulator_untouched() {
        let address = Address::new([0x0a; 20]);
        let alice = keyring::with_single_key(address, key(0x11));

        let mut good = unsigned(address);
        good.sign(&alice, None).unwrap();

        let mut tampered = Transaction::builder(TxType::FeeDelegatedValueTransfer)
            .from(address)
            .to(Address::new([0x02; 20]))
            .value(2u64) // differs
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        tampered.sign(&alice, None).unwrap();

        let mut combined = unsigned(address);
        let err = combined
            .combine_signed_raw_transactions(&[
                good.raw_transaction().unwrap(),
                tampered.raw_transaction().unwrap(),
            ])
            .unwrap_err();
        assert_eq!(err, TransactionError::CombineMismatch { field: "value" });
        // The good copy's signature must not have leaked in.
        assert!(combined.signatures().is_empty());
        assert_eq!(combined.fee_payer(), None);
    }

    #[test]
    fn conflicting_fee_payers_reject() {
        let address = Address::new([0x0a; 20]);
        let payer_a = keyring::generate();
        let payer_b = keyring::generate();

        let mut a = unsigned(address);
        a.sign_as_fee_payer(&payer_a, None).unwrap();
        let mut b = unsigned(address);
        b.sign_as_fee_payer(&payer_b, None).unwrap();

        let mut combined = unsigned(address);
        let err = combined
            .combine_signed_raw_transactions(&[
                a.raw_transaction().unwrap(),
                b.raw_transaction().unwrap(),
            ])
            .unwrap_err();
        assert_eq!(err, TransactionError::CombineMismatch { field: "feePayer" });
    }

    #[test]
    fn legacy_cannot_combine() {
        let keyring = keyring::generate();
        let mut tx = Transaction::builder(TxType::Legacy)
            .from(keyring.address())
            .to(Address::new([0x02; 20]))
            .value(1u64)
            .gas(21_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        tx.sign(&keyring, None).unwrap();
        let raw = tx.raw_transaction().unwrap();
        assert!(matches!(
            tx.combine_signed_raw_transactions(&[raw]).unwrap_err(),
            TransactionError::Unsupported { .. }
        ));
    }
}
