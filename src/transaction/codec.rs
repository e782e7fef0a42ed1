//! Canonical RLP encoding and decoding of transactions.
//!
//! Three encodings exist per transaction and they are not interchangeable:
//!
//! - the **signing encoding**, `RLP([type ‖ RLP(body), chainId, 0, 0])`,
//!   which the sender signs (the fee payer's variant inserts its address
//!   before the chain id);
//! - the **sender encoding**, the final form with all fee-payer material
//!   omitted, which the sender transaction hash is taken over;
//! - the **final encoding**, `type ‖ RLP([body..., sigs, feePayer?,
//!   feePayerSigs?])`, the raw transaction submitted to the network.
//!
//! Legacy transactions are the untyped exception: no tag, a flat nine
//! item list, and exactly one signature spliced into the body.

use primitive_types::U256;
use rlp::{DecoderError, Rlp, RlpStream};

use crate::account::codec as account_codec;
use crate::error::{TransactionError, ValidationError};
use crate::signature::SignatureData;
use crate::transaction::builder::Transaction;
use crate::transaction::tx_type::{CodeFormat, TxGroup, TxType};
use crate::types::{bytes_from_hex, to_hex, Address};

impl Transaction {
    // -- encoding ----------------------------------------------------------

    /// The final wire encoding: the byte string submitted to the network.
    pub fn rlp_encoding(&self) -> Result<Vec<u8>, TransactionError> {
        match self.tx_type().tag() {
            None => self.legacy_final_encoding(),
            Some(tag) => {
                let mut stream = RlpStream::new();
                stream.begin_unbounded_list();
                self.append_body(&mut stream)?;
                append_signature_list(&mut stream, self.signatures());
                if self.tx_type().is_fee_delegated() {
                    let fee_payer = self.fee_payer().unwrap_or(Address::ZERO);
                    stream.append(&fee_payer.as_bytes().to_vec());
                    append_signature_list(&mut stream, self.fee_payer_signatures());
                }
                stream.finalize_unbounded_list();
                Ok(tag_prefixed(tag, &stream.out()))
            }
        }
    }

    /// The final encoding as a `0x`-prefixed hex string.
    pub fn raw_transaction(&self) -> Result<String, TransactionError> {
        Ok(to_hex(&self.rlp_encoding()?))
    }

    /// The final form stripped of fee-payer material. The sender
    /// transaction hash is taken over this; for non-fee-delegated types
    /// it coincides with [`rlp_encoding`](Self::rlp_encoding).
    pub fn sender_encoding(&self) -> Result<Vec<u8>, TransactionError> {
        match self.tx_type().tag() {
            None => self.legacy_final_encoding(),
            Some(tag) => {
                let mut stream = RlpStream::new();
                stream.begin_unbounded_list();
                self.append_body(&mut stream)?;
                append_signature_list(&mut stream, self.signatures());
                stream.finalize_unbounded_list();
                Ok(tag_prefixed(tag, &stream.out()))
            }
        }
    }

    /// The bytes the sender's keys sign over (pre-hash).
    pub(crate) fn encoding_for_signature(&self) -> Result<Vec<u8>, TransactionError> {
        let chain_id = self
            .chain_id()
            .ok_or(TransactionError::UndefinedField { field: "chainId" })?;
        match self.tx_type().tag() {
            None => {
                // Flat replay-protected form: body fields then
                // (chainId, 0, 0) in place of the signature.
                let mut stream = RlpStream::new_list(9);
                self.append_legacy_body(&mut stream)?;
                stream.append(&chain_id);
                stream.append(&0u8);
                stream.append(&0u8);
                Ok(stream.out().to_vec())
            }
            Some(tag) => {
                let mut body = RlpStream::new();
                body.begin_unbounded_list();
                self.append_body(&mut body)?;
                body.finalize_unbounded_list();
                let tagged = tag_prefixed(tag, &body.out());

                let mut stream = RlpStream::new_list(4);
                stream.append(&tagged);
                stream.append(&chain_id);
                stream.append(&0u8);
                stream.append(&0u8);
                Ok(stream.out().to_vec())
            }
        }
    }

    /// The bytes the fee payer's keys sign over (pre-hash). The fee
    /// payer's address participates, binding the signature to it.
    pub(crate) fn encoding_for_fee_payer_signature(&self) -> Result<Vec<u8>, TransactionError> {
        if !self.tx_type().is_fee_delegated() {
            return Err(TransactionError::Unsupported {
                op: "fee-payer signing",
                tx_type: self.tx_type().name(),
            });
        }
        let tag = self.tx_type().tag().ok_or(TransactionError::Unsupported {
            op: "fee-payer signing",
            tx_type: self.tx_type().name(),
        })?;
        let chain_id = self
            .chain_id()
            .ok_or(TransactionError::UndefinedField { field: "chainId" })?;
        let fee_payer = self
            .fee_payer()
            .ok_or(TransactionError::UndefinedField { field: "feePayer" })?;

        let mut body = RlpStream::new();
        body.begin_unbounded_list();
        self.append_body(&mut body)?;
        body.finalize_unbounded_list();
        let tagged = tag_prefixed(tag, &body.out());

        let mut stream = RlpStream::new_list(5);
        stream.append(&tagged);
        stream.append(&fee_payer.as_bytes().to_vec());
        stream.append(&chain_id);
        stream.append(&0u8);
        stream.append(&0u8);
        Ok(stream.out().to_vec())
    }

    fn legacy_final_encoding(&self) -> Result<Vec<u8>, TransactionError> {
        let real: Vec<&SignatureData> =
            self.signatures().iter().filter(|s| !s.is_empty()).collect();
        let signature = match real.as_slice() {
            [] => {
                return Err(TransactionError::UndefinedField {
                    field: "signatures",
                })
            }
            [single] => *single,
            _ => {
                return Err(TransactionError::Unsupported {
                    op: "multiple signatures",
                    tx_type: "Legacy",
                })
            }
        };
        let mut stream = RlpStream::new_list(9);
        self.append_legacy_body(&mut stream)?;
        stream.append(&signature.v().to_vec());
        stream.append(&signature.r().to_vec());
        stream.append(&signature.s().to_vec());
        Ok(stream.out().to_vec())
    }

    /// Appends the six legacy body fields: nonce, gasPrice, gas, to,
    /// value, input. Absent `to` (contract creation), `value`, and
    /// `input` take their empty wire forms.
    fn append_legacy_body(&self, stream: &mut RlpStream) -> Result<(), TransactionError> {
        let nonce = self
            .nonce()
            .ok_or(TransactionError::UndefinedField { field: "nonce" })?;
        let gas_price = self
            .gas_price()
            .ok_or(TransactionError::UndefinedField { field: "gasPrice" })?;
        stream.append(&nonce);
        stream.append(&gas_price);
        stream.append(&self.gas());
        match self.to() {
            Some(to) => stream.append(&to.as_bytes().to_vec()),
            None => stream.append_empty_data(),
        };
        stream.append(&self.value().unwrap_or_else(U256::zero));
        stream.append(&self.input().unwrap_or_default().to_vec());
        Ok(())
    }

    /// Appends the typed body fields for this type's group, in canonical
    /// order, into an already open list.
    fn append_body(&self, stream: &mut RlpStream) -> Result<(), TransactionError> {
        let nonce = self
            .nonce()
            .ok_or(TransactionError::UndefinedField { field: "nonce" })?;
        let gas_price = self
            .gas_price()
            .ok_or(TransactionError::UndefinedField { field: "gasPrice" })?;
        stream.append(&nonce);
        stream.append(&gas_price);
        stream.append(&self.gas());

        let from = self.from().as_bytes().to_vec();
        match self.tx_type().group() {
            TxGroup::Legacy => {
                return Err(TransactionError::Unsupported {
                    op: "typed body encoding",
                    tx_type: "Legacy",
                })
            }
            TxGroup::ValueTransfer => {
                stream.append(&self.required_to()?.as_bytes().to_vec());
                stream.append(&self.required_value()?);
                stream.append(&from);
            }
            TxGroup::ValueTransferMemo | TxGroup::SmartContractExecution => {
                stream.append(&self.required_to()?.as_bytes().to_vec());
                stream.append(&self.required_value()?);
                stream.append(&from);
                stream.append(&self.required_input()?.to_vec());
            }
            TxGroup::AccountUpdate => {
                let account = self
                    .account()
                    .ok_or(TransactionError::UndefinedField { field: "account" })?;
                stream.append(&from);
                stream.append(&account_codec::encode(account));
            }
            TxGroup::SmartContractDeploy => {
                stream.append_empty_data(); // deploys never target an address
                stream.append(&self.required_value()?);
                stream.append(&from);
                stream.append(&self.required_input()?.to_vec());
                stream.append(&self.human_readable().unwrap_or(false));
                stream.append(&self.code_format().unwrap_or_default().as_u8());
            }
            TxGroup::Cancel => {
                stream.append(&from);
            }
            TxGroup::ChainDataAnchoring => {
                stream.append(&from);
                stream.append(&self.required_input()?.to_vec());
            }
        }

        if self.tx_type().has_fee_ratio() {
            let ratio = self
                .fee_ratio()
                .ok_or(TransactionError::UndefinedField { field: "feeRatio" })?;
            stream.append(&ratio);
        }
        Ok(())
    }

    fn required_to(&self) -> Result<Address, TransactionError> {
        self.to()
            .ok_or(TransactionError::UndefinedField { field: "to" })
    }

    fn required_value(&self) -> Result<U256, TransactionError> {
        self.value()
            .ok_or(TransactionError::UndefinedField { field: "value" })
    }

    fn required_input(&self) -> Result<&[u8], TransactionError> {
        self.input()
            .ok_or(TransactionError::UndefinedField { field: "input" })
    }

    // -- decoding ----------------------------------------------------------

    /// Decodes a `0x`-prefixed hex raw transaction.
    pub fn from_raw_transaction(raw: &str) -> Result<Self, TransactionError> {
        let bytes = bytes_from_hex(raw)?;
        Self::from_rlp_encoding(&bytes)
    }

    /// Decodes the final wire encoding produced by
    /// [`rlp_encoding`](Self::rlp_encoding).
    pub fn from_rlp_encoding(bytes: &[u8]) -> Result<Self, TransactionError> {
        let first = *bytes
            .first()
            .ok_or(DecoderError::Custom("empty transaction encoding"))?;
        // An untyped transaction starts with its RLP list prefix; any
        // typed one starts with a tag well below the list range.
        if first >= 0xc0 {
            return decode_legacy(bytes);
        }
        let ty = TxType::from_tag(first).ok_or(TransactionError::UnknownTypeTag { tag: first })?;
        decode_typed(ty, &bytes[1..])
    }
}

fn tag_prefixed(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(1 + payload.len());
    bytes.push(tag);
    bytes.extend_from_slice(payload);
    bytes
}

/// Appends `[[v, r, s], ...]`. An all-empty list goes out as the single
/// sentinel triple so the wire shape never shows a zero-length list.
fn append_signature_list(stream: &mut RlpStream, signatures: &[SignatureData]) {
    let real: Vec<&SignatureData> = signatures.iter().filter(|s| !s.is_empty()).collect();
    let sentinel = SignatureData::empty();
    let out: Vec<&SignatureData> = if real.is_empty() { vec![&sentinel] } else { real };
    stream.begin_list(out.len());
    for sig in out {
        stream.begin_list(3);
        stream.append(&sig.v().to_vec());
        stream.append(&sig.r().to_vec());
        stream.append(&sig.s().to_vec());
    }
}

/// The number of body items (signatures excluded) for a typed
/// transaction, fee ratio included where the type carries one.
fn body_item_count(ty: TxType) -> usize {
    let base = match ty.group() {
        TxGroup::Legacy => 6,
        TxGroup::ValueTransfer => 6,
        TxGroup::ValueTransferMemo | TxGroup::SmartContractExecution => 7,
        TxGroup::AccountUpdate => 5,
        TxGroup::SmartContractDeploy => 9,
        TxGroup::Cancel => 4,
        TxGroup::ChainDataAnchoring => 5,
    };
    base + usize::from(ty.has_fee_ratio())
}

fn decode_typed(ty: TxType, payload: &[u8]) -> Result<Transaction, TransactionError> {
    let rlp = Rlp::new(payload);
    let body_len = body_item_count(ty);
    let expected = body_len + 1 + if ty.is_fee_delegated() { 2 } else { 0 };
    if rlp.item_count()? != expected {
        return Err(DecoderError::RlpIncorrectListLen.into());
    }

    let nonce: u64 = rlp.val_at(0)?;
    let gas_price: U256 = rlp.val_at(1)?;
    let gas: u64 = rlp.val_at(2)?;

    let mut to = None;
    let mut value = None;
    let mut input = None;
    let mut human_readable = None;
    let mut code_format = None;
    let mut account = None;
    let from;

    match ty.group() {
        TxGroup::Legacy => return Err(DecoderError::Custom("legacy type cannot carry a tag").into()),
        TxGroup::ValueTransfer => {
            to = Some(address_at(&rlp, 3)?);
            value = Some(rlp.val_at(4)?);
            from = address_at(&rlp, 5)?;
        }
        TxGroup::ValueTransferMemo | TxGroup::SmartContractExecution => {
            to = Some(address_at(&rlp, 3)?);
            value = Some(rlp.val_at(4)?);
            from = address_at(&rlp, 5)?;
            input = Some(rlp.val_at::<Vec<u8>>(6)?);
        }
        TxGroup::AccountUpdate => {
            from = address_at(&rlp, 3)?;
            let key_bytes: Vec<u8> = rlp.val_at(4)?;
            account = Some(account_codec::decode(&key_bytes)?);
        }
        TxGroup::SmartContractDeploy => {
            if !rlp.at(3)?.is_empty() {
                return Err(DecoderError::Custom("deploy must not carry a target address").into());
            }
            value = Some(rlp.val_at(4)?);
            from = address_at(&rlp, 5)?;
            input = Some(rlp.val_at::<Vec<u8>>(6)?);
            human_readable = Some(rlp.val_at::<bool>(7)?);
            code_format = Some(match rlp.val_at::<u8>(8)? {
                0x00 => CodeFormat::Evm,
                _ => return Err(DecoderError::Custom("unknown code format").into()),
            });
        }
        TxGroup::Cancel => {
            from = address_at(&rlp, 3)?;
        }
        TxGroup::ChainDataAnchoring => {
            from = address_at(&rlp, 3)?;
            input = Some(rlp.val_at::<Vec<u8>>(4)?);
        }
    }

    let fee_ratio = if ty.has_fee_ratio() {
        let ratio = rlp.val_at::<u8>(body_len - 1)?;
        // The decoder enforces the same range the builder does; an
        // out-of-range ratio on the wire is not a valid transaction.
        if !(1..=99).contains(&ratio) {
            return Err(ValidationError::FeeRatioOutOfRange {
                value: ratio as u64,
            }
            .into());
        }
        Some(ratio)
    } else {
        None
    };

    let signatures = decode_signature_list(&rlp.at(body_len)?)?;

    let (fee_payer, fee_payer_signatures) = if ty.is_fee_delegated() {
        let fee_payer = address_at(&rlp, body_len + 1)?;
        let sigs = decode_signature_list(&rlp.at(body_len + 2)?)?;
        // An unset fee payer travels as the zero address.
        let fee_payer = if fee_payer.is_zero() { None } else { Some(fee_payer) };
        (fee_payer, sigs)
    } else {
        (None, Vec::new())
    };

    Ok(Transaction {
        tx_type: ty,
        from,
        nonce: Some(nonce),
        gas,
        gas_price: Some(gas_price),
        chain_id: None,
        to,
        value,
        input,
        human_readable,
        code_format,
        account,
        fee_ratio,
        fee_payer,
        signatures,
        fee_payer_signatures,
    })
}

fn decode_legacy(bytes: &[u8]) -> Result<Transaction, TransactionError> {
    let rlp = Rlp::new(bytes);
    if rlp.item_count()? != 9 {
        return Err(DecoderError::RlpIncorrectListLen.into());
    }
    let nonce: u64 = rlp.val_at(0)?;
    let gas_price: U256 = rlp.val_at(1)?;
    let gas: u64 = rlp.val_at(2)?;
    let to_item = rlp.at(3)?;
    let to = if to_item.is_empty() {
        None
    } else {
        Some(address_at(&rlp, 3)?)
    };
    let value: U256 = rlp.val_at(4)?;
    let input: Vec<u8> = rlp.val_at(5)?;

    let v: Vec<u8> = rlp.val_at(6)?;
    let r: Vec<u8> = rlp.val_at(7)?;
    let s: Vec<u8> = rlp.val_at(8)?;
    let signature = SignatureData::new(v, r, s);

    // The replay-protected v pins the chain id; bare 27/28 values
    // predate replay protection and pin nothing.
    let chain_id = crate::types::u64_from_bytes(signature.v())
        .filter(|&v| v >= 35)
        .map(|v| (v - 35) / 2);

    Ok(Transaction {
        tx_type: TxType::Legacy,
        // The sender is not on the wire; it is recoverable from the
        // signature, and signing adopts the keyring's address.
        from: Address::ZERO,
        nonce: Some(nonce),
        gas,
        gas_price: Some(gas_price),
        chain_id,
        to,
        value: Some(value),
        input: Some(input),
        human_readable: None,
        code_format: None,
        account: None,
        fee_ratio: None,
        fee_payer: None,
        signatures: vec![signature],
        fee_payer_signatures: Vec::new(),
    })
}

fn address_at(rlp: &Rlp<'_>, index: usize) -> Result<Address, TransactionError> {
    let bytes: Vec<u8> = rlp.val_at(index)?;
    Address::from_slice(&bytes)
        .ok_or_else(|| DecoderError::Custom("address must be 20 bytes").into())
}

fn decode_signature_list(rlp: &Rlp<'_>) -> Result<Vec<SignatureData>, TransactionError> {
    let mut signatures = Vec::with_capacity(rlp.item_count()?);
    for item in rlp.iter() {
        if item.item_count()? != 3 {
            return Err(DecoderError::Custom("signature must be a (v, r, s) triple").into());
        }
        let v: Vec<u8> = item.val_at(0)?;
        let r: Vec<u8> = item.val_at(1)?;
        let s: Vec<u8> = item.val_at(2)?;
        signatures.push(SignatureData::new(v, r, s));
    }
    // The lone sentinel triple means "unsigned"; surface that as no
    // signatures at all.
    if signatures.len() == 1 && signatures[0].is_empty() {
        signatures.clear();
    }
    Ok(signatures)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountKey;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn sig(v: &str, fill: u8) -> SignatureData {
        SignatureData::new(
            bytes_from_hex(v).unwrap(),
            [fill; 32],
            [fill.wrapping_add(1); 32],
        )
    }

    #[test]
    fn account_update_matches_reference_bytes() {
        let from = Address::from_hex("0xdca786ce39b074966e8a9eae16eac90783974d80").unwrap();
        let mut tx = Transaction::builder(TxType::AccountUpdate)
            .from(from)
            .nonce(0)
            .gas_price(0x5d21dba00u64)
            .gas(0x30d40)
            .account(AccountKey::Legacy)
            .build()
            .unwrap();
        tx.append_signature(SignatureData::new([0x0f, 0xea], [0xaa; 32], [0xbb; 32]));

        let expected = format!(
            "0x20f86c808505d21dba0083030d4094dca786ce39b074966e8a9eae16eac90783974d808201c0f847f845820feaa0{}a0{}",
            "aa".repeat(32),
            "bb".repeat(32),
        );
        assert_eq!(tx.raw_transaction().unwrap(), expected);
    }

    #[test]
    fn unsigned_typed_encoding_carries_the_sentinel_triple() {
        let tx = Transaction::builder(TxType::ValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        let encoded = tx.rlp_encoding().unwrap();
        // [[v=0x01, r=0x, s=0x]] on the wire.
        let sentinel = [0xc4, 0xc3, 0x01, 0x80, 0x80];
        assert!(encoded
            .windows(sentinel.len())
            .any(|window| window == sentinel));

        let back = Transaction::from_rlp_encoding(&encoded).unwrap();
        assert!(back.signatures().is_empty());
    }

    #[test]
    fn value_transfer_roundtrip() {
        let mut tx = Transaction::builder(TxType::ValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(0xde0b6b3a7640000u64) // 1e18
            .gas(25_000)
            .nonce(1234)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let back = Transaction::from_raw_transaction(&tx.raw_transaction().unwrap()).unwrap();
        assert_eq!(back.tx_type(), TxType::ValueTransfer);
        assert_eq!(back.from(), tx.from());
        assert_eq!(back.to(), tx.to());
        assert_eq!(back.value(), tx.value());
        assert_eq!(back.nonce(), tx.nonce());
        assert_eq!(back.signatures(), tx.signatures());
    }

    #[test]
    fn fee_delegated_roundtrip_with_fee_payer() {
        let mut tx = Transaction::builder(TxType::FeeDelegatedValueTransferMemo)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(7u64)
            .input(b"memo".to_vec())
            .gas(50_000)
            .nonce(3)
            .gas_price(25_000_000_000u64)
            .fee_payer(addr(0x0f))
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));
        tx.append_fee_payer_signatures([sig("0x0fe9", 0x22)]).unwrap();

        let back = Transaction::from_raw_transaction(&tx.raw_transaction().unwrap()).unwrap();
        assert_eq!(back.fee_payer(), Some(addr(0x0f)));
        assert_eq!(back.fee_payer_signatures(), tx.fee_payer_signatures());
        assert_eq!(back.input(), Some(&b"memo"[..]));
    }

    #[test]
    fn unset_fee_payer_travels_as_zero_and_decodes_to_none() {
        let mut tx = Transaction::builder(TxType::FeeDelegatedCancel)
            .from(addr(0x01))
            .gas(21_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let encoded = tx.rlp_encoding().unwrap();
        let back = Transaction::from_rlp_encoding(&encoded).unwrap();
        assert_eq!(back.fee_payer(), None);
        assert!(back.fee_payer_signatures().is_empty());
    }

    #[test]
    fn ratio_type_roundtrips_its_ratio() {
        let mut tx = Transaction::builder(TxType::FeeDelegatedValueTransferWithRatio)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .fee_ratio(30)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let back = Transaction::from_rlp_encoding(&tx.rlp_encoding().unwrap()).unwrap();
        assert_eq!(back.tx_type(), TxType::FeeDelegatedValueTransferWithRatio);
        assert_eq!(back.fee_ratio(), Some(30));
    }

    #[test]
    fn out_of_range_wire_fee_ratio_is_rejected() {
        let mut tx = Transaction::builder(TxType::FeeDelegatedValueTransferWithRatio)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .fee_ratio(30)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));
        let encoded = tx.rlp_encoding().unwrap();

        // Ratio 30 travels as the single byte 0x1e; splice it in place.
        let positions: Vec<usize> = encoded
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == 0x1e)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 1, "ambiguous splice point");
        let at = positions[0];

        // 0x80 is the canonical wire form of zero.
        let mut zero_ratio = encoded.clone();
        zero_ratio[at] = 0x80;
        assert!(matches!(
            Transaction::from_rlp_encoding(&zero_ratio).unwrap_err(),
            TransactionError::Validation(ValidationError::FeeRatioOutOfRange { value: 0 })
        ));

        let mut over_ratio = encoded.clone();
        over_ratio[at] = 0x64; // 100
        assert!(matches!(
            Transaction::from_rlp_encoding(&over_ratio).unwrap_err(),
            TransactionError::Validation(ValidationError::FeeRatioOutOfRange { value: 100 })
        ));

        // The untouched encoding still decodes.
        assert_eq!(
            Transaction::from_rlp_encoding(&encoded).unwrap().fee_ratio(),
            Some(30)
        );
    }

    #[test]
    fn deploy_roundtrip_keeps_aux_fields() {
        let mut tx = Transaction::builder(TxType::SmartContractDeploy)
            .from(addr(0x01))
            .input(vec![0x60, 0x80, 0x60, 0x40])
            .gas(1_000_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let back = Transaction::from_rlp_encoding(&tx.rlp_encoding().unwrap()).unwrap();
        assert_eq!(back.to(), None);
        assert_eq!(back.human_readable(), Some(false));
        assert_eq!(back.code_format(), Some(CodeFormat::Evm));
        assert_eq!(back.value(), Some(U256::zero()));
    }

    #[test]
    fn account_update_roundtrips_its_key() {
        let mut tx = Transaction::builder(TxType::AccountUpdate)
            .from(addr(0x01))
            .account(AccountKey::Disabled)
            .gas(50_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let back = Transaction::from_rlp_encoding(&tx.rlp_encoding().unwrap()).unwrap();
        assert_eq!(back.account(), Some(&AccountKey::Disabled));
    }

    #[test]
    fn chain_data_anchoring_roundtrip() {
        let mut tx = Transaction::builder(TxType::ChainDataAnchoring)
            .from(addr(0x01))
            .input(vec![0x01, 0x02, 0x03])
            .gas(100_000)
            .nonce(77)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));

        let back = Transaction::from_rlp_encoding(&tx.rlp_encoding().unwrap()).unwrap();
        assert_eq!(back.tx_type(), TxType::ChainDataAnchoring);
        assert_eq!(back.input(), Some(&[0x01, 0x02, 0x03][..]));
    }

    #[test]
    fn legacy_roundtrip_derives_chain_id_from_v() {
        let mut tx = Transaction::builder(TxType::Legacy)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(21_000)
            .nonce(5)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        // v = 1001 * 2 + 35 = 2037 = 0x07f5
        tx.append_signature(SignatureData::new([0x07, 0xf5], [0x11; 32], [0x22; 32]));

        let back = Transaction::from_rlp_encoding(&tx.rlp_encoding().unwrap()).unwrap();
        assert_eq!(back.tx_type(), TxType::Legacy);
        assert_eq!(back.chain_id(), Some(1001));
        assert_eq!(back.from(), Address::ZERO);
        assert_eq!(back.to(), tx.to());
        assert_eq!(back.signatures(), tx.signatures());
    }

    #[test]
    fn legacy_refuses_to_encode_unsigned() {
        let tx = Transaction::builder(TxType::Legacy)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(21_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        assert!(matches!(
            tx.rlp_encoding().unwrap_err(),
            TransactionError::UndefinedField { field: "signatures" }
        ));
    }

    #[test]
    fn signing_encoding_wraps_tagged_body() {
        let tx = Transaction::builder(TxType::ValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        let encoded = tx.encoding_for_signature().unwrap();
        let rlp = Rlp::new(&encoded);
        assert_eq!(rlp.item_count().unwrap(), 4);
        let tagged: Vec<u8> = rlp.val_at(0).unwrap();
        assert_eq!(tagged[0], 0x08);
        assert_eq!(rlp.val_at::<u64>(1).unwrap(), 1001);
        assert_eq!(rlp.val_at::<u8>(2).unwrap(), 0);
        assert_eq!(rlp.val_at::<u8>(3).unwrap(), 0);
    }

    #[test]
    fn fee_payer_signing_encoding_includes_the_fee_payer() {
        let tx = Transaction::builder(TxType::FeeDelegatedValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .fee_payer(addr(0x0f))
            .build()
            .unwrap();
        let encoded = tx.encoding_for_fee_payer_signature().unwrap();
        let rlp = Rlp::new(&encoded);
        assert_eq!(rlp.item_count().unwrap(), 5);
        let fee_payer: Vec<u8> = rlp.val_at(1).unwrap();
        assert_eq!(fee_payer, addr(0x0f).as_bytes());
    }

    #[test]
    fn sender_encoding_strips_fee_payer_material() {
        let mut tx = Transaction::builder(TxType::FeeDelegatedValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .fee_payer(addr(0x0f))
            .build()
            .unwrap();
        tx.append_signature(sig("0x0fea", 0x11));
        tx.append_fee_payer_signatures([sig("0x0fe9", 0x22)]).unwrap();

        let sender = tx.sender_encoding().unwrap();
        let full = tx.rlp_encoding().unwrap();
        assert_ne!(sender, full);
        assert!(sender.len() < full.len());

        // For a non-fee-delegated type the two encodings coincide.
        let mut plain = Transaction::builder(TxType::ValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .nonce(0)
            .gas_price(25_000_000_000u64)
            .build()
            .unwrap();
        plain.append_signature(sig("0x0fea", 0x11));
        assert_eq!(plain.sender_encoding().unwrap(), plain.rlp_encoding().unwrap());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(
            Transaction::from_rlp_encoding(&[0x4b, 0xc0]).unwrap_err(),
            TransactionError::UnknownTypeTag { tag: 0x4b }
        ));
    }

    #[test]
    fn wrong_item_count_is_rejected() {
        // A ValueTransfer payload with one item too few.
        let mut stream = RlpStream::new_list(6);
        for _ in 0..6 {
            stream.append_empty_data();
        }
        let mut bytes = vec![0x08];
        bytes.extend_from_slice(&stream.out());
        assert!(Transaction::from_rlp_encoding(&bytes).is_err());
    }

    #[test]
    fn encoding_without_nonce_demands_a_fill() {
        let tx = Transaction::builder(TxType::ValueTransfer)
            .from(addr(0x01))
            .to(addr(0x02))
            .value(1u64)
            .gas(25_000)
            .gas_price(25_000_000_000u64)
            .chain_id(1001)
            .build()
            .unwrap();
        assert!(matches!(
            tx.encoding_for_signature().unwrap_err(),
            TransactionError::UndefinedField { field: "nonce" }
        ));
    }
}
