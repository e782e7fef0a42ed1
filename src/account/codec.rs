//! Byte-exact wire embedding of account keys.
//!
//! An account key travels as a one-byte tag followed by a tag-specific
//! payload, and the whole thing embeds in a transaction body as a single
//! RLP byte string:
//!
//! ```text
//! Legacy            0x01 ‖ 0xc0
//! Public            0x02 ‖ RLP(compressed pubkey)
//! Disabled          0x03 ‖ 0xc0
//! WeightedMultiSig  0x04 ‖ RLP([threshold, [[weight, pubkey], …]])
//! RoleBased         0x05 ‖ RLP([key₀, key₁, key₂])   (each keyᵢ embedded
//!                   as a byte string; trailing absent roles omitted,
//!                   interior absences encoded as the nil string 0x80)
//! ```
//!
//! Inside each multisig entry the weight comes BEFORE the public key.
//! That ordering is load-bearing; the vector tests below pin it.

use rlp::{DecoderError, Rlp, RlpStream};

use super::{AccountKey, RoleBasedKey, WeightedMultiSigKey, WeightedPublicKey};
use crate::types::PublicKey;

const TAG_LEGACY: u8 = 0x01;
const TAG_PUBLIC: u8 = 0x02;
const TAG_DISABLED: u8 = 0x03;
const TAG_WEIGHTED_MULTISIG: u8 = 0x04;
const TAG_ROLE_BASED: u8 = 0x05;

/// The RLP empty string, standing for an absent role inside a role-based
/// key. Not a valid account key on its own.
const NIL: u8 = 0x80;

/// Encodes an account key into its tagged wire form.
pub fn encode(key: &AccountKey) -> Vec<u8> {
    match key {
        AccountKey::Legacy => vec![TAG_LEGACY, 0xc0],
        AccountKey::Disabled => vec![TAG_DISABLED, 0xc0],
        AccountKey::Public(public) => {
            let mut stream = RlpStream::new();
            stream.append(&public.as_bytes().to_vec());
            tagged(TAG_PUBLIC, &stream.out())
        }
        AccountKey::WeightedMultiSig(multi) => {
            let mut stream = RlpStream::new_list(2);
            stream.append(&multi.threshold());
            stream.begin_list(multi.keys().len());
            for entry in multi.keys() {
                stream.begin_list(2);
                stream.append(&entry.weight);
                stream.append(&entry.key.as_bytes().to_vec());
            }
            tagged(TAG_WEIGHTED_MULTISIG, &stream.out())
        }
        AccountKey::RoleBased(roles) => {
            let len = roles.wire_len();
            let mut stream = RlpStream::new_list(len);
            for role in super::KeyRole::all().into_iter().take(len) {
                match roles.role(role) {
                    Some(sub) => {
                        stream.append(&encode(sub));
                    }
                    None => {
                        stream.append_empty_data();
                    }
                }
            }
            tagged(TAG_ROLE_BASED, &stream.out())
        }
    }
}

fn tagged(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(tag);
    out.extend_from_slice(payload);
    out
}

/// Decodes a tagged account-key byte string. The exact inverse of
/// [`encode`]; any unknown tag or shape mismatch is rejected.
pub fn decode(bytes: &[u8]) -> Result<AccountKey, DecoderError> {
    let (&tag, payload) = bytes
        .split_first()
        .ok_or(DecoderError::Custom("empty account key"))?;
    match tag {
        TAG_LEGACY => expect_empty_list(payload).map(|_| AccountKey::Legacy),
        TAG_DISABLED => expect_empty_list(payload).map(|_| AccountKey::Disabled),
        TAG_PUBLIC => {
            let rlp = Rlp::new(payload);
            let raw: Vec<u8> = rlp.as_val()?;
            let key = PublicKey::from_slice(&raw)
                .map_err(|_| DecoderError::Custom("invalid public key in account key"))?;
            Ok(AccountKey::Public(key))
        }
        TAG_WEIGHTED_MULTISIG => {
            let rlp = Rlp::new(payload);
            if rlp.item_count()? != 2 {
                return Err(DecoderError::Custom("weighted multisig expects 2 items"));
            }
            let threshold: u32 = rlp.val_at(0)?;
            let mut keys = Vec::new();
            for entry in rlp.at(1)?.iter() {
                if entry.item_count()? != 2 {
                    return Err(DecoderError::Custom("multisig entry expects [weight, key]"));
                }
                let weight: u32 = entry.val_at(0)?;
                let raw: Vec<u8> = entry.val_at(1)?;
                let key = PublicKey::from_slice(&raw)
                    .map_err(|_| DecoderError::Custom("invalid public key in multisig entry"))?;
                keys.push(WeightedPublicKey::new(weight, key));
            }
            let multi = WeightedMultiSigKey::new(threshold, keys)
                .map_err(|_| DecoderError::Custom("invalid weighted multisig key"))?;
            Ok(AccountKey::WeightedMultiSig(multi))
        }
        TAG_ROLE_BASED => {
            let rlp = Rlp::new(payload);
            let count = rlp.item_count()?;
            if count == 0 || count > 3 {
                return Err(DecoderError::Custom("role-based key expects 1..=3 roles"));
            }
            let mut roles: [Option<AccountKey>; 3] = [None, None, None];
            for (i, slot) in roles.iter_mut().enumerate().take(count) {
                let item = rlp.at(i)?;
                if item.is_data() && item.is_empty() {
                    continue; // nil: this role is absent
                }
                *slot = Some(decode(item.data()?)?);
            }
            let [transaction, update, fee_payer] = roles;
            let role_based = RoleBasedKey::new(transaction, update, fee_payer)
                .map_err(|_| DecoderError::Custom("invalid role-based key"))?;
            Ok(AccountKey::RoleBased(role_based))
        }
        NIL if payload.is_empty() => Err(DecoderError::Custom(
            "nil is only valid inside a role-based key",
        )),
        _ => Err(DecoderError::Custom("unknown account key tag")),
    }
}

fn expect_empty_list(payload: &[u8]) -> Result<(), DecoderError> {
    if payload == [0xc0] {
        Ok(())
    } else {
        Err(DecoderError::Custom("expected empty list payload"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
