// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Kestrel Protocol — Transaction Library
//!
//! Client-side machinery for the Kestrel network's typed transactions:
//! build them, encode them canonically, sign them with the right role,
//! and merge signatures from parties who have never met.
//!
//! Kestrel decouples an account's address from its keys. An address is
//! a stable identifier; the keys behind it can be rotated, split into
//! weighted multisigs, or partitioned by role (sending, key rotation,
//! fee payment) without the address changing. This library models that
//! honestly: addresses are carried, never re-derived behind your back,
//! and a keyring that does not match the transaction is an error, not
//! a silent correction.
//!
//! ## Architecture
//!
//! - **types** — Addresses, public keys, hex and Keccak plumbing.
//! - **signature** — The `(v, r, s)` wire triple, replay protection included.
//! - **account** — The on-chain key model: public, multisig, role-based.
//! - **keyring** — The private-key side: signing, recovery, wallet keys.
//! - **transaction** — Build, encode, hash, sign, combine. The main event.
//! - **wallet** — An address-indexed keyring collection.
//! - **provider** — The seam to whatever RPC client you already have.
//!
//! ## Design Philosophy
//!
//! 1. The canonical encoding is the protocol. Bytes first, opinions second.
//! 2. Signing never guesses: wrong address, wrong role, wrong type — error.
//! 3. Secrets never appear in logs or `Debug` output.
//! 4. If it produces bytes another machine verifies, it has tests. Plural.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kestrel_protocol::keyring;
//! use kestrel_protocol::transaction::{Transaction, TxType};
//! use kestrel_protocol::types::Address;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sender = keyring::generate();
//! let mut tx = Transaction::builder(TxType::ValueTransfer)
//!     .from(sender.address())
//!     .to(Address::from_hex("0xdca786ce39b074966e8a9eae16eac90783974d80")?)
//!     .value(1_000_000_000_000_000_000u64)
//!     .gas(25_000)
//!     .nonce(0)
//!     .gas_price(25_000_000_000u64)
//!     .chain_id(1001)
//!     .build()?;
//! tx.sign(&sender, None)?;
//! let raw = tx.raw_transaction()?;
//! # let _ = raw;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod error;
pub mod keyring;
pub mod provider;
pub mod signature;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use account::{AccountKey, KeyRole};
pub use error::TransactionError;
pub use keyring::Keyring;
pub use signature::SignatureData;
pub use transaction::{Transaction, TxType};
pub use types::{Address, PublicKey};
pub use wallet::Wallet;
