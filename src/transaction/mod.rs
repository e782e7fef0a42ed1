//! Transaction construction, encoding, hashing, signing, and
//! multi-party combination.
//!
//! The lifecycle reads left to right:
//!
//! ```text
//! builder -> fill -> sign (sender) -> sign_as_fee_payer -> raw_transaction
//!                                  \-> combine (multisig copies)
//! ```
//!
//! One [`Transaction`] struct covers all twenty-two types; the
//! [`TxType`] tag drives field legality, wire shape, and which keyring
//! role signs. The codec, hasher, signing, and combine submodules each
//! extend `Transaction` with their slice of the lifecycle.

pub mod builder;
pub mod codec;
pub mod combine;
pub mod hasher;
pub mod signing;
pub mod tx_type;

pub use builder::{Transaction, TransactionBuilder};
pub use tx_type::{CodeFormat, Field, TxGroup, TxType};
