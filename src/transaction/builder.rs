//! The [`Transaction`] value type and its builder.
//!
//! One struct covers every transaction type; the type tag decides which
//! optional fields are legal, and both the builder and the setters
//! enforce that table up front. An illegal field is an error at
//! construction, never a silent drop at encode time.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::account::AccountKey;
use crate::error::{TransactionError, ValidationError};
use crate::signature::SignatureData;
use crate::transaction::tx_type::{CodeFormat, Field, TxType};
use crate::types::{serde_hex_opt, Address};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A transaction in any signing state: freshly built, partially signed,
/// or fully signed by sender and fee payer.
///
/// `nonce`, `gas_price`, and `chain_id` are optional so a transaction
/// can be built offline and filled from a
/// [`ChainDataProvider`](crate::provider::ChainDataProvider) later.
/// Hashing and final encoding demand them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub(crate) tx_type: TxType,
    pub(crate) from: Address,
    pub(crate) nonce: Option<u64>,
    pub(crate) gas: u64,
    pub(crate) gas_price: Option<U256>,
    pub(crate) chain_id: Option<u64>,

    pub(crate) to: Option<Address>,
    pub(crate) value: Option<U256>,
    #[serde(default, with = "serde_hex_opt")]
    pub(crate) input: Option<Vec<u8>>,
    pub(crate) human_readable: Option<bool>,
    pub(crate) code_format: Option<CodeFormat>,
    pub(crate) account: Option<AccountKey>,

    pub(crate) fee_ratio: Option<u8>,
    pub(crate) fee_payer: Option<Address>,

    pub(crate) signatures: Vec<SignatureData>,
    pub(crate) fee_payer_signatures: Vec<SignatureData>,
}

impl Transaction {
    /// Starts a builder for the given type.
    pub fn builder(tx_type: TxType) -> TransactionBuilder {
        TransactionBuilder::new(tx_type)
    }

    pub fn tx_type(&self) -> TxType {
        self.tx_type
    }

    pub fn from(&self) -> Address {
        self.from
    }

    pub fn nonce(&self) -> Option<u64> {
        self.nonce
    }

    pub fn gas(&self) -> u64 {
        self.gas
    }

    pub fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn to(&self) -> Option<Address> {
        self.to
    }

    pub fn value(&self) -> Option<U256> {
        self.value
    }

    pub fn input(&self) -> Option<&[u8]> {
        self.input.as_deref()
    }

    pub fn human_readable(&self) -> Option<bool> {
        self.human_readable
    }

    pub fn code_format(&self) -> Option<CodeFormat> {
        self.code_format
    }

    pub fn account(&self) -> Option<&AccountKey> {
        self.account.as_ref()
    }

    pub fn fee_ratio(&self) -> Option<u8> {
        self.fee_ratio
    }

    pub fn fee_payer(&self) -> Option<Address> {
        self.fee_payer
    }

    pub fn signatures(&self) -> &[SignatureData] {
        &self.signatures
    }

    pub fn fee_payer_signatures(&self) -> &[SignatureData] {
        &self.fee_payer_signatures
    }

    /// `true` once at least one real sender signature is attached.
    pub fn is_signed(&self) -> bool {
        self.signatures.iter().any(|sig| !sig.is_empty())
    }

    // -- setters ----------------------------------------------------------

    pub fn set_nonce(&mut self, nonce: u64) {
        self.nonce = Some(nonce);
    }

    pub fn set_gas(&mut self, gas: u64) {
        self.gas = gas;
    }

    pub fn set_gas_price(&mut self, gas_price: U256) {
        self.gas_price = Some(gas_price);
    }

    pub fn set_chain_id(&mut self, chain_id: u64) {
        self.chain_id = Some(chain_id);
    }

    pub fn set_from(&mut self, from: Address) {
        self.from = from;
    }

    pub fn set_to(&mut self, to: Address) -> Result<(), ValidationError> {
        self.check_allowed(Field::To)?;
        self.to = Some(to);
        Ok(())
    }

    pub fn set_value(&mut self, value: U256) -> Result<(), ValidationError> {
        self.check_allowed(Field::Value)?;
        self.value = Some(value);
        Ok(())
    }

    pub fn set_input(&mut self, input: Vec<u8>) -> Result<(), ValidationError> {
        self.check_allowed(Field::Input)?;
        self.input = Some(input);
        Ok(())
    }

    pub fn set_account(&mut self, account: AccountKey) -> Result<(), ValidationError> {
        self.check_allowed(Field::Account)?;
        self.account = Some(account);
        Ok(())
    }

    /// Sets the fee ratio, legal only on `WithRatio` types and only in
    /// the inclusive `[1, 99]` range.
    pub fn set_fee_ratio(&mut self, ratio: u8) -> Result<(), ValidationError> {
        if !self.tx_type.has_fee_ratio() {
            return Err(ValidationError::ForbiddenField {
                tx_type: self.tx_type.name(),
                field: "feeRatio",
            });
        }
        if !(1..=99).contains(&ratio) {
            return Err(ValidationError::FeeRatioOutOfRange {
                value: ratio as u64,
            });
        }
        self.fee_ratio = Some(ratio);
        Ok(())
    }

    /// Sets the fee payer, legal only on fee-delegated types.
    pub fn set_fee_payer(&mut self, fee_payer: Address) -> Result<(), ValidationError> {
        if !self.tx_type.is_fee_delegated() {
            return Err(ValidationError::ForbiddenField {
                tx_type: self.tx_type.name(),
                field: "feePayer",
            });
        }
        self.fee_payer = Some(fee_payer);
        Ok(())
    }

    fn check_allowed(&self, field: Field) -> Result<(), ValidationError> {
        if self.tx_type.allowed_fields().contains(&field) {
            Ok(())
        } else {
            Err(ValidationError::ForbiddenField {
                tx_type: self.tx_type.name(),
                field: field.name(),
            })
        }
    }

    // -- signature accumulation -------------------------------------------

    /// Appends one sender signature.
    pub fn append_signature(&mut self, signature: SignatureData) {
        self.append_signatures(std::iter::once(signature));
    }

    /// Appends sender signatures, dropping empty sentinels and clearing
    /// a sentinel-only list on the first real signature.
    pub fn append_signatures(&mut self, signatures: impl IntoIterator<Item = SignatureData>) {
        append_filtered(&mut self.signatures, signatures);
    }

    /// Appends fee-payer signatures. Errors on types with no fee-payer
    /// signature block.
    pub fn append_fee_payer_signatures(
        &mut self,
        signatures: impl IntoIterator<Item = SignatureData>,
    ) -> Result<(), TransactionError> {
        if !self.tx_type.is_fee_delegated() {
            return Err(TransactionError::Unsupported {
                op: "fee-payer signing",
                tx_type: self.tx_type.name(),
            });
        }
        append_filtered(&mut self.fee_payer_signatures, signatures);
        Ok(())
    }
}

fn append_filtered(
    target: &mut Vec<SignatureData>,
    incoming: impl IntoIterator<Item = SignatureData>,
) {
    let mut real: Vec<SignatureData> = incoming.into_iter().filter(|s| !s.is_empty()).collect();
    if real.is_empty() {
        return;
    }
    if target.iter().all(|s| s.is_empty()) {
        target.clear();
    }
    target.append(&mut real);
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent construction with validation deferred to [`build`].
///
/// [`build`]: TransactionBuilder::build
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    tx_type: TxType,
    from: Option<Address>,
    nonce: Option<u64>,
    gas: Option<u64>,
    gas_price: Option<U256>,
    chain_id: Option<u64>,
    to: Option<Address>,
    value: Option<U256>,
    input: Option<Vec<u8>>,
    human_readable: Option<bool>,
    code_format: Option<CodeFormat>,
    account: Option<AccountKey>,
    fee_ratio: Option<u8>,
    fee_payer: Option<Address>,
}

impl TransactionBuilder {
    pub fn new(tx_type: TxType) -> Self {
        Self {
            tx_type,
            from: None,
            nonce: None,
            gas: None,
            gas_price: None,
            chain_id: None,
            to: None,
            value: None,
            input: None,
            human_readable: None,
            code_format: None,
            account: None,
            fee_ratio: None,
            fee_payer: None,
        }
    }

    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<U256>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    pub fn value(mut self, value: impl Into<U256>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn human_readable(mut self, human_readable: bool) -> Self {
        self.human_readable = Some(human_readable);
        self
    }

    pub fn code_format(mut self, code_format: CodeFormat) -> Self {
        self.code_format = Some(code_format);
        self
    }

    pub fn account(mut self, account: AccountKey) -> Self {
        self.account = Some(account);
        self
    }

    pub fn fee_ratio(mut self, fee_ratio: u8) -> Self {
        self.fee_ratio = Some(fee_ratio);
        self
    }

    pub fn fee_payer(mut self, fee_payer: Address) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Validates the assembled fields against the type's legality table
    /// and produces the transaction.
    pub fn build(self) -> Result<Transaction, ValidationError> {
        let ty = self.tx_type;
        let name = ty.name();

        let from = self.from.ok_or(ValidationError::MissingField {
            tx_type: name,
            field: "from",
        })?;
        let gas = self.gas.ok_or(ValidationError::MissingField {
            tx_type: name,
            field: "gas",
        })?;

        let allowed = ty.allowed_fields();
        let forbid = |field: Field, present: bool| -> Result<(), ValidationError> {
            if present && !allowed.contains(&field) {
                Err(ValidationError::ForbiddenField {
                    tx_type: name,
                    field: field.name(),
                })
            } else {
                Ok(())
            }
        };
        forbid(Field::To, self.to.is_some())?;
        forbid(Field::Value, self.value.is_some())?;
        forbid(Field::Input, self.input.is_some())?;
        forbid(Field::Account, self.account.is_some())?;
        forbid(Field::HumanReadable, self.human_readable.is_some())?;
        forbid(Field::CodeFormat, self.code_format.is_some())?;

        for &field in ty.required_fields() {
            let present = match field {
                Field::To => self.to.is_some(),
                Field::Value => self.value.is_some(),
                Field::Input => self.input.is_some(),
                Field::Account => self.account.is_some(),
                Field::HumanReadable => self.human_readable.is_some(),
                Field::CodeFormat => self.code_format.is_some(),
            };
            if !present {
                return Err(ValidationError::MissingField {
                    tx_type: name,
                    field: field.name(),
                });
            }
        }

        if ty.has_fee_ratio() {
            let ratio = self.fee_ratio.ok_or(ValidationError::MissingField {
                tx_type: name,
                field: "feeRatio",
            })?;
            if !(1..=99).contains(&ratio) {
                return Err(ValidationError::FeeRatioOutOfRange {
                    value: ratio as u64,
                });
            }
        } else if self.fee_ratio.is_some() {
            return Err(ValidationError::ForbiddenField {
                tx_type: name,
                field: "feeRatio",
            });
        }

        if self.fee_payer.is_some() && !ty.is_fee_delegated() {
            return Err(ValidationError::ForbiddenField {
                tx_type: name,
                field: "feePayer",
            });
        }

        // Deploy transactions never target an address and carry wire
        // defaults for their auxiliary fields.
        let deploy = ty.group() == super::tx_type::TxGroup::SmartContractDeploy;
        let value = match (self.value, deploy) {
            (None, true) => Some(U256::zero()),
            (value, _) => value,
        };
        let human_readable = match (self.human_readable, deploy) {
            (None, true) => Some(false),
            (hr, _) => hr,
        };
        let code_format = match (self.code_format, deploy) {
            (None, true) => Some(CodeFormat::Evm),
            (cf, _) => cf,
        };

        Ok(Transaction {
            tx_type: ty,
            from,
            nonce: self.nonce,
            gas,
            gas_price: self.gas_price,
            chain_id: self.chain_id,
            to: self.to,
            value,
            input: self.input,
            human_readable,
            code_format,
            account: self.account,
            fee_ratio: self.fee_ratio,
            fee_payer: self.fee_payer,
            signatures: Vec::new(),
            fee_payer_signatures: Vec::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
