//! The transaction type registry: tags, fee-delegation variants, and the
//! per-type field legality table.
//!
//! Every typed transaction family occupies a base tag; its fee-delegated
//! variant is base + 1 and its partial-fee-delegated (ratio) variant is
//! base + 2. The legacy type has no tag at all and is recognized on the
//! wire by its leading RLP list byte.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// Every transaction type the protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    Legacy,

    ValueTransfer,
    FeeDelegatedValueTransfer,
    FeeDelegatedValueTransferWithRatio,

    ValueTransferMemo,
    FeeDelegatedValueTransferMemo,
    FeeDelegatedValueTransferMemoWithRatio,

    AccountUpdate,
    FeeDelegatedAccountUpdate,
    FeeDelegatedAccountUpdateWithRatio,

    SmartContractDeploy,
    FeeDelegatedSmartContractDeploy,
    FeeDelegatedSmartContractDeployWithRatio,

    SmartContractExecution,
    FeeDelegatedSmartContractExecution,
    FeeDelegatedSmartContractExecutionWithRatio,

    Cancel,
    FeeDelegatedCancel,
    FeeDelegatedCancelWithRatio,

    ChainDataAnchoring,
    FeeDelegatedChainDataAnchoring,
    FeeDelegatedChainDataAnchoringWithRatio,
}

/// The shared body shape behind a type and its fee-delegated variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxGroup {
    Legacy,
    ValueTransfer,
    ValueTransferMemo,
    AccountUpdate,
    SmartContractDeploy,
    SmartContractExecution,
    Cancel,
    ChainDataAnchoring,
}

impl TxType {
    /// The wire tag byte, or `None` for the untagged legacy type.
    pub fn tag(self) -> Option<u8> {
        use TxType::*;
        Some(match self {
            Legacy => return None,
            ValueTransfer => 0x08,
            FeeDelegatedValueTransfer => 0x09,
            FeeDelegatedValueTransferWithRatio => 0x0a,
            ValueTransferMemo => 0x10,
            FeeDelegatedValueTransferMemo => 0x11,
            FeeDelegatedValueTransferMemoWithRatio => 0x12,
            AccountUpdate => 0x20,
            FeeDelegatedAccountUpdate => 0x21,
            FeeDelegatedAccountUpdateWithRatio => 0x22,
            SmartContractDeploy => 0x28,
            FeeDelegatedSmartContractDeploy => 0x29,
            FeeDelegatedSmartContractDeployWithRatio => 0x2a,
            SmartContractExecution => 0x30,
            FeeDelegatedSmartContractExecution => 0x31,
            FeeDelegatedSmartContractExecutionWithRatio => 0x32,
            Cancel => 0x38,
            FeeDelegatedCancel => 0x39,
            FeeDelegatedCancelWithRatio => 0x3a,
            ChainDataAnchoring => 0x48,
            FeeDelegatedChainDataAnchoring => 0x49,
            FeeDelegatedChainDataAnchoringWithRatio => 0x4a,
        })
    }

    /// Resolves a wire tag byte. Legacy transactions have no tag and are
    /// never produced here.
    pub fn from_tag(tag: u8) -> Option<Self> {
        use TxType::*;
        Some(match tag {
            0x08 => ValueTransfer,
            0x09 => FeeDelegatedValueTransfer,
            0x0a => FeeDelegatedValueTransferWithRatio,
            0x10 => ValueTransferMemo,
            0x11 => FeeDelegatedValueTransferMemo,
            0x12 => FeeDelegatedValueTransferMemoWithRatio,
            0x20 => AccountUpdate,
            0x21 => FeeDelegatedAccountUpdate,
            0x22 => FeeDelegatedAccountUpdateWithRatio,
            0x28 => SmartContractDeploy,
            0x29 => FeeDelegatedSmartContractDeploy,
            0x2a => FeeDelegatedSmartContractDeployWithRatio,
            0x30 => SmartContractExecution,
            0x31 => FeeDelegatedSmartContractExecution,
            0x32 => FeeDelegatedSmartContractExecutionWithRatio,
            0x38 => Cancel,
            0x39 => FeeDelegatedCancel,
            0x3a => FeeDelegatedCancelWithRatio,
            0x48 => ChainDataAnchoring,
            0x49 => FeeDelegatedChainDataAnchoring,
            0x4a => FeeDelegatedChainDataAnchoringWithRatio,
            _ => return None,
        })
    }

    /// The shared body shape for this type.
    pub fn group(self) -> TxGroup {
        use TxType::*;
        match self {
            Legacy => TxGroup::Legacy,
            ValueTransfer | FeeDelegatedValueTransfer | FeeDelegatedValueTransferWithRatio => {
                TxGroup::ValueTransfer
            }
            ValueTransferMemo
            | FeeDelegatedValueTransferMemo
            | FeeDelegatedValueTransferMemoWithRatio => TxGroup::ValueTransferMemo,
            AccountUpdate | FeeDelegatedAccountUpdate | FeeDelegatedAccountUpdateWithRatio => {
                TxGroup::AccountUpdate
            }
            SmartContractDeploy
            | FeeDelegatedSmartContractDeploy
            | FeeDelegatedSmartContractDeployWithRatio => TxGroup::SmartContractDeploy,
            SmartContractExecution
            | FeeDelegatedSmartContractExecution
            | FeeDelegatedSmartContractExecutionWithRatio => TxGroup::SmartContractExecution,
            Cancel | FeeDelegatedCancel | FeeDelegatedCancelWithRatio => TxGroup::Cancel,
            ChainDataAnchoring
            | FeeDelegatedChainDataAnchoring
            | FeeDelegatedChainDataAnchoringWithRatio => TxGroup::ChainDataAnchoring,
        }
    }

    /// `true` for types that carry a fee-payer signature block.
    pub fn is_fee_delegated(self) -> bool {
        matches!(self.tag(), Some(tag) if tag & 0x03 != 0)
    }

    /// `true` for the partial-fee-delegation variants, which carry an
    /// explicit fee ratio.
    pub fn has_fee_ratio(self) -> bool {
        matches!(self.tag(), Some(tag) if tag & 0x03 == 0x02)
    }

    /// `true` if an account update installs a new account key.
    pub fn is_account_update(self) -> bool {
        self.group() == TxGroup::AccountUpdate
    }

    /// The canonical display name.
    pub fn name(self) -> &'static str {
        use TxType::*;
        match self {
            Legacy => "Legacy",
            ValueTransfer => "ValueTransfer",
            FeeDelegatedValueTransfer => "FeeDelegatedValueTransfer",
            FeeDelegatedValueTransferWithRatio => "FeeDelegatedValueTransferWithRatio",
            ValueTransferMemo => "ValueTransferMemo",
            FeeDelegatedValueTransferMemo => "FeeDelegatedValueTransferMemo",
            FeeDelegatedValueTransferMemoWithRatio => "FeeDelegatedValueTransferMemoWithRatio",
            AccountUpdate => "AccountUpdate",
            FeeDelegatedAccountUpdate => "FeeDelegatedAccountUpdate",
            FeeDelegatedAccountUpdateWithRatio => "FeeDelegatedAccountUpdateWithRatio",
            SmartContractDeploy => "SmartContractDeploy",
            FeeDelegatedSmartContractDeploy => "FeeDelegatedSmartContractDeploy",
            FeeDelegatedSmartContractDeployWithRatio => "FeeDelegatedSmartContractDeployWithRatio",
            SmartContractExecution => "SmartContractExecution",
            FeeDelegatedSmartContractExecution => "FeeDelegatedSmartContractExecution",
            FeeDelegatedSmartContractExecutionWithRatio => {
                "FeeDelegatedSmartContractExecutionWithRatio"
            }
            Cancel => "Cancel",
            FeeDelegatedCancel => "FeeDelegatedCancel",
            FeeDelegatedCancelWithRatio => "FeeDelegatedCancelWithRatio",
            ChainDataAnchoring => "ChainDataAnchoring",
            FeeDelegatedChainDataAnchoring => "FeeDelegatedChainDataAnchoring",
            FeeDelegatedChainDataAnchoringWithRatio => "FeeDelegatedChainDataAnchoringWithRatio",
        }
    }

    /// Fields this type's body requires beyond the universal set
    /// (`from`, `gas`, and the fill-provided `nonce`/`gasPrice`).
    pub fn required_fields(self) -> &'static [Field] {
        use Field::*;
        match self.group() {
            TxGroup::Legacy => &[],
            TxGroup::ValueTransfer => &[To, Value],
            TxGroup::ValueTransferMemo => &[To, Value, Input],
            TxGroup::AccountUpdate => &[Account],
            TxGroup::SmartContractDeploy => &[Input],
            TxGroup::SmartContractExecution => &[To, Input],
            TxGroup::Cancel => &[],
            TxGroup::ChainDataAnchoring => &[Input],
        }
    }

    /// Fields this type's body may carry. Anything else is rejected at
    /// build time.
    pub fn allowed_fields(self) -> &'static [Field] {
        use Field::*;
        match self.group() {
            TxGroup::Legacy => &[To, Value, Input],
            TxGroup::ValueTransfer => &[To, Value],
            TxGroup::ValueTransferMemo => &[To, Value, Input],
            TxGroup::AccountUpdate => &[Account],
            TxGroup::SmartContractDeploy => &[Value, Input, HumanReadable, CodeFormat],
            TxGroup::SmartContractExecution => &[To, Value, Input],
            TxGroup::Cancel => &[],
            TxGroup::ChainDataAnchoring => &[Input],
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The optional body fields the legality table speaks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    To,
    Value,
    Input,
    Account,
    HumanReadable,
    CodeFormat,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::To => "to",
            Field::Value => "value",
            Field::Input => "input",
            Field::Account => "account",
            Field::HumanReadable => "humanReadable",
            Field::CodeFormat => "codeFormat",
        }
    }
}

/// The contract code format marker carried by deploy transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodeFormat {
    #[default]
    Evm,
}

impl CodeFormat {
    pub fn as_u8(self) -> u8 {
        match self {
            CodeFormat::Evm => 0x00,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
