//! The seam between offline transaction machinery and whatever RPC
//! client the application brings.
//!
//! The crate never talks to a network itself. Anything that can answer
//! three questions (current gas price, an account's next nonce, the
//! chain id) can drive [`Transaction::fill`], and tests get a canned
//! [`StaticChainData`] for free.
//!
//! [`Transaction::fill`]: crate::transaction::Transaction::fill

use async_trait::async_trait;
use primitive_types::U256;

use crate::error::ProviderError;
use crate::types::Address;

/// Supplies the chain-derived fields a transaction cannot know offline.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// The current unit price for gas.
    async fn gas_price(&self) -> Result<U256, ProviderError>;

    /// The next nonce for `address`.
    async fn transaction_count(&self, address: &Address) -> Result<u64, ProviderError>;

    /// The chain id of the connected network.
    async fn chain_id(&self) -> Result<u64, ProviderError>;
}

/// A provider with fixed answers. Useful in tests and for fully
/// offline flows where the caller already knows all three values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticChainData {
    pub gas_price: U256,
    pub chain_id: u64,
    pub nonce: u64,
}

#[async_trait]
impl ChainDataProvider for StaticChainData {
    async fn gas_price(&self) -> Result<U256, ProviderError> {
        Ok(self.gas_price)
    }

    async fn transaction_count(&self, _address: &Address) -> Result<u64, ProviderError> {
        Ok(self.nonce)
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.chain_id)
    }
}
