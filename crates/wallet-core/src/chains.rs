//! The operations the transfer orchestrator needs from a chain, and the two
//! adapters that provide them over [`EvmClient`] and [`TronClient`].

use async_trait::async_trait;
use chain_eth::{EvmClient, U256};
use chain_tron::transaction::sign_transaction;
use chain_tron::TronClient;
use rust_decimal::Decimal;

use crate::error::WalletError;
use crate::hd_derivation::PrivateKey;
use crate::types::{Network, ETH_DECIMALS, TRX_DECIMALS};
use crate::units::to_decimal;

#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native balance in human units.
    async fn native_balance(&self, address: &str) -> Result<Decimal, WalletError>;

    /// Raw USDT units held by `address`.
    async fn token_balance(&self, address: &str) -> Result<U256, WalletError>;

    /// Signs and broadcasts a USDT transfer, returning the transaction id.
    async fn transfer_token(
        &self,
        key: &PrivateKey,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<String, WalletError>;
}

/// Borrowed handle to one of the two configured chains.
pub enum ChainRef<'a, E, T> {
    Evm(&'a E),
    Tron(&'a T),
}

impl<'a, E: ChainClient, T: ChainClient> ChainRef<'a, E, T> {
    pub fn network(&self) -> Network {
        match self {
            ChainRef::Evm(_) => Network::Eth,
            ChainRef::Tron(_) => Network::Tron,
        }
    }

    pub async fn native_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        match self {
            ChainRef::Evm(c) => c.native_balance(address).await,
            ChainRef::Tron(c) => c.native_balance(address).await,
        }
    }

    pub async fn token_balance(&self, address: &str) -> Result<U256, WalletError> {
        match self {
            ChainRef::Evm(c) => c.token_balance(address).await,
            ChainRef::Tron(c) => c.token_balance(address).await,
        }
    }

    pub async fn transfer_token(
        &self,
        key: &PrivateKey,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<String, WalletError> {
        match self {
            ChainRef::Evm(c) => c.transfer_token(key, from, to, amount).await,
            ChainRef::Tron(c) => c.transfer_token(key, from, to, amount).await,
        }
    }
}

pub struct EvmChain {
    client: EvmClient,
    usdt_contract: String,
}

impl EvmChain {
    pub fn new(client: EvmClient, usdt_contract: impl Into<String>) -> Self {
        Self {
            client,
            usdt_contract: usdt_contract.into(),
        }
    }

    pub fn client(&self) -> &EvmClient {
        &self.client
    }
}

#[async_trait]
impl ChainClient for EvmChain {
    async fn native_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        let wei = self.client.native_balance(address).await?;
        to_decimal(wei, ETH_DECIMALS)
    }

    async fn token_balance(&self, address: &str) -> Result<U256, WalletError> {
        Ok(self.client.token_balance(address, &self.usdt_contract).await?)
    }

    async fn transfer_token(
        &self,
        key: &PrivateKey,
        _from: &str,
        to: &str,
        amount: U256,
    ) -> Result<String, WalletError> {
        // Zero goes straight to the client, which returns an empty id offline.
        let gas_price = if amount.is_zero() {
            U256::ZERO
        } else {
            self.client.suggest_gas_price().await?
        };

        Ok(self
            .client
            .transfer_token(key.expose(), to, &self.usdt_contract, amount, gas_price)
            .await?)
    }
}

pub struct TronChain {
    client: TronClient,
    usdt_contract: String,
    fee_limit: i64,
}

impl TronChain {
    pub fn new(client: TronClient, usdt_contract: impl Into<String>, fee_limit: i64) -> Self {
        Self {
            client,
            usdt_contract: usdt_contract.into(),
            fee_limit,
        }
    }

    pub fn client(&self) -> &TronClient {
        &self.client
    }
}

#[async_trait]
impl ChainClient for TronChain {
    async fn native_balance(&self, address: &str) -> Result<Decimal, WalletError> {
        let account = self.client.native_balance(address).await?;
        let sun = u64::try_from(account.balance_sun).map_err(|_| {
            WalletError::Internal(format!("negative balance {} on {address}", account.balance_sun))
        })?;
        to_decimal(U256::from(sun), TRX_DECIMALS)
    }

    async fn token_balance(&self, address: &str) -> Result<U256, WalletError> {
        Ok(self
            .client
            .trc20_balance(address, &self.usdt_contract)
            .await?)
    }

    async fn transfer_token(
        &self,
        key: &PrivateKey,
        from: &str,
        to: &str,
        amount: U256,
    ) -> Result<String, WalletError> {
        let unsigned = self
            .client
            .transfer_trc20(from, to, &self.usdt_contract, amount, self.fee_limit)
            .await?;
        let signed = sign_transaction(&unsigned, key.expose())?;
        self.client.broadcast(&signed).await?;
        Ok(unsigned.txid_hex())
    }
}
