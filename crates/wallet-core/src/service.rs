//! Per-request transfer orchestration over the two long-lived chain clients.

use chain_eth::{EvmClient, U256};
use chain_tron::TronClient;
use rust_decimal::Decimal;

use crate::address::{derive_address, same_address};
use crate::chains::{ChainClient, ChainRef, EvmChain, TronChain};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::hd_derivation::{derive_private_key, master_key, PrivateKey};
use crate::mnemonic::derive_seed;
use crate::types::{Network, USDT_DECIMALS};
use crate::units::{to_base_units, to_decimal};
use crate::validation::check_address;

/// Holds one client per chain, built once and shared by every request.
pub struct WalletService<E = EvmChain, T = TronChain> {
    evm: E,
    tron: T,
}

impl WalletService<EvmChain, TronChain> {
    /// Validates `config` and connects both chain clients.
    pub async fn connect(config: &WalletConfig) -> Result<Self, WalletError> {
        config.validate()?;

        let evm = EvmClient::new(config.evm_client_config())?;
        let tron = TronClient::connect(&config.tron_client_config()).await?;
        tracing::info!(
            evm_rpc = %config.evm.rpc_url,
            tron_grpc = %config.tron.grpc_endpoint,
            "chain clients ready"
        );

        Ok(Self::new(
            EvmChain::new(evm, config.evm.usdt_contract.clone()),
            TronChain::new(tron, config.tron.usdt_contract.clone(), config.tron.fee_limit),
        ))
    }
}

impl<E: ChainClient, T: ChainClient> WalletService<E, T> {
    pub fn new(evm: E, tron: T) -> Self {
        Self { evm, tron }
    }

    fn chain(&self, network: Network) -> ChainRef<'_, E, T> {
        match network {
            Network::Eth => ChainRef::Evm(&self.evm),
            Network::Tron => ChainRef::Tron(&self.tron),
        }
    }

    /// Address at `m/44'/coin'/0'/0/0` for `network`.
    pub fn get_address(&self, mnemonic: &str, network: Network) -> Result<String, WalletError> {
        let (_key, address) = derive_account(mnemonic, network)?;
        Ok(address)
    }

    /// Sends `amount` USDT from the mnemonic's account to `receiver`.
    ///
    /// Returns the transaction id once the node accepted the transaction.
    /// A zero amount on EVM returns an empty id without any network call.
    pub async fn transfer_token(
        &self,
        mnemonic: &str,
        network: Network,
        receiver: &str,
        amount: Decimal,
    ) -> Result<String, WalletError> {
        let (key, sender) = derive_account(mnemonic, network)?;

        check_address(network, receiver)?;
        if same_address(network, &sender, receiver) {
            return Err(WalletError::Validation(format!(
                "sender and receiver are the same address: {receiver}"
            )));
        }

        let units = to_base_units(amount, USDT_DECIMALS)?;
        let chain = self.chain(network);

        if units.is_zero() {
            return match network {
                Network::Eth => chain.transfer_token(&key, &sender, receiver, units).await,
                Network::Tron => Err(WalletError::Validation(format!(
                    "amount must be positive: {amount}"
                ))),
            };
        }

        let available = chain.token_balance(&sender).await.map_err(|e| {
            tracing::error!(network = %network.display_name(), error = %e, "token balance lookup failed");
            e
        })?;
        if !balance_covers(available, amount) {
            tracing::warn!(
                network = %network.display_name(),
                available = %available,
                requested = %units,
                "insufficient token balance"
            );
            return Err(WalletError::InsufficientBalance {
                available: display_units(available),
                requested: amount.to_string(),
            });
        }

        match chain.transfer_token(&key, &sender, receiver, units).await {
            Ok(tx_id) => {
                tracing::info!(
                    network = %network.display_name(),
                    from = %sender,
                    to = %receiver,
                    amount = %amount,
                    tx_id = %tx_id,
                    "token transfer submitted"
                );
                Ok(tx_id)
            }
            Err(e) => {
                tracing::error!(network = %network.display_name(), from = %sender, error = %e, "token transfer failed");
                Err(e)
            }
        }
    }

    /// Native balance of `address` in human units.
    pub async fn get_native_balance(
        &self,
        network: Network,
        address: &str,
    ) -> Result<String, WalletError> {
        check_address(network, address)?;
        let balance = self.chain(network).native_balance(address).await?;
        Ok(balance.to_string())
    }

    /// USDT balance of `address` in human units.
    pub async fn get_token_balance(
        &self,
        network: Network,
        address: &str,
    ) -> Result<String, WalletError> {
        check_address(network, address)?;
        let units = self.chain(network).token_balance(address).await?;
        Ok(to_decimal(units, USDT_DECIMALS)?.to_string())
    }
}

/// Seed, master key, account key and address for one request.
///
/// A master-key failure is reported as an invalid mnemonic so callers see the
/// same error for every bad phrase on either chain.
fn derive_account(mnemonic: &str, network: Network) -> Result<(PrivateKey, String), WalletError> {
    let seed = derive_seed(mnemonic)?;
    let master = master_key(&seed).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    let key = derive_private_key(&master, network.coin_type())?;
    let address = derive_address(&key, network)?;
    Ok((key, address))
}

/// Compares the full requested amount, including digits below token precision.
///
/// A balance too large for `Decimal` covers any representable amount.
fn balance_covers(available: U256, amount: Decimal) -> bool {
    to_decimal(available, USDT_DECIMALS).map_or(true, |held| held >= amount)
}

fn display_units(units: U256) -> String {
    to_decimal(units, USDT_DECIMALS)
        .map(|d| d.to_string())
        .unwrap_or_else(|_| format!("{units} base units"))
}
