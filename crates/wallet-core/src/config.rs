//! Wallet engine configuration.
//!
//! Loaded from TOML, then optionally overridden from `WALLET_*` environment
//! variables, then validated before any client is built.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::WalletError;
use crate::types::Network;
use crate::validation::is_address_shape;

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub evm: EvmConfig,
    pub tron: TronConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvmConfig {
    pub rpc_url: String,
    pub usdt_contract: String,
    #[serde(default = "default_native_gas_limit")]
    pub native_gas_limit: u64,
    #[serde(default = "default_token_gas_limit")]
    pub token_gas_limit: u64,
    #[serde(default = "default_evm_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TronConfig {
    pub grpc_endpoint: String,
    pub usdt_contract: String,
    /// Fee limit for TRC20 transfers, in sun.
    #[serde(default = "default_fee_limit")]
    pub fee_limit: i64,
    #[serde(default = "default_tron_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_native_gas_limit() -> u64 {
    chain_eth::client::NATIVE_TRANSFER_GAS_LIMIT
}

fn default_token_gas_limit() -> u64 {
    chain_eth::client::TOKEN_TRANSFER_GAS_LIMIT
}

fn default_evm_timeout_secs() -> u64 {
    30
}

fn default_fee_limit() -> i64 {
    chain_tron::client::DEFAULT_FEE_LIMIT
}

fn default_tron_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl WalletConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            WalletError::Config(format!("failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, WalletError> {
        toml::from_str(content).map_err(|e| WalletError::Config(format!("invalid TOML: {e}")))
    }

    /// Applies `WALLET_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary lookup (environment, test table).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WALLET_EVM_RPC_URL") {
            self.evm.rpc_url = v;
        }
        if let Some(v) = lookup("WALLET_EVM_USDT_CONTRACT") {
            self.evm.usdt_contract = v;
        }
        if let Some(v) = lookup("WALLET_TRON_GRPC") {
            self.tron.grpc_endpoint = v;
        }
        if let Some(v) = lookup("WALLET_TRON_USDT_CONTRACT") {
            self.tron.usdt_contract = v;
        }
        if let Some(v) = lookup("WALLET_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.evm.rpc_url.trim().is_empty() {
            return Err(WalletError::Config("evm.rpc_url must not be empty".into()));
        }
        if !self.evm.rpc_url.starts_with("http://") && !self.evm.rpc_url.starts_with("https://") {
            return Err(WalletError::Config(
                "evm.rpc_url must start with http:// or https://".into(),
            ));
        }
        if !is_address_shape(Network::Eth, &self.evm.usdt_contract) {
            return Err(WalletError::Config(format!(
                "evm.usdt_contract is not an EVM address: {}",
                self.evm.usdt_contract
            )));
        }
        if self.evm.native_gas_limit == 0 || self.evm.token_gas_limit == 0 {
            return Err(WalletError::Config("evm gas limits must be positive".into()));
        }

        if self.tron.grpc_endpoint.trim().is_empty() {
            return Err(WalletError::Config("tron.grpc_endpoint must not be empty".into()));
        }
        if !is_address_shape(Network::Tron, &self.tron.usdt_contract) {
            return Err(WalletError::Config(format!(
                "tron.usdt_contract is not a TRON address: {}",
                self.tron.usdt_contract
            )));
        }
        if self.tron.fee_limit <= 0 {
            return Err(WalletError::Config("tron.fee_limit must be positive".into()));
        }

        if self.evm.request_timeout_secs == 0 || self.tron.request_timeout_secs == 0 {
            return Err(WalletError::Config("request timeouts must be positive".into()));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(WalletError::Config(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        if self.logging.format != "text" && self.logging.format != "json" {
            return Err(WalletError::Config(format!(
                "logging.format must be text or json, got {}",
                self.logging.format
            )));
        }

        Ok(())
    }

    pub fn evm_client_config(&self) -> chain_eth::EvmClientConfig {
        chain_eth::EvmClientConfig {
            rpc_url: self.evm.rpc_url.clone(),
            native_gas_limit: self.evm.native_gas_limit,
            token_gas_limit: self.evm.token_gas_limit,
            request_timeout: Duration::from_secs(self.evm.request_timeout_secs),
        }
    }

    pub fn tron_client_config(&self) -> chain_tron::TronClientConfig {
        let mut config = chain_tron::TronClientConfig::new(self.tron.grpc_endpoint.clone());
        config.request_timeout = Duration::from_secs(self.tron.request_timeout_secs);
        config
    }
}
