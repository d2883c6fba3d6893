use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};
use std::time::Duration;

use alloy_primitives::U256;
use serde_json::{json, Value};
use tokio::sync::{Mutex, OnceCell};

use crate::abi::decode_uint256;
use crate::address::{parse_address, private_key_to_address};
use crate::erc20;
use crate::error::EthError;
use crate::rpc::{format_quantity, parse_data, parse_quantity, parse_u64_quantity, RpcTransport};
use crate::transaction::{
    build_native_transfer, build_token_transfer, sign_transaction, LegacyTransaction,
};

/// Gas limit for a plain value transfer.
pub const NATIVE_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Gas limit for an ERC-20 `transfer` call.
pub const TOKEN_TRANSFER_GAS_LIMIT: u64 = 100_000;

#[derive(Debug, Clone)]
pub struct EvmClientConfig {
    pub rpc_url: String,
    pub native_gas_limit: u64,
    pub token_gas_limit: u64,
    pub request_timeout: Duration,
}

impl EvmClientConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            native_gas_limit: NATIVE_TRANSFER_GAS_LIMIT,
            token_gas_limit: TOKEN_TRANSFER_GAS_LIMIT,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Receipt fields needed to settle an uncertain broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub tx_hash: String,
    /// `true` when the transaction executed successfully.
    pub success: bool,
    pub block_number: u64,
    pub gas_used: u64,
}

/// A transaction as the node reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub hash: String,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub nonce: u64,
    pub value: U256,
    /// `None` while the transaction is still pending.
    pub block_number: Option<u64>,
}

impl TransactionDetails {
    pub fn is_pending(&self) -> bool {
        self.block_number.is_none()
    }
}

/// Client for one EVM JSON-RPC endpoint.
///
/// Shared by reference across requests. Transfers from the same sender are
/// serialized from nonce lookup through broadcast.
pub struct EvmClient {
    rpc: RpcTransport,
    config: EvmClientConfig,
    chain_id: OnceCell<u64>,
    sender_locks: SyncMutex<HashMap<[u8; 20], Arc<Mutex<()>>>>,
}

/// Claim on a sender's transfer lock; drops the map entry once unused.
struct SenderPermit<'a> {
    locks: &'a SyncMutex<HashMap<[u8; 20], Arc<Mutex<()>>>>,
    sender: [u8; 20],
    lock: Arc<Mutex<()>>,
}

impl Drop for SenderPermit<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map and this permit still hold the lock: nobody is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.sender);
        }
    }
}

impl EvmClient {
    pub fn new(config: EvmClientConfig) -> Result<Self, EthError> {
        let rpc = RpcTransport::new(&config.rpc_url, config.request_timeout)?;
        Ok(Self {
            rpc,
            config,
            chain_id: OnceCell::new(),
            sender_locks: SyncMutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &EvmClientConfig {
        &self.config
    }

    /// Native balance in wei.
    pub async fn native_balance(&self, address: &str) -> Result<U256, EthError> {
        parse_address(address)?;
        let result = self
            .rpc
            .call("eth_getBalance", json!([address, "latest"]))
            .await?;
        parse_quantity(&result)
    }

    /// Raw token units held by `owner` on `contract`.
    pub async fn token_balance(&self, owner: &str, contract: &str) -> Result<U256, EthError> {
        let data = erc20::encode_balance_of(owner)?;
        parse_address(contract)?;

        let result = self
            .rpc
            .call(
                "eth_call",
                json!([{ "to": contract, "data": format!("0x{}", hex::encode(data)) }, "latest"]),
            )
            .await?;
        decode_uint256(&parse_data(&result)?)
    }

    /// The node's suggested legacy gas price in wei.
    pub async fn suggest_gas_price(&self) -> Result<U256, EthError> {
        let result = self.rpc.call("eth_gasPrice", json!([])).await?;
        parse_quantity(&result)
    }

    /// Pending nonce for `address`, queried fresh on every call.
    pub async fn pending_nonce(&self, address: &str) -> Result<u64, EthError> {
        let result = self
            .rpc
            .call("eth_getTransactionCount", json!([address, "pending"]))
            .await?;
        parse_u64_quantity(&result)
    }

    /// Chain id, fetched once and cached for the client's lifetime.
    pub async fn chain_id(&self) -> Result<u64, EthError> {
        self.chain_id
            .get_or_try_init(|| async {
                let result = self.rpc.call("eth_chainId", json!([])).await?;
                parse_u64_quantity(&result)
            })
            .await
            .copied()
    }

    /// Gas estimate for a call; not used by the fixed-limit transfer paths.
    pub async fn estimate_gas(
        &self,
        from: &str,
        to: &str,
        value: U256,
        data: &[u8],
    ) -> Result<u64, EthError> {
        let result = self
            .rpc
            .call(
                "eth_estimateGas",
                json!([{
                    "from": from,
                    "to": to,
                    "value": format_quantity(value),
                    "data": format!("0x{}", hex::encode(data)),
                }]),
            )
            .await?;
        parse_u64_quantity(&result)
    }

    pub async fn latest_block_number(&self) -> Result<u64, EthError> {
        let result = self.rpc.call("eth_blockNumber", json!([])).await?;
        parse_u64_quantity(&result)
    }

    /// Receipt for `tx_hash`, or `None` while the transaction is pending or unknown.
    pub async fn transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, EthError> {
        let result = self
            .rpc
            .call("eth_getTransactionReceipt", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        parse_receipt(tx_hash, &result).map(Some)
    }

    /// Transaction `tx_hash`, or `None` if the node does not know it.
    pub async fn transaction_by_hash(
        &self,
        tx_hash: &str,
    ) -> Result<Option<TransactionDetails>, EthError> {
        let result = self
            .rpc
            .call("eth_getTransactionByHash", json!([tx_hash]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        parse_transaction(&result).map(Some)
    }

    /// Every transaction in block `number`.
    pub async fn block_transactions(&self, number: u64) -> Result<Vec<TransactionDetails>, EthError> {
        let result = self
            .rpc
            .call(
                "eth_getBlockByNumber",
                json!([format_quantity(U256::from(number)), true]),
            )
            .await?;
        if result.is_null() {
            return Err(EthError::InvalidResponse(format!("block {number} not found")));
        }

        result
            .get("transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| EthError::InvalidResponse("block missing transactions".into()))?
            .iter()
            .map(parse_transaction)
            .collect()
    }

    /// Sends `amount_wei` of native value using the fixed native gas limit.
    pub async fn transfer_native(
        &self,
        private_key: &[u8; 32],
        to: &str,
        amount_wei: U256,
        gas_price: U256,
    ) -> Result<String, EthError> {
        let gas_limit = self.config.native_gas_limit;
        self.sign_and_send(private_key, |chain_id, nonce| {
            build_native_transfer(chain_id, nonce, to, amount_wei, gas_price, gas_limit)
        })
        .await
    }

    /// Sends `amount` raw token units through `contract`.
    ///
    /// A zero amount returns an empty id without touching the network.
    pub async fn transfer_token(
        &self,
        private_key: &[u8; 32],
        to: &str,
        contract: &str,
        amount: U256,
        gas_price: U256,
    ) -> Result<String, EthError> {
        if amount.is_zero() {
            return Ok(String::new());
        }

        let gas_limit = self.config.token_gas_limit;
        self.sign_and_send(private_key, |chain_id, nonce| {
            build_token_transfer(chain_id, nonce, contract, to, amount, gas_price, gas_limit)
        })
        .await
    }

    async fn sign_and_send<F>(&self, private_key: &[u8; 32], build: F) -> Result<String, EthError>
    where
        F: FnOnce(u64, u64) -> Result<LegacyTransaction, EthError>,
    {
        let from = private_key_to_address(private_key)?;
        let permit = self.sender_permit(parse_address(&from)?);
        let _guard = permit.lock.lock().await;

        let chain_id = self.chain_id().await?;
        let nonce = self.pending_nonce(&from).await?;
        let tx = build(chain_id, nonce)?;
        let signed = sign_transaction(&tx, private_key)?;

        let node_hash = self
            .rpc
            .send_raw_transaction(&signed.raw_tx_hex(), &signed.tx_hash)
            .await?;

        if !node_hash.eq_ignore_ascii_case(&signed.tx_hash) {
            tracing::warn!(
                local = %signed.tx_hash,
                node = %node_hash,
                "node returned a different transaction hash"
            );
        }
        tracing::info!(from = %from, nonce, tx_hash = %signed.tx_hash, "evm transaction broadcast");
        Ok(signed.tx_hash)
    }

    fn sender_permit(&self, sender: [u8; 20]) -> SenderPermit<'_> {
        let lock = self
            .sender_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(sender)
            .or_default()
            .clone();
        SenderPermit {
            locks: &self.sender_locks,
            sender,
            lock,
        }
    }
}

fn parse_transaction(value: &Value) -> Result<TransactionDetails, EthError> {
    let field = |name: &str| {
        value
            .get(name)
            .ok_or_else(|| EthError::InvalidResponse(format!("transaction missing {name}")))
    };
    let text = |name: &str| -> Result<String, EthError> {
        field(name)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| EthError::InvalidResponse(format!("transaction {name} is not a string")))
    };

    let to = match value.get("to") {
        None | Some(Value::Null) => None,
        Some(_) => Some(text("to")?),
    };
    let block_number = match value.get("blockNumber") {
        None | Some(Value::Null) => None,
        Some(number) => Some(parse_u64_quantity(number)?),
    };

    Ok(TransactionDetails {
        hash: text("hash")?,
        from: text("from")?,
        to,
        nonce: parse_u64_quantity(field("nonce")?)?,
        value: parse_quantity(field("value")?)?,
        block_number,
    })
}

fn parse_receipt(tx_hash: &str, value: &Value) -> Result<TransactionReceipt, EthError> {
    let field = |name: &str| {
        value
            .get(name)
            .ok_or_else(|| EthError::InvalidResponse(format!("receipt missing {name}")))
    };

    Ok(TransactionReceipt {
        tx_hash: tx_hash.to_string(),
        success: parse_u64_quantity(field("status")?)? == 1,
        block_number: parse_u64_quantity(field("blockNumber")?)?,
        gas_used: parse_u64_quantity(field("gasUsed")?)?,
    })
}
