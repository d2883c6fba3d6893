use std::time::Duration;

use alloy_primitives::U256;
use chain_eth::abi::decode_uint256;
use chain_eth::erc20;
use tokio::sync::RwLock;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request, Status};

use crate::address::{address_body, decode_address};
use crate::error::TronError;
use crate::proto::{
    path, Account, EmptyMessage, NodeInfo, ResponseCode, Return, Transaction,
    TransactionExtention, TransferAssetContract, TransferContract, TriggerSmartContract,
};
use crate::transaction::{transaction_id, UnsignedTransaction};

/// Default fee limit for TRC20 transfers, in sun.
pub const DEFAULT_FEE_LIMIT: i64 = 50_000_000;

#[derive(Debug, Clone)]
pub struct TronClientConfig {
    /// `host:port` or a full `http(s)://` URI.
    pub endpoint: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl TronClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Channel health as seen by the last call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Reconnecting,
    Failed,
}

/// Native account view returned by [`TronClient::native_balance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub balance_sun: i64,
    pub create_time: i64,
}

struct Session {
    channel: Channel,
    state: ConnectionState,
    /// Bumped on every channel replacement.
    generation: u64,
}

/// What the client does after the liveness probe.
#[derive(Debug)]
enum ProbeOutcome {
    Healthy,
    Reconnect,
    Fail(TronError),
}

fn classify_probe(result: Result<NodeInfo, Status>) -> ProbeOutcome {
    match result {
        Ok(_) => ProbeOutcome::Healthy,
        Err(status) if status.code() == Code::Unavailable => ProbeOutcome::Reconnect,
        Err(status) => ProbeOutcome::Fail(TronError::from_status(status)),
    }
}

/// gRPC client for a TRON full node.
///
/// Every call first probes `GetNodeInfo`. A transport-level failure
/// (`Unavailable`) rebuilds the channel to the same endpoint once and then
/// runs the call; any other probe failure, or a failed rebuild, is returned
/// to the caller. There is no backoff between calls.
pub struct TronClient {
    endpoint: Endpoint,
    session: RwLock<Session>,
}

impl TronClient {
    /// Connects eagerly; fails if the node cannot be reached.
    pub async fn connect(config: &TronClientConfig) -> Result<Self, TronError> {
        let endpoint = build_endpoint(config)?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| TronError::Network(format!("connect {}: {e}", config.endpoint)))?;

        tracing::info!(endpoint = %config.endpoint, "tron node connected");
        Ok(Self::with_channel(endpoint, channel))
    }

    /// Creates the client without dialing; the first call establishes the channel.
    pub fn connect_lazy(config: &TronClientConfig) -> Result<Self, TronError> {
        let endpoint = build_endpoint(config)?;
        let channel = endpoint.connect_lazy();
        Ok(Self::with_channel(endpoint, channel))
    }

    fn with_channel(endpoint: Endpoint, channel: Channel) -> Self {
        Self {
            endpoint,
            session: RwLock::new(Session {
                channel,
                state: ConnectionState::Connected,
                generation: 0,
            }),
        }
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.session.read().await.state
    }

    pub async fn node_info(&self) -> Result<NodeInfo, TronError> {
        let channel = self.ready_channel().await?;
        unary(channel, path::GET_NODE_INFO, EmptyMessage {})
            .await
            .map_err(TronError::from_status)
    }

    /// Account view with the native balance in sun.
    pub async fn native_balance(&self, address: &str) -> Result<AccountInfo, TronError> {
        let account = self.account(address).await?;
        Ok(AccountInfo {
            address: address.to_string(),
            balance_sun: account.balance,
            create_time: account.create_time,
        })
    }

    /// Balance of TRC10 asset `asset_id`; an asset the account never held is `NotFound`.
    pub async fn trc10_balance(&self, address: &str, asset_id: &str) -> Result<i64, TronError> {
        let account = self.account(address).await?;
        account
            .asset_v2
            .get(asset_id)
            .copied()
            .ok_or_else(|| TronError::NotFound(format!("asset {asset_id} on {address}")))
    }

    /// Raw TRC20 units held by `address` on `contract`.
    pub async fn trc20_balance(&self, address: &str, contract: &str) -> Result<U256, TronError> {
        let request = TriggerSmartContract {
            owner_address: decode_address(address)?.to_vec(),
            contract_address: decode_address(contract)?.to_vec(),
            data: erc20::encode_balance_of_raw(address_body(address)?),
            ..Default::default()
        };

        let channel = self.ready_channel().await?;
        let ext: TransactionExtention = unary(channel, path::TRIGGER_CONSTANT_CONTRACT, request)
            .await
            .map_err(TronError::from_status)?;
        check_build_result(ext.result.as_ref())?;

        let word = ext
            .constant_result
            .first()
            .ok_or_else(|| TronError::EncodingError("empty constant result".into()))?;
        decode_uint256(word).map_err(|e| TronError::EncodingError(e.to_string()))
    }

    /// Builds an unsigned TRC20 `transfer` through the node.
    pub async fn transfer_trc20(
        &self,
        from: &str,
        to: &str,
        contract: &str,
        amount: U256,
        fee_limit: i64,
    ) -> Result<UnsignedTransaction, TronError> {
        let request = TriggerSmartContract {
            owner_address: decode_address(from)?.to_vec(),
            contract_address: decode_address(contract)?.to_vec(),
            data: erc20::encode_transfer_raw(address_body(to)?, amount),
            ..Default::default()
        };

        let channel = self.ready_channel().await?;
        let ext = unary(channel, path::TRIGGER_CONTRACT, request)
            .await
            .map_err(TronError::from_status)?;
        unsigned_from_extention(ext, Some(fee_limit))
    }

    /// Builds an unsigned native TRX transfer.
    pub async fn transfer_trx(
        &self,
        from: &str,
        to: &str,
        amount_sun: i64,
    ) -> Result<UnsignedTransaction, TronError> {
        let request = TransferContract {
            owner_address: decode_address(from)?.to_vec(),
            to_address: decode_address(to)?.to_vec(),
            amount: amount_sun,
        };

        let channel = self.ready_channel().await?;
        let ext = unary(channel, path::CREATE_TRANSACTION, request)
            .await
            .map_err(TronError::from_status)?;
        unsigned_from_extention(ext, None)
    }

    /// Builds an unsigned TRC10 transfer of `asset_id`.
    pub async fn transfer_trc10(
        &self,
        from: &str,
        to: &str,
        asset_id: &str,
        amount: i64,
    ) -> Result<UnsignedTransaction, TronError> {
        let request = TransferAssetContract {
            asset_name: asset_id.as_bytes().to_vec(),
            owner_address: decode_address(from)?.to_vec(),
            to_address: decode_address(to)?.to_vec(),
            amount,
        };

        let channel = self.ready_channel().await?;
        let ext = unary(channel, path::TRANSFER_ASSET, request)
            .await
            .map_err(TronError::from_status)?;
        unsigned_from_extention(ext, None)
    }

    /// Submits a signed transaction.
    ///
    /// A deadline after the request was handed to the channel is reported as
    /// [`TronError::OutcomeUnknown`] with the locally computed id.
    pub async fn broadcast(&self, signed: &Transaction) -> Result<(), TronError> {
        let tx_id = hex::encode(transaction_id(signed)?);
        let channel = self.ready_channel().await?;

        let ret: Return = match unary(channel, path::BROADCAST_TRANSACTION, signed.clone()).await {
            Ok(ret) => ret,
            Err(status) if matches!(status.code(), Code::DeadlineExceeded | Code::Cancelled) => {
                return Err(TronError::OutcomeUnknown {
                    tx_id,
                    reason: status.message().to_string(),
                })
            }
            Err(status) => return Err(TronError::from_status(status)),
        };

        check_broadcast_return(&ret)?;
        tracing::info!(tx_id = %tx_id, "tron transaction broadcast");
        Ok(())
    }

    async fn account(&self, address: &str) -> Result<Account, TronError> {
        let request = Account {
            address: decode_address(address)?.to_vec(),
            ..Default::default()
        };
        let channel = self.ready_channel().await?;
        unary(channel, path::GET_ACCOUNT, request)
            .await
            .map_err(TronError::from_status)
    }

    /// Runs the liveness probe and returns a channel safe to call on.
    async fn ready_channel(&self) -> Result<Channel, TronError> {
        let (channel, generation) = {
            let session = self.session.read().await;
            (session.channel.clone(), session.generation)
        };

        let probe = unary::<_, NodeInfo>(channel.clone(), path::GET_NODE_INFO, EmptyMessage {}).await;
        match classify_probe(probe) {
            ProbeOutcome::Healthy => {
                self.set_state(ConnectionState::Connected).await;
                Ok(channel)
            }
            ProbeOutcome::Reconnect => self.reconnect(generation).await,
            ProbeOutcome::Fail(err) => {
                tracing::warn!(error = %err, "tron node probe failed");
                self.set_state(ConnectionState::Failed).await;
                Err(err)
            }
        }
    }

    /// Replaces the channel unless another caller already did since `seen_generation`.
    async fn reconnect(&self, seen_generation: u64) -> Result<Channel, TronError> {
        let mut session = self.session.write().await;
        if session.generation != seen_generation && session.state == ConnectionState::Connected {
            return Ok(session.channel.clone());
        }

        session.state = ConnectionState::Reconnecting;
        tracing::warn!(endpoint = %self.endpoint.uri(), "tron node unreachable, reconnecting");

        match self.endpoint.connect().await {
            Ok(channel) => {
                session.channel = channel.clone();
                session.generation += 1;
                session.state = ConnectionState::Connected;
                tracing::info!(endpoint = %self.endpoint.uri(), "tron node reconnected");
                Ok(channel)
            }
            Err(e) => {
                session.state = ConnectionState::Failed;
                tracing::error!(endpoint = %self.endpoint.uri(), error = %e, "tron reconnect failed");
                Err(TronError::Network(format!("reconnect failed: {e}")))
            }
        }
    }

    async fn set_state(&self, state: ConnectionState) {
        let mut session = self.session.write().await;
        if session.state != state {
            session.state = state;
        }
    }
}

fn build_endpoint(config: &TronClientConfig) -> Result<Endpoint, TronError> {
    let uri = if config.endpoint.contains("://") {
        config.endpoint.clone()
    } else {
        format!("http://{}", config.endpoint)
    };

    Endpoint::from_shared(uri)
        .map(|endpoint| {
            endpoint
                .timeout(config.request_timeout)
                .connect_timeout(config.connect_timeout)
        })
        .map_err(|e| TronError::Network(format!("invalid endpoint {}: {e}", config.endpoint)))
}

async fn unary<Req, Resp>(
    channel: Channel,
    method: &'static str,
    request: Req,
) -> Result<Resp, Status>
where
    Req: prost::Message + Send + 'static,
    Resp: prost::Message + Default + Send + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready()
        .await
        .map_err(|e| Status::unavailable(format!("channel not ready: {e}")))?;

    let codec: ProstCodec<Req, Resp> = ProstCodec::default();
    grpc.unary(Request::new(request), PathAndQuery::from_static(method), codec)
        .await
        .map(tonic::Response::into_inner)
}

/// Accepts a build or constant-call result only when the node reported success.
fn check_build_result(result: Option<&Return>) -> Result<(), TronError> {
    match result {
        Some(ret) if ret.result => Ok(()),
        Some(ret) => Err(TronError::Build(format!(
            "{:?}: {}",
            ret.code(),
            ret.message_text()
        ))),
        None => Err(TronError::Build("node returned no result".into())),
    }
}

fn unsigned_from_extention(
    ext: TransactionExtention,
    fee_limit: Option<i64>,
) -> Result<UnsignedTransaction, TronError> {
    check_build_result(ext.result.as_ref())?;
    let transaction = ext
        .transaction
        .ok_or_else(|| TronError::Build("node returned no transaction".into()))?;
    UnsignedTransaction::from_node(transaction, fee_limit)
}

/// Only `SUCCESS` together with `result == true` is an accepted broadcast.
pub fn check_broadcast_return(ret: &Return) -> Result<(), TronError> {
    let code = ret.code();
    if code != ResponseCode::Success {
        return Err(TronError::Broadcast {
            code: format!("{code:?}"),
            message: format!("bad transaction: {}", ret.message_text()),
        });
    }
    if !ret.result {
        return Err(TronError::Broadcast {
            code: format!("{code:?}"),
            message: format!(
                "tx send fail: result=false message={}",
                ret.message_text()
            ),
        });
    }
    Ok(())
}
