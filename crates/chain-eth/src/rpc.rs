//! JSON-RPC 2.0 transport over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use alloy_primitives::U256;
use serde_json::{json, Value};

use crate::error::EthError;

pub(crate) struct RpcTransport {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcTransport {
    pub(crate) fn new(url: &str, timeout: Duration) -> Result<Self, EthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EthError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Performs one call and returns the `result` member.
    pub(crate) async fn call(&self, method: &str, params: Value) -> Result<Value, EthError> {
        let payload = self.payload(method, params);

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(EthError::from_transport)?;

        let body: Value = response.json().await.map_err(EthError::from_transport)?;
        extract_result(method, body)
    }

    /// Submits a signed transaction.
    ///
    /// Once the request may have reached the node, transport failures are
    /// reported as [`EthError::OutcomeUnknown`] carrying `tx_hash`.
    pub(crate) async fn send_raw_transaction(
        &self,
        raw_tx_hex: &str,
        tx_hash: &str,
    ) -> Result<String, EthError> {
        let payload = self.payload("eth_sendRawTransaction", json!([raw_tx_hex]));

        let response = match self.http.post(&self.url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_builder() => {
                return Err(EthError::Network(e.to_string()))
            }
            Err(e) => {
                return Err(EthError::OutcomeUnknown {
                    tx_hash: tx_hash.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        let body: Value = response.json().await.map_err(|e| EthError::OutcomeUnknown {
            tx_hash: tx_hash.to_string(),
            reason: e.to_string(),
        })?;

        match extract_result("eth_sendRawTransaction", body) {
            Ok(Value::String(hash)) => Ok(hash),
            Ok(other) => Err(EthError::OutcomeUnknown {
                tx_hash: tx_hash.to_string(),
                reason: format!("unexpected result: {other}"),
            }),
            Err(EthError::Rpc { message, .. }) => Err(EthError::Broadcast(message)),
            Err(e) => Err(EthError::OutcomeUnknown {
                tx_hash: tx_hash.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn payload(&self, method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        })
    }
}

fn extract_result(method: &str, mut body: Value) -> Result<Value, EthError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        return Err(EthError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    match body.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(EthError::InvalidResponse(format!(
            "missing result in {method} response"
        ))),
    }
}

/// Parses a hex quantity such as `"0x1bc16d674ec80000"`.
pub fn parse_quantity(value: &Value) -> Result<U256, EthError> {
    let text = value
        .as_str()
        .ok_or_else(|| EthError::InvalidResponse(format!("expected hex string, got {value}")))?;
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| EthError::InvalidResponse(format!("missing 0x prefix: {text}")))?;

    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 16)
        .map_err(|e| EthError::InvalidResponse(format!("bad quantity {text}: {e}")))
}

/// Parses a hex quantity that must fit in 64 bits (nonce, gas, block number).
pub fn parse_u64_quantity(value: &Value) -> Result<u64, EthError> {
    let quantity = parse_quantity(value)?;
    u64::try_from(quantity)
        .map_err(|_| EthError::InvalidResponse(format!("quantity {quantity} exceeds u64")))
}

/// Renders a quantity without leading zeros, as JSON-RPC requires.
pub fn format_quantity(value: U256) -> String {
    format!("0x{value:x}")
}

/// Parses `0x`-prefixed hex data (call results).
pub fn parse_data(value: &Value) -> Result<Vec<u8>, EthError> {
    let text = value
        .as_str()
        .ok_or_else(|| EthError::InvalidResponse(format!("expected hex data, got {value}")))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| EthError::InvalidResponse(format!("bad hex data: {e}")))
}

#[cfg(test)]
pub(crate) mod stub {
    //! Loopback HTTP server answering JSON-RPC calls from a fixed table.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    pub(crate) struct RpcStub {
        pub url: String,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl RpcStub {
        /// Methods received so far, in order.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    /// `responses` maps a method name to either `{"result": ..}` or `{"error": ..}`.
    pub(crate) async fn spawn(responses: HashMap<&'static str, Value>) -> RpcStub {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let calls = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(responses);

        let recorded = calls.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let responses = responses.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &responses, &recorded).await;
                });
            }
        });

        RpcStub { url, calls }
    }

    async fn serve(
        mut stream: TcpStream,
        responses: &HashMap<&'static str, Value>,
        recorded: &Mutex<Vec<String>>,
    ) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Ok(());
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let request: Value = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
        let method = request["method"].as_str().unwrap_or_default().to_string();
        recorded.lock().unwrap().push(method.clone());

        let mut reply = responses.get(method.as_str()).cloned().unwrap_or_else(|| {
            json!({ "error": { "code": -32601, "message": "method not found" } })
        });
        reply["jsonrpc"] = json!("2.0");
        reply["id"] = request["id"].clone();

        let body = reply.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await
    }
}
