use alloy_primitives::U256;
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use sha3::{Digest, Keccak256};

use crate::address::parse_address;
use crate::erc20;
use crate::error::EthError;

/// An unsigned legacy (pre-typed) transaction.
#[derive(Debug, Clone)]
pub struct LegacyTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// Recipient as raw bytes.
    pub to: [u8; 20],
    /// Native value in wei.
    pub value: U256,
    /// Call data (empty for plain value transfers).
    pub data: Vec<u8>,
}

/// A signed legacy transaction ready for `eth_sendRawTransaction`.
pub struct SignedLegacyTransaction {
    pub raw_tx: Vec<u8>,
    /// `0x`-prefixed Keccak-256 of `raw_tx`.
    pub tx_hash: String,
}

impl SignedLegacyTransaction {
    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

/// Builds a native value transfer.
pub fn build_native_transfer(
    chain_id: u64,
    nonce: u64,
    to: &str,
    value_wei: U256,
    gas_price: U256,
    gas_limit: u64,
) -> Result<LegacyTransaction, EthError> {
    Ok(LegacyTransaction {
        chain_id,
        nonce,
        gas_price,
        gas_limit,
        to: parse_address(to)?,
        value: value_wei,
        data: Vec::new(),
    })
}

/// Builds a token transfer: zero native value, addressed to the contract,
/// carrying `transfer(address,uint256)` call data.
pub fn build_token_transfer(
    chain_id: u64,
    nonce: u64,
    token_contract: &str,
    to: &str,
    amount: U256,
    gas_price: U256,
    gas_limit: u64,
) -> Result<LegacyTransaction, EthError> {
    Ok(LegacyTransaction {
        chain_id,
        nonce,
        gas_price,
        gas_limit,
        to: parse_address(token_contract)?,
        value: U256::ZERO,
        data: erc20::encode_transfer(to, amount)?,
    })
}

/// Signs with the EIP-155 replay-protected scheme.
///
/// 1. `sighash = keccak256(rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0]))`
/// 2. Sign the prehash; `v = recovery_id + 35 + 2 * chainId`.
/// 3. `raw = rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`, hash is `keccak256(raw)`.
pub fn sign_transaction(
    tx: &LegacyTransaction,
    private_key: &[u8; 32],
) -> Result<SignedLegacyTransaction, EthError> {
    let sighash = Keccak256::digest(encode_signing_payload(tx));

    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| EthError::InvalidPrivateKey(e.to_string()))?;

    let (signature, recovery_id): (Signature, RecoveryId) = signing_key
        .sign_prehash_recoverable(sighash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let v = tx
        .chain_id
        .checked_mul(2)
        .and_then(|c| c.checked_add(35 + recovery_id.is_y_odd() as u64))
        .ok_or_else(|| EthError::SigningError("chain id overflows v".into()))?;

    let signed = SignedFields {
        nonce: tx.nonce,
        gas_price: RlpU256(tx.gas_price),
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: RlpU256(tx.value),
        data: RlpBytes(tx.data.clone()),
        v,
        r: RlpU256(U256::from_be_slice(&signature.r().to_bytes())),
        s: RlpU256(U256::from_be_slice(&signature.s().to_bytes())),
    };

    let mut raw_tx = Vec::with_capacity(signed.length());
    signed.encode(&mut raw_tx);

    let tx_hash = format!("0x{}", hex::encode(Keccak256::digest(&raw_tx)));

    Ok(SignedLegacyTransaction { raw_tx, tx_hash })
}

/// RLP of the nine-field EIP-155 signing payload.
pub fn encode_signing_payload(tx: &LegacyTransaction) -> Vec<u8> {
    let unsigned = UnsignedFields {
        nonce: tx.nonce,
        gas_price: RlpU256(tx.gas_price),
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: RlpU256(tx.value),
        data: RlpBytes(tx.data.clone()),
        chain_id: tx.chain_id,
        empty_r: 0,
        empty_s: 0,
    };

    let mut buf = Vec::with_capacity(unsigned.length());
    unsigned.encode(&mut buf);
    buf
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedFields {
    nonce: u64,
    gas_price: RlpU256,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    chain_id: u64,
    empty_r: u8,
    empty_s: u8,
}

#[derive(RlpEncodable)]
struct SignedFields {
    nonce: u64,
    gas_price: RlpU256,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    v: u64,
    r: RlpU256,
    s: RlpU256,
}

/// 20-byte address encoded as an RLP string.
#[derive(Debug, Clone)]
struct RlpAddress([u8; 20]);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Call data encoded as an RLP string, not a list of integers.
#[derive(Debug, Clone)]
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// 256-bit integer encoded as minimal big-endian bytes (leading zeros stripped).
#[derive(Debug, Clone)]
struct RlpU256(U256);

impl RlpU256 {
    fn trimmed(&self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes::<32>();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(32);
        bytes[start..].to_vec()
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().as_slice().length()
    }
}
