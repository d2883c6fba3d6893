//! EVM chain support for the HD wallet engine.
//!
//! This crate provides:
//! - Address derivation from secp256k1 keys (EIP-55 checksummed rendering)
//! - Minimal ABI encoding and ERC-20 call data (`transfer`, `balanceOf`)
//! - Legacy (pre-typed) transaction building with EIP-155 signing
//! - A JSON-RPC transport and the [`client::EvmClient`] built on it

pub mod abi;
pub mod address;
pub mod client;
pub mod erc20;
pub mod error;
pub mod rpc;
pub mod transaction;

pub use alloy_primitives::U256;
pub use client::{EvmClient, EvmClientConfig};
pub use error::EthError;
