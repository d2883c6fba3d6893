//! TRON chain support for the HD wallet engine.
//!
//! Provides base58check address derivation (0x41 prefix), the protobuf
//! messages of the node's `protocol.Wallet` gRPC service, transaction id
//! computation and signing, and a [`client::TronClient`] that probes node
//! health before each call and rebuilds its channel once on transport loss.

pub mod address;
pub mod client;
pub mod error;
pub mod proto;
pub mod transaction;

pub use client::{AccountInfo, ConnectionState, TronClient, TronClientConfig};
pub use error::TronError;
pub use transaction::UnsignedTransaction;
