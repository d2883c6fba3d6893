//! Subset of the `protocol` package served by TRON full nodes.
//!
//! Declared by hand with field tags matching `core/Tron.proto`,
//! `core/contract/*.proto` and `api/api.proto`. Only the fields this crate
//! reads or writes are present; unknown fields are skipped on decode.

use std::collections::HashMap;

/// gRPC method paths on the `protocol.Wallet` service.
pub mod path {
    pub const GET_NODE_INFO: &str = "/protocol.Wallet/GetNodeInfo";
    pub const GET_ACCOUNT: &str = "/protocol.Wallet/GetAccount";
    pub const TRIGGER_CONSTANT_CONTRACT: &str = "/protocol.Wallet/TriggerConstantContract";
    pub const TRIGGER_CONTRACT: &str = "/protocol.Wallet/TriggerContract";
    pub const CREATE_TRANSACTION: &str = "/protocol.Wallet/CreateTransaction2";
    pub const TRANSFER_ASSET: &str = "/protocol.Wallet/TransferAsset2";
    pub const BROADCAST_TRANSACTION: &str = "/protocol.Wallet/BroadcastTransaction";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmptyMessage {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeInfo {
    #[prost(int64, tag = "1")]
    pub begin_sync_num: i64,
    #[prost(string, tag = "2")]
    pub block: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Account {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub address: Vec<u8>,
    /// Native balance in sun.
    #[prost(int64, tag = "4")]
    pub balance: i64,
    /// Legacy TRC10 balances keyed by asset name.
    #[prost(map = "string, int64", tag = "6")]
    pub asset: HashMap<String, i64>,
    #[prost(int64, tag = "9")]
    pub create_time: i64,
    /// TRC10 balances keyed by numeric asset id.
    #[prost(map = "string, int64", tag = "56")]
    pub asset_v2: HashMap<String, i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TriggerSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub call_value: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_token_value: i64,
    #[prost(int64, tag = "6")]
    pub token_id: i64,
}

/// `google.protobuf.Any`.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContractType {
    AccountCreateContract = 0,
    TransferContract = 1,
    TransferAssetContract = 2,
    TriggerSmartContract = 31,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Contract {
    #[prost(enumeration = "ContractType", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub parameter: Option<Any>,
    #[prost(bytes = "vec", tag = "3")]
    pub provider: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub contract_name: Vec<u8>,
    #[prost(int32, tag = "5")]
    pub permission_id: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountId {
    #[prost(bytes = "vec", tag = "1")]
    pub name: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub address: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Authority {
    #[prost(message, optional, tag = "1")]
    pub account: Option<AccountId>,
    #[prost(bytes = "vec", tag = "2")]
    pub permission_name: Vec<u8>,
}

/// `Transaction.raw`; its encoding is what the transaction id hashes.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub ref_block_bytes: Vec<u8>,
    #[prost(int64, tag = "3")]
    pub ref_block_num: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub ref_block_hash: Vec<u8>,
    #[prost(int64, tag = "8")]
    pub expiration: i64,
    #[prost(message, repeated, tag = "9")]
    pub auths: Vec<Authority>,
    #[prost(bytes = "vec", tag = "10")]
    pub data: Vec<u8>,
    #[prost(message, repeated, tag = "11")]
    pub contract: Vec<Contract>,
    #[prost(bytes = "vec", tag = "12")]
    pub scripts: Vec<u8>,
    #[prost(int64, tag = "14")]
    pub timestamp: i64,
    /// Maximum energy fee in sun the sender will pay.
    #[prost(int64, tag = "18")]
    pub fee_limit: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(message, optional, tag = "1")]
    pub raw_data: Option<TransactionRaw>,
    /// One 65-byte `r || s || v` signature per signing key.
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseCode {
    Success = 0,
    Sigerror = 1,
    ContractValidateError = 2,
    ContractExeError = 3,
    BandwithError = 4,
    DupTransactionError = 5,
    TaposError = 6,
    TooBigTransactionError = 7,
    TransactionExpirationError = 8,
    ServerBusy = 9,
    NoConnection = 10,
    NotEnoughEffectiveConnection = 11,
    OtherError = 20,
}

/// `protocol.Return`: the node's verdict on a build or broadcast call.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Return {
    #[prost(bool, tag = "1")]
    pub result: bool,
    #[prost(enumeration = "ResponseCode", tag = "2")]
    pub code: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub message: Vec<u8>,
}

impl Return {
    pub fn message_text(&self) -> String {
        String::from_utf8_lossy(&self.message).into_owned()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionExtention {
    #[prost(message, optional, tag = "1")]
    pub transaction: Option<Transaction>,
    #[prost(bytes = "vec", tag = "2")]
    pub txid: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub constant_result: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "4")]
    pub result: Option<Return>,
    #[prost(int64, tag = "5")]
    pub energy_used: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn transfer_contract_wire_layout() {
        let msg = TransferContract {
            owner_address: vec![0x41, 0x01],
            to_address: vec![0x41, 0x02],
            amount: 5,
        };
        // field 1 bytes, field 2 bytes, field 3 varint
        assert_eq!(
            msg.encode_to_vec(),
            vec![0x0a, 0x02, 0x41, 0x01, 0x12, 0x02, 0x41, 0x02, 0x18, 0x05]
        );
    }

    #[test]
    fn fee_limit_uses_tag_18() {
        let raw = TransactionRaw {
            fee_limit: 1,
            ..Default::default()
        };
        // (18 << 3) | 0 = 144 -> varint 0x90 0x01
        assert_eq!(raw.encode_to_vec(), vec![0x90, 0x01, 0x01]);
    }

    #[test]
    fn return_code_accessor() {
        let ret = Return {
            result: false,
            code: ResponseCode::ContractValidateError as i32,
            message: b"balance is not sufficient".to_vec(),
        };
        assert_eq!(ret.code(), ResponseCode::ContractValidateError);
        assert_eq!(ret.message_text(), "balance is not sufficient");
    }

    #[test]
    fn account_asset_v2_decodes() {
        let mut account = Account {
            balance: 1_000_000,
            ..Default::default()
        };
        account.asset_v2.insert("1002000".into(), 42);

        let decoded = Account::decode(account.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.balance, 1_000_000);
        assert_eq!(decoded.asset_v2.get("1002000"), Some(&42));
    }

    #[test]
    fn extention_without_result_defaults() {
        let ext = TransactionExtention::decode(&[][..]).unwrap();
        assert!(ext.result.is_none());
        assert!(ext.transaction.is_none());
    }
}
