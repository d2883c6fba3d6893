use k256::ecdsa::SigningKey;
use prost::Message;
use sha2::{Digest, Sha256};

use crate::error::TronError;
use crate::proto::Transaction;

/// A node-built transaction awaiting a signature.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    pub transaction: Transaction,
    /// `sha256(raw_data)`, computed locally after the fee limit was applied.
    pub txid: [u8; 32],
}

impl UnsignedTransaction {
    /// Wraps a node-built transaction, optionally overriding its fee limit.
    ///
    /// The id the node returned is discarded; it is recomputed from the
    /// final `raw_data` so that it always matches what gets signed.
    pub fn from_node(
        mut transaction: Transaction,
        fee_limit: Option<i64>,
    ) -> Result<Self, TronError> {
        if let Some(limit) = fee_limit {
            let raw = transaction
                .raw_data
                .as_mut()
                .ok_or_else(|| TronError::EncodingError("transaction has no raw_data".into()))?;
            raw.fee_limit = limit;
        }

        let txid = transaction_id(&transaction)?;
        Ok(Self { transaction, txid })
    }

    pub fn txid_hex(&self) -> String {
        hex::encode(self.txid)
    }
}

/// Transaction id: SHA-256 of the protobuf-encoded `raw_data`.
pub fn transaction_id(transaction: &Transaction) -> Result<[u8; 32], TronError> {
    let raw = transaction
        .raw_data
        .as_ref()
        .ok_or_else(|| TronError::EncodingError("transaction has no raw_data".into()))?;
    Ok(Sha256::digest(raw.encode_to_vec()).into())
}

/// Signs the transaction id and appends a 65-byte `r || s || v` signature.
///
/// `v` is the bare recovery id (0 or 1). The input is left untouched.
pub fn sign_transaction(
    unsigned: &UnsignedTransaction,
    private_key: &[u8; 32],
) -> Result<Transaction, TronError> {
    let txid = transaction_id(&unsigned.transaction)?;

    let signing_key = SigningKey::from_bytes(private_key.into())
        .map_err(|e| TronError::InvalidPrivateKey(e.to_string()))?;
    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(&txid)
        .map_err(|e| TronError::SigningError(e.to_string()))?;

    let mut sig = Vec::with_capacity(65);
    sig.extend_from_slice(&signature.to_bytes());
    sig.push(recovery_id.to_byte());

    let mut signed = unsigned.transaction.clone();
    signed.signature.push(sig);
    Ok(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::private_key_to_address;
    use crate::proto::{Any, Contract, ContractType, TransactionRaw, TransferContract};
    use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

    fn key_one() -> [u8; 32] {
        let mut key = [0u8; 32];
        key[31] = 1;
        key
    }

    fn sample_transaction() -> Transaction {
        let transfer = TransferContract {
            owner_address: vec![0x41; 21],
            to_address: vec![0x42; 21],
            amount: 1_000_000,
        };
        Transaction {
            raw_data: Some(TransactionRaw {
                ref_block_bytes: vec![0x12, 0x34],
                ref_block_hash: vec![0xab; 8],
                expiration: 1_700_000_060_000,
                timestamp: 1_700_000_000_000,
                contract: vec![Contract {
                    r#type: ContractType::TransferContract as i32,
                    parameter: Some(Any {
                        type_url: "type.googleapis.com/protocol.TransferContract".into(),
                        value: transfer.encode_to_vec(),
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            signature: Vec::new(),
        }
    }

    #[test]
    fn txid_is_sha256_of_raw_data() {
        let tx = sample_transaction();
        let expected: [u8; 32] =
            Sha256::digest(tx.raw_data.as_ref().unwrap().encode_to_vec()).into();
        assert_eq!(transaction_id(&tx).unwrap(), expected);
    }

    #[test]
    fn fee_limit_changes_txid() {
        let plain = UnsignedTransaction::from_node(sample_transaction(), None).unwrap();
        let limited = UnsignedTransaction::from_node(sample_transaction(), Some(50_000_000)).unwrap();

        assert_ne!(plain.txid, limited.txid);
        assert_eq!(
            limited.transaction.raw_data.as_ref().unwrap().fee_limit,
            50_000_000
        );
        assert_eq!(limited.txid, transaction_id(&limited.transaction).unwrap());
    }

    #[test]
    fn missing_raw_data_is_error() {
        let tx = Transaction::default();
        assert!(transaction_id(&tx).is_err());
        assert!(UnsignedTransaction::from_node(tx, Some(1)).is_err());
    }

    #[test]
    fn signature_is_65_bytes_and_recovers_signer() {
        let unsigned = UnsignedTransaction::from_node(sample_transaction(), Some(1)).unwrap();
        let signed = sign_transaction(&unsigned, &key_one()).unwrap();

        assert_eq!(signed.signature.len(), 1);
        let sig = &signed.signature[0];
        assert_eq!(sig.len(), 65);
        assert!(sig[64] <= 1);

        let signature = Signature::from_slice(&sig[..64]).unwrap();
        let recid = RecoveryId::from_byte(sig[64]).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(&unsigned.txid, &signature, recid).unwrap();

        let point = recovered.to_encoded_point(false);
        let pubkey: [u8; 65] = point.as_bytes().try_into().unwrap();
        assert_eq!(
            crate::address::pubkey_to_address(&pubkey).unwrap(),
            private_key_to_address(&key_one()).unwrap()
        );
    }

    #[test]
    fn signing_does_not_change_txid() {
        let unsigned = UnsignedTransaction::from_node(sample_transaction(), Some(1)).unwrap();
        let signed = sign_transaction(&unsigned, &key_one()).unwrap();
        assert_eq!(transaction_id(&signed).unwrap(), unsigned.txid);
        assert!(unsigned.transaction.signature.is_empty());
    }

    #[test]
    fn invalid_key_is_rejected() {
        let unsigned = UnsignedTransaction::from_node(sample_transaction(), None).unwrap();
        assert!(matches!(
            sign_transaction(&unsigned, &[0u8; 32]),
            Err(TronError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn txid_hex_is_64_chars() {
        let unsigned = UnsignedTransaction::from_node(sample_transaction(), None).unwrap();
        assert_eq!(unsigned.txid_hex().len(), 64);
    }
}
