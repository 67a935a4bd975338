// Deposit event decoding

use ethers::abi::RawLog;
use ethers::contract::EthEvent;
use ethers::types::{Address, H256, U256};
use thiserror::Error;

use crate::chains::contract::DepositedFilter;
use crate::chains::LogRecord;

/// Errors raised while decoding a raw log into a [`DepositEvent`]. Handled
/// per log; a failed decode never affects subsequent logs.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("log does not carry the Deposited event signature")]
    SignatureMismatch,

    #[error("malformed Deposited log: {0}")]
    Malformed(String),

    #[error("log is missing its originating transaction hash")]
    MissingTxHash,
}

/// A decoded `Deposited` event. The four payload fields pass through to the
/// destination call unchanged; `original_tx_hash` is taken from the log
/// record, never re-derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    pub resource_id: H256,
    pub user: Address,
    pub amount: U256,
    pub dest_chain_id: u64,
    pub original_tx_hash: H256,
}

impl DepositEvent {
    pub fn decode(record: &LogRecord) -> Result<Self, DecodeError> {
        match record.topics.first() {
            Some(topic0) if *topic0 == DepositedFilter::signature() => {}
            _ => return Err(DecodeError::SignatureMismatch),
        }

        let raw = RawLog {
            topics: record.topics.clone(),
            data: record.data.clone(),
        };
        let decoded = <DepositedFilter as EthEvent>::decode_log(&raw)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let original_tx_hash = record.tx_hash.ok_or(DecodeError::MissingTxHash)?;

        Ok(Self {
            resource_id: H256::from(decoded.resource_id),
            user: decoded.user,
            amount: decoded.amount,
            dest_chain_id: decoded.dest_chain_id,
            original_tx_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::abi::{encode, Token};

    fn address_topic(addr: Address) -> H256 {
        let mut topic = [0u8; 32];
        topic[12..].copy_from_slice(addr.as_bytes());
        H256::from(topic)
    }

    fn deposited_record(
        resource_id: H256,
        user: Address,
        amount: U256,
        dest_chain_id: u64,
        tx_hash: Option<H256>,
    ) -> LogRecord {
        LogRecord {
            address: Address::repeat_byte(0xbb),
            topics: vec![
                DepositedFilter::signature(),
                resource_id,
                address_topic(user),
            ],
            data: encode(&[
                Token::Uint(amount),
                Token::Uint(U256::from(dest_chain_id)),
            ]),
            block_number: Some(100),
            tx_hash,
            log_index: Some(0),
        }
    }

    #[test]
    fn decodes_all_fields_unchanged() {
        let resource_id = H256::repeat_byte(0x11);
        let user = Address::repeat_byte(0x22);
        // larger than any u64 to catch truncating conversions
        let amount = U256::exp10(30);
        let tx_hash = H256::repeat_byte(0x33);

        let record = deposited_record(resource_id, user, amount, 84532, Some(tx_hash));
        let event = DepositEvent::decode(&record).unwrap();

        assert_eq!(event.resource_id, resource_id);
        assert_eq!(event.user, user);
        assert_eq!(event.amount, amount);
        assert_eq!(event.dest_chain_id, 84532);
        assert_eq!(event.original_tx_hash, tx_hash);
    }

    #[test]
    fn rejects_foreign_event_signature() {
        let mut record = deposited_record(
            H256::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(1u64),
            84532,
            Some(H256::repeat_byte(0x33)),
        );
        record.topics[0] = H256::repeat_byte(0xff);

        assert!(matches!(
            DepositEvent::decode(&record),
            Err(DecodeError::SignatureMismatch)
        ));
    }

    #[test]
    fn rejects_log_without_topics() {
        let mut record = deposited_record(
            H256::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(1u64),
            84532,
            Some(H256::repeat_byte(0x33)),
        );
        record.topics.clear();

        assert!(matches!(
            DepositEvent::decode(&record),
            Err(DecodeError::SignatureMismatch)
        ));
    }

    #[test]
    fn rejects_truncated_data() {
        let mut record = deposited_record(
            H256::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(1u64),
            84532,
            Some(H256::repeat_byte(0x33)),
        );
        record.data.truncate(31);

        assert!(matches!(
            DepositEvent::decode(&record),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_log_without_tx_hash() {
        let record = deposited_record(
            H256::repeat_byte(0x11),
            Address::repeat_byte(0x22),
            U256::from(1u64),
            84532,
            None,
        );

        assert!(matches!(
            DepositEvent::decode(&record),
            Err(DecodeError::MissingTxHash)
        ));
    }
}
