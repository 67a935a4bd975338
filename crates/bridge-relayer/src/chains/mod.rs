// Chain connection types

use async_trait::async_trait;
use ethers::types::{Address, Log, H256, U256};
use futures::Stream;
use thiserror::Error;

pub mod contract;
pub mod evm;

pub use evm::EvmChain;

/// Errors surfaced by a chain connection, grouped by the relay step they
/// belong to so the relay layer can report them per event.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("submission rejected: {0}")]
    Submission(String),

    #[error("confirmation failed: {0}")]
    Confirmation(String),
}

/// Generic interface to one network: a live deposit-log subscription plus
/// typed submission of the destination `executeTx` call.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Numeric chain identifier used for routing comparisons.
    fn chain_id(&self) -> u64;

    /// Human-readable network name used in logs.
    fn name(&self) -> &str;

    /// Subscribe to `Deposited` logs emitted by the bridge contract.
    ///
    /// The stream is infinite while the underlying connection lives; it ends
    /// when the provider drops the subscription. Dropping the stream cancels
    /// the subscription.
    async fn subscribe_deposits(
        &self,
    ) -> Result<Box<dyn Stream<Item = LogRecord> + Send + Unpin>, ChainError>;

    /// Submit `executeTx` with the given arguments. Returns the transaction
    /// hash once the submission is accepted as pending.
    async fn submit_execute(&self, call: &ExecuteCall) -> Result<H256, ChainError>;

    /// Wait until the given transaction is included and settled. Returns the
    /// confirmed transaction hash; a dropped or reverted transaction is a
    /// `Confirmation` error.
    async fn await_confirmation(&self, tx_hash: H256) -> Result<H256, ChainError>;

    /// Latest block height, used as a connectivity probe.
    async fn latest_height(&self) -> Result<u64, ChainError>;
}

/// A raw, undecoded log as delivered by the subscription. Block number,
/// transaction hash and log index are absent on logs a node surfaces before
/// inclusion; decoding requires the transaction hash to be present.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Vec<u8>,
    pub block_number: Option<u64>,
    pub tx_hash: Option<H256>,
    pub log_index: Option<u64>,
}

impl From<Log> for LogRecord {
    fn from(log: Log) -> Self {
        Self {
            address: log.address,
            topics: log.topics,
            data: log.data.to_vec(),
            block_number: log.block_number.map(|n| n.as_u64()),
            tx_hash: log.transaction_hash,
            log_index: log.log_index.map(|i| i.as_u64()),
        }
    }
}

/// Arguments of the destination `executeTx` call, in contract order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCall {
    pub original_tx_hash: H256,
    pub resource_id: H256,
    pub user: Address,
    pub amount: U256,
}
