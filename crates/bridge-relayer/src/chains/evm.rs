// EVM chain connection over a websocket provider

use std::sync::Arc;

use async_trait::async_trait;
use ethers::contract::EthEvent;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Middleware, PendingTransaction, Provider, Ws};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::{Address, Filter, H256, U64};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use super::contract::{DepositBridge, DepositedFilter};
use super::{Chain, ChainError, ExecuteCall, LogRecord};
use crate::config::ChainConfig;

type WsClient = SignerMiddleware<Provider<Ws>, LocalWallet>;

/// One EVM network: a signing websocket client plus the bridge contract
/// deployed on it.
pub struct EvmChain {
    name: String,
    chain_id: u64,
    client: Arc<WsClient>,
    contract: DepositBridge<WsClient>,
}

impl EvmChain {
    /// Connect to the configured endpoint, bind the signing key to the
    /// configured chain id and verify the node actually serves that chain.
    pub async fn connect(
        name: &str,
        config: &ChainConfig,
        signing_key: &str,
    ) -> Result<Self, ChainError> {
        let provider = Provider::<Ws>::connect(&config.ws_endpoint)
            .await
            .map_err(|e| ChainError::Connection(format!("{}: {e}", config.ws_endpoint)))?;

        let wallet: LocalWallet = signing_key
            .parse()
            .map_err(|e| ChainError::Connection(format!("invalid signing key: {e}")))?;
        let wallet = wallet.with_chain_id(config.chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        let reported = client
            .get_chainid()
            .await
            .map_err(|e| ChainError::Connection(e.to_string()))?;
        if reported.as_u64() != config.chain_id {
            return Err(ChainError::Connection(format!(
                "endpoint {} serves chain {} but configuration expects {}",
                config.ws_endpoint, reported, config.chain_id
            )));
        }

        let address: Address = config
            .contract_address
            .parse()
            .map_err(|e| ChainError::Connection(format!("invalid contract address: {e}")))?;
        let contract = DepositBridge::new(address, client.clone());

        Ok(Self {
            name: name.to_string(),
            chain_id: config.chain_id,
            client,
            contract,
        })
    }
}

#[async_trait]
impl Chain for EvmChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn subscribe_deposits(
        &self,
    ) -> Result<Box<dyn Stream<Item = LogRecord> + Send + Unpin>, ChainError> {
        let filter = Filter::new()
            .address(self.contract.address())
            .topic0(DepositedFilter::signature());

        let client = self.client.clone();
        let name = self.name.clone();
        let (log_tx, mut log_rx) = mpsc::channel::<LogRecord>(1024);
        let (ready_tx, ready_rx) = oneshot::channel();

        // The ethers subscription stream borrows its provider, so the
        // subscription lives in its own task and forwards into an owned
        // channel. Dropping the returned stream tears the task down.
        tokio::spawn(async move {
            let mut stream = match client.subscribe_logs(&filter).await {
                Ok(stream) => {
                    if ready_tx.send(Ok(())).is_err() {
                        return;
                    }
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(ChainError::Subscription(e.to_string())));
                    return;
                }
            };
            while let Some(log) = stream.next().await {
                if log_tx.send(LogRecord::from(log)).await.is_err() {
                    return;
                }
            }
            warn!(chain = %name, "deposit log subscription closed by provider");
        });

        ready_rx
            .await
            .map_err(|_| ChainError::Subscription("subscription task exited".to_string()))??;

        let stream = futures::stream::poll_fn(move |cx| log_rx.poll_recv(cx));
        Ok(Box::new(stream))
    }

    async fn submit_execute(&self, call: &ExecuteCall) -> Result<H256, ChainError> {
        let tx = self.contract.execute_tx(
            call.original_tx_hash.to_fixed_bytes(),
            call.resource_id.to_fixed_bytes(),
            call.user,
            call.amount,
        );
        let pending = tx
            .send()
            .await
            .map_err(|e| ChainError::Submission(e.to_string()))?;
        Ok(*pending)
    }

    async fn await_confirmation(&self, tx_hash: H256) -> Result<H256, ChainError> {
        let pending = PendingTransaction::new(tx_hash, self.client.provider());
        let receipt = pending
            .await
            .map_err(|e| ChainError::Confirmation(e.to_string()))?
            .ok_or_else(|| {
                ChainError::Confirmation(format!("transaction {tx_hash:?} dropped without a receipt"))
            })?;
        if receipt.status == Some(U64::zero()) {
            return Err(ChainError::Confirmation(format!(
                "transaction {tx_hash:?} reverted"
            )));
        }
        Ok(receipt.transaction_hash)
    }

    async fn latest_height(&self) -> Result<u64, ChainError> {
        let height = self
            .client
            .get_block_number()
            .await
            .map_err(|e| ChainError::Connection(e.to_string()))?;
        Ok(height.as_u64())
    }
}
