// Per-network relay pipeline: subscription loop and event dispatch

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::{RelayExecutor, RelayOutcome, Route};
use crate::chains::{Chain, ChainError, LogRecord};
use crate::events::DepositEvent;
use crate::metrics::RelayerMetrics;

/// One always-on relay pipeline: listens for deposits on its source chain
/// and forwards those addressed to the peer. Owns its connection and route;
/// shares nothing mutable with the other pipeline.
pub struct RelayPipeline {
    source: Arc<dyn Chain>,
    executor: Arc<RelayExecutor>,
    metrics: Arc<RelayerMetrics>,
    shutdown: watch::Receiver<bool>,
}

impl RelayPipeline {
    pub fn new(
        source: Arc<dyn Chain>,
        route: Route,
        metrics: Arc<RelayerMetrics>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let executor = Arc::new(RelayExecutor::new(source.name(), route));
        Self {
            source,
            executor,
            metrics,
            shutdown,
        }
    }

    /// Consume the deposit subscription until shutdown, or until the
    /// provider drops the stream. Each decoded event is handled in its own
    /// task, so in-flight relays never block the subscription loop or each
    /// other, and a failed relay never affects the next event.
    pub async fn run(self) -> Result<(), ChainError> {
        let Self {
            source,
            executor,
            metrics,
            mut shutdown,
        } = self;

        let mut deposits = source.subscribe_deposits().await?;
        info!(chain = %source.name(), "listening for Deposited events");

        loop {
            tokio::select! {
                maybe_log = deposits.next() => match maybe_log {
                    Some(record) => Self::dispatch(&source, &executor, &metrics, record),
                    None => {
                        error!(chain = %source.name(), "deposit subscription ended, pipeline stopping");
                        return Err(ChainError::Subscription(
                            "deposit log stream closed".to_string(),
                        ));
                    }
                },
                changed = shutdown.changed() => {
                    // a dropped sender also means the process is going down
                    if changed.is_err() || *shutdown.borrow() {
                        info!(chain = %source.name(), "relay pipeline stopping");
                        return Ok(());
                    }
                }
            }
        }
    }

    fn dispatch(
        source: &Arc<dyn Chain>,
        executor: &Arc<RelayExecutor>,
        metrics: &Arc<RelayerMetrics>,
        record: LogRecord,
    ) {
        let event = match DepositEvent::decode(&record) {
            Ok(event) => event,
            Err(e) => {
                metrics.log_decode_errors.inc();
                warn!(chain = %source.name(), error = %e, "skipping undecodable log");
                return;
            }
        };

        metrics.deposits_detected.inc();
        info!(
            chain = %source.name(),
            resource_id = ?event.resource_id,
            user = ?event.user,
            amount = %event.amount,
            dest_chain_id = event.dest_chain_id,
            original_tx = ?event.original_tx_hash,
            block = record.block_number,
            "Deposited event detected"
        );

        let executor = executor.clone();
        let metrics = metrics.clone();
        let source_name = source.name().to_string();
        tokio::spawn(async move {
            let timer = metrics.relay_duration.start_timer();
            match executor.handle(event).await {
                Ok(RelayOutcome::Relayed { .. }) => {
                    metrics.deposits_relayed.inc();
                    timer.observe_duration();
                }
                Ok(RelayOutcome::Skipped) => {
                    timer.stop_and_discard();
                }
                Err(e) => {
                    metrics.relays_failed.inc();
                    timer.stop_and_discard();
                    error!(chain = %source_name, error = %e, "relay failed, event dropped");
                }
            }
        });
    }
}
