// Metrics and monitoring

use std::sync::Arc;

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

/// Relayer metrics, one instance shared by both pipelines.
pub struct RelayerMetrics {
    pub deposits_detected: Counter,
    pub deposits_relayed: Counter,
    pub relays_failed: Counter,
    pub log_decode_errors: Counter,
    pub relay_duration: Histogram,

    registry: Arc<Registry>,
}

impl RelayerMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let deposits_detected = Counter::new(
            "bridge_deposits_detected_total",
            "Deposited events decoded from source-chain logs",
        )?;
        let deposits_relayed = Counter::new(
            "bridge_deposits_relayed_total",
            "Deposits confirmed on the destination chain",
        )?;
        let relays_failed = Counter::new(
            "bridge_relays_failed_total",
            "Deposits whose destination submission or confirmation failed",
        )?;
        let log_decode_errors = Counter::new(
            "bridge_log_decode_errors_total",
            "Source logs that did not decode as Deposited events",
        )?;
        let relay_duration = Histogram::with_opts(HistogramOpts::new(
            "bridge_relay_duration_seconds",
            "Time from detection to destination confirmation",
        ))?;

        registry.register(Box::new(deposits_detected.clone()))?;
        registry.register(Box::new(deposits_relayed.clone()))?;
        registry.register(Box::new(relays_failed.clone()))?;
        registry.register(Box::new(log_decode_errors.clone()))?;
        registry.register(Box::new(relay_duration.clone()))?;

        Ok(Self {
            deposits_detected,
            deposits_relayed,
            relays_failed,
            log_decode_errors,
            relay_duration,
            registry,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }
}
