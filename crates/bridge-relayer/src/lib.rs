// Deposit bridge relayer library
// This module structure exposes the relay components for testing and external use

pub mod chains;
pub mod config;
pub mod events;
pub mod metrics;
pub mod relay;

// Re-export commonly used types for convenience
pub use chains::{Chain, ChainError, EvmChain, ExecuteCall, LogRecord};
pub use config::{ChainConfig, GlobalConfig, MetricsConfig, RelayerConfig};
pub use events::{DecodeError, DepositEvent};
pub use metrics::RelayerMetrics;
pub use relay::{RelayError, RelayExecutor, RelayOutcome, RelayPipeline, Route, RoutingTable};
