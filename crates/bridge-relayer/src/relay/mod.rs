// Core relay pipeline: routing, execution, event consumption

pub mod executor;
pub mod pipeline;

use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::H256;
use thiserror::Error;

use crate::chains::{Chain, ChainError};

pub use executor::RelayExecutor;
pub use pipeline::RelayPipeline;

/// Errors raised while forwarding one deposit event. Caught at the level of
/// that single event; never retried, never fatal to a pipeline.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("submission to {chain} failed: {source}")]
    Submission { chain: String, source: ChainError },

    #[error("confirmation on {chain} failed: {source}")]
    Confirmation { chain: String, source: ChainError },
}

/// Outcome of handling one deposit event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The event designates a chain other than this pipeline's peer.
    Skipped,
    /// The event was forwarded and confirmed on the peer chain.
    Relayed { submitted: H256, confirmed: H256 },
}

/// One routing entry: the peer identifier an event must designate and the
/// connection used to reach that peer.
#[derive(Clone)]
pub struct Route {
    pub peer_chain_id: u64,
    pub destination: Arc<dyn Chain>,
}

/// Static two-entry association wiring each chain to the other. Built once
/// at start-up, immutable thereafter; no third network.
pub struct RoutingTable {
    routes: HashMap<u64, Route>,
}

impl RoutingTable {
    pub fn for_pair(a: Arc<dyn Chain>, b: Arc<dyn Chain>) -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            a.chain_id(),
            Route {
                peer_chain_id: b.chain_id(),
                destination: b.clone(),
            },
        );
        routes.insert(
            b.chain_id(),
            Route {
                peer_chain_id: a.chain_id(),
                destination: a,
            },
        );
        Self { routes }
    }

    pub fn route_for(&self, source_chain_id: u64) -> Option<&Route> {
        self.routes.get(&source_chain_id)
    }
}
