// Relay execution: routing decision, submission, confirmation wait

use tracing::{debug, info};

use super::{RelayError, RelayOutcome, Route};
use crate::chains::ExecuteCall;
use crate::events::DepositEvent;

/// Decides whether a deposit event is addressed to this pipeline's peer
/// chain and, if so, forwards it as an `executeTx` call and waits for its
/// confirmation.
pub struct RelayExecutor {
    source_name: String,
    route: Route,
}

impl RelayExecutor {
    pub fn new(source_name: impl Into<String>, route: Route) -> Self {
        Self {
            source_name: source_name.into(),
            route,
        }
    }

    pub fn peer_chain_id(&self) -> u64 {
        self.route.peer_chain_id
    }

    /// Handle one decoded deposit event. Nothing is retried, and no
    /// idempotency check precedes submission: a duplicate delivery is
    /// submitted again, leaving deduplication by `originalTxHash` to the
    /// destination contract.
    pub async fn handle(&self, event: DepositEvent) -> Result<RelayOutcome, RelayError> {
        if event.dest_chain_id != self.route.peer_chain_id {
            debug!(
                source = %self.source_name,
                dest_chain_id = event.dest_chain_id,
                peer_chain_id = self.route.peer_chain_id,
                "deposit not addressed to peer chain, ignoring"
            );
            return Ok(RelayOutcome::Skipped);
        }

        let dest = &self.route.destination;
        let call = ExecuteCall {
            original_tx_hash: event.original_tx_hash,
            resource_id: event.resource_id,
            user: event.user,
            amount: event.amount,
        };

        let submitted =
            dest.submit_execute(&call)
                .await
                .map_err(|source| RelayError::Submission {
                    chain: dest.name().to_string(),
                    source,
                })?;
        info!(chain = %dest.name(), tx_hash = ?submitted, "executeTx submitted");

        let confirmed =
            dest.await_confirmation(submitted)
                .await
                .map_err(|source| RelayError::Confirmation {
                    chain: dest.name().to_string(),
                    source,
                })?;
        info!(chain = %dest.name(), tx_hash = ?confirmed, "executeTx confirmed");

        Ok(RelayOutcome::Relayed {
            submitted,
            confirmed,
        })
    }
}
