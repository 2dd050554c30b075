//! Terminal outcomes and the worker that produces them.
//!
//! One dispatch = one permit, one serialization, one network call, one
//! outcome. The permit is an RAII guard held for the whole call, so every
//! exit path releases exactly once. The API's answer is classified the way
//! the endpoint defines success: HTTP 200 means the document was accepted,
//! anything else is a rejection, and calls that never produce a response are
//! failures.

use std::sync::Arc;

use serde::Serialize;
use tokio::time::Instant;

use crate::gate::CapacityGate;
use crate::queue::Task;
use crate::telemetry::{ClientEvent, EventSink};
use crate::transport::{Transport, TransportError};

/// The only status the registration API uses for a successful creation.
pub const SUCCESS_STATUS: u16 = 200;

/// Why a dispatch produced no usable HTTP response.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    /// The payload could not be serialized to JSON.
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The outbound call itself failed.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
}

/// Terminal result of one submission.
#[derive(Debug)]
pub enum Outcome {
    /// The API accepted the document; carries the response body.
    Accepted {
        /// Response body returned by the API.
        body: String,
    },
    /// The API answered with a non-success status.
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Response body returned by the API.
        body: String,
    },
    /// Serialization or transport failed; no response arrived.
    Failed(DispatchError),
}

impl Outcome {
    /// True when the API accepted the document.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    /// HTTP status of the response, when one arrived at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Accepted { .. } => Some(SUCCESS_STATUS),
            Outcome::Rejected { status, .. } => Some(*status),
            Outcome::Failed(_) => None,
        }
    }
}

/// Shared dispatch machinery: the gate, the wire, and the event sink.
///
/// Cheap to share; the replenisher spawns one `run` per admitted task.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    gate: CapacityGate,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub(crate) fn new(
        gate: CapacityGate,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { gate, transport, sink }
    }

    /// Carries one task to its terminal outcome.
    ///
    /// Waits for a permit, performs the call, reports through the log and the
    /// sink, then releases the permit and fires the completion hook.
    pub(crate) async fn run<P: Serialize>(&self, task: Task<P>) {
        let Task { payload, signature, completed, .. } = task;

        let permit = self.gate.acquire().await;
        let started = Instant::now();
        let outcome = self.perform(&payload, &signature).await;
        let elapsed = started.elapsed();

        match &outcome {
            Outcome::Accepted { body } => {
                tracing::info!(elapsed = ?elapsed, body = %body, "document created");
            }
            Outcome::Rejected { status, body } => {
                tracing::warn!(status = *status, body = %body, "document creation rejected");
            }
            Outcome::Failed(error) => {
                tracing::error!(error = %error, "document dispatch failed");
            }
        }
        self.sink.record(ClientEvent::Completed {
            status: outcome.status(),
            accepted: outcome.is_accepted(),
            elapsed,
        });

        // The permit goes back before the completion fires, so a submitter
        // that awaits its outcome never sees the pool still short. A dropped
        // handle is not an error; the outcome is already logged and recorded.
        drop(permit);
        let _ = completed.send(outcome);
    }

    async fn perform<P: Serialize>(&self, payload: &P, signature: &str) -> Outcome {
        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(err) => return Outcome::Failed(DispatchError::Serialize(err)),
        };

        match self.transport.send(body, signature).await {
            Ok(response) if response.status == SUCCESS_STATUS => {
                Outcome::Accepted { body: response.body }
            }
            Ok(response) => Outcome::Rejected { status: response.status, body: response.body },
            Err(err) => Outcome::Failed(DispatchError::Transport(err)),
        }
    }
}
