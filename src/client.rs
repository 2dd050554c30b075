//! The client facade: non-blocking submission against a fixed-window quota.
//!
//! [`Client::submit`] enqueues and returns immediately with a [`Submission`]
//! handle; admission, dispatch, and completion all happen on background
//! tasks. At most `request_limit` dispatches start per `window`, excess
//! submissions wait in FIFO order, and nothing is ever dropped or retried.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, Outcome};
use crate::document::Document;
use crate::gate::CapacityGate;
use crate::queue::{PendingQueue, Task};
use crate::replenisher::Replenisher;
use crate::telemetry::{ClientEvent, EventSink, LogSink};
use crate::transport::{HttpTransport, Transport, TransportError};

/// Completion handle for one submission.
///
/// Await [`outcome`](Self::outcome) for the terminal result, or drop the
/// handle for fire-and-forget; the dispatch itself is unaffected either way.
#[derive(Debug)]
pub struct Submission {
    outcome: oneshot::Receiver<Outcome>,
}

impl Submission {
    /// Waits for the terminal outcome.
    ///
    /// Returns `None` when the client was dropped before this submission was
    /// admitted; once a submission has been handed to the transport its
    /// outcome always arrives.
    pub async fn outcome(self) -> Option<Outcome> {
        self.outcome.await.ok()
    }
}

/// Rate-limited client for the document registration API.
///
/// The client is cheap to share by reference across tasks and threads;
/// `submit` never blocks and never suspends. Wrap it in an [`Arc`] when
/// producers outlive the creating scope. Dropping the client stops the
/// window timer: queued-but-unadmitted submissions resolve to `None`, while
/// dispatches already in flight run to completion detached.
pub struct Client<P = Document> {
    config: ClientConfig,
    queue: Arc<PendingQueue<P>>,
    gate: CapacityGate,
    sink: Arc<dyn EventSink>,
    replenisher: JoinHandle<()>,
}

impl<P> std::fmt::Debug for Client<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("queue_depth", &self.queue.len())
            .field("available_permits", &self.gate.available())
            .finish()
    }
}

impl Client<Document> {
    /// Client against the production registration endpoint.
    ///
    /// Must be called from within a tokio runtime: the window timer is
    /// spawned on it.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }
}

impl<P> Client<P>
where
    P: Serialize + Send + Sync + 'static,
{
    /// Client over a custom [`Transport`], logging events through `tracing`.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_transport_and_sink(config, transport, Arc::new(LogSink))
    }

    /// Client over a custom [`Transport`] and [`EventSink`].
    pub fn with_transport_and_sink(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let gate = CapacityGate::new(config.request_limit());
        let queue = Arc::new(PendingQueue::new());
        let dispatcher = Arc::new(Dispatcher::new(gate.clone(), transport, Arc::clone(&sink)));
        let replenisher = Replenisher::new(
            config.window(),
            config.request_limit(),
            Arc::clone(&queue),
            gate.clone(),
            dispatcher,
            Arc::clone(&sink),
        )
        .start();
        tracing::debug!(
            window = ?config.window(),
            request_limit = config.request_limit(),
            "client started"
        );
        Self { config, queue, gate, sink, replenisher }
    }

    /// Queues one document for dispatch and returns immediately.
    ///
    /// The payload is serialized at dispatch time; a payload that cannot be
    /// serialized still consumes its admission slot and reports a failed
    /// outcome through the handle.
    pub fn submit(&self, payload: P, signature: impl Into<String>) -> Submission {
        let (tx, rx) = oneshot::channel();
        self.queue.push(Task::new(payload, signature.into(), tx));
        let depth = self.queue.len();
        self.sink.record(ClientEvent::Enqueued { depth });
        tracing::debug!(depth, "submission queued");
        Submission { outcome: rx }
    }

    /// The validated configuration this client runs with.
    pub fn config(&self) -> ClientConfig {
        self.config
    }

    /// Submissions currently waiting for admission.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Dispatch permits currently available in the gate.
    pub fn available_permits(&self) -> u32 {
        self.gate.available()
    }
}

impl<P> Drop for Client<P> {
    fn drop(&mut self) {
        self.replenisher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::MemorySink;
    use crate::transport::RecordingTransport;
    use std::time::Duration;

    fn client(limit: u32, transport: &RecordingTransport, sink: &MemorySink) -> Client<u32> {
        let config = ClientConfig::new(Duration::from_secs(1), limit).unwrap();
        Client::with_transport_and_sink(
            config,
            Arc::new(transport.clone()),
            Arc::new(sink.clone()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn submit_returns_immediately_and_enqueues() {
        let transport = RecordingTransport::new();
        let sink = MemorySink::new();
        let client = client(3, &transport, &sink);

        let _a = client.submit(1, "sig-1");
        let _b = client.submit(2, "sig-2");

        assert_eq!(client.queue_depth(), 2);
        assert_eq!(client.available_permits(), 3);
        assert_eq!(transport.sent_count(), 0);
        assert!(sink.events().iter().any(|e| matches!(e, ClientEvent::Enqueued { depth: 2 })));
    }

    #[tokio::test(start_paused = true)]
    async fn outcome_arrives_after_the_first_window() {
        let transport = RecordingTransport::new();
        let sink = MemorySink::new();
        let client = client(3, &transport, &sink);

        let submission = client.submit(7, "sig");
        let outcome = tokio::time::timeout(Duration::from_secs(5), submission.outcome())
            .await
            .expect("outcome should arrive once the window elapses")
            .expect("client is still alive");

        assert!(outcome.is_accepted());
        assert_eq!(transport.sent_count(), 1);
        assert_eq!(client.queue_depth(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_client_resolves_unadmitted_handles_to_none() {
        let transport = RecordingTransport::new();
        let sink = MemorySink::new();
        let client = client(1, &transport, &sink);

        let submission = client.submit(1, "sig");
        drop(client);

        let outcome = tokio::time::timeout(Duration::from_secs(5), submission.outcome())
            .await
            .expect("handle must resolve after the client is gone");
        assert!(outcome.is_none());
        assert_eq!(transport.sent_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_dispatch_survives_client_drop() {
        let transport = RecordingTransport::new().with_latency(Duration::from_secs(2));
        let sink = MemorySink::new();
        let client = client(1, &transport, &sink);

        let submission = client.submit(1, "sig");
        // Let the first tick admit it; the reply is still two windows away.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(transport.sent_count(), 1);
        drop(client);

        let outcome = tokio::time::timeout(Duration::from_secs(10), submission.outcome())
            .await
            .expect("detached dispatch must still complete")
            .expect("outcome must be delivered");
        assert!(outcome.is_accepted());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_is_fire_and_forget() {
        let transport = RecordingTransport::new();
        let sink = MemorySink::new();
        let client = client(1, &transport, &sink);

        drop(client.submit(1, "sig"));
        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(transport.sent_count(), 1);
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, ClientEvent::Completed { accepted: true, .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn custom_payload_types_dispatch_from_spawned_tasks() {
        #[derive(Serialize)]
        struct Label {
            name: String,
        }

        let transport = RecordingTransport::new();
        let config = ClientConfig::new(Duration::from_millis(20), 2).unwrap();
        let client: Arc<Client<Label>> = Arc::new(Client::with_transport_and_sink(
            config,
            Arc::new(transport.clone()),
            Arc::new(MemorySink::new()),
        ));

        // Submitting from a worker task sends the dispatch future across
        // threads, so the whole pipeline must hold for any shared payload.
        let worker = {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client.submit(Label { name: "from-worker".to_string() }, "sig-worker")
            })
        };
        let submission = worker.await.unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(5), submission.outcome())
            .await
            .expect("submission settles within a few windows")
            .expect("client is still alive");
        assert!(outcome.is_accepted());
        assert_eq!(transport.sent()[0].body, r#"{"name":"from-worker"}"#);
        assert_eq!(transport.sent()[0].signature, "sig-worker");
    }

    #[tokio::test(start_paused = true)]
    async fn accessors_reflect_queue_and_gate() {
        let transport = RecordingTransport::new().with_latency(Duration::from_secs(10));
        let sink = MemorySink::new();
        let client = client(2, &transport, &sink);

        for i in 0..5 {
            drop(client.submit(i, format!("sig-{}", i)));
        }
        assert_eq!(client.queue_depth(), 5);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        // Two admitted and in flight, three still queued.
        assert_eq!(client.queue_depth(), 3);
        assert_eq!(client.available_permits(), 0);
        assert_eq!(client.config().request_limit(), 2);
    }
}
