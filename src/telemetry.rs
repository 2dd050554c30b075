//! Observability for the submission pipeline.
//!
//! The client reports its lifecycle through an injected [`EventSink`] rather
//! than global logger state, so embedding applications can count, capture, or
//! forward events however they like. Three events cover the pipeline:
//!
//! - [`ClientEvent::Enqueued`]: a submission entered the pending queue.
//! - [`ClientEvent::Admitted`]: the replenisher granted it a dispatch slot.
//! - [`ClientEvent::Completed`]: the dispatch reached a terminal outcome.
//!
//! Sinks must not block: they are called from the submit path and from
//! dispatch tasks. The built-in sinks ([`NullSink`], [`LogSink`],
//! [`CountingSink`], [`MemorySink`]) all record in O(1).

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Lifecycle events emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A submission entered the pending queue.
    Enqueued {
        /// Queue depth after the push.
        depth: usize,
    },
    /// The replenisher moved a queued task into dispatch.
    Admitted {
        /// Time the task spent waiting in the queue.
        waited: Duration,
    },
    /// A dispatch finished.
    Completed {
        /// HTTP status, when a response arrived at all.
        status: Option<u16>,
        /// Whether the registration API accepted the document.
        accepted: bool,
        /// Time from permit acquisition to terminal outcome.
        elapsed: Duration,
    },
}

impl fmt::Display for ClientEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientEvent::Enqueued { depth } => write!(f, "Enqueued(depth={})", depth),
            ClientEvent::Admitted { waited } => write!(f, "Admitted(waited={:?})", waited),
            ClientEvent::Completed { status, accepted, elapsed } => match status {
                Some(status) => write!(
                    f,
                    "Completed(status={}, accepted={}, elapsed={:?})",
                    status, accepted, elapsed
                ),
                None => write!(f, "Completed(no_response, elapsed={:?})", elapsed),
            },
        }
    }
}

/// Consumer of [`ClientEvent`]s.
///
/// Implementations must be cheap and non-blocking; events are recorded inline
/// on hot paths and are fire-and-forget.
pub trait EventSink: Send + Sync + fmt::Debug {
    fn record(&self, event: ClientEvent);
}

/// Discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: ClientEvent) {}
}

/// Logs every event through `tracing` at INFO level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: ClientEvent) {
        tracing::info!(event = %event, "client_event");
    }
}

/// Counts events by kind. All counters are monotonic.
#[derive(Clone, Debug, Default)]
pub struct CountingSink {
    enqueued: Arc<AtomicU64>,
    admitted: Arc<AtomicU64>,
    accepted: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
}

impl CountingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions that entered the queue.
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Tasks granted a dispatch slot.
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    /// Dispatches the API accepted.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Dispatches the API answered with a non-success status.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Dispatches that produced no HTTP response at all.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

impl EventSink for CountingSink {
    fn record(&self, event: ClientEvent) {
        match event {
            ClientEvent::Enqueued { .. } => self.enqueued.fetch_add(1, Ordering::Relaxed),
            ClientEvent::Admitted { .. } => self.admitted.fetch_add(1, Ordering::Relaxed),
            ClientEvent::Completed { accepted: true, .. } => {
                self.accepted.fetch_add(1, Ordering::Relaxed)
            }
            ClientEvent::Completed { status: Some(_), .. } => {
                self.rejected.fetch_add(1, Ordering::Relaxed)
            }
            ClientEvent::Completed { status: None, .. } => {
                self.failed.fetch_add(1, Ordering::Relaxed)
            }
        };
    }
}

/// Stores events in memory for inspection. Intended for tests and debugging.
///
/// Bounded by default; the oldest events are evicted once the capacity is
/// exceeded, and the eviction count is kept so truncation is detectable.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<VecDeque<ClientEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    /// Creates a bounded memory sink (default cap: 10,000).
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    /// Creates a bounded memory sink with explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a snapshot of all events received so far, oldest first.
    pub fn events(&self) -> Vec<ClientEvent> {
        self.events.lock().expect("memory sink poisoned").iter().cloned().collect()
    }

    /// Clears all stored events.
    pub fn clear(&self) {
        self.events.lock().expect("memory sink poisoned").clear();
    }

    /// Number of events currently stored.
    pub fn len(&self) -> usize {
        self.events.lock().expect("memory sink poisoned").len()
    }

    /// True if no events are stored.
    pub fn is_empty(&self) -> bool {
        self.events.lock().expect("memory sink poisoned").is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events evicted to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: ClientEvent) {
        let mut guard = self.events.lock().expect("memory sink poisoned");
        if guard.len() >= self.capacity {
            guard.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(status: Option<u16>, accepted: bool) -> ClientEvent {
        ClientEvent::Completed { status, accepted, elapsed: Duration::from_millis(5) }
    }

    #[test]
    fn memory_sink_stores_in_order() {
        let sink = MemorySink::new();
        sink.record(ClientEvent::Enqueued { depth: 1 });
        sink.record(ClientEvent::Admitted { waited: Duration::from_millis(10) });
        sink.record(completed(Some(200), true));

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ClientEvent::Enqueued { depth: 1 });
        assert!(matches!(events[2], ClientEvent::Completed { accepted: true, .. }));
    }

    #[test]
    fn memory_sink_evicts_oldest_past_capacity() {
        let sink = MemorySink::with_capacity(2);
        sink.record(ClientEvent::Enqueued { depth: 1 });
        sink.record(ClientEvent::Enqueued { depth: 2 });
        sink.record(ClientEvent::Enqueued { depth: 3 });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.evicted(), 1);
        assert_eq!(sink.events()[0], ClientEvent::Enqueued { depth: 2 });
    }

    #[test]
    fn memory_sink_clear_resets_events() {
        let sink = MemorySink::new();
        sink.record(ClientEvent::Enqueued { depth: 1 });
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn counting_sink_buckets_by_kind() {
        let sink = CountingSink::new();
        sink.record(ClientEvent::Enqueued { depth: 1 });
        sink.record(ClientEvent::Enqueued { depth: 2 });
        sink.record(ClientEvent::Admitted { waited: Duration::ZERO });
        sink.record(completed(Some(200), true));
        sink.record(completed(Some(500), false));
        sink.record(completed(None, false));

        assert_eq!(sink.enqueued(), 2);
        assert_eq!(sink.admitted(), 1);
        assert_eq!(sink.accepted(), 1);
        assert_eq!(sink.rejected(), 1);
        assert_eq!(sink.failed(), 1);
    }

    #[test]
    fn display_includes_the_terminal_status() {
        assert_eq!(
            completed(Some(200), true).to_string(),
            "Completed(status=200, accepted=true, elapsed=5ms)"
        );
        assert_eq!(completed(None, false).to_string(), "Completed(no_response, elapsed=5ms)");
        assert_eq!(ClientEvent::Enqueued { depth: 4 }.to_string(), "Enqueued(depth=4)");
    }

    #[test]
    fn null_sink_accepts_everything() {
        let sink = NullSink;
        for depth in 0..100 {
            sink.record(ClientEvent::Enqueued { depth });
        }
    }
}
