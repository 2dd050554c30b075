//! Window timer that turns queued submissions into dispatches.
//!
//! Once per window the replenisher drains up to the request limit from the
//! front of the queue. Each drained task gets one capped permit release and
//! its own spawned dispatch run, so a hanging call can never stall the timer
//! or the tasks admitted after it. Capacity left unused by an underfull tick
//! is not banked; the next tick starts from the same fixed quota.
//!
//! The first tick fires one full window after start, so a freshly built
//! client dispatches nothing until `window` has elapsed once.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::dispatch::Dispatcher;
use crate::gate::CapacityGate;
use crate::queue::PendingQueue;
use crate::telemetry::{ClientEvent, EventSink};

pub(crate) struct Replenisher<P> {
    window: Duration,
    limit: u32,
    queue: Arc<PendingQueue<P>>,
    gate: CapacityGate,
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn EventSink>,
}

impl<P> Replenisher<P>
where
    P: Serialize + Send + Sync + 'static,
{
    pub(crate) fn new(
        window: Duration,
        limit: u32,
        queue: Arc<PendingQueue<P>>,
        gate: CapacityGate,
        dispatcher: Arc<Dispatcher>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self { window, limit, queue, gate, dispatcher, sink }
    }

    /// Spawns the timer loop. The caller owns the handle and aborts it to
    /// stop admission.
    pub(crate) fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.window, self.window);
            loop {
                ticker.tick().await;
                self.drain_tick();
            }
        })
    }

    /// Admits up to `limit` queued tasks. Synchronous, so an abort can only
    /// land on the tick await, never between a pop and its spawn.
    fn drain_tick(&self) {
        let mut admitted = 0u32;
        for _ in 0..self.limit {
            let task = match self.queue.pop() {
                Some(task) => task,
                None => break,
            };
            self.gate.release();
            self.sink.record(ClientEvent::Admitted { waited: task.queued_for() });
            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move { dispatcher.run(task).await });
            admitted += 1;
        }
        if admitted > 0 {
            tracing::debug!(admitted, remaining = self.queue.len(), "tick admitted submissions");
        }
    }
}
