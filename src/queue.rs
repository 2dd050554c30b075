//! Unbounded FIFO of submissions waiting for dispatch capacity.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::dispatch::Outcome;

/// One pending submission: the payload, its signature, and the channel the
/// final [`Outcome`] is delivered on.
///
/// A task is consumed exactly once by the dispatcher. It is never retried and
/// never persisted.
pub struct Task<P> {
    pub(crate) payload: P,
    pub(crate) signature: String,
    pub(crate) completed: oneshot::Sender<Outcome>,
    pub(crate) enqueued_at: Instant,
}

impl<P> Task<P> {
    pub(crate) fn new(payload: P, signature: String, completed: oneshot::Sender<Outcome>) -> Self {
        Self { payload, signature, completed, enqueued_at: Instant::now() }
    }

    /// The document payload this task will submit.
    #[cfg(test)]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// The detached signature sent alongside the payload.
    #[cfg(test)]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// How long this task has been waiting since submission.
    pub fn queued_for(&self) -> Duration {
        self.enqueued_at.elapsed()
    }
}

impl<P> std::fmt::Debug for Task<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("signature_len", &self.signature.len())
            .field("queued_for", &self.queued_for())
            .finish()
    }
}

/// FIFO admission queue. Unbounded; `push` never blocks and never fails.
///
/// Insertion order is submission order, and the replenisher drains strictly
/// from the front, so no submission can overtake an earlier one.
pub struct PendingQueue<P> {
    tasks: Mutex<VecDeque<Task<P>>>,
}

impl<P> PendingQueue<P> {
    pub fn new() -> Self {
        Self { tasks: Mutex::new(VecDeque::new()) }
    }

    /// Appends a task at the back.
    pub fn push(&self, task: Task<P>) {
        self.tasks.lock().expect("pending queue poisoned").push_back(task);
    }

    /// Removes the oldest task, or `None` when the queue is empty.
    pub fn pop(&self) -> Option<Task<P>> {
        self.tasks.lock().expect("pending queue poisoned").pop_front()
    }

    /// Number of tasks waiting for admission.
    pub fn len(&self) -> usize {
        self.tasks.lock().expect("pending queue poisoned").len()
    }

    /// True when nothing is waiting.
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.lock().expect("pending queue poisoned").is_empty()
    }
}

impl<P> Default for PendingQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for PendingQueue<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingQueue").field("len", &self.len()).finish()
    }
}
