//! Counting permit pool that bounds how many dispatches a window admits.
//!
//! The gate holds between 0 and `limit` permits. Acquiring takes one permit
//! and releasing returns one; releases past `limit` are silently capped, so
//! the pool can never hold more capacity than the configured request limit.
//! Permits are RAII guards: dropping a [`Permit`] releases exactly once, on
//! every path.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shared permit pool sized to the request limit.
///
/// Cloning is cheap and all clones observe the same pool.
#[derive(Clone, Debug)]
pub struct CapacityGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    available: AtomicU32,
    limit: u32,
    waiters: Notify,
}

impl CapacityGate {
    /// Creates a gate holding `limit` permits. The pool starts full.
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Arc::new(GateInner {
                available: AtomicU32::new(limit),
                limit,
                waiters: Notify::new(),
            }),
        }
    }

    /// Takes one permit without waiting. Returns `None` when the pool is empty.
    pub fn try_acquire(&self) -> Option<Permit> {
        self.inner
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .ok()
            .map(|_| Permit { gate: Arc::clone(&self.inner) })
    }

    /// Takes one permit, waiting until one is released if the pool is empty.
    pub async fn acquire(&self) -> Permit {
        loop {
            if let Some(permit) = self.try_acquire() {
                return permit;
            }
            let notified = self.inner.waiters.notified();
            tokio::pin!(notified);
            // Register interest before the re-check so a release between the
            // failed try_acquire and the await cannot be missed.
            notified.as_mut().enable();
            if let Some(permit) = self.try_acquire() {
                return permit;
            }
            notified.await;
        }
    }

    /// Returns one permit to the pool, capped at the configured limit.
    ///
    /// Releasing a full pool is a no-op, so stray releases cannot inflate
    /// capacity beyond the limit.
    pub fn release(&self) {
        self.inner.release();
    }

    /// Permits currently available.
    pub fn available(&self) -> u32 {
        self.inner.available.load(Ordering::Acquire)
    }

    /// The configured maximum pool size.
    pub fn limit(&self) -> u32 {
        self.inner.limit
    }
}

impl GateInner {
    fn release(&self) {
        let limit = self.limit;
        let _ = self.available.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            if n < limit {
                Some(n + 1)
            } else {
                None
            }
        });
        self.waiters.notify_one();
    }
}

/// RAII guard for one unit of dispatch capacity.
///
/// Dropping the permit releases it back to the gate exactly once.
#[derive(Debug)]
pub struct Permit {
    gate: Arc<GateInner>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
