//! Concurrency limiting for probe tasks.
//!
//! A fixed-capacity counting semaphore. Each in-flight probe holds one
//! `Slot`; dropping the slot returns it, so release happens on every exit
//! path of the holding task, including unwinding.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Bounds the number of probes in flight at once.
///
/// Cloning shares the same slot pool. Separate limiters never interfere,
/// so independent scans can run side by side.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: NonZeroUsize,
}

/// Permission to run one probe. Returned to the pool on drop.
#[derive(Debug)]
#[must_use = "dropping a slot releases it immediately"]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` slots, capped at `Semaphore::MAX_PERMITS`.
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = NonZeroUsize::new(capacity.get().min(Semaphore::MAX_PERMITS))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity.get())),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Slots currently held.
    pub fn in_use(&self) -> usize {
        self.capacity.get() - self.available()
    }

    /// Wait until a slot is free and take it.
    ///
    /// Fails only if the limiter has been closed, which this crate never does.
    pub async fn acquire(&self) -> Result<Slot, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        Ok(Slot { _permit: permit })
    }

    /// Take a slot without waiting, if one is free.
    pub fn try_acquire(&self) -> Option<Slot> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| Slot { _permit: permit })
    }
}

impl Slot {
    /// Give the slot back explicitly. Equivalent to dropping it.
    pub fn release(self) {}
}
