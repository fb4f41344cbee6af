//! Bounded concurrency for resize pipelines.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::ImageError;

/// Counting gate limiting how many resize pipelines run at once.
///
/// Cloning yields another handle to the same gate.
#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyGate {
    /// Create a gate admitting `workers` holders at a time (at least one).
    pub fn new(workers: usize) -> Self {
        let capacity = workers.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait for a free slot.
    ///
    /// Fails with [`ImageError::Cancelled`] if `cancel` fires first. A token
    /// that is already cancelled wins even when a slot is free, so a
    /// cancelled caller never starts work.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GateSlot, ImageError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ImageError::Cancelled),
            permit = self.semaphore.clone().acquire_owned() => {
                let permit = permit.map_err(|_| ImageError::Internal {
                    message: "concurrency gate closed".to_string(),
                })?;
                Ok(GateSlot { _permit: permit })
            }
        }
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<GateSlot> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| GateSlot { _permit: permit })
    }

    /// Give a slot back. Equivalent to dropping it.
    pub fn release(&self, slot: GateSlot) {
        drop(slot);
    }

    /// Maximum number of concurrent holders.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots free right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A held gate slot. Released exactly once, when dropped.
#[derive(Debug)]
#[must_use = "the slot is released as soon as it is dropped"]
pub struct GateSlot {
    _permit: OwnedSemaphorePermit,
}
