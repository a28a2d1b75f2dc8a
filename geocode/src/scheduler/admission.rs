//! Admission control: a concurrency cap plus a single shared rate gate.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::queue::{QueueItem, RequestQueue};

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ticket for one in-flight slot, tagged with the admission generation it
/// was taken from so a reset can orphan it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Slot {
    generation: u64,
}

#[derive(Debug, Default)]
struct Backlog {
    queue: RequestQueue,
    in_flight: usize,
    generation: u64,
}

/// Owns the request queue and the in-flight counter.
#[derive(Debug)]
pub(crate) struct AdmissionController {
    max_concurrent: usize,
    backlog: Mutex<Backlog>,
}

impl AdmissionController {
    /// A cap of 0 is treated as 1 so the queue always drains.
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
            backlog: Mutex::new(Backlog::default()),
        }
    }

    pub fn enqueue(&self, item: QueueItem) {
        lock(&self.backlog).queue.push(item);
    }

    /// Pulls as many queued items as free slots allow, taking a slot for each.
    pub fn admit(&self) -> Vec<(QueueItem, Slot)> {
        let mut backlog = lock(&self.backlog);
        let mut admitted = Vec::new();
        while backlog.in_flight < self.max_concurrent {
            let Some(item) = backlog.queue.pop() else {
                break;
            };
            backlog.in_flight += 1;
            admitted.push((
                item,
                Slot {
                    generation: backlog.generation,
                },
            ));
        }
        admitted
    }

    /// Returns a slot. Slots from before the last reset are ignored.
    pub fn release(&self, slot: Slot) {
        let mut backlog = lock(&self.backlog);
        if slot.generation == backlog.generation {
            backlog.in_flight = backlog.in_flight.saturating_sub(1);
        }
    }

    pub fn is_current(&self, slot: Slot) -> bool {
        lock(&self.backlog).generation == slot.generation
    }

    /// Drops the queue and forgets every outstanding slot.
    pub fn reset(&self) {
        let mut backlog = lock(&self.backlog);
        backlog.queue.clear();
        backlog.in_flight = 0;
        backlog.generation += 1;
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.backlog).in_flight
    }

    pub fn queued(&self) -> usize {
        lock(&self.backlog).queue.len()
    }
}

/// Enforces a minimum spacing between consecutive dispatches across all slots.
///
/// Callers pass through one at a time: the check of the last dispatch time,
/// the wait, and the update happen while holding `turn`, so two slots can
/// never both observe the same elapsed time.
#[derive(Debug)]
pub(crate) struct RateGate {
    min_interval: Duration,
    turn: tokio::sync::Mutex<()>,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            turn: tokio::sync::Mutex::new(()),
            last_dispatch: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous dispatch, then
    /// records now as the latest dispatch.
    pub async fn wait(&self) {
        let _turn = self.turn.lock().await;
        let last = *lock(&self.last_dispatch);
        if let Some(last) = last {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let remaining = self.min_interval - elapsed;
                tracing::debug!(wait_ms = remaining.as_millis() as u64, "rate gate waiting");
                tokio::time::sleep(remaining).await;
            }
        }
        *lock(&self.last_dispatch) = Some(Instant::now());
    }

    pub fn reset(&self) {
        *lock(&self.last_dispatch) = None;
    }
}
