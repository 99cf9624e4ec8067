use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::warn;

/// Bounded-concurrency gate in front of the provisioning pipeline.
///
/// `try_acquire` never suspends: a saturated gate rejects immediately
/// so the caller can report a distinct "busy" outcome instead of
/// queueing work. Release is bound to [`AdmissionPermit`] drop, which
/// makes exactly-once release hold on every exit path, including
/// panics in the admitted work.
#[derive(Clone)]
pub struct AdmissionController {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionController {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity.max(1))),
            capacity: capacity.max(1),
        }
    }

    /// Reject-or-proceed; never waits for a permit.
    pub fn try_acquire(&self) -> Option<AdmissionPermit> {
        match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => Some(AdmissionPermit { _permit: permit }),
            Err(_) => {
                warn!(capacity = self.capacity, "admission gate saturated, rejecting request");
                None
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently free. Used by tests to verify acquire/release
    /// accounting; not part of any request path.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

impl std::fmt::Debug for AdmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionController")
            .field("capacity", &self.capacity)
            .field("available", &self.available())
            .finish()
    }
}

/// One unit of admission capacity. Dropping the permit releases it;
/// for streaming requests the permit is moved into the background
/// task so its lifetime covers the full orchestration, not just the
/// handler's return.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_capacity_and_clamps_zero_to_one() {
        assert_eq!(AdmissionController::new(3).capacity(), 3);

        // A zero-capacity gate would reject every request forever.
        let gate = AdmissionController::new(0);
        assert_eq!(gate.capacity(), 1);
        let permit = gate.try_acquire();
        assert!(permit.is_some());
        assert!(gate.try_acquire().is_none());
    }

    #[tokio::test]
    async fn rejects_exactly_one_of_capacity_plus_one() {
        let gate = AdmissionController::new(3);
        let held: Vec<_> = (0..3).map(|_| gate.try_acquire()).collect();
        assert!(held.iter().all(Option::is_some));
        assert!(gate.try_acquire().is_none());

        drop(held);
        assert_eq!(gate.available(), 3);
    }

    #[tokio::test]
    async fn admits_again_after_any_completion() {
        let gate = AdmissionController::new(2);
        let a = gate.try_acquire().unwrap();
        let _b = gate.try_acquire().unwrap();
        assert!(gate.try_acquire().is_none());

        drop(a);
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn concurrent_acquire_release_loses_no_permits() {
        let gate = AdmissionController::new(4);
        let mut tasks = Vec::new();
        for _ in 0..32 {
            let gate = gate.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..50 {
                    if let Some(permit) = gate.try_acquire() {
                        tokio::task::yield_now().await;
                        drop(permit);
                    } else {
                        tokio::task::yield_now().await;
                    }
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(gate.available(), 4);
    }

    #[tokio::test]
    async fn release_survives_panicking_work() {
        let gate = AdmissionController::new(1);
        let permit = gate.try_acquire().unwrap();
        let task = tokio::spawn(async move {
            let _permit = permit;
            panic!("admitted work blew up");
        });
        assert!(task.await.is_err());
        assert_eq!(gate.available(), 1);
    }
}
