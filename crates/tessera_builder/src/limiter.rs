//! Admission gate for concurrent file extraction.

use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::ExtractError;

/// Default number of extractions allowed in flight at once.
pub const DEFAULT_EXTRACT_CONCURRENCY: usize = 20;

/// Counting semaphore bounding in-flight extractions.
///
/// Clones share the same budget: hand the same limiter to several builders to
/// bound them together, or give each its own for independent budgets.
#[derive(Debug, Clone)]
pub struct ExtractLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Default for ExtractLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACT_CONCURRENCY)
    }
}

impl ExtractLimiter {
    /// Creates a limiter admitting `capacity` extractions at once (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Maximum number of concurrent extractions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of extractions that could start right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a slot. Waiters are admitted in request order.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, ExtractError> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| ExtractError::LimiterClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn default_capacity() {
        let limiter = ExtractLimiter::default();
        assert_eq!(limiter.capacity(), DEFAULT_EXTRACT_CONCURRENCY);
        assert_eq!(limiter.available(), 20);
    }

    #[test]
    fn zero_capacity_still_admits_one() {
        assert_eq!(ExtractLimiter::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn clones_share_budget() {
        let limiter = ExtractLimiter::new(2);
        let other = limiter.clone();
        let _permit = limiter.acquire().await.unwrap();
        assert_eq!(other.available(), 1);

        let independent = ExtractLimiter::new(2);
        assert_eq!(independent.available(), 2);
    }

    #[tokio::test]
    async fn bounds_in_flight_work() {
        let limiter = ExtractLimiter::new(3);
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let tasks = (0..12).map(|_| async {
            let _permit = limiter.acquire().await.unwrap();
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::task::yield_now().await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
        futures::future::join_all(tasks).await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(limiter.available(), 3);
    }
}
