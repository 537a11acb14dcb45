//! Shared handle to both caches.
//!
//! Builders receive a [`Caches`] value instead of reaching for process-wide
//! state. Cloning the handle shares the underlying caches, so several
//! builders over the same project reuse each other's work.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ConfigCache;
use crate::content::ContentCache;

/// Config and content caches behind shared locks.
///
/// The locks are synchronous and must not be held across an `.await`.
#[derive(Debug)]
pub struct Caches<C> {
    config: Arc<Mutex<ConfigCache<C>>>,
    content: Arc<Mutex<ContentCache>>,
}

impl<C> Caches<C> {
    /// Creates a pair of empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the config cache.
    pub fn lock_config(&self) -> MutexGuard<'_, ConfigCache<C>> {
        self.config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the content cache.
    pub fn lock_content(&self) -> MutexGuard<'_, ContentCache> {
        self.content.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Clone for Caches<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            content: Arc::clone(&self.content),
        }
    }
}

impl<C> Default for Caches<C> {
    fn default() -> Self {
        Self {
            config: Arc::new(Mutex::new(ConfigCache::new())),
            content: Arc::new(Mutex::new(ContentCache::new())),
        }
    }
}
