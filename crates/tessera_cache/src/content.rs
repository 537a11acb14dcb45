//! Per-context content cache: generated CSS and last-seen mtimes per file.
//!
//! Entries are keyed by an opaque [`ContextId`]. A context's entry lives from
//! [`ContentCache::register`] until [`ContentCache::retire`]; writes to a
//! retired context are rejected instead of silently recreating it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::error::CacheError;
use crate::stamp::Stamps;

/// Opaque identity of one loaded build context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocates an identifier never returned before in this process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps a raw value. Intended for tests and diagnostics.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Cached output of one context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentData {
    /// Accumulated CSS fragment per source file.
    pub file_css: BTreeMap<PathBuf, String>,
    /// Modification time of each file when it was last extracted successfully.
    pub file_modified: Stamps,
}

/// Content entries of every live context.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<ContextId, ContentData>,
}

impl ContentCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking content for `id`. Registering twice keeps the data.
    pub fn register(&mut self, id: ContextId) {
        self.entries.entry(id).or_default();
    }

    /// Stops tracking `id` and returns whatever it had accumulated.
    pub fn retire(&mut self, id: ContextId) -> Option<ContentData> {
        self.entries.remove(&id)
    }

    /// Returns the content of `id`.
    pub fn get(&self, id: ContextId) -> Option<&ContentData> {
        self.entries.get(&id)
    }

    /// Returns `true` if `path` was last extracted at exactly `mtime`.
    pub fn is_unchanged(&self, id: ContextId, path: &Path, mtime: SystemTime) -> bool {
        self.entries
            .get(&id)
            .and_then(|data| data.file_modified.get(path))
            .is_some_and(|recorded| *recorded == mtime)
    }

    /// Records a successful extraction of `path`.
    ///
    /// The mtime is always stored. A non-empty `css` fragment is combined with
    /// the file's previous fragment through `merge(old, new)`, or stored as-is
    /// when there was none.
    pub fn record(
        &mut self,
        id: ContextId,
        path: &Path,
        mtime: SystemTime,
        css: Option<String>,
        merge: impl FnOnce(&str, &str) -> String,
    ) -> Result<(), CacheError> {
        let data = self
            .entries
            .get_mut(&id)
            .ok_or(CacheError::UnknownContext { id })?;
        data.file_modified.insert(path.to_path_buf(), mtime);

        let Some(css) = css.filter(|css| !css.trim().is_empty()) else {
            return Ok(());
        };
        let merged = match data.file_css.get(path) {
            Some(previous) => merge(previous, &css),
            None => css,
        };
        data.file_css.insert(path.to_path_buf(), merged);
        Ok(())
    }

    /// Every cached fragment of `id`, ordered by path.
    pub fn fragments(&self, id: ContextId) -> Vec<String> {
        self.entries
            .get(&id)
            .map(|data| data.file_css.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of live contexts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no context is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
