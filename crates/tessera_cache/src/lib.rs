//! Incremental build caches.
//!
//! Two caches back every builder. The [`ConfigCache`] keeps one loaded
//! context per configuration file together with the modification times of the
//! files it was assembled from. The [`ContentCache`] keeps, per loaded
//! context, the CSS generated for each source file and the mtime it was
//! generated at. Both are reached through a [`Caches`] handle so tests and
//! embedders can inject their own.

#![warn(missing_docs)]

pub mod config;
pub mod content;
pub mod error;
pub mod shared;
pub mod stamp;

pub use config::{ConfigCache, ConfigData};
pub use content::{ContentCache, ContentData, ContextId};
pub use error::CacheError;
pub use shared::Caches;
pub use stamp::{detect_changes, snapshot, stat_mtime, StampChanges, Stamps};
