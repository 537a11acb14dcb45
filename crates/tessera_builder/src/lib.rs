//! Incremental CSS builds.
//!
//! The [`Builder`] decides on every cycle whether configuration must be
//! reloaded and which source files must be extracted again, based purely on
//! modification times recorded in the [`tessera_cache`] caches. Everything
//! project specific (loading configuration, parsing files, writing
//! artifacts) sits behind the [`BuildHost`] and [`BuildContext`] traits;
//! [`ProjectHost`] implements them for `tessera.toml` projects.

#![warn(missing_docs)]

pub mod builder;
pub mod context;
pub mod css;
pub mod error;
pub mod host;
pub mod limiter;
pub mod project;
pub mod root;

pub use builder::{Builder, ExtractSummary};
pub use context::{BuildContext, DependencyMessage, HookEvent};
pub use css::{merge_css, optimize_css, Stylesheet};
pub use error::{BuildError, ExtractError};
pub use host::BuildHost;
pub use limiter::{ExtractLimiter, DEFAULT_EXTRACT_CONCURRENCY};
pub use project::{ProjectContext, ProjectHost};
pub use root::CssRoot;
