//! Style canonicalization: turns nested, condition-aware style objects into
//! deduplicated, content-addressed atomic entries.
//!
//! The [`HashFactory`] drives everything. It normalizes each style object,
//! walks it with the [`traverse`] module, resolves each leaf's condition
//! through [`condition::resolve_condition`], and records the resulting
//! [`StyleEntry`] hashes in its [`HashRegistries`]. [`codegen`] renders those
//! registries as CSS.

#![warn(missing_docs)]

pub mod codegen;
pub mod condition;
pub mod context;
pub mod entry;
pub mod factory;
pub mod normalize;
pub mod provider;
pub mod traverse;
pub mod usage;
pub mod utility;

pub use codegen::generate_css;
pub use condition::{resolve_condition, ConditionKind, Conditions, CONDITION_SEPARATOR};
pub use context::CollectorContext;
pub use entry::{EntryBase, StyleEntry};
pub use factory::{HashFactory, HashRegistries};
pub use provider::{
    ConfigRecipes, PatternKind, PatternProvider, PatternRegistry, RecipeProvider,
};
pub use usage::{ExtractResult, PatternUsage};
pub use utility::Utilities;
