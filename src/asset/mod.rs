//! Asset selection module
//!
//! Guesses which assets of a release fit the current OS and architecture,
//! and settles on exactly one, asking the operator when one is available.

mod picker;
mod platform;
mod resolver;

pub use picker::KeywordMatcher;
pub use platform::{AliasTable, DEFAULT_ALIASES, Platform};
pub use resolver::{AssetResolver, ResolvedAsset};
