//! Format links and the version chain.
//!
//! # Module Structure
//!
//! - `layout`: required top-level fields of a version's tree
//! - `link`: per-version declarations (codec, layout, components, deltas)
//! - `chain`: the ordered, resolved chain and the translation pipeline

pub mod chain;
pub mod layout;
pub mod link;

pub use chain::{FormatChain, FormatChainBuilder, ResolvedLink};
pub use layout::Layout;
pub use link::{Delta, FormatLink};
