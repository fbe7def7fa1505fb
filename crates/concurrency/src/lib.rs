//! Concurrency layer for chunkform
//!
//! This crate implements per-key mutual exclusion:
//! - KeyLockTable: one reentrant lock per key, created on demand
//! - KeyLock: the handle; its entry is reclaimed when the last handle drops
//!
//! All other pipeline state (format chain, component registry) is immutable
//! after construction and needs no locking.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod lock_table;

pub use lock_table::{KeyLock, KeyLockTable};
