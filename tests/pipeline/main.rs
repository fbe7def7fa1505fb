//! End-to-end tests for the translation pipeline.
//!
//! Each module drives the public `chunkform` API the way a host application
//! would: build a chain, load and save chunks, share registries and locks
//! across threads.

mod common;

mod chain_walk;
mod components;
mod full_pipeline;
mod locking;
mod registry;
