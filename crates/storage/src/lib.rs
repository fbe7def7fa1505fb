//! Storage layer for chunkform
//!
//! This crate implements the universal chunk model with:
//! - Slice normalization and partial N-axis array views
//! - Sectioned index arrays (SectionArrayMap)
//! - The Component trait and the standard components
//! - UniversalChunk and the explicit ComponentRegistry
//!
//! # Views
//!
//! Section arrays and height maps hand out [`ArrayView`] / [`ArrayViewMut`]
//! windows. A window addresses only the selected elements of the backing
//! buffer and never copies it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod component;
pub mod components;
pub mod convert;
pub mod section;
pub mod slice;
pub mod view;

pub use chunk::{ComponentDecoder, ComponentRegistry, UniversalChunk};
pub use component::{AnyComponent, BoxedValue, Component};
pub use components::{
    Biome3DComponent, Biome3DData, BlockComponent, BlockComponentData, BlockEntity,
    BlockEntityComponent, Entity, EntityComponent, HeightmapComponent, RawComponent,
};
pub use section::{IndexArray3D, SectionArrayMap};
pub use slice::{normalize_slice, normalize_unbounded, sliced_array_size, NormalizedSlice, SliceSpec};
pub use view::{ArrayView, ArrayViewMut, Indices};
