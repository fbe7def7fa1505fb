//! Standard chunk components
//!
//! | key   | component                |
//! |-------|--------------------------|
//! | `bl`  | [`BlockComponent`]       |
//! | `b3d` | [`Biome3DComponent`]     |
//! | `hm`  | [`HeightmapComponent`]   |
//! | `e`   | [`EntityComponent`]      |
//! | `be`  | [`BlockEntityComponent`] |
//! | `raw` | [`RawComponent`]         |

mod biome;
mod block;
mod block_entity;
mod entity;
mod heightmap;
mod raw;

pub use biome::{Biome3DComponent, Biome3DData};
pub use block::{BlockComponent, BlockComponentData};
pub use block_entity::{BlockEntity, BlockEntityComponent};
pub use entity::{Entity, EntityComponent};
pub use heightmap::HeightmapComponent;
pub use raw::RawComponent;

use chunkform_core::{Compound, Error, Result, Tag};

/// Borrow `tag` as the root compound of component `key`
pub(crate) fn component_root<'a>(key: &str, tag: &'a Tag) -> Result<&'a Compound> {
    tag.as_compound().ok_or_else(|| {
        Error::mismatch(format!(
            "component '{}' is {}, expected compound",
            key,
            tag.kind()
        ))
    })
}
