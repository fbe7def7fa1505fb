//! Format links
//!
//! A [`FormatLink`] describes one format version as a plain record. Anything
//! it leaves unset is inherited from the nearest lower link when the chain
//! is built; unset deltas are identity.
//!
//! Deltas run in place on the decoded tree and must only touch the fields
//! their version changes:
//!
//! ```rust
//! use chunkform_core::{Tag, TagKind};
//! use chunkform_durability::{FormatLink, Layout};
//!
//! let v2 = FormatLink::new(2)
//!     .with_layout(Layout::new().require("xPos", TagKind::Int))
//!     .with_upgrade(|root| {
//!         root.rename("x", "xPos");
//!         Ok(())
//!     })
//!     .with_downgrade(|root| {
//!         root.rename("xPos", "x");
//!         Ok(())
//!     });
//! assert!(v2.upgrade().is_some());
//! ```

use super::layout::Layout;
use crate::codec::PayloadCodec;
use chunkform_core::{Compound, FormatVersion, Result};
use std::fmt;
use std::sync::Arc;

/// In-place transformation of a decoded tree
pub type Delta = Arc<dyn Fn(&mut Compound) -> Result<()> + Send + Sync>;

/// Declaration of one format version
#[derive(Clone)]
pub struct FormatLink {
    pub(crate) version: FormatVersion,
    pub(crate) codec: Option<Arc<dyn PayloadCodec>>,
    pub(crate) layout: Option<Layout>,
    pub(crate) components: Option<Vec<String>>,
    pub(crate) upgrade: Option<Delta>,
    pub(crate) downgrade: Option<Delta>,
}

impl FormatLink {
    /// Link for `version` that inherits everything
    pub fn new(version: impl Into<FormatVersion>) -> Self {
        FormatLink {
            version: version.into(),
            codec: None,
            layout: None,
            components: None,
            upgrade: None,
            downgrade: None,
        }
    }

    /// Use `codec` for this version and, by inheritance, the ones above it
    pub fn with_codec(mut self, codec: impl PayloadCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Required top-level fields of this version's tree
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Component storage keys this version persists
    pub fn with_components<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Transformation from the previous version's tree to this one's
    pub fn with_upgrade<F>(mut self, delta: F) -> Self
    where
        F: Fn(&mut Compound) -> Result<()> + Send + Sync + 'static,
    {
        self.upgrade = Some(Arc::new(delta));
        self
    }

    /// Transformation from this version's tree to the previous one's
    pub fn with_downgrade<F>(mut self, delta: F) -> Self
    where
        F: Fn(&mut Compound) -> Result<()> + Send + Sync + 'static,
    {
        self.downgrade = Some(Arc::new(delta));
        self
    }

    /// Version this link describes
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Declared codec
    pub fn codec(&self) -> Option<&dyn PayloadCodec> {
        self.codec.as_deref()
    }

    /// Declared layout
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// Declared persisted components
    pub fn components(&self) -> Option<&[String]> {
        self.components.as_deref()
    }

    /// Declared upgrade delta
    pub fn upgrade(&self) -> Option<&Delta> {
        self.upgrade.as_ref()
    }

    /// Declared downgrade delta
    pub fn downgrade(&self) -> Option<&Delta> {
        self.downgrade.as_ref()
    }
}

impl fmt::Debug for FormatLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatLink")
            .field("version", &self.version)
            .field("codec", &self.codec.as_ref().map(|c| c.codec_id().to_string()))
            .field("layout", &self.layout)
            .field("components", &self.components)
            .field("upgrade", &self.upgrade.is_some())
            .field("downgrade", &self.downgrade.is_some())
            .finish()
    }
}
