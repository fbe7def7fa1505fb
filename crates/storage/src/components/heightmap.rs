use crate::component::Component;
use crate::components::component_root;
use crate::section::{element_count, shape_from, shape_tag};
use crate::slice::SliceSpec;
use crate::view::{ArrayView, ArrayViewMut};
use chunkform_core::{Compound, Error, Result, Tag};
use std::collections::BTreeMap;

/// Named 2D height maps (`hm`)
///
/// Every map has the component's fixed `(x, z)` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightmapComponent {
    shape: [usize; 2],
    maps: BTreeMap<String, Vec<i64>>,
}

impl HeightmapComponent {
    /// No maps yet; every map will have `shape`
    pub fn new(shape: [usize; 2]) -> Self {
        HeightmapComponent {
            shape,
            maps: BTreeMap::new(),
        }
    }

    /// Shape every map has
    pub fn shape(&self) -> [usize; 2] {
        self.shape
    }

    /// Map `name`, row-major
    pub fn map(&self, name: &str) -> Option<&[i64]> {
        self.maps.get(name).map(Vec::as_slice)
    }

    /// Map names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.maps.keys().map(String::as_str)
    }

    /// Insert or replace map `name`
    pub fn set_map(&mut self, name: impl Into<String>, heights: Vec<i64>) -> Result<()> {
        let name = name.into();
        self.check_len(&name, heights.len())?;
        self.maps.insert(name, heights);
        Ok(())
    }

    /// Remove map `name`
    pub fn remove_map(&mut self, name: &str) -> Option<Vec<i64>> {
        self.maps.remove(name)
    }

    /// Read-only window over map `name`
    pub fn view(&self, name: &str, specs: [SliceSpec; 2]) -> Result<ArrayView<'_, i64, 2>> {
        let heights = self
            .maps
            .get(name)
            .ok_or_else(|| Error::mismatch(format!("no height map '{}'", name)))?;
        ArrayView::new(heights, self.shape, specs)
    }

    /// Mutable window over map `name`
    pub fn view_mut(&mut self, name: &str, specs: [SliceSpec; 2]) -> Result<ArrayViewMut<'_, i64, 2>> {
        let shape = self.shape;
        let heights = self
            .maps
            .get_mut(name)
            .ok_or_else(|| Error::mismatch(format!("no height map '{}'", name)))?;
        ArrayViewMut::new(heights, shape, specs)
    }

    fn check_len(&self, name: &str, len: usize) -> Result<()> {
        let expected = element_count(&self.shape)?;
        if len != expected {
            return Err(Error::mismatch(format!(
                "height map '{}' has {} cells, expected {} for shape {:?}",
                name, len, expected, self.shape
            )));
        }
        Ok(())
    }
}

impl Component for HeightmapComponent {
    const STORAGE_KEY: &'static str = "hm";
    type Value = BTreeMap<String, Vec<i64>>;

    fn get(&self) -> &Self::Value {
        &self.maps
    }

    fn set(&mut self, value: Self::Value) -> Result<()> {
        for (name, heights) in &value {
            self.check_len(name, heights.len())?;
        }
        self.maps = value;
        Ok(())
    }

    fn to_tag(&self) -> Tag {
        let maps: Compound = self
            .maps
            .iter()
            .map(|(name, heights)| (name.clone(), Tag::LongArray(heights.clone())))
            .collect();
        let mut root = Compound::new();
        root.insert("shape", shape_tag(&self.shape));
        root.insert("maps", maps);
        Tag::Compound(root)
    }

    fn from_tag(tag: &Tag) -> Result<Self> {
        let root = component_root(Self::STORAGE_KEY, tag)?;
        let mut component = HeightmapComponent::new(shape_from(root.require_int_array("shape")?)?);
        let maps = root.require_compound("maps")?;
        for name in maps.keys() {
            component.set_map(name, maps.require_long_array(name)?.to_vec())?;
        }
        Ok(component)
    }
}
