//! Sectioned index arrays
//!
//! A chunk column is split vertically into sections. Each section is a dense
//! 3D array of palette indices with a fixed shape; missing sections read as
//! a default value until populated.

use crate::slice::SliceSpec;
use crate::view::{ArrayView, ArrayViewMut};
use chunkform_core::{Compound, Error, Result, Tag};
use std::collections::BTreeMap;

/// Dense `x * y * z` array of palette indices, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArray3D {
    shape: [usize; 3],
    data: Vec<u32>,
}

impl IndexArray3D {
    /// Array of `shape` filled with `fill`
    ///
    /// # Panics
    ///
    /// If the element count of `shape` overflows `usize`.
    pub fn new(shape: [usize; 3], fill: u32) -> Self {
        IndexArray3D {
            shape,
            data: vec![fill; shape.iter().product()],
        }
    }

    /// Wrap an existing buffer
    ///
    /// Fails with [`Error::StructuralMismatch`] if the buffer length does not
    /// match the shape.
    pub fn from_vec(shape: [usize; 3], data: Vec<u32>) -> Result<Self> {
        let expected = element_count(&shape)?;
        if data.len() != expected {
            return Err(Error::mismatch(format!(
                "{} indices cannot fill a {:?} section",
                data.len(),
                shape
            )));
        }
        Ok(IndexArray3D { shape, data })
    }

    /// Shape of the array
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Flat row-major contents
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    /// Mutable flat contents. The length cannot change through this.
    pub fn as_mut_slice(&mut self) -> &mut [u32] {
        &mut self.data
    }

    fn offset(&self, [x, y, z]: [usize; 3]) -> Result<usize> {
        if x >= self.shape[0] || y >= self.shape[1] || z >= self.shape[2] {
            return Err(Error::slice(format!(
                "({}, {}, {}) outside section of shape {:?}",
                x, y, z, self.shape
            )));
        }
        Ok((x * self.shape[1] + y) * self.shape[2] + z)
    }

    /// Index at `(x, y, z)`
    pub fn get(&self, index: [usize; 3]) -> Result<u32> {
        Ok(self.data[self.offset(index)?])
    }

    /// Replace the index at `(x, y, z)`
    pub fn set(&mut self, index: [usize; 3], value: u32) -> Result<()> {
        let offset = self.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Read-only window over the section
    pub fn view(&self, specs: [SliceSpec; 3]) -> Result<ArrayView<'_, u32, 3>> {
        ArrayView::new(&self.data, self.shape, specs)
    }

    /// Mutable window over the section
    pub fn view_mut(&mut self, specs: [SliceSpec; 3]) -> Result<ArrayViewMut<'_, u32, 3>> {
        ArrayViewMut::new(&mut self.data, self.shape, specs)
    }
}

/// Sparse map of section y index to fixed-shape index arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionArrayMap {
    array_shape: [usize; 3],
    default: u32,
    sections: BTreeMap<i64, IndexArray3D>,
}

impl SectionArrayMap {
    /// Empty map whose sections all have `array_shape`
    pub fn new(array_shape: [usize; 3], default: u32) -> Result<Self> {
        if array_shape.iter().any(|&d| d == 0) {
            return Err(Error::mismatch(format!(
                "section shape {:?} has a zero dimension",
                array_shape
            )));
        }
        element_count(&array_shape)?;
        Ok(SectionArrayMap {
            array_shape,
            default,
            sections: BTreeMap::new(),
        })
    }

    /// Shape every section must have
    pub fn array_shape(&self) -> [usize; 3] {
        self.array_shape
    }

    /// Value missing sections read as
    pub fn default_value(&self) -> u32 {
        self.default
    }

    /// Number of materialized sections
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section is materialized
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Whether section `cy` is materialized
    pub fn contains_section(&self, cy: i64) -> bool {
        self.sections.contains_key(&cy)
    }

    /// Materialized section y indices, ascending
    pub fn section_ys(&self) -> impl Iterator<Item = i64> + '_ {
        self.sections.keys().copied()
    }

    /// Materialized sections, ascending by y
    pub fn sections(&self) -> impl Iterator<Item = (i64, &IndexArray3D)> {
        self.sections.iter().map(|(cy, a)| (*cy, a))
    }

    /// Mutable materialized sections, ascending by y
    pub fn sections_mut(&mut self) -> impl Iterator<Item = (i64, &mut IndexArray3D)> {
        self.sections.iter_mut().map(|(cy, a)| (*cy, a))
    }

    /// Section `cy`, if materialized
    pub fn get_section(&self, cy: i64) -> Option<&IndexArray3D> {
        self.sections.get(&cy)
    }

    /// Mutable section `cy`, if materialized
    pub fn get_section_mut(&mut self, cy: i64) -> Option<&mut IndexArray3D> {
        self.sections.get_mut(&cy)
    }

    /// Store `array` as section `cy`
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] if the array shape differs from
    /// [`array_shape`](Self::array_shape). The map is unchanged.
    pub fn set_section(&mut self, cy: i64, array: IndexArray3D) -> Result<()> {
        if array.shape() != self.array_shape {
            return Err(Error::mismatch(format!(
                "section {} has shape {:?}, expected {:?}",
                cy,
                array.shape(),
                self.array_shape
            )));
        }
        self.sections.insert(cy, array);
        Ok(())
    }

    /// Section `cy`, materialized from the default if missing
    pub fn populate_section(&mut self, cy: i64) -> &mut IndexArray3D {
        let (shape, default) = (self.array_shape, self.default);
        self.sections
            .entry(cy)
            .or_insert_with(|| IndexArray3D::new(shape, default))
    }

    /// Remove section `cy`
    pub fn del_section(&mut self, cy: i64) -> Option<IndexArray3D> {
        self.sections.remove(&cy)
    }

    /// Index at column-local `(x, z)` and absolute `y`
    pub fn get_at(&self, x: usize, y: i64, z: usize) -> Result<u32> {
        let sy = self.array_shape[1] as i64;
        let (cy, dy) = (y.div_euclid(sy), y.rem_euclid(sy) as usize);
        match self.sections.get(&cy) {
            Some(section) => section.get([x, dy, z]),
            None => {
                self.check_column(x, z)?;
                Ok(self.default)
            }
        }
    }

    /// Replace the index at column-local `(x, z)` and absolute `y`
    pub fn set_at(&mut self, x: usize, y: i64, z: usize, value: u32) -> Result<()> {
        self.check_column(x, z)?;
        let sy = self.array_shape[1] as i64;
        let (cy, dy) = (y.div_euclid(sy), y.rem_euclid(sy) as usize);
        self.populate_section(cy).set([x, dy, z], value)
    }

    fn check_column(&self, x: usize, z: usize) -> Result<()> {
        if x >= self.array_shape[0] || z >= self.array_shape[2] {
            return Err(Error::slice(format!(
                "column ({}, {}) outside footprint {}x{}",
                x, z, self.array_shape[0], self.array_shape[2]
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Tag form
    // =========================================================================

    /// Encode as `{shape, default, sections: [{cy, data}]}`
    pub fn to_tag(&self) -> Tag {
        let sections = self
            .sections
            .iter()
            .map(|(cy, array)| {
                let mut entry = Compound::new();
                entry.insert("cy", Tag::Long(*cy));
                entry.insert(
                    "data",
                    Tag::LongArray(array.as_slice().iter().map(|&v| i64::from(v)).collect()),
                );
                Tag::Compound(entry)
            })
            .collect();
        let mut root = Compound::new();
        root.insert("shape", shape_tag(&self.array_shape));
        root.insert("default", Tag::Long(self.default as i64));
        root.insert("sections", Tag::List(sections));
        Tag::Compound(root)
    }

    /// Decode the form written by [`to_tag`](Self::to_tag)
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        let root = tag
            .as_compound()
            .ok_or_else(|| Error::mismatch(format!("section map is {}, expected compound", tag.kind())))?;
        let array_shape: [usize; 3] = shape_from(root.require_int_array("shape")?)?;
        let default = u32::try_from(root.require_i64("default")?)
            .map_err(|_| Error::mismatch("section default out of range"))?;
        let mut map = SectionArrayMap::new(array_shape, default)?;
        for entry in root.require_list("sections")? {
            let entry = entry
                .as_compound()
                .ok_or_else(|| Error::mismatch("section entry is not a compound"))?;
            let cy = entry.require_i64("cy")?;
            let data = entry
                .require_long_array("data")?
                .iter()
                .map(|&v| {
                    u32::try_from(v)
                        .map_err(|_| Error::mismatch(format!("section index {} out of range", v)))
                })
                .collect::<Result<Vec<_>>>()?;
            map.set_section(cy, IndexArray3D::from_vec(array_shape, data)?)?;
        }
        Ok(map)
    }
}

/// Shape as an int array tag
pub(crate) fn shape_tag(shape: &[usize]) -> Tag {
    Tag::IntArray(shape.iter().map(|&d| d as i32).collect())
}

/// Fixed-rank shape from an int array
pub(crate) fn shape_from<const N: usize>(dims: &[i32]) -> Result<[usize; N]> {
    if dims.len() != N {
        return Err(Error::mismatch(format!(
            "shape has {} axes, expected {}",
            dims.len(),
            N
        )));
    }
    let mut shape = [0usize; N];
    for (axis, &d) in dims.iter().enumerate() {
        shape[axis] = usize::try_from(d)
            .map_err(|_| Error::mismatch(format!("negative dimension {} in shape", d)))?;
    }
    element_count(&shape)?;
    Ok(shape)
}

/// Number of elements in an array of `shape`
///
/// Fails with [`Error::StructuralMismatch`] if the count overflows `usize`.
pub(crate) fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |count, &d| count.checked_mul(d))
        .ok_or_else(|| Error::mismatch(format!("shape {:?} has too many elements", shape)))
}
