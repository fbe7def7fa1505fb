//! Partial array views
//!
//! Windowed read/write access to an N-axis, row-major buffer. A view holds
//! one [`NormalizedSlice`] per axis and addresses only the selected elements;
//! nothing outside the window is copied or touched.
//!
//! ```rust
//! use chunkform_storage::{ArrayView, SliceSpec};
//!
//! let data: Vec<u32> = (0..16).collect(); // 4 x 4
//! let view = ArrayView::new(&data, [4, 4], [SliceSpec::stepped(0, 4, 2), SliceSpec::reversed()]).unwrap();
//! assert_eq!(view.shape(), [2, 4]);
//! assert_eq!(view.to_vec(), vec![3, 2, 1, 0, 11, 10, 9, 8]);
//! ```

use crate::section::element_count;
use crate::slice::{normalize_slice, NormalizedSlice, SliceSpec};
use chunkform_core::{Error, Result};

/// Row-major multi-index iterator over a shape
#[derive(Debug, Clone)]
pub struct Indices<const N: usize> {
    shape: [usize; N],
    next: Option<[usize; N]>,
}

impl<const N: usize> Indices<N> {
    /// Iterate every index of `shape`
    pub fn new(shape: [usize; N]) -> Self {
        let next = if shape.iter().any(|&d| d == 0) {
            None
        } else {
            Some([0; N])
        };
        Indices { shape, next }
    }
}

impl<const N: usize> Iterator for Indices<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut advanced = current;
        let mut carried_out = true;
        for axis in (0..N).rev() {
            advanced[axis] += 1;
            if advanced[axis] < self.shape[axis] {
                carried_out = false;
                break;
            }
            advanced[axis] = 0;
        }
        self.next = if carried_out { None } else { Some(advanced) };
        Some(current)
    }
}

/// Strides and per-axis slices shared by both view kinds
#[derive(Debug, Clone, Copy)]
struct Window<const N: usize> {
    strides: [usize; N],
    slices: [NormalizedSlice; N],
}

impl<const N: usize> Window<N> {
    fn new(buffer_len: usize, shape: [usize; N], specs: [SliceSpec; N]) -> Result<Self> {
        let expected = element_count(&shape)?;
        if buffer_len != expected {
            return Err(Error::mismatch(format!(
                "buffer of {} elements cannot have shape {:?}",
                buffer_len, shape
            )));
        }
        let mut strides = [1usize; N];
        for axis in (0..N.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }
        let mut slices = [normalize_slice(SliceSpec::full(), 0)?; N];
        for axis in 0..N {
            slices[axis] = normalize_slice(specs[axis], shape[axis])?;
        }
        Ok(Window { strides, slices })
    }

    fn shape(&self) -> [usize; N] {
        let mut shape = [0; N];
        for (axis, s) in self.slices.iter().enumerate() {
            shape[axis] = s.len();
        }
        shape
    }

    fn len(&self) -> usize {
        self.slices.iter().map(NormalizedSlice::len).product()
    }

    fn offset(&self, index: [usize; N]) -> Result<usize> {
        let mut offset = 0usize;
        for axis in 0..N {
            let position = self.slices[axis].position(index[axis]).ok_or_else(|| {
                Error::slice(format!(
                    "index {:?} out of range for view shape {:?}",
                    index,
                    self.shape()
                ))
            })?;
            offset += position as usize * self.strides[axis];
        }
        Ok(offset)
    }

    /// Offset of an index known to be in range
    fn offset_unchecked(&self, index: [usize; N]) -> usize {
        let mut offset = 0usize;
        for axis in 0..N {
            if let Some(position) = self.slices[axis].position(index[axis]) {
                offset += position as usize * self.strides[axis];
            }
        }
        offset
    }

    fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        Indices::new(self.shape()).map(move |index| self.offset_unchecked(index))
    }

    fn restrict(&self, specs: [SliceSpec; N]) -> Result<Self> {
        let mut slices = self.slices;
        for axis in 0..N {
            let inner = normalize_slice(specs[axis], self.slices[axis].len())?;
            slices[axis] = self.slices[axis].stack(&inner);
        }
        Ok(Window {
            strides: self.strides,
            slices,
        })
    }
}

/// Read-only window into a row-major buffer
#[derive(Debug, Clone, Copy)]
pub struct ArrayView<'a, T, const N: usize> {
    data: &'a [T],
    window: Window<N>,
}

impl<'a, T, const N: usize> ArrayView<'a, T, N> {
    /// View `data`, laid out with `shape`, through `specs`
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] if `data` does not hold exactly
    /// `shape.product()` elements; [`Error::Slice`] for a zero step.
    pub fn new(data: &'a [T], shape: [usize; N], specs: [SliceSpec; N]) -> Result<Self> {
        Ok(ArrayView {
            data,
            window: Window::new(data.len(), shape, specs)?,
        })
    }

    /// Shape of the window
    pub fn shape(&self) -> [usize; N] {
        self.window.shape()
    }

    /// Number of addressed elements
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-axis slices in source coordinates
    pub fn slices(&self) -> &[NormalizedSlice; N] {
        &self.window.slices
    }

    /// Element at a window index
    pub fn get(&self, index: [usize; N]) -> Result<&'a T> {
        Ok(&self.data[self.window.offset(index)?])
    }

    /// Elements in row-major window order
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        let data = self.data;
        self.window.offsets().map(move |o| &data[o])
    }

    /// Narrow this view further without copying
    pub fn slice(&self, specs: [SliceSpec; N]) -> Result<ArrayView<'a, T, N>> {
        Ok(ArrayView {
            data: self.data,
            window: self.window.restrict(specs)?,
        })
    }
}

impl<'a, T: Clone, const N: usize> ArrayView<'a, T, N> {
    /// Copy the addressed elements out, in row-major window order
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

/// Mutable window into a row-major buffer
#[derive(Debug)]
pub struct ArrayViewMut<'a, T, const N: usize> {
    data: &'a mut [T],
    window: Window<N>,
}

impl<'a, T, const N: usize> ArrayViewMut<'a, T, N> {
    /// View `data`, laid out with `shape`, through `specs`
    pub fn new(data: &'a mut [T], shape: [usize; N], specs: [SliceSpec; N]) -> Result<Self> {
        let window = Window::new(data.len(), shape, specs)?;
        Ok(ArrayViewMut { data, window })
    }

    /// Shape of the window
    pub fn shape(&self) -> [usize; N] {
        self.window.shape()
    }

    /// Number of addressed elements
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a window index
    pub fn get(&self, index: [usize; N]) -> Result<&T> {
        Ok(&self.data[self.window.offset(index)?])
    }

    /// Replace the element at a window index
    pub fn set(&mut self, index: [usize; N], value: T) -> Result<()> {
        let offset = self.window.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Apply `f` to every addressed element
    pub fn update(&mut self, mut f: impl FnMut(&mut T)) {
        let offsets: Vec<usize> = self.window.offsets().collect();
        for o in offsets {
            f(&mut self.data[o]);
        }
    }

    /// Read-only view of the same window
    pub fn as_view(&self) -> ArrayView<'_, T, N> {
        ArrayView {
            data: self.data,
            window: self.window,
        }
    }

    /// Narrow this view further without copying
    pub fn slice(&mut self, specs: [SliceSpec; N]) -> Result<ArrayViewMut<'_, T, N>> {
        let window = self.window.restrict(specs)?;
        Ok(ArrayViewMut {
            data: self.data,
            window,
        })
    }
}

impl<'a, T: Clone, const N: usize> ArrayViewMut<'a, T, N> {
    /// Set every addressed element to `value`
    pub fn fill(&mut self, value: T) {
        self.update(|v| *v = value.clone());
    }

    /// Overwrite the addressed elements from `values` in row-major window order
    ///
    /// # Errors
    ///
    /// [`Error::StructuralMismatch`] if `values.len()` differs from the window
    /// length. Nothing is written in that case.
    pub fn copy_from(&mut self, values: &[T]) -> Result<()> {
        if values.len() != self.len() {
            return Err(Error::mismatch(format!(
                "{} values for a window of {} elements",
                values.len(),
                self.len()
            )));
        }
        let offsets: Vec<usize> = self.window.offsets().collect();
        for (o, v) in offsets.into_iter().zip(values) {
            self.data[o] = v.clone();
        }
        Ok(())
    }

    /// Copy the addressed elements out, in row-major window order
    pub fn to_vec(&self) -> Vec<T> {
        self.as_view().to_vec()
    }
}
