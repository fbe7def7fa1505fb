//! Slice normalization
//!
//! Converts a possibly partial `(start, stop, step)` request plus a known axis
//! size into a concrete descriptor that enumerates the addressed positions
//! without materializing the array.
//!
//! # Normalized Form
//!
//! A [`NormalizedSlice`] is an enumeration descriptor, not a pair of element
//! indices. For a positive step the `i`-th position is `start + i * step`.
//! For a negative step both bounds are shifted up by one, so the `i`-th
//! position is `start - 1 + i * step`. In both cases
//! `stop == start + len * step`.
//!
//! ```text
//! size 10, (0, 5, 2)        -> (0, 6, 2)   len 3  positions 0, 2, 4
//! size 10, (None, None, -1) -> (10, 0, -1) len 10 positions 9, 8, ..., 0
//! ```

use chunkform_core::{Error, Result};

/// A per-axis slice request; any field may be unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceSpec {
    /// First position, negative counts from the end
    pub start: Option<i64>,
    /// Exclusive end, negative counts from the end
    pub stop: Option<i64>,
    /// Step, must not be zero
    pub step: Option<i64>,
}

impl SliceSpec {
    /// Slice with every field given explicitly
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        SliceSpec { start, stop, step }
    }

    /// The whole axis
    pub const fn full() -> Self {
        SliceSpec::new(None, None, None)
    }

    /// The whole axis, reversed
    pub const fn reversed() -> Self {
        SliceSpec::new(None, None, Some(-1))
    }

    /// `start..stop` with step 1
    pub const fn range(start: i64, stop: i64) -> Self {
        SliceSpec::new(Some(start), Some(stop), None)
    }

    /// `start..stop` with an explicit step
    pub const fn stepped(start: i64, stop: i64, step: i64) -> Self {
        SliceSpec::new(Some(start), Some(stop), Some(step))
    }

    /// A single position; negative counts from the end
    pub const fn index(i: i64) -> Self {
        if i == -1 {
            SliceSpec::new(Some(-1), None, Some(1))
        } else {
            SliceSpec::new(Some(i), Some(i.saturating_add(1)), Some(1))
        }
    }
}

/// A concrete, self-consistent `(start, stop, step)` enumeration descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSlice {
    start: i64,
    stop: i64,
    step: i64,
    len: usize,
}

/// `ceil(a / b)` for any signs, `b != 0`
fn ceil_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    let r = a % b;
    if r != 0 && ((r > 0) == (b > 0)) {
        q + 1
    } else {
        q
    }
}

impl NormalizedSlice {
    /// Count the positions and pin `stop` to `start + len * step`
    ///
    /// Counting is done in `i128`; a pinned `stop` beyond `i64` saturates.
    fn finish(start: i64, stop: i64, step: i64) -> Self {
        let len = ceil_div(i128::from(stop) - i128::from(start), i128::from(step)).max(0);
        NormalizedSlice {
            start,
            stop: boundary(start, len, step),
            step,
            len: usize::try_from(len).unwrap_or(usize::MAX),
        }
    }

    /// Descriptor that visits `len` positions starting at `first`
    fn from_first(first: i64, step: i64, len: usize) -> Self {
        let start = if step > 0 { first } else { first.saturating_add(1) };
        NormalizedSlice {
            start,
            stop: boundary(start, len as i128, step),
            step,
            len,
        }
    }

    /// Start boundary
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Stop boundary
    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Step
    pub fn step(&self) -> i64 {
        self.step
    }

    /// The `(start, stop, step)` triple
    pub fn triple(&self) -> (i64, i64, i64) {
        (self.start, self.stop, self.step)
    }

    /// Number of positions visited
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no position is visited
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `i`-th visited position; `None` past the end
    pub fn position(&self, i: usize) -> Option<i64> {
        if i >= self.len {
            return None;
        }
        let offset = i as i128 * i128::from(self.step);
        let first = if self.step > 0 {
            i128::from(self.start)
        } else {
            i128::from(self.start) - 1
        };
        i64::try_from(first + offset).ok()
    }

    /// All visited positions in enumeration order
    pub fn positions(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len).filter_map(move |i| self.position(i))
    }

    /// Compose a slice taken of this slice's output into one over the source axis
    ///
    /// `inner` must have been normalized against `self.len()`. A combined
    /// step beyond `i64` saturates.
    pub fn stack(&self, inner: &NormalizedSlice) -> NormalizedSlice {
        let step = self.step.saturating_mul(inner.step);
        match inner.position(0).and_then(|p| self.position(p as usize)) {
            Some(first) => NormalizedSlice::from_first(first, step, inner.len),
            None => NormalizedSlice::from_first(self.start, step, 0),
        }
    }
}

/// `start + len * step`, saturated into `i64`
fn boundary(start: i64, len: i128, step: i64) -> i64 {
    let stop = i128::from(start) + len * i128::from(step);
    i64::try_from(stop).unwrap_or(if stop > 0 { i64::MAX } else { i64::MIN })
}

/// Normalize `spec` against an axis of `size` elements
///
/// Bounds may be any `i64`; they are clamped to `[-1, size]` after
/// negative indices are resolved.
///
/// # Errors
///
/// [`Error::Slice`] if the step is zero.
pub fn normalize_slice(spec: SliceSpec, size: usize) -> Result<NormalizedSlice> {
    let size = i64::try_from(size).unwrap_or(i64::MAX).min(i64::MAX - 1);
    let step = match spec.step {
        None => 1,
        Some(0) => return Err(Error::slice("step cannot be 0")),
        Some(step) => step,
    };

    let mut start = match spec.start {
        None if step > 0 => 0,
        None => size - 1,
        Some(s) if s < 0 => size + s,
        Some(s) => s,
    }
    .clamp(-1, size);
    let mut stop = match spec.stop {
        None if step > 0 => size,
        None => -1,
        Some(s) if s < 0 => size + s,
        Some(s) => s,
    }
    .clamp(-1, size);

    if step < 0 {
        start += 1;
        stop += 1;
    }

    if step > 0 {
        start = start.max(0);
        stop = stop.min(size);
    } else {
        start = start.min(size);
        stop = stop.max(0);
    }

    Ok(NormalizedSlice::finish(start, stop, step))
}

/// Normalize `spec` on an axis with no fixed size
///
/// Unset bounds default to `default_min`/`default_max`; negative values are
/// taken literally and nothing is clamped. The negative-step adjustment
/// saturates at `i64::MAX`.
pub fn normalize_unbounded(
    spec: SliceSpec,
    default_min: i64,
    default_max: i64,
) -> Result<NormalizedSlice> {
    let step = match spec.step {
        None => 1,
        Some(0) => return Err(Error::slice("step cannot be 0")),
        Some(step) => step,
    };
    let (mut start, mut stop) = if step > 0 {
        (
            spec.start.unwrap_or(default_min),
            spec.stop.unwrap_or(default_max),
        )
    } else {
        (
            spec.start.unwrap_or(default_max),
            spec.stop.unwrap_or(default_min),
        )
    };
    if step < 0 {
        start = start.saturating_add(1);
        stop = stop.saturating_add(1);
    }
    Ok(NormalizedSlice::finish(start, stop, step))
}

/// Number of elements `spec` addresses in an axis of `size` elements
pub fn sliced_array_size(spec: SliceSpec, size: usize) -> Result<usize> {
    Ok(normalize_slice(spec, size)?.len())
}
