//! Rank-2..5 dense contiguous storage, shared by every tensor in the pipeline
//! (audio blocks, steering table, channel spectra, output maps).
//!
//! One generic container parameterized over rank via a const generic instead
//! of a per-rank type or a class hierarchy: `Tensor<f32, 3>` is an audio
//! block, `Tensor<Complex<f32>, 5>` is the steering table.

use crate::error::BeamformError;

/// Safety cap on the number of elements a single tensor may allocate.
/// Guards against a misconfigured sweep silently requesting an enormous
/// allocation rather than failing fast at construction.
const MAX_ELEMENTS: usize = 1 << 30;

/// A dense, row-major, rank-`R` array of `T`.
///
/// Shape is fixed at construction and storage is owned exclusively by the
/// tensor; there is no aliasing between distinct `Tensor` values.
#[derive(Clone, Debug)]
pub struct Tensor<T, const R: usize> {
    dims: [usize; R],
    strides: [usize; R],
    data: Vec<T>,
}

impl<T: Clone + Default, const R: usize> Tensor<T, R> {
    /// Allocates a new tensor of the given shape, zero-initialized via `T::default()`.
    pub fn new(dims: [usize; R]) -> Result<Self, BeamformError> {
        if dims.iter().any(|&d| d == 0) {
            return Err(BeamformError::InvalidShape(format!(
                "all dimensions must be positive, got {:?}",
                dims
            )));
        }
        let total: usize = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)).ok_or_else(|| {
            BeamformError::InvalidShape(format!("shape {:?} overflows usize", dims))
        })?;
        if total > MAX_ELEMENTS {
            return Err(BeamformError::InvalidShape(format!(
                "shape {:?} requests {} elements, exceeding the {} cap",
                dims, total, MAX_ELEMENTS
            )));
        }

        let mut strides = [0usize; R];
        let mut acc = 1usize;
        for i in (0..R).rev() {
            strides[i] = acc;
            acc *= dims[i];
        }

        Ok(Self {
            dims,
            strides,
            data: vec![T::default(); total],
        })
    }

    /// Assigns `v` to every element.
    pub fn fill(&mut self, v: T) {
        for slot in self.data.iter_mut() {
            *slot = v.clone();
        }
    }

    /// Overwrites this tensor's storage with `src`, which must have the same shape.
    pub fn copy_from(&mut self, src: &Tensor<T, R>) {
        debug_assert_eq!(self.dims, src.dims, "copy_from requires matching shapes");
        self.data.clone_from(&src.data);
    }
}

impl<T, const R: usize> Tensor<T, R> {
    /// Dimensions `d_1..d_k`.
    pub fn shape(&self) -> [usize; R] {
        self.dims
    }

    /// Total element count, `prod(d_i)`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, idx: [usize; R]) -> usize {
        let mut off = 0;
        for i in 0..R {
            debug_assert!(idx[i] < self.dims[i], "index {} out of bounds for dim {} (size {})", idx[i], i, self.dims[i]);
            off += idx[i] * self.strides[i];
        }
        off
    }

    /// Element access by `k` explicit indices. Bounds are only checked in debug builds.
    pub fn at(&self, idx: [usize; R]) -> &T {
        let off = self.offset(idx);
        &self.data[off]
    }

    pub fn at_mut(&mut self, idx: [usize; R]) -> &mut T {
        let off = self.offset(idx);
        &mut self.data[off]
    }

    /// Contiguous slice over the trailing dimension, addressed by the leading `R - 1` indices.
    /// Used for unit-stride access into the last axis (FFT bins, samples, …).
    pub fn trailing_slice(&self, leading: &[usize]) -> &[T] {
        debug_assert_eq!(leading.len(), R - 1);
        let mut full = [0usize; R];
        full[..R - 1].copy_from_slice(leading);
        let start = self.offset(full);
        &self.data[start..start + self.dims[R - 1]]
    }

    pub fn trailing_slice_mut(&mut self, leading: &[usize]) -> &mut [T] {
        debug_assert_eq!(leading.len(), R - 1);
        let mut full = [0usize; R];
        full[..R - 1].copy_from_slice(leading);
        let start = self.offset(full);
        let len = self.dims[R - 1];
        &mut self.data[start..start + len]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: std::fmt::Display, const R: usize> Tensor<T, R> {
    /// Diagnostic formatting of the 2-D slice at the given leading indices
    /// (length `R - 2`). Has no effect on state.
    pub fn print_layer(&self, leading: &[usize]) -> String {
        debug_assert_eq!(leading.len(), R - 2);
        let rows = self.dims[R - 2];
        let cols = self.dims[R - 1];
        let mut out = String::new();
        for r in 0..rows {
            let mut full = [0usize; R];
            full[..R - 2].copy_from_slice(leading);
            full[R - 2] = r;
            for c in 0..cols {
                full[R - 1] = c;
                let off = self.offset(full);
                out.push_str(&format!("{:>10.4} ", self.data[off]));
            }
            out.push('\n');
        }
        out
    }
}
