// SPDX-License-Identifier: MIT OR Apache-2.0
//! APL Tensor - immutable n-dimensional numeric values.
//!
//! A [`Tensor`] pairs a shape with a flat, row-major element buffer. Every
//! operation that changes shape returns a new tensor; nothing is mutated in
//! place. Three element kinds are supported:
//!
//! - `Float32`: four bytes per element
//! - `Int4`: signed 4-bit values, two per byte
//! - `Bit1`: single-bit values, eight per byte
//!
//! # Example
//!
//! ```
//! use apl_tensor::Tensor;
//!
//! let v = Tensor::iota(6);
//! let m = v.reshape(&[2, 3]).unwrap();
//! assert_eq!(m.shape(), &[2, 3]);
//! assert_eq!(m.get(&[1, 0]), Some(3.0));
//! ```

pub mod display;
pub mod storage;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use storage::{Storage, INT4_MAX, INT4_MIN};

/// Element representation of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ElementKind {
    /// 32-bit IEEE float.
    #[default]
    Float32,
    /// Signed 4-bit integer, packed.
    Int4,
    /// Single bit, packed.
    Bit1,
}

impl ElementKind {
    /// Bits of storage used per element.
    #[must_use]
    pub const fn bits(self) -> usize {
        match self {
            Self::Float32 => 32,
            Self::Int4 => 4,
            Self::Bit1 => 1,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float32 => write!(f, "Float32"),
            Self::Int4 => write!(f, "Int4"),
            Self::Bit1 => write!(f, "Bit1"),
        }
    }
}

/// Errors produced by tensor construction and reshaping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    /// Reshape target does not hold the same number of elements.
    #[error("Shape mismatch: cannot reshape {from:?} ({from_len} elements) to {to:?} ({to_len} elements)")]
    ShapeMismatch {
        /// Current shape.
        from: Vec<usize>,
        /// Requested shape.
        to: Vec<usize>,
        /// Elements in the current shape.
        from_len: usize,
        /// Elements in the requested shape, `None` if the product overflows.
        to_len: ElementCount,
    },

    /// Supplied values do not match the element count of the shape.
    #[error("Element count mismatch: shape {shape:?} needs {expected} values, got {actual}")]
    ElementCount {
        /// Requested shape.
        shape: Vec<usize>,
        /// Elements required by the shape.
        expected: usize,
        /// Elements supplied.
        actual: usize,
    },

    /// A value cannot be represented by the element kind.
    #[error("Value {value} out of range for {kind}")]
    ValueOutOfRange {
        /// Target element kind.
        kind: ElementKind,
        /// Offending value.
        value: f64,
    },
}

/// Element count of a shape, `Overflow` when it does not fit in `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCount {
    /// Exact count.
    Exact(usize),
    /// Product overflowed.
    Overflow,
}

impl fmt::Display for ElementCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::Overflow => write!(f, "too many"),
        }
    }
}

/// Result type for tensor operations.
pub type TensorResult<T> = Result<T, TensorError>;

/// Returns the number of elements a shape holds. The empty shape is a scalar.
#[must_use]
pub fn element_count(shape: &[usize]) -> ElementCount {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .map_or(ElementCount::Overflow, ElementCount::Exact)
}

/// An immutable n-dimensional tensor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tensor {
    shape: Vec<usize>,
    storage: Storage,
}

impl Tensor {
    /// Wraps a buffer, asserting `storage.len() == product(shape)`.
    fn from_parts(shape: Vec<usize>, storage: Storage) -> Self {
        assert_eq!(
            element_count(&shape),
            ElementCount::Exact(storage.len()),
            "tensor invariant violated: shape {shape:?} vs {} elements",
            storage.len()
        );
        Self { shape, storage }
    }

    /// Creates a tensor filled with the kind's zero value.
    ///
    /// # Panics
    ///
    /// Panics if the element count of `shape` overflows `usize`.
    #[must_use]
    pub fn zeros(shape: &[usize], kind: ElementKind) -> Self {
        let ElementCount::Exact(len) = element_count(shape) else {
            panic!("shape {shape:?} is too large to allocate");
        };
        Self::from_parts(shape.to_vec(), Storage::zeros(kind, len))
    }

    /// Creates a 0-D `Float32` scalar.
    #[must_use]
    pub fn scalar(value: f32) -> Self {
        Self::from_parts(Vec::new(), Storage::Float32(vec![value]))
    }

    /// Creates a 1-D `Float32` vector from flat values.
    #[must_use]
    pub fn from_flat_values(values: impl Into<Vec<f32>>) -> Self {
        let values = values.into();
        Self::from_parts(vec![values.len()], Storage::Float32(values))
    }

    /// Creates a `Float32` tensor with an explicit shape.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ElementCount`] if `values` does not fill `shape`.
    pub fn from_shape_values(shape: &[usize], values: Vec<f32>) -> TensorResult<Self> {
        check_count(shape, values.len())?;
        Ok(Self::from_parts(shape.to_vec(), Storage::Float32(values)))
    }

    /// Creates a packed `Int4` tensor.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ElementCount`] if `values` does not fill `shape`,
    /// or [`TensorError::ValueOutOfRange`] for values outside `-8..=7`.
    pub fn from_int4(shape: &[usize], values: &[i8]) -> TensorResult<Self> {
        check_count(shape, values.len())?;
        Ok(Self::from_parts(shape.to_vec(), Storage::pack_int4(values)?))
    }

    /// Creates a packed `Bit1` tensor.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ElementCount`] if `values` does not fill `shape`.
    pub fn from_bits(shape: &[usize], values: &[bool]) -> TensorResult<Self> {
        check_count(shape, values.len())?;
        Ok(Self::from_parts(shape.to_vec(), Storage::pack_bits(values)))
    }

    /// Creates the vector `0, 1, ..., n-1` as `Float32`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn iota(n: usize) -> Self {
        Self::from_flat_values((0..n).map(|i| i as f32).collect::<Vec<_>>())
    }

    /// Returns the shape.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.storage.kind()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Returns true if the tensor holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Returns true for a 0-D tensor.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns the backing storage.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns the number of bytes used by the element buffer.
    #[must_use]
    pub fn storage_bytes(&self) -> usize {
        self.storage.byte_len()
    }

    /// Decodes all elements to `f32` in row-major order.
    #[must_use]
    pub fn values(&self) -> Vec<f32> {
        self.storage.to_f32_vec()
    }

    /// Reads the element at a multi-dimensional index.
    #[must_use]
    pub fn get(&self, index: &[usize]) -> Option<f32> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&i, &dim) in index.iter().zip(&self.shape) {
            if i >= dim {
                return None;
            }
            flat = flat * dim + i;
        }
        self.storage.get(flat)
    }

    /// Returns a new tensor with the same elements under `shape`.
    ///
    /// Element order is preserved row-major.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ShapeMismatch`] if the element counts differ.
    pub fn reshape(&self, shape: &[usize]) -> TensorResult<Self> {
        let to_len = element_count(shape);
        if to_len != ElementCount::Exact(self.len()) {
            return Err(TensorError::ShapeMismatch {
                from: self.shape.clone(),
                to: shape.to_vec(),
                from_len: self.len(),
                to_len,
            });
        }
        Ok(Self::from_parts(shape.to_vec(), self.storage.clone()))
    }

    /// Returns a serializable summary of this tensor.
    #[must_use]
    pub fn descriptor(&self) -> TensorDescriptor {
        TensorDescriptor {
            shape: self.shape.clone(),
            kind: self.kind(),
            values: self.values(),
        }
    }
}

fn check_count(shape: &[usize], actual: usize) -> TensorResult<()> {
    match element_count(shape) {
        ElementCount::Exact(expected) if expected == actual => Ok(()),
        ElementCount::Exact(expected) => Err(TensorError::ElementCount {
            shape: shape.to_vec(),
            expected,
            actual,
        }),
        ElementCount::Overflow => Err(TensorError::ElementCount {
            shape: shape.to_vec(),
            expected: usize::MAX,
            actual,
        }),
    }
}

/// Shape, kind, and decoded values of a tensor, for structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDescriptor {
    pub shape: Vec<usize>,
    pub kind: ElementKind,
    pub values: Vec<f32>,
}

impl fmt::Display for TensorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.shape.iter().map(ToString::to_string).collect();
        write!(f, "Tensor[{}] {}", dims.join("x"), self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeros_float32() {
        let t = Tensor::zeros(&[2, 3], ElementKind::Float32);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.len(), 6);
        assert_eq!(t.storage_bytes(), 24);
        assert!(t.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zeros_narrow_kinds() {
        let t = Tensor::zeros(&[3, 3], ElementKind::Int4);
        assert_eq!(t.kind(), ElementKind::Int4);
        assert_eq!(t.storage_bytes(), 5);
        assert_eq!(t.values(), vec![0.0; 9]);

        let b = Tensor::zeros(&[10], ElementKind::Bit1);
        assert_eq!(b.storage_bytes(), 2);
        assert_eq!(b.values(), vec![0.0; 10]);
    }

    #[test]
    fn test_zeros_with_zero_dimension() {
        let t = Tensor::zeros(&[4, 0], ElementKind::Float32);
        assert!(t.is_empty());
        assert_eq!(t.storage_bytes(), 0);
    }

    #[test]
    fn test_empty_shape_is_scalar() {
        let t = Tensor::zeros(&[], ElementKind::Float32);
        assert!(t.is_scalar());
        assert_eq!(t.len(), 1);
        assert_eq!(Tensor::scalar(2.5).get(&[]), Some(2.5));
    }

    #[test]
    fn test_from_flat_values() {
        let t = Tensor::from_flat_values(vec![1.0, 2.0, 3.0]);
        assert_eq!(t.shape(), &[3]);
        assert_eq!(t.kind(), ElementKind::Float32);
        assert_eq!(t.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_flat_values_empty() {
        let t = Tensor::from_flat_values(Vec::new());
        assert_eq!(t.shape(), &[0]);
        assert!(t.is_empty());
    }

    #[test]
    fn test_iota() {
        assert_eq!(Tensor::iota(5).values(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Tensor::iota(0).shape(), &[0]);
    }

    #[test]
    fn test_reshape_row_major() {
        let m = Tensor::iota(6).reshape(&[2, 3]).unwrap();
        assert_eq!(m.shape(), &[2, 3]);
        assert_eq!(m.get(&[0, 2]), Some(2.0));
        assert_eq!(m.get(&[1, 0]), Some(3.0));
        assert_eq!(m.values(), Tensor::iota(6).values());
    }

    #[test]
    fn test_reshape_same_shape_is_identity() {
        let m = Tensor::iota(6).reshape(&[3, 2]).unwrap();
        assert_eq!(m.reshape(&[3, 2]).unwrap(), m);
    }

    #[test]
    fn test_reshape_does_not_alias_original() {
        let v = Tensor::iota(4);
        let m = v.reshape(&[2, 2]).unwrap();
        assert_eq!(v.shape(), &[4]);
        assert_eq!(m.shape(), &[2, 2]);
    }

    #[test]
    fn test_reshape_mismatch() {
        let err = Tensor::iota(6).reshape(&[4]).unwrap_err();
        match err {
            TensorError::ShapeMismatch { from, to, from_len, to_len } => {
                assert_eq!(from, vec![6]);
                assert_eq!(to, vec![4]);
                assert_eq!(from_len, 6);
                assert_eq!(to_len, ElementCount::Exact(4));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reshape_overflowing_shape() {
        let err = Tensor::iota(2).reshape(&[usize::MAX, 2]).unwrap_err();
        assert!(matches!(
            err,
            TensorError::ShapeMismatch {
                to_len: ElementCount::Overflow,
                ..
            }
        ));
    }

    #[test]
    fn test_reshape_scalar_to_vector() {
        let v = Tensor::scalar(7.0).reshape(&[1]).unwrap();
        assert_eq!(v.shape(), &[1]);
        assert_eq!(v.values(), vec![7.0]);
    }

    #[test]
    fn test_reshape_narrow_kind_keeps_packing() {
        let t = Tensor::from_int4(&[4], &[1, -2, 3, -4]).unwrap();
        let r = t.reshape(&[2, 2]).unwrap();
        assert_eq!(r.kind(), ElementKind::Int4);
        assert_eq!(r.storage(), t.storage());
        assert_eq!(r.get(&[1, 1]), Some(-4.0));
    }

    #[test]
    fn test_from_bits() {
        let t = Tensor::from_bits(&[2, 2], &[true, false, false, true]).unwrap();
        assert_eq!(t.values(), vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(t.storage_bytes(), 1);
    }

    #[test]
    fn test_from_shape_values_count_mismatch() {
        let err = Tensor::from_shape_values(&[2, 2], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            TensorError::ElementCount {
                expected: 4,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let m = Tensor::iota(6).reshape(&[2, 3]).unwrap();
        assert_eq!(m.get(&[2, 0]), None);
        assert_eq!(m.get(&[0]), None);
    }

    #[test]
    fn test_descriptor() {
        let d = Tensor::iota(6).reshape(&[2, 3]).unwrap().descriptor();
        assert_eq!(d.to_string(), "Tensor[2x3] Float32");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"shape\":[2,3]"));
    }

    #[test]
    fn test_element_kind_bits() {
        assert_eq!(ElementKind::Float32.bits(), 32);
        assert_eq!(ElementKind::Int4.bits(), 4);
        assert_eq!(ElementKind::Bit1.bits(), 1);
    }

    #[test]
    #[should_panic(expected = "tensor invariant violated")]
    fn test_invariant_violation_panics() {
        let _ = Tensor::from_parts(vec![3], Storage::Float32(vec![1.0]));
    }
}
