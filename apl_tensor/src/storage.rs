// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flat element storage for each element kind.
//!
//! `Float32` keeps one `f32` per element. `Int4` packs two signed nibbles per
//! byte (high nibble first, offset by 8). `Bit1` packs eight values per byte,
//! most significant bit first. The logical element count is tracked
//! separately because the packed kinds round up to whole bytes.

use serde::{Deserialize, Serialize};

use crate::{ElementKind, TensorError};

/// Smallest value representable by a packed 4-bit element.
pub const INT4_MIN: i8 = -8;
/// Largest value representable by a packed 4-bit element.
pub const INT4_MAX: i8 = 7;

/// Backing buffer for a tensor's elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Storage {
    /// One `f32` per element.
    Float32(Vec<f32>),
    /// Two signed 4-bit values per byte.
    Int4 { packed: Vec<u8>, len: usize },
    /// Eight 1-bit values per byte.
    Bit1 { packed: Vec<u8>, len: usize },
}

impl Storage {
    /// Allocates zero-filled storage for `len` elements.
    #[must_use]
    pub fn zeros(kind: ElementKind, len: usize) -> Self {
        match kind {
            ElementKind::Float32 => Self::Float32(vec![0.0; len]),
            ElementKind::Int4 => Self::Int4 {
                // Zero is stored as the offset value 8 in each nibble.
                packed: vec![0x88; int4_bytes(len)],
                len,
            },
            ElementKind::Bit1 => Self::Bit1 {
                packed: vec![0; bit1_bytes(len)],
                len,
            },
        }
    }

    /// Packs signed 4-bit values.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::ValueOutOfRange`] if a value lies outside
    /// `INT4_MIN..=INT4_MAX`.
    pub fn pack_int4(values: &[i8]) -> Result<Self, TensorError> {
        let mut packed = vec![0u8; int4_bytes(values.len())];
        for (i, &v) in values.iter().enumerate() {
            if !(INT4_MIN..=INT4_MAX).contains(&v) {
                return Err(TensorError::ValueOutOfRange {
                    kind: ElementKind::Int4,
                    value: f64::from(v),
                });
            }
            let nibble = (v - INT4_MIN) as u8;
            if i % 2 == 0 {
                packed[i / 2] |= nibble << 4;
            } else {
                packed[i / 2] |= nibble;
            }
        }
        // An odd trailing slot holds a packed zero.
        if values.len() % 2 == 1 {
            packed[values.len() / 2] |= 0x08;
        }
        Ok(Self::Int4 {
            packed,
            len: values.len(),
        })
    }

    /// Packs 1-bit values.
    #[must_use]
    pub fn pack_bits(values: &[bool]) -> Self {
        let mut packed = vec![0u8; bit1_bytes(values.len())];
        for (i, &bit) in values.iter().enumerate() {
            if bit {
                packed[i / 8] |= 0x80 >> (i % 8);
            }
        }
        Self::Bit1 {
            packed,
            len: values.len(),
        }
    }

    /// Returns the element kind of this buffer.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Float32(_) => ElementKind::Float32,
            Self::Int4 { .. } => ElementKind::Int4,
            Self::Bit1 { .. } => ElementKind::Bit1,
        }
    }

    /// Returns the logical number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Int4 { len, .. } | Self::Bit1 { len, .. } => *len,
        }
    }

    /// Returns true if there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes occupied by the buffer.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len() * std::mem::size_of::<f32>(),
            Self::Int4 { packed, .. } | Self::Bit1 { packed, .. } => packed.len(),
        }
    }

    /// Reads element `index` as `f32`. Returns `None` when out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len() {
            return None;
        }
        Some(match self {
            Self::Float32(v) => v[index],
            Self::Int4 { packed, .. } => {
                let byte = packed[index / 2];
                let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
                f32::from(nibble as i8 + INT4_MIN)
            },
            Self::Bit1 { packed, .. } => {
                if packed[index / 8] & (0x80 >> (index % 8)) != 0 {
                    1.0
                } else {
                    0.0
                }
            },
        })
    }

    /// Decodes every element to `f32`, in storage order.
    #[must_use]
    pub fn to_f32_vec(&self) -> Vec<f32> {
        match self {
            Self::Float32(v) => v.clone(),
            _ => (0..self.len()).filter_map(|i| self.get(i)).collect(),
        }
    }
}

/// Bytes needed for `len` packed 4-bit values.
#[inline]
#[must_use]
pub const fn int4_bytes(len: usize) -> usize {
    (len + 1) / 2
}

/// Bytes needed for `len` packed 1-bit values.
#[inline]
#[must_use]
pub const fn bit1_bytes(len: usize) -> usize {
    (len + 7) / 8
}
