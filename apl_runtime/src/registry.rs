// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model structure registry.
//!
//! An ordered list of declared layers. Records are immutable once appended
//! and handed out as `Arc`s, so a presentation layer holding the registry can
//! take snapshots at any time while the owning session keeps mutating it.

use std::{fmt, sync::Arc};

use apl_parser::Dim;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Precision label attached to a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantization {
    /// 4-bit quantized weights.
    #[serde(rename = "4-bit FPTQ")]
    Fptq4,
    /// Full-precision weights.
    #[serde(rename = "FP32")]
    Fp32,
}

impl Quantization {
    /// Derives the label from a layer kind: kinds containing `Quant` are
    /// quantized.
    #[must_use]
    pub fn for_kind(kind: &str) -> Self {
        if kind.contains("Quant") {
            Self::Fptq4
        } else {
            Self::Fp32
        }
    }
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fptq4 => write!(f, "4-bit FPTQ"),
            Self::Fp32 => write!(f, "FP32"),
        }
    }
}

/// One declared layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub name: String,
    pub kind: String,
    pub shape: Vec<Dim>,
    pub quantization: Quantization,
}

impl LayerRecord {
    /// Creates a record, deriving its quantization label from `kind`.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, shape: Vec<Dim>) -> Self {
        let kind = kind.into();
        Self {
            name: name.into(),
            quantization: Quantization::for_kind(&kind),
            kind,
            shape,
        }
    }

    /// Returns the shape joined with `x`, e.g. `64x32`.
    #[must_use]
    pub fn shape_label(&self) -> String {
        self.shape
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("x")
    }
}

/// Ordered, shareable sequence of layer records.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    layers: RwLock<Vec<Arc<LayerRecord>>>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.layers.write().clear();
    }

    /// Appends a record and returns the shared handle to it.
    pub fn append(&self, record: LayerRecord) -> Arc<LayerRecord> {
        let record = Arc::new(record);
        self.layers.write().push(Arc::clone(&record));
        record
    }

    /// Clears the registry and appends `records` under a single write lock,
    /// so readers never observe a partially loaded model.
    pub fn replace_all(&self, records: impl IntoIterator<Item = LayerRecord>) -> usize {
        let mut layers = self.layers.write();
        layers.clear();
        layers.extend(records.into_iter().map(Arc::new));
        layers.len()
    }

    /// Returns an ordered snapshot of the records.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<LayerRecord>> {
        self.layers.read().clone()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.read().len()
    }

    /// Returns true if no layers are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.read().is_empty()
    }
}
