// SPDX-License-Identifier: MIT OR Apache-2.0
//! Results of executing one command.
//!
//! [`Outcome`] is what the session hands back on success; its `Display` is
//! the text an interactive caller prints. [`StructuredOutcome`] is the
//! serializable `Ok | Error` form used by non-interactive callers.

use std::{fmt, path::PathBuf, sync::Arc};

use apl_tensor::{Tensor, TensorDescriptor};
use serde::{Deserialize, Serialize};

use crate::{
    error::{EvalError, EvalResult},
    registry::LayerRecord,
};

/// Placeholder output descriptor of the simulated inference pass.
pub const SIMULATED_OUTPUT: &str = "[Tensor 1x32000] (Simulated logits)";

/// Successful result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Blank input.
    Empty,
    /// The static help document.
    Help(&'static str),
    /// Value of a bare expression.
    Value(Tensor),
    /// A variable was bound.
    Assigned { name: String, value: Tensor },
    /// `Layer` appended a record.
    LayerAdded(Arc<LayerRecord>),
    /// `LoadModel` replaced the registry with a preset.
    ModelLoaded {
        preset: &'static str,
        description: &'static str,
        layers: usize,
    },
    /// `Run` produced a simulated report.
    Inference(InferenceReport),
    /// `Source` finished a script.
    FileExecuted(FileReport),
}

impl Outcome {
    /// Returns the tensor carried by this outcome, if any.
    #[must_use]
    pub fn tensor(&self) -> Option<&Tensor> {
        match self {
            Self::Value(value) | Self::Assigned { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Converts into the serializable form.
    #[must_use]
    pub fn structured(&self) -> StructuredOutcome {
        let payload = match self {
            Self::Value(value) => Payload::Tensor(value.descriptor()),
            Self::Inference(report) => Payload::Inference(report.clone()),
            Self::FileExecuted(report) => Payload::File(report.clone()),
            other => Payload::Text(other.to_string()),
        };
        StructuredOutcome::Ok(payload)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Help(text) => write!(f, "{text}"),
            Self::Value(value) => write!(f, "{value}"),
            Self::Assigned { name, .. } => write!(f, "{name} assigned."),
            Self::LayerAdded(record) => {
                write!(f, "Layer {} ({}) added to model structure.", record.name, record.kind)
            },
            Self::ModelLoaded { description, .. } => write!(f, "Loaded {description} structure."),
            Self::Inference(report) => write!(f, "{report}"),
            Self::FileExecuted(report) => write!(f, "{report}"),
        }
    }
}

/// Report of a simulated inference pass. No numeric work backs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceReport {
    pub input: String,
    pub device: String,
    pub layers: usize,
    pub output: String,
    pub simulated: bool,
}

impl InferenceReport {
    pub(crate) fn simulated(input: impl Into<String>, device: &str, layers: usize) -> Self {
        Self {
            input: input.into(),
            device: device.to_string(),
            layers,
            output: SIMULATED_OUTPUT.to_string(),
            simulated: true,
        }
    }
}

impl fmt::Display for InferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Running inference on '{}'... (simulated)", self.input)?;
        writeln!(f, "Device: {}", self.device)?;
        writeln!(f, "Layers: {}", self.layers)?;
        write!(f, "Output: {}", self.output)
    }
}

/// A line of a script that failed without stopping the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    /// 1-based line number in the script.
    pub line: usize,
    pub message: String,
}

/// Summary of a `Source` / `run_file` execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    /// Commands attempted, including those that failed.
    pub executed: usize,
    pub failures: Vec<LineFailure>,
}

impl FileReport {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            executed: 0,
            failures: Vec::new(),
        }
    }

    /// Number of commands that failed recoverably.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Executed {} commands from {}", self.executed, self.path.display())?;
        if !self.failures.is_empty() {
            write!(f, " ({} failed)", self.failures.len())?;
        }
        Ok(())
    }
}

/// Serializable command result: `{"kind": "Ok" | "Error", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum StructuredOutcome {
    Ok(Payload),
    Error(Payload),
}

impl StructuredOutcome {
    /// Converts an evaluation result.
    #[must_use]
    pub fn from_result(result: &EvalResult<Outcome>) -> Self {
        match result {
            Ok(outcome) => outcome.structured(),
            Err(err) => Self::from(err),
        }
    }

    /// Returns true for the `Ok` kind.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl From<&EvalError> for StructuredOutcome {
    fn from(err: &EvalError) -> Self {
        Self::Error(Payload::Text(err.to_string()))
    }
}

/// Body of a [`StructuredOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Tensor(TensorDescriptor),
    Inference(InferenceReport),
    File(FileReport),
    Text(String),
}
