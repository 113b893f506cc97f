// SPDX-License-Identifier: MIT OR Apache-2.0
//! APL Runtime - sessions for the APL command interpreter.
//!
//! A [`Session`] owns a variable environment and a model structure registry
//! and executes one command line at a time:
//!
//! ```
//! use apl_runtime::{Outcome, Session};
//!
//! let mut session = Session::new();
//! session.eval("A <- 2 3 ⍴ ⍳6").unwrap();
//! let shown = session.eval("A").unwrap();
//! assert_eq!(shown.to_string(), "0 1 2\n3 4 5");
//!
//! session.eval("LoadModel tinyllama").unwrap();
//! assert_eq!(session.model_structure().len(), 24);
//! assert!(matches!(session.eval("Run 'hi'").unwrap(), Outcome::Inference(_)));
//! ```
//!
//! Every user-facing failure is an [`EvalError`]; none of them poison the
//! session.

pub mod config;
pub mod environment;
pub mod error;
pub mod eval;
pub mod outcome;
pub mod presets;
pub mod registry;
pub mod session;

pub use config::{ConfigError, Device, DevicePreference, SessionConfig};
pub use environment::Environment;
pub use error::{EvalError, EvalResult, IdentifierKind};
pub use eval::Evaluator;
pub use outcome::{
    FileReport, InferenceReport, LineFailure, Outcome, Payload, StructuredOutcome,
    SIMULATED_OUTPUT,
};
pub use presets::{find_preset, Preset, PRESETS};
pub use registry::{LayerRecord, ModelRegistry, Quantization};
pub use session::{Session, HELP_TEXT};
