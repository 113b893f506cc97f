// SPDX-License-Identifier: MIT OR Apache-2.0
//! Integration test helpers for the APL interpreter.
//!
//! Provides deterministic sessions and throwaway script files.

use std::io::Write;

use apl_runtime::{DevicePreference, Outcome, Session, SessionConfig};
use apl_tensor::Tensor;
use tempfile::{NamedTempFile, TempDir};

/// Create a session pinned to the CPU so reports do not depend on the host.
pub fn create_session() -> Session {
    Session::with_config(SessionConfig::default().with_device(DevicePreference::Cpu))
}

/// Create a session with custom limits, pinned to the CPU.
pub fn create_session_with(max_source_depth: usize, max_elements: usize) -> Session {
    Session::with_config(
        SessionConfig::default()
            .with_device(DevicePreference::Cpu)
            .with_max_source_depth(max_source_depth)
            .with_max_elements(max_elements),
    )
}

/// Evaluate a line that must produce a tensor value.
pub fn eval_value(session: &mut Session, line: &str) -> Tensor {
    match session.eval(line) {
        Ok(Outcome::Value(tensor)) => tensor,
        other => panic!("expected a value from {line:?}, got {other:?}"),
    }
}

/// Write `contents` to a new temporary script file.
pub fn write_script(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp script");
    file.write_all(contents.as_bytes()).expect("write temp script");
    file
}

/// Write `contents` to `name` inside `dir`, returning the path as a string.
pub fn write_script_in(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write script");
    path.display().to_string()
}
