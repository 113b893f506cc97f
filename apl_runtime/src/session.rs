// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interpreter session: variable environment, model registry and command
//! dispatch.

use std::{
    fs,
    path::Path,
    sync::Arc,
};

use apl_parser::{parse_command, Command};
use apl_tensor::Tensor;
use tracing::{debug, info, warn};

use crate::{
    config::{Device, SessionConfig},
    environment::Environment,
    error::{EvalError, EvalResult, IdentifierKind},
    eval::Evaluator,
    outcome::{FileReport, InferenceReport, LineFailure, Outcome},
    presets::{find_preset, preset_hint},
    registry::{LayerRecord, ModelRegistry},
};

/// Static document returned by `help`.
pub const HELP_TEXT: &str = "\
Commands:
  help                          Show this help
  exit, quit                    Leave the shell

APL Examples:
  ⍳5                            The vector 0 1 2 3 4
  2 3 ⍴ ⍳6                      A 2x3 matrix of 0..5
  A <- ⍳4                       Bind A (← also works)
  A                             Show the value of A

AI Building:
  Layer 'Conv1' 'Conv2d' 64 3   Define a layer
  LoadModel 'tinyllama'         Load a preset structure (tinyllama, mistral)
  Run 'Hello world'             Run inference (simulated)
  Source 'path/to/file.apl'     Run commands from a file

Shell:
  )vars                         List variables
  )layers                       Show the model structure";

/// One interpreter's state.
///
/// Commands run synchronously to completion. The registry is shared through
/// an `Arc` so a display layer can take snapshots while this session owns
/// all mutation.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    device: Device,
    env: Environment,
    registry: Arc<ModelRegistry>,
    depth: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Creates a session, resolving the device once for its lifetime.
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        let device = config.device.resolve();
        debug!(device = device.label(), "session created");
        Self {
            config,
            device,
            env: Environment::new(),
            registry: Arc::new(ModelRegistry::new()),
            depth: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Parses and executes one line.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] describing why the line failed. The session
    /// stays usable after any error.
    pub fn eval(&mut self, line: &str) -> EvalResult<Outcome> {
        let command = parse_command(line).map_err(|error| EvalError::Parse {
            text: line.to_string(),
            error,
        })?;
        self.execute(command, line)
    }

    /// Executes an already parsed command. `line` is the text it was parsed
    /// from; expression spans point into it.
    ///
    /// # Errors
    ///
    /// See [`Session::eval`].
    pub fn execute(&mut self, command: Command, line: &str) -> EvalResult<Outcome> {
        debug!(command = command.name(), "dispatch");
        match command {
            Command::Empty => Ok(Outcome::Empty),
            Command::Help => Ok(Outcome::Help(HELP_TEXT)),
            Command::Source { path } => self.run_file(path).map(Outcome::FileExecuted),
            Command::LoadModel { name } => self.load_model(&name),
            Command::Run { input } => self.run_inference(input),
            Command::DefineLayer { name, kind, shape } => {
                let record = self.registry.append(LayerRecord::new(name, kind, shape));
                Ok(Outcome::LayerAdded(record))
            },
            Command::Assign { name, expr } => {
                let value = Evaluator::new(&self.env, line, self.config.max_elements).evaluate(&expr)?;
                self.env.bind(name.clone(), value.clone());
                Ok(Outcome::Assigned { name, value })
            },
            Command::Eval(expr) => Evaluator::new(&self.env, line, self.config.max_elements)
                .evaluate(&expr)
                .map(Outcome::Value),
        }
    }

    fn load_model(&self, name: &str) -> EvalResult<Outcome> {
        let Some(preset) = find_preset(name) else {
            return Err(EvalError::UnknownIdentifier {
                kind: IdentifierKind::Preset,
                name: name.to_string(),
                hint: Some(preset_hint()),
            });
        };
        let layers = self.registry.replace_all(preset.layers());
        info!(preset = preset.name, layers, "model loaded");
        Ok(Outcome::ModelLoaded {
            preset: preset.name,
            description: preset.description,
            layers,
        })
    }

    fn run_inference(&self, input: String) -> EvalResult<Outcome> {
        let layers = self.registry.len();
        if layers == 0 {
            return Err(EvalError::MissingModel);
        }
        Ok(Outcome::Inference(InferenceReport::simulated(
            input,
            self.device.label(),
            layers,
        )))
    }

    /// Executes a script, one command per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line that fails
    /// recoverably is recorded in the report and execution continues; a fatal
    /// error abandons the remaining lines and is returned.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Resource`] if the file cannot be read, if
    /// `Source` nests deeper than the configured limit, or if a nested script
    /// fails that way.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> EvalResult<FileReport> {
        let path = path.as_ref();
        if self.depth >= self.config.max_source_depth {
            return Err(EvalError::Resource {
                path: path.to_path_buf(),
                message: format!(
                    "Source nested more than {} levels deep",
                    self.config.max_source_depth
                ),
            });
        }
        let contents = fs::read_to_string(path).map_err(|e| EvalError::Resource {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), depth = self.depth, "running script");
        self.depth += 1;
        let result = self.run_lines(path, &contents);
        self.depth -= 1;
        result
    }

    fn run_lines(&mut self, path: &Path, contents: &str) -> EvalResult<FileReport> {
        let mut report = FileReport::new(path);
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            report.executed += 1;
            match self.eval(line) {
                Ok(_) => {},
                Err(err) if err.is_fatal() => {
                    warn!(path = %path.display(), line = index + 1, error = %err, "script aborted");
                    return Err(err);
                },
                Err(err) => {
                    warn!(path = %path.display(), line = index + 1, error = %err, "command failed");
                    report.failures.push(LineFailure {
                        line: index + 1,
                        message: err.to_string(),
                    });
                },
            }
        }
        info!(
            path = %path.display(),
            executed = report.executed,
            failed = report.failed(),
            "script finished"
        );
        Ok(report)
    }

    /// Returns an ordered snapshot of the declared layers.
    #[must_use]
    pub fn model_structure(&self) -> Vec<Arc<LayerRecord>> {
        self.registry.list()
    }

    /// Returns a shared handle to the registry for read-only observers.
    #[must_use]
    pub fn registry(&self) -> Arc<ModelRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns the notional device label, `cpu` or `cuda`.
    #[must_use]
    pub const fn device_label(&self) -> &'static str {
        self.device.label()
    }

    /// Returns the sorted names of bound variables.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        self.env.names()
    }

    /// Looks up a variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Tensor> {
        self.env.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DevicePreference, registry::Quantization};
    use apl_parser::Dim;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn session() -> Session {
        Session::with_config(SessionConfig::default().with_device(DevicePreference::Cpu))
    }

    fn value(outcome: Outcome) -> Tensor {
        match outcome {
            Outcome::Value(t) => t,
            other => panic!("expected a value, got {other:?}"),
        }
    }

    fn script(lines: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{lines}").unwrap();
        file
    }

    #[test]
    fn test_empty_and_help() {
        let mut s = session();
        assert_eq!(s.eval("").unwrap(), Outcome::Empty);
        assert_eq!(s.eval("help").unwrap(), Outcome::Help(HELP_TEXT));
        assert!(HELP_TEXT.contains("LoadModel"));
    }

    #[test]
    fn test_iota_and_reshape() {
        let mut s = session();
        let t = value(s.eval("⍳5").unwrap());
        assert_eq!(t.values(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        let m = value(s.eval("2 3 ⍴ ⍳6").unwrap());
        assert_eq!(m.shape(), &[2, 3]);
        assert_eq!(m.to_string(), "0 1 2\n3 4 5");
    }

    #[test]
    fn test_assignment_round_trip() {
        let mut s = session();
        let out = s.eval("A <- 10").unwrap();
        assert_eq!(out.to_string(), "A assigned.");
        let a = value(s.eval("A").unwrap());
        assert_eq!(a, value(s.eval("10").unwrap()));
        assert_eq!(s.variables(), vec!["A"]);
    }

    #[test]
    fn test_failed_assignment_does_not_bind() {
        let mut s = session();
        let err = s.eval("A <- 2 2 ⍴ ⍳3").unwrap_err();
        assert!(matches!(err, EvalError::ShapeMismatch { .. }));
        assert!(s.variable("A").is_none());

        s.eval("A <- ⍳2").unwrap();
        assert!(s.eval("A <- B").is_err());
        assert_eq!(s.variable("A"), Some(&Tensor::iota(2)));
    }

    #[test]
    fn test_parse_error_is_recoverable() {
        let mut s = session();
        let err = s.eval("⍳x").unwrap_err();
        assert!(matches!(err, EvalError::Parse { .. }));
        assert!(!err.is_fatal());
        assert!(s.eval("⍳2").is_ok());
    }

    #[test]
    fn test_unknown_variable() {
        let mut s = session();
        assert_eq!(s.eval("B").unwrap_err().to_string(), "Unknown variable: B");
    }

    #[test]
    fn test_load_model_idempotent() {
        let mut s = session();
        let out = s.eval("LoadModel 'tinyllama'").unwrap();
        assert_eq!(out.to_string(), "Loaded TinyLlama (1.1B) structure.");
        let once = s.model_structure();
        s.eval("LoadModel tinyllama").unwrap();
        let twice = s.model_structure();
        assert_eq!(once.len(), 24);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_load_model_replaces_layers() {
        let mut s = session();
        s.eval("Layer L1 Linear 4 4").unwrap();
        s.eval("LoadModel Mistral").unwrap();
        let layers = s.model_structure();
        assert_eq!(layers.len(), 34);
        assert_eq!(layers[0].name, "Embed");
    }

    #[test]
    fn test_unknown_preset_leaves_registry() {
        let mut s = session();
        s.eval("Layer L1 Linear 4 4").unwrap();
        let err = s.eval("LoadModel 'gpt9'").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown preset: gpt9. Try 'tinyllama' or 'mistral'."
        );
        assert_eq!(s.model_structure().len(), 1);
    }

    #[test]
    fn test_define_layer() {
        let mut s = session();
        let out = s.eval("Layer 'L1' 'Linear' 64 32").unwrap();
        assert_eq!(out.to_string(), "Layer L1 (Linear) added to model structure.");
        s.eval("Layer Q1 QuantLinear 8 k").unwrap();
        let layers = s.model_structure();
        assert_eq!(layers[0].shape, vec![Dim::Size(64), Dim::Size(32)]);
        assert_eq!(layers[1].quantization, Quantization::Fptq4);
        assert_eq!(layers[1].shape_label(), "8xk");
    }

    #[test]
    fn test_run_requires_model() {
        let mut s = session();
        s.eval("X <- 1").unwrap();
        let err = s.eval("Run 'hi'").unwrap_err();
        assert_eq!(err, EvalError::MissingModel);
        assert!(s.model_structure().is_empty());
        assert_eq!(s.variables(), vec!["X"]);
    }

    #[test]
    fn test_run_is_simulated() {
        let mut s = session();
        s.eval("LoadModel tinyllama").unwrap();
        match s.eval("Run 'hello world'").unwrap() {
            Outcome::Inference(report) => {
                assert!(report.simulated);
                assert_eq!(report.input, "hello world");
                assert_eq!(report.device, "cpu");
                assert_eq!(report.layers, 24);
            },
            other => panic!("expected inference, got {other:?}"),
        }
    }

    #[test]
    fn test_run_file_skips_comments_and_blanks() {
        let mut s = session();
        let file = script("# setup\n\nA <- ⍳4\n   \nB <- 2 2 ⍴ A\n# done\n");
        let report = s.run_file(file.path()).unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(report.failed(), 0);
        assert_eq!(s.variable("B").map(|t| t.shape().to_vec()), Some(vec![2, 2]));
    }

    #[test]
    fn test_run_file_continues_after_recoverable_error() {
        let mut s = session();
        let file = script("A <- 1\nRun 'x'\nB <- Z\nC <- 2\n");
        let report = s.run_file(file.path()).unwrap();
        assert_eq!(report.executed, 4);
        let lines: Vec<usize> = report.failures.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![2, 3]);
        assert!(s.variable("C").is_some());
    }

    #[test]
    fn test_run_file_missing_is_resource_error() {
        let mut s = session();
        let err = s.run_file("/definitely/not/here.apl").unwrap_err();
        assert!(err.is_fatal());
        // Recoverable at the top level: the session still works.
        assert!(s.eval("Source '/definitely/not/here.apl'").is_err());
        assert!(s.eval("⍳1").is_ok());
    }

    #[test]
    fn test_nested_missing_source_aborts_outer_file() {
        let mut s = session();
        let file = script("A <- 1\nSource '/definitely/not/here.apl'\nB <- 2\n");
        let err = s.run_file(file.path()).unwrap_err();
        assert!(matches!(err, EvalError::Resource { .. }));
        assert!(s.variable("A").is_some());
        assert!(s.variable("B").is_none());
    }

    #[test]
    fn test_nested_source_shares_state() {
        let mut s = session();
        let inner = script("X <- ⍳3\n");
        let outer = script(&format!("Source '{}'\nY <- 3 1 ⍴ X\n", inner.path().display()));
        let report = s.run_file(outer.path()).unwrap();
        assert_eq!(report.executed, 2);
        assert_eq!(s.variable("Y").map(|t| t.shape().to_vec()), Some(vec![3, 1]));
    }

    #[test]
    fn test_self_including_script_hits_depth_limit() {
        let mut s = Session::with_config(
            SessionConfig::default()
                .with_device(DevicePreference::Cpu)
                .with_max_source_depth(4),
        );
        let mut file = NamedTempFile::new().unwrap();
        let path = file.path().display().to_string();
        write!(file, "Source '{path}'\n").unwrap();
        let err = s.run_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("nested more than 4 levels"));
        // Depth is restored after unwinding.
        assert!(s.run_file(script("A <- 1\n").path()).is_ok());
    }

    #[test]
    fn test_registry_handle_observes_session() {
        let mut s = session();
        let observer = s.registry();
        s.eval("Layer L1 Linear 2").unwrap();
        assert_eq!(observer.list().len(), 1);
    }

    #[test]
    fn test_iota_limit_from_config() {
        let mut s = Session::with_config(
            SessionConfig::default()
                .with_device(DevicePreference::Cpu)
                .with_max_elements(8),
        );
        assert!(matches!(s.eval("⍳9").unwrap_err(), EvalError::TooLarge { .. }));
        assert!(s.eval("⍳8").is_ok());
    }
}
