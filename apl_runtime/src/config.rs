// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session configuration types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Environment variable names for configuration.

/// Device preference environment variable (`auto`, `cpu`, `cuda`, `gpu`).
pub const ENV_DEVICE: &str = "APL_DEVICE";
/// Maximum `Source` nesting depth environment variable.
pub const ENV_MAX_SOURCE_DEPTH: &str = "APL_MAX_SOURCE_DEPTH";
/// Maximum elements per generated tensor environment variable.
pub const ENV_MAX_ELEMENTS: &str = "APL_MAX_ELEMENTS";
/// Consulted by [`DevicePreference::Auto`] to decide whether an accelerator
/// is notionally present.
pub const ENV_CUDA_VISIBLE_DEVICES: &str = "CUDA_VISIBLE_DEVICES";

/// Default maximum `Source` nesting depth.
pub const DEFAULT_MAX_SOURCE_DEPTH: usize = 16;
/// Default maximum element count of a generated tensor.
pub const DEFAULT_MAX_ELEMENTS: usize = 1 << 24;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid {key}: {message}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Reason.
        message: String,
    },
}

/// Device the session reports itself as running on.
///
/// No computation is dispatched anywhere; the label only appears in
/// `device_label()` and in simulated inference reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// Host CPU.
    Cpu,
    /// CUDA accelerator.
    Cuda,
}

impl Device {
    /// Returns the device label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Requested device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    /// Use an accelerator when one is visible.
    #[default]
    Auto,
    /// Always report the CPU.
    Cpu,
    /// Always report CUDA.
    Cuda,
}

impl DevicePreference {
    /// Resolves the preference, reading accelerator visibility through
    /// `lookup`.
    pub fn resolve_with(self, lookup: impl Fn(&str) -> Option<String>) -> Device {
        match self {
            Self::Cpu => Device::Cpu,
            Self::Cuda => Device::Cuda,
            Self::Auto => {
                let visible = lookup(ENV_CUDA_VISIBLE_DEVICES).is_some_and(|v| {
                    let v = v.trim();
                    !v.is_empty() && v != "-1" && !v.eq_ignore_ascii_case("none")
                });
                if visible {
                    Device::Cuda
                } else {
                    Device::Cpu
                }
            },
        }
    }

    /// Resolves the preference against the process environment.
    #[must_use]
    pub fn resolve(self) -> Device {
        self.resolve_with(|key| std::env::var(key).ok())
    }
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!("expected auto, cpu, cuda or gpu, got '{other}'")),
        }
    }
}

/// Environment variable parsing helpers.
mod env_parse {
    use std::str::FromStr;

    use super::ConfigError;

    /// Parses a value from an environment variable, if set.
    pub fn parse<T>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &'static str,
    ) -> Option<Result<T, ConfigError>>
    where
        T: FromStr,
        T::Err: ToString,
    {
        lookup(key).map(|val| {
            val.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                message: e.to_string(),
            })
        })
    }
}

/// Configuration for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Requested device.
    pub device: DevicePreference,
    /// Maximum nesting of `Source` commands.
    pub max_source_depth: usize,
    /// Maximum elements a single generated tensor may hold.
    pub max_elements: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: DevicePreference::Auto,
            max_source_depth: DEFAULT_MAX_SOURCE_DEPTH,
            max_elements: DEFAULT_MAX_ELEMENTS,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from the process environment, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an
    /// unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an
    /// unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(device) = env_parse::parse(&lookup, ENV_DEVICE) {
            config.device = device?;
        }
        if let Some(depth) = env_parse::parse(&lookup, ENV_MAX_SOURCE_DEPTH) {
            config.max_source_depth = depth?;
        }
        if let Some(limit) = env_parse::parse(&lookup, ENV_MAX_ELEMENTS) {
            config.max_elements = limit?;
        }
        Ok(config)
    }

    /// Sets the device preference.
    #[must_use]
    pub const fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    /// Sets the maximum `Source` nesting depth.
    #[must_use]
    pub const fn with_max_source_depth(mut self, depth: usize) -> Self {
        self.max_source_depth = depth;
        self
    }

    /// Sets the maximum elements per generated tensor.
    #[must_use]
    pub const fn with_max_elements(mut self, limit: usize) -> Self {
        self.max_elements = limit;
        self
    }
}
