// SPDX-License-Identifier: MIT OR Apache-2.0
//! Variable environment: names bound to tensor values.

use std::collections::HashMap;

use apl_tensor::Tensor;

/// Mapping from case-sensitive variable names to tensors.
///
/// Binding an existing name replaces the previous value.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, Tensor>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Tensor> {
        self.vars.get(name)
    }

    /// Binds `name` to `value`, returning the value it replaced.
    pub fn bind(&mut self, name: impl Into<String>, value: Tensor) -> Option<Tensor> {
        self.vars.insert(name.into(), value)
    }

    /// Returns true if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Returns all bound names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
