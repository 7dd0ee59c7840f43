//! Environment snapshot.
//!
//! Every constructor in ragkit resolves its settings from an [`Environment`]
//! value instead of reading the process environment directly. The snapshot is
//! taken once at the boundary with [`Environment::from_process`], or assembled
//! from explicit pairs in tests.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// An immutable snapshot of environment variables.
///
/// Empty values are treated as absent, so `FOO=` behaves like an unset `FOO`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        let env = Self::from_iter(std::env::vars());
        tracing::trace!(
            target: crate::TRACING_TARGET,
            count = env.vars.len(),
            "Captured process environment"
        );
        env
    }

    /// Adds or replaces a single variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Removes a variable.
    pub fn without_var(mut self, name: &str) -> Self {
        self.vars.remove(name);
        self
    }

    /// Returns the value of an optional variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Returns the value of a required variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the variable when it is unset.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| Error::missing_env(name))
    }

    /// Returns the value of an optional variable, or `default` when unset.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Returns true if the variable is set to a non-empty value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<K, V> FromIterator<(K, V)> for Environment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Values routinely carry credentials.
        let mut names: Vec<_> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("Environment").field("vars", &names).finish()
    }
}
