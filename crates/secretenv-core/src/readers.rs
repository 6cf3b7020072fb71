//! Secret and variable readers
//!
//! These traits are the boundary between the engine and the outside world.
//! A `SecretReader` performs the (usually remote) fetch of a secret's data;
//! a `VariableReader` supplies template variables. The engine never caches
//! what either returns.

use crate::config::EnvConfig;
use crate::error::{EnvError, EnvResult};
use std::collections::HashMap;

/// Fetches the current data of a secret by path
#[cfg_attr(test, mockall::automock)]
pub trait SecretReader: Send + Sync {
    /// Read the secret stored at `path`
    fn read_secret(&self, path: &str) -> EnvResult<String>;
}

/// Resolves template variables by name
#[cfg_attr(test, mockall::automock)]
pub trait VariableReader: Send + Sync {
    /// Read the value of the variable `name`
    fn read_variable(&self, name: &str) -> EnvResult<String>;
}

/// Secret reader used when evaluating keys; every lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretsNotAllowed;

impl SecretReader for SecretsNotAllowed {
    fn read_secret(&self, _path: &str) -> EnvResult<String> {
        Err(EnvError::SecretsNotAllowedInKey)
    }
}

/// Variable reader backed by an in-memory map
///
/// Variables come from two places: explicitly passed values (e.g. `--var`
/// flags) and OS environment variables carrying the configured prefix,
/// e.g. `SECRETHUB_VAR_ENV=prod` defines `env`. Explicit values win.
#[derive(Debug, Clone, Default)]
pub struct MapVariableReader {
    vars: HashMap<String, String>,
}

impl MapVariableReader {
    /// Create a reader from explicit variables
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Create a reader from the OS environment and explicit variables
    pub fn from_env<I, K, V>(
        os_env: I,
        explicit: HashMap<String, String>,
        config: &EnvConfig,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut vars: HashMap<String, String> = os_env
            .into_iter()
            .filter_map(|(name, value)| {
                name.as_ref()
                    .strip_prefix(config.variable_prefix.as_str())
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value.into()))
            })
            .collect();

        tracing::debug!(
            from_os = vars.len(),
            explicit = explicit.len(),
            "Loaded template variables"
        );

        vars.extend(explicit);
        Self { vars }
    }

    /// Create a reader from the current process environment and explicit variables
    pub fn from_process_env(explicit: HashMap<String, String>, config: &EnvConfig) -> Self {
        Self::from_env(std::env::vars(), explicit, config)
    }

    /// Number of known variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if no variables are defined
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VariableReader for MapVariableReader {
    fn read_variable(&self, name: &str) -> EnvResult<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::VariableNotFound {
                name: name.to_string(),
            })
    }
}
