//! Secret references in the OS environment
//!
//! Any environment variable whose value starts with the reference prefix
//! (default `secrethub://`) is a secret reference:
//!
//! ```text
//! DB_PASSWORD=secrethub://company/app/db/password
//! ```
//!
//! Other variables are not part of this source.

use super::traits::{EnvSource, EnvValue};
use crate::config::EnvConfig;
use crate::error::EnvResult;
use crate::validation::SecretPath;
use std::collections::HashMap;

/// Source scanning the OS environment for secret references
#[derive(Debug, Clone, Default)]
pub struct OsReferenceSource {
    references: HashMap<String, String>,
}

impl OsReferenceSource {
    /// Scan `vars` using the default `secrethub://` prefix
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self::with_config(vars, &EnvConfig::default())
    }

    /// Scan `vars` using the prefix from `config`
    pub fn with_config<I, K, V>(vars: I, config: &EnvConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let prefix = config.reference_prefix.as_str();
        let references: HashMap<String, String> = vars
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .strip_prefix(prefix)
                    .map(|path| (name.into(), path.to_string()))
            })
            .collect();

        tracing::debug!(
            count = references.len(),
            prefix,
            "Scanned OS environment for secret references"
        );
        Self { references }
    }

    /// Scan the current process environment
    pub fn from_process_env(config: &EnvConfig) -> Self {
        Self::with_config(std::env::vars(), config)
    }

    /// Names of the variables holding secret references.
    ///
    /// Callers use this to drop the raw references from the environment
    /// passed on to a child process.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.references.keys().map(String::as_str)
    }
}

impl EnvSource for OsReferenceSource {
    fn name(&self) -> &str {
        "os"
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        self.references
            .iter()
            .map(|(name, path)| Ok((name.clone(), EnvValue::secret(SecretPath::parse(path)?))))
            .collect()
    }
}
