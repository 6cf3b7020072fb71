//! Source Chain
//!
//! Combines several environment sources into one environment. Sources are
//! merged in the order they were added: when two sources define the same
//! variable, the one added last wins.
//!
//! # Example
//!
//! ```rust,ignore
//! use secretenv_core::sources::EnvChainBuilder;
//!
//! let chain = EnvChainBuilder::new()
//!     .with_os_references(&config)
//!     .with_dir("/run/secrets")?
//!     .with_env_file("secrethub.env", vars, &DefaultParser)?
//!     .with_flags(flags)?
//!     .build();
//!
//! let env = chain.resolve(&client)?;
//! ```

use super::file::{read_env_dir, read_env_file};
use super::flags::FlagSource;
use super::os::OsReferenceSource;
use super::traits::{EnvSource, EnvValue};
use crate::config::EnvConfig;
use crate::error::{EnvError, EnvResult};
use crate::readers::{SecretReader, VariableReader};
use crate::template::TemplateParser;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

/// An ordered list of environment sources
#[derive(Default)]
pub struct EnvChain {
    sources: Vec<Arc<dyn EnvSource>>,
}

impl std::fmt::Debug for EnvChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvChain")
            .field("sources", &self.source_names())
            .finish()
    }
}

impl EnvChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source to the chain (builder pattern)
    ///
    /// Sources added later override earlier ones.
    pub fn with_source<S: EnvSource + 'static>(mut self, source: S) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Add a source to the chain
    pub fn add_source<S: EnvSource + 'static>(&mut self, source: S) {
        self.sources.push(Arc::new(source));
    }

    /// Get the number of sources in the chain
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the chain is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Get the source names in merge order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Resolve every variable of the merged environment.
    ///
    /// Values are resolved one at a time in key order; the first failure
    /// aborts and names the key.
    pub fn resolve(&self, secrets: &dyn SecretReader) -> EnvResult<BTreeMap<String, String>> {
        let env = self.env()?;
        let mut keys: Vec<&String> = env.keys().collect();
        keys.sort();

        let mut resolved = BTreeMap::new();
        for key in keys {
            let value = env[key].resolve(secrets).map_err(|source| EnvError::Resolve {
                key: key.clone(),
                source: Box::new(source),
            })?;
            tracing::trace!(key = %key, "Resolved variable");
            resolved.insert(key.clone(), value);
        }
        Ok(resolved)
    }

    /// Resolve the merged environment on top of `base`, e.g. the current
    /// process environment. Resolved variables replace base variables.
    pub fn resolve_onto(
        &self,
        base: HashMap<String, String>,
        secrets: &dyn SecretReader,
    ) -> EnvResult<HashMap<String, String>> {
        let mut env = base;
        env.extend(self.resolve(secrets)?);
        Ok(env)
    }

    /// Sorted names of the variables that need a secret to resolve.
    ///
    /// Does not contact the secret store.
    pub fn secret_keys(&self) -> EnvResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .env()?
            .into_iter()
            .filter(|(_, value)| value.contains_secret())
            .map(|(key, _)| key)
            .collect();
        keys.sort();
        Ok(keys)
    }
}

impl EnvSource for EnvChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        let mut merged: HashMap<String, EnvValue> = HashMap::new();
        let mut origin: HashMap<String, &str> = HashMap::new();

        for source in &self.sources {
            for (key, value) in source.env()? {
                if let Some(previous) = origin.insert(key.clone(), source.name()) {
                    tracing::debug!(
                        key = %key,
                        overridden = previous,
                        by = source.name(),
                        "Variable defined by multiple sources"
                    );
                }
                merged.insert(key, value);
            }
        }

        Ok(merged)
    }
}

/// Builder for creating source chains
#[derive(Debug, Default)]
pub struct EnvChainBuilder {
    chain: EnvChain,
}

impl EnvChainBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add secret references found in the process environment
    pub fn with_os_references(self, config: &EnvConfig) -> Self {
        self.with_source(OsReferenceSource::from_process_env(config))
    }

    /// Add a secrets directory
    pub fn with_dir(self, path: impl AsRef<Path>) -> EnvResult<Self> {
        Ok(self.with_source(read_env_dir(path)?))
    }

    /// Add an environment file
    pub fn with_env_file(
        self,
        path: impl AsRef<Path>,
        vars: Arc<dyn VariableReader>,
        parser: &dyn TemplateParser,
    ) -> EnvResult<Self> {
        Ok(self.with_source(read_env_file(path, vars, parser)?))
    }

    /// Add `name -> secret path` flags
    pub fn with_flags(self, flags: HashMap<String, String>) -> EnvResult<Self> {
        Ok(self.with_source(FlagSource::new(flags)?))
    }

    /// Add any source
    pub fn with_source<S: EnvSource + 'static>(mut self, source: S) -> Self {
        self.chain.add_source(source);
        self
    }

    /// Build the source chain
    pub fn build(self) -> EnvChain {
        self.chain
    }
}
