//! Environment variables passed as flags
//!
//! Each flag maps an environment variable name to a secret path, e.g.
//! `--envar DB_PASSWORD=company/app/db/password`. Both sides are validated
//! when the source is created, before anything is resolved.

use super::traits::{EnvSource, EnvValue};
use crate::error::EnvResult;
use crate::validation::{validate_envar_name, SecretPath};
use std::collections::HashMap;

/// Source built from `name -> secret path` flags
#[derive(Debug, Clone, Default)]
pub struct FlagSource {
    envars: HashMap<String, SecretPath>,
}

impl FlagSource {
    /// Validate and store the given flags
    pub fn new(flags: HashMap<String, String>) -> EnvResult<Self> {
        let mut envars = HashMap::with_capacity(flags.len());
        for (name, path) in flags {
            validate_envar_name(&name)?;
            let path = SecretPath::parse(&path)?;
            envars.insert(name, path);
        }

        tracing::debug!(count = envars.len(), "Created flag source");
        Ok(Self { envars })
    }

    /// Number of flags
    pub fn len(&self) -> usize {
        self.envars.len()
    }

    /// Check if no flags were given
    pub fn is_empty(&self) -> bool {
        self.envars.is_empty()
    }
}

impl EnvSource for FlagSource {
    fn name(&self) -> &str {
        "flags"
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        Ok(self
            .envars
            .iter()
            .map(|(name, path)| (name.clone(), EnvValue::secret(path.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EnvError;

    fn flags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_flags_become_secret_values() {
        let source = FlagSource::new(flags(&[
            ("DB_PASSWORD", "company/app/db/password"),
            ("API_KEY", "company/app/api_key:2"),
        ]))
        .unwrap();

        let env = source.env().unwrap();
        assert_eq!(env.len(), 2);
        assert!(env.values().all(EnvValue::contains_secret));
        assert!(matches!(
            env.get("API_KEY"),
            Some(EnvValue::Secret(path)) if path.as_str() == "company/app/api_key:2"
        ));
    }

    #[test]
    fn test_invalid_name_fails_at_construction() {
        let err = FlagSource::new(flags(&[("1BAD", "company/app/secret")])).unwrap_err();
        assert!(matches!(err, EnvError::InvalidEnvarName { .. }));
    }

    #[test]
    fn test_invalid_path_fails_at_construction() {
        let err = FlagSource::new(flags(&[("GOOD", "not-a-path")])).unwrap_err();
        assert!(matches!(err, EnvError::InvalidSecretPath { .. }));
    }

    #[test]
    fn test_empty() {
        let source = FlagSource::new(HashMap::new()).unwrap();
        assert!(source.is_empty());
        assert!(source.env().unwrap().is_empty());
    }
}
