//! Engine configuration
//!
//! Controls how OS environment variables are interpreted: which value prefix
//! marks a secret reference and which name prefix marks a template variable.
//!
//! ```yaml
//! reference_prefix: "secrethub://"
//! variable_prefix: "SECRETHUB_VAR_"
//! ```

use crate::error::EnvResult;
use serde::{Deserialize, Serialize};

/// Default scheme that marks an OS environment value as a secret reference
pub const DEFAULT_REFERENCE_PREFIX: &str = "secrethub://";

/// Default name prefix of OS environment variables that define template variables
pub const DEFAULT_VARIABLE_PREFIX: &str = "SECRETHUB_VAR_";

/// Configuration for environment composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Value prefix of secret references in the OS environment (default: "secrethub://")
    pub reference_prefix: String,
    /// Name prefix of template variables in the OS environment (default: "SECRETHUB_VAR_")
    pub variable_prefix: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            variable_prefix: DEFAULT_VARIABLE_PREFIX.to_string(),
        }
    }
}

impl EnvConfig {
    /// Load configuration from a YAML document; missing fields keep their defaults
    pub fn from_yaml_str(content: &str) -> EnvResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Use a different secret reference prefix
    pub fn with_reference_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reference_prefix = prefix.into();
        self
    }

    /// Use a different template variable prefix
    pub fn with_variable_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.variable_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.reference_prefix, "secrethub://");
        assert_eq!(config.variable_prefix, "SECRETHUB_VAR_");
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = EnvConfig::from_yaml_str("variable_prefix: MYAPP_VAR_\n").unwrap();
        assert_eq!(config.reference_prefix, DEFAULT_REFERENCE_PREFIX);
        assert_eq!(config.variable_prefix, "MYAPP_VAR_");
    }

    #[test]
    fn test_from_yaml_invalid() {
        let err = EnvConfig::from_yaml_str("reference_prefix: [1, 2]").unwrap_err();
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn test_builder() {
        let config = EnvConfig::default().with_reference_prefix("vault://");
        assert_eq!(config.reference_prefix, "vault://");
    }
}
