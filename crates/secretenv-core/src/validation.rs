//! Syntax checks for environment variable names and secret paths

use crate::error::{EnvError, EnvResult};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn envar_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

fn path_segment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid regex"))
}

/// Validate that `name` can be used as an environment variable name
pub fn validate_envar_name(name: &str) -> EnvResult<()> {
    if name.is_empty() {
        return Err(invalid_name(name, "name cannot be empty"));
    }
    if !envar_name_pattern().is_match(name) {
        return Err(invalid_name(
            name,
            "only letters, digits and underscores are allowed and the first character cannot be a digit",
        ));
    }
    Ok(())
}

fn invalid_name(name: &str, reason: &str) -> EnvError {
    EnvError::InvalidEnvarName {
        name: name.to_string(),
        line: None,
        reason: reason.to_string(),
    }
}

/// A syntactically valid secret path: `namespace/repo[/dir...]/secret[:version]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretPath(String);

impl SecretPath {
    /// Parse and validate a secret path
    pub fn parse(path: &str) -> EnvResult<Self> {
        let invalid = |reason: &str| EnvError::InvalidSecretPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let (body, version) = match path.rsplit_once(':') {
            Some((body, version)) => (body, Some(version)),
            None => (path, None),
        };

        if let Some(version) = version {
            let numeric = !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit());
            if version != "latest" && !numeric {
                return Err(invalid("version must be a number or \"latest\""));
            }
        }

        let segments: Vec<&str> = body.split('/').collect();
        if segments.len() < 3 {
            return Err(invalid("expected at least namespace/repo/secret"));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("path segments cannot be empty"));
        }
        if let Some(bad) = segments.iter().find(|s| !path_segment_pattern().is_match(s)) {
            return Err(invalid(&format!(
                "segment {:?} may only contain letters, digits, dots, dashes and underscores",
                bad
            )));
        }

        Ok(Self(path.to_string()))
    }

    /// The path as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SecretPath {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SecretPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
