//! Core traits and value types for environment sources
//!
//! An `EnvSource` produces a named set of `EnvValue`s. Values are resolved
//! lazily: building a source never contacts a secret store, and
//! `EnvValue::contains_secret` tells callers whether resolving would, without
//! doing it.

use crate::error::{EnvError, EnvResult};
use crate::readers::{SecretReader, VariableReader};
use crate::template::Template;
use crate::validation::SecretPath;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A lazily resolvable environment value
#[derive(Clone)]
pub enum EnvValue {
    /// Reference to a secret, fetched on resolve
    Secret(SecretPath),
    /// Contents of a file in a secrets directory, read when the directory was scanned
    File(String),
    /// Compiled template from an environment file
    Template(TemplateValue),
}

impl EnvValue {
    /// Create a value referencing the secret at `path`
    pub fn secret(path: SecretPath) -> Self {
        EnvValue::Secret(path)
    }

    /// Create a value from already loaded file contents
    pub fn file(contents: impl Into<String>) -> Self {
        EnvValue::File(contents.into())
    }

    /// Produce the final string.
    ///
    /// Secret references are passed to `secrets` as-is and its error is
    /// returned unmodified. Template errors are wrapped with the file the
    /// template came from.
    pub fn resolve(&self, secrets: &dyn SecretReader) -> EnvResult<String> {
        match self {
            EnvValue::Secret(path) => secrets.read_secret(path.as_str()),
            EnvValue::File(contents) => Ok(contents.clone()),
            EnvValue::Template(template) => template.resolve(secrets),
        }
    }

    /// Whether resolving this value needs a secret.
    ///
    /// File values always report `true`: anything read from a secrets
    /// directory is treated as sensitive.
    pub fn contains_secret(&self) -> bool {
        match self {
            EnvValue::Secret(_) | EnvValue::File(_) => true,
            EnvValue::Template(template) => template.contains_secret(),
        }
    }
}

impl fmt::Debug for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Secret(path) => f.debug_tuple("Secret").field(&path.as_str()).finish(),
            EnvValue::File(_) => f.debug_tuple("File").field(&"<redacted>").finish(),
            EnvValue::Template(template) => fmt::Debug::fmt(template, f),
        }
    }
}

/// A compiled template bound to the variable reader of its file
#[derive(Clone)]
pub struct TemplateValue {
    template: Arc<dyn Template>,
    vars: Arc<dyn VariableReader>,
    path: Option<PathBuf>,
}

impl TemplateValue {
    /// Bind `template` to a shared variable reader
    pub fn new(
        template: Arc<dyn Template>,
        vars: Arc<dyn VariableReader>,
        path: Option<PathBuf>,
    ) -> Self {
        Self { template, vars, path }
    }

    /// The file the template was read from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn resolve(&self, secrets: &dyn SecretReader) -> EnvResult<String> {
        self.template
            .evaluate(self.vars.as_ref(), secrets)
            .map_err(|e| match &self.path {
                Some(path) => EnvError::in_file(path, e),
                None => e,
            })
    }

    fn contains_secret(&self) -> bool {
        self.template.contains_secrets()
    }
}

impl fmt::Debug for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("path", &self.path)
            .field("contains_secrets", &self.template.contains_secrets())
            .finish()
    }
}

/// A provider of environment variables from one origin
///
/// Implementations do all file I/O at construction; `env` is cheap and
/// returns the same result on every call.
pub trait EnvSource: Send + Sync + fmt::Debug {
    /// Returns a short name describing the origin of this source
    fn name(&self) -> &str;

    /// Build the variables of this source
    fn env(&self) -> EnvResult<HashMap<String, EnvValue>>;
}

impl<S: EnvSource + ?Sized> EnvSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        (**self).env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::{MapVariableReader, MockSecretReader};
    use crate::template::{DefaultParser, TemplateParser};
    use mockall::predicate::eq;

    fn template_value(body: &str, path: Option<&str>) -> EnvValue {
        let template = DefaultParser.parse(body, Some(1), 1).unwrap();
        EnvValue::Template(TemplateValue::new(
            Arc::from(template),
            Arc::new(MapVariableReader::default()),
            path.map(PathBuf::from),
        ))
    }

    #[test]
    fn test_secret_value_passes_exact_path() {
        let mut secrets = MockSecretReader::new();
        secrets
            .expect_read_secret()
            .with(eq("ns/repo/secret"))
            .times(1)
            .returning(|_| Ok("s3cr3t".to_string()));

        let value = EnvValue::secret(SecretPath::parse("ns/repo/secret").unwrap());
        assert!(value.contains_secret());
        assert_eq!(value.resolve(&secrets).unwrap(), "s3cr3t");
    }

    #[test]
    fn test_secret_value_error_is_unmodified() {
        let mut secrets = MockSecretReader::new();
        secrets
            .expect_read_secret()
            .returning(|path| Err(EnvError::secret_read(path, "access denied")));

        let value = EnvValue::secret(SecretPath::parse("ns/repo/secret").unwrap());
        let err = value.resolve(&secrets).unwrap_err();
        match err {
            EnvError::SecretRead { path, message } => {
                assert_eq!(path, "ns/repo/secret");
                assert_eq!(message, "access denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_value_ignores_reader() {
        let secrets = MockSecretReader::new();
        let value = EnvValue::file("alice");
        assert!(value.contains_secret());
        assert_eq!(value.resolve(&secrets).unwrap(), "alice");
    }

    #[test]
    fn test_template_value_contains_secret_without_io() {
        let secrets = MockSecretReader::new();
        let plain = template_value("plain", None);
        let secret = template_value("{{ ns/repo/secret }}", None);

        assert!(!plain.contains_secret());
        assert!(secret.contains_secret());
        assert_eq!(plain.resolve(&secrets).unwrap(), "plain");
    }

    #[test]
    fn test_template_value_wraps_error_with_path() {
        let mut secrets = MockSecretReader::new();
        secrets
            .expect_read_secret()
            .returning(|path| Err(EnvError::secret_read(path, "not found")));

        let value = template_value("{{ ns/repo/secret }}", Some("secrethub.env"));
        let err = value.resolve(&secrets).unwrap_err();
        assert!(matches!(
            err,
            EnvError::InFile { ref path, .. } if path == Path::new("secrethub.env")
        ));
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_debug_redacts_file_contents() {
        let value = EnvValue::file("s3cr3t");
        assert!(!format!("{:?}", value).contains("s3cr3t"));
    }
}
