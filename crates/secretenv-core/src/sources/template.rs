//! Environment files with templated keys and values
//!
//! Each `key=value` entry (or YAML mapping entry) is compiled into a key
//! template and a value template. Keys are evaluated when `env` is called,
//! using variables only; values are evaluated on resolve, with secrets.
//!
//! ```text
//! DB_USER=admin
//! DB_PASSWORD={{ company/${env}/db/password }}
//! REGION_{{ region }}=1
//! ```

use super::traits::{EnvSource, EnvValue, TemplateValue};
use crate::error::{EnvError, EnvResult};
use crate::parse::parse_environment;
use crate::readers::{SecretsNotAllowed, VariableReader};
use crate::template::{Template, TemplateParser};
use crate::validation::validate_envar_name;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct TemplateEntry {
    key: Box<dyn Template>,
    value: Arc<dyn Template>,
    line: Option<usize>,
}

/// Source built from a compiled environment file
pub struct TemplateFileSource {
    path: Option<PathBuf>,
    entries: Vec<TemplateEntry>,
    vars: Arc<dyn VariableReader>,
}

impl TemplateFileSource {
    /// Parse and compile an environment file.
    ///
    /// `path` is only used to add context to resolve errors. Every value of
    /// the file shares `vars`.
    pub fn new<R: Read>(
        content: R,
        path: Option<PathBuf>,
        vars: Arc<dyn VariableReader>,
        parser: &dyn TemplateParser,
    ) -> EnvResult<Self> {
        let raw = parse_environment(content)?;

        let entries = raw
            .into_iter()
            .map(|var| {
                Ok(TemplateEntry {
                    key: parser.parse(&var.key, var.line, var.column_key)?,
                    value: Arc::from(parser.parse(&var.value, var.line, var.column_value)?),
                    line: var.line,
                })
            })
            .collect::<EnvResult<Vec<_>>>()?;

        tracing::debug!(
            path = ?path,
            entries = entries.len(),
            "Compiled environment template"
        );

        Ok(Self { path, entries, vars })
    }

    /// Compile an environment file held in memory
    pub fn from_string(
        content: &str,
        vars: Arc<dyn VariableReader>,
        parser: &dyn TemplateParser,
    ) -> EnvResult<Self> {
        Self::new(content.as_bytes(), None, vars, parser)
    }

    /// The file this template was read from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of entries in the file
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the file has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evaluate_key(&self, entry: &TemplateEntry) -> EnvResult<String> {
        let key = entry
            .key
            .evaluate(self.vars.as_ref(), &SecretsNotAllowed)
            .map_err(|source| EnvError::KeyEvaluation {
                line: entry.line,
                source: Box::new(source),
            })?;

        validate_envar_name(&key).map_err(|e| match e {
            EnvError::InvalidEnvarName { name, reason, .. } => EnvError::InvalidEnvarName {
                name,
                line: entry.line,
                reason,
            },
            other => other,
        })?;

        Ok(key)
    }
}

impl fmt::Debug for TemplateFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateFileSource")
            .field("path", &self.path)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl EnvSource for TemplateFileSource {
    fn name(&self) -> &str {
        "template"
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        let mut result = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            let key = self.evaluate_key(entry)?;
            let value =
                TemplateValue::new(entry.value.clone(), self.vars.clone(), self.path.clone());
            result.insert(key, EnvValue::Template(value));
        }
        Ok(result)
    }
}
