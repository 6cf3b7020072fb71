//! Error types for environment composition
//!
//! Errors fall into four groups that callers handle differently:
//!
//! - **Parse** errors: the file is not valid `key=value` text, YAML, or
//!   template syntax. Always fatal for the whole file.
//! - **Validation** errors: a key is not a valid environment variable name,
//!   a secret path is malformed, or a key tries to reference a secret.
//! - **Resolution** errors: a secret could not be fetched or a variable is
//!   undefined. Only produced by `EnvValue::resolve`.
//! - **I/O** errors: a directory or file could not be read.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while composing or resolving an environment
#[derive(Error, Debug)]
pub enum EnvError {
    /// Structural error in an environment file
    #[error("template error{}: {message}", on_line(.line))]
    Parse {
        line: Option<usize>,
        message: String,
    },

    /// Syntax error inside a template body
    #[error("template syntax error{}, column {column}: {message}", on_line(.line))]
    TemplateSyntax {
        line: Option<usize>,
        column: usize,
        message: String,
    },

    /// A key is not usable as an environment variable name
    #[error("template error{}: invalid environment variable name {name:?}: {reason}", on_line(.line))]
    InvalidEnvarName {
        name: String,
        line: Option<usize>,
        reason: String,
    },

    /// A secret path does not follow `namespace/repo/secret[:version]`
    #[error("invalid secret path {path:?}: {reason}")]
    InvalidSecretPath { path: String, reason: String },

    /// A key template tried to read a secret
    #[error("secrets are not allowed in environment variable keys")]
    SecretsNotAllowedInKey,

    /// A key template could not be evaluated
    #[error("template error{}: {source}", on_line(.line))]
    KeyEvaluation {
        line: Option<usize>,
        #[source]
        source: Box<EnvError>,
    },

    /// A template variable has no value
    #[error("variable {name:?} is not defined")]
    VariableNotFound { name: String },

    /// The secret reader failed to fetch a secret
    #[error("cannot read secret {path}: {message}")]
    SecretRead { path: String, message: String },

    /// A directory could not be listed
    #[error("cannot read directory {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file could not be read
    #[error("cannot read file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error raised by a source that was read from a file
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<EnvError>,
    },

    /// Error raised while resolving a single key of a composed environment
    #[error("cannot resolve {key}: {source}")]
    Resolve {
        key: String,
        #[source]
        source: Box<EnvError>,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn on_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" on line {}", line),
        None => String::new(),
    }
}

/// Result type alias for environment operations
pub type EnvResult<T> = Result<T, EnvError>;

impl EnvError {
    /// Create a structural parse error
    pub fn parse(line: Option<usize>, message: impl Into<String>) -> Self {
        EnvError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a secret read error
    pub fn secret_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        EnvError::SecretRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the file it originated from
    pub fn in_file(path: impl Into<PathBuf>, source: EnvError) -> Self {
        EnvError::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Strip file and key context, returning the underlying error
    pub fn root(&self) -> &EnvError {
        match self {
            EnvError::InFile { source, .. } | EnvError::Resolve { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this is a structural parse error
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self.root(),
            EnvError::Parse { .. } | EnvError::TemplateSyntax { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.root(),
            EnvError::InvalidEnvarName { .. }
                | EnvError::InvalidSecretPath { .. }
                | EnvError::SecretsNotAllowedInKey
                | EnvError::KeyEvaluation { .. }
        )
    }

    /// Check if this error came from resolving a value
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self.root(),
            EnvError::VariableNotFound { .. } | EnvError::SecretRead { .. }
        )
    }

    /// Line number in the originating file, when known
    pub fn line(&self) -> Option<usize> {
        match self.root() {
            EnvError::Parse { line, .. }
            | EnvError::TemplateSyntax { line, .. }
            | EnvError::InvalidEnvarName { line, .. }
            | EnvError::KeyEvaluation { line, .. } => *line,
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for EnvError {
    fn from(err: serde_yaml::Error) -> Self {
        EnvError::Config(format!("YAML error: {}", err))
    }
}
