//! Template compilation interfaces
//!
//! Values (and keys) of environment files are templates. A `TemplateParser`
//! compiles a body once; the resulting `Template` is evaluated later, when
//! the caller actually needs the value, against a variable reader and a
//! secret reader.
//!
//! `DefaultParser` implements the built-in template syntax:
//!
//! ```text
//! PLAIN=literal text
//! ENV_NAME={{ env }}                      # variable
//! REGION=${region}                        # variable
//! DB_PASSWORD={{ company/app/db/password }}   # secret
//! API_KEY={{ company/app/${env}/api_key }}    # secret path with a variable
//! ```

mod parser;

pub use parser::{CompiledTemplate, DefaultParser};

use crate::error::EnvResult;
use crate::readers::{SecretReader, VariableReader};

/// A compiled, not yet evaluated template
pub trait Template: Send + Sync {
    /// Render the template, reading variables and secrets as needed
    fn evaluate(&self, vars: &dyn VariableReader, secrets: &dyn SecretReader) -> EnvResult<String>;

    /// Whether evaluating this template reads at least one secret
    fn contains_secrets(&self) -> bool;
}

/// Compiles template bodies
pub trait TemplateParser: Send + Sync {
    /// Compile `body`, which starts at `line`/`column` of its file.
    ///
    /// The position is only used for error messages.
    fn parse(&self, body: &str, line: Option<usize>, column: usize) -> EnvResult<Box<dyn Template>>;
}
