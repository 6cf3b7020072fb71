//! SecretEnv Core
//!
//! Composes a process environment from flags, OS variables, secret
//! directories and templated environment files, and resolves secret values
//! only when they are needed.
//!
//! ## Features
//!
//! - **Multiple Sources**: flags, `secrethub://` references in the OS
//!   environment, secrets directories and `.env`/YAML template files
//! - **Lazy Resolution**: values are fetched from the secret store on
//!   `resolve`, never while composing
//! - **Cheap Secret Detection**: `contains_secret` answers without any I/O,
//!   for dry runs and listings
//! - **Dual Format**: `.env` files with a YAML fallback
//! - **Precise Diagnostics**: parse and validation errors carry line and
//!   column numbers and the originating file
//!
//! ## Architecture
//!
//! 1. **Parse** (`parse/`): turns file contents into raw `key=value` entries.
//! 2. **Template** (`template/`): compiles keys and values into templates.
//! 3. **Sources** (`sources/`): `EnvSource` implementations and the chain
//!    that merges them.
//! 4. **Readers** (`readers`): the secret and variable reader interfaces.
//!
//! ## Example
//!
//! ```rust,no_run
//! use secretenv_core::{
//!     readers::{MapVariableReader, SecretReader},
//!     sources::{read_env_file, EnvChain, EnvSource},
//!     template::DefaultParser,
//!     EnvConfig, EnvResult,
//! };
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! fn run(client: &dyn SecretReader) -> EnvResult<()> {
//!     let config = EnvConfig::default();
//!     let vars = Arc::new(MapVariableReader::from_process_env(HashMap::new(), &config));
//!
//!     let file = read_env_file("secrethub.env", vars, &DefaultParser)?;
//!     let chain = EnvChain::new().with_source(file);
//!
//!     for (name, value) in chain.env()? {
//!         if value.contains_secret() {
//!             println!("{name}: <secret>");
//!         }
//!     }
//!
//!     let resolved = chain.resolve(client)?;
//!     println!("resolved {} variables", resolved.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod parse;
pub mod readers;
pub mod sources;
pub mod template;
pub mod validation;

pub use config::EnvConfig;
pub use error::{EnvError, EnvResult};
pub use parse::{parse_environment, trim_quotes, RawEnvVar};
pub use readers::{MapVariableReader, SecretReader, SecretsNotAllowed, VariableReader};
pub use sources::{EnvChain, EnvSource, EnvValue};
pub use template::{DefaultParser, Template, TemplateParser};
pub use validation::{validate_envar_name, SecretPath};
