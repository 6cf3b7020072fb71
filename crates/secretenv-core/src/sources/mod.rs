//! Environment Sources
//!
//! This module provides the sources an environment can be composed from.
//! Every source turns its input into a map of variable names to lazily
//! resolvable `EnvValue`s.
//!
//! # Supported Sources
//!
//! - **Flags**: `name -> secret path` pairs given on the command line
//! - **OS references**: OS variables whose value is `secrethub://<path>`
//! - **Directories**: one variable per file, e.g. mounted secrets
//! - **Template files**: `.env` or flat YAML files whose keys and values are
//!   templates
//! - **File wrapper**: adds the file or directory path to the errors of any
//!   other source (`read_env_file`, `read_env_dir`)
//!
//! # Example
//!
//! ```rust,ignore
//! use secretenv_core::sources::{EnvChain, EnvSource, FlagSource, OsReferenceSource};
//!
//! let chain = EnvChain::new()
//!     .with_source(OsReferenceSource::from_process_env(&config))
//!     .with_source(FlagSource::new(flags)?);
//!
//! for (name, value) in chain.env()? {
//!     if value.contains_secret() {
//!         println!("{name} needs a secret");
//!     }
//! }
//! ```

pub mod chain;
pub mod dir;
pub mod file;
pub mod flags;
pub mod os;
pub mod template;
pub mod traits;

pub use chain::{EnvChain, EnvChainBuilder};
pub use dir::DirSource;
pub use file::{read_env_dir, read_env_file, FileSource};
pub use flags::FlagSource;
pub use os::OsReferenceSource;
pub use template::TemplateFileSource;
pub use traits::{EnvSource, EnvValue, TemplateValue};
