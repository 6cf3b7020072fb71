//! Secrets directory source
//!
//! Every file in the directory becomes one variable named after the file,
//! with the file contents as value. This matches how secrets are mounted
//! into containers:
//!
//! ```text
//! /run/secrets/
//! ├── DB_USER       -> "admin"
//! └── DB_PASSWORD   -> "hunter2"
//! ```
//!
//! Files are read when the source is created. Symlinks are followed;
//! subdirectories, sockets, FIFOs and device nodes are skipped.

use super::traits::{EnvSource, EnvValue};
use crate::error::{EnvError, EnvResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Source built from the files in a directory
#[derive(Clone)]
pub struct DirSource {
    path: PathBuf,
    files: HashMap<String, String>,
}

impl DirSource {
    /// List `path` and read every regular file in it
    pub fn read(path: impl AsRef<Path>) -> EnvResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = fs::read_dir(&path).map_err(|source| EnvError::ReadDir {
            path: path.clone(),
            source,
        })?;

        let mut files = HashMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| EnvError::ReadDir {
                path: path.clone(),
                source,
            })?;
            let file_path = entry.path();

            let metadata = fs::metadata(&file_path).map_err(|source| EnvError::ReadFile {
                path: file_path.clone(),
                source,
            })?;
            if !metadata.is_file() {
                tracing::trace!(path = %file_path.display(), "Skipping non-regular file");
                continue;
            }

            let contents = fs::read_to_string(&file_path).map_err(|source| {
                EnvError::ReadFile {
                    path: file_path.clone(),
                    source,
                }
            })?;
            files.insert(entry.file_name().to_string_lossy().into_owned(), contents);
        }

        tracing::debug!(path = %path.display(), count = files.len(), "Read secrets directory");
        Ok(Self { path, files })
    }

    /// The directory this source was read from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for DirSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirSource")
            .field("path", &self.path)
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EnvSource for DirSource {
    fn name(&self) -> &str {
        "dir"
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        Ok(self
            .files
            .iter()
            .map(|(name, contents)| (name.clone(), EnvValue::file(contents.clone())))
            .collect())
    }
}
