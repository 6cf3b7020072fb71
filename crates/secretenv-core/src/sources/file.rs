//! Adds the originating file path to the errors of a source

use super::dir::DirSource;
use super::template::TemplateFileSource;
use super::traits::{EnvSource, EnvValue};
use crate::error::{EnvError, EnvResult};
use crate::readers::VariableReader;
use crate::template::TemplateParser;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A source read from a file
#[derive(Debug)]
pub struct FileSource<S> {
    path: PathBuf,
    inner: S,
}

impl<S: EnvSource> FileSource<S> {
    /// Wrap an already constructed source
    pub fn new(path: impl Into<PathBuf>, inner: S) -> Self {
        Self {
            path: path.into(),
            inner,
        }
    }

    /// Construct the inner source, adding `path` to any construction error
    pub fn build<F>(path: impl Into<PathBuf>, build: F) -> EnvResult<Self>
    where
        F: FnOnce(&Path) -> EnvResult<S>,
    {
        let path = path.into();
        let inner = build(&path).map_err(|e| EnvError::in_file(&path, e))?;
        Ok(Self { path, inner })
    }

    /// The originating file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The wrapped source
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: EnvSource> EnvSource for FileSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn env(&self) -> EnvResult<HashMap<String, EnvValue>> {
        self.inner.env().map_err(|e| EnvError::in_file(&self.path, e))
    }
}

/// Read and compile the environment file at `path`
pub fn read_env_file(
    path: impl AsRef<Path>,
    vars: Arc<dyn VariableReader>,
    parser: &dyn TemplateParser,
) -> EnvResult<FileSource<TemplateFileSource>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| EnvError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    FileSource::build(path, |path| {
        TemplateFileSource::new(file, Some(path.to_path_buf()), vars, parser)
    })
}

/// Read the secrets directory at `path`
pub fn read_env_dir(path: impl AsRef<Path>) -> EnvResult<FileSource<DirSource>> {
    FileSource::build(path.as_ref(), |path| DirSource::read(path))
}
