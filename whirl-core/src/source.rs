//! Source loading for imports.
//!
//! The code generator never touches the filesystem itself; it asks a
//! [`SourceLoader`] for the bytes behind an import path.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    /// Resolved location; its parent is the directory for nested imports.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

pub trait SourceLoader {
    /// Load `relative` as seen from the importing file's directory `dir`.
    fn load(&self, dir: &Path, relative: &str) -> Result<LoadedSource, CoreError>;
}

/// Reads imports from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, dir: &Path, relative: &str) -> Result<LoadedSource, CoreError> {
        let path = dir.join(relative);
        match fs::read(&path) {
            Ok(contents) => Ok(LoadedSource { path, contents }),
            Err(source) => Err(CoreError::ImportResolution { path, source }),
        }
    }
}

/// In-memory file table keyed by lexically normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        self.files
            .insert(normalize(path.as_ref()), contents.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, dir: &Path, relative: &str) -> Result<LoadedSource, CoreError> {
        let path = normalize(&dir.join(relative));
        match self.files.get(&path) {
            Some(contents) => Ok(LoadedSource {
                path,
                contents: contents.clone(),
            }),
            None => Err(CoreError::ImportResolution {
                path,
                source: io::Error::new(io::ErrorKind::NotFound, "no such source file"),
            }),
        }
    }
}

/// Drop `.` components and fold `..` into its parent without touching
/// the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                None | Some(Component::ParentDir) => normalized.push(".."),
                Some(_) => {
                    normalized.pop();
                }
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
