//! File I/O seams
//!
//! The engine never touches the filesystem directly; callers inject a
//! [`FileReader`] and a [`FileWriter`]. [`FsReader`]/[`FsWriter`] use the real
//! filesystem, [`MemoryFs`] keeps everything in memory.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{FrontweaveError, Result};

/// Reads text files
pub trait FileReader {
    /// # Errors
    ///
    /// `FILE_NOT_FOUND` when `path` does not exist, `READ_ERROR` otherwise.
    fn read(&self, path: &Path) -> Result<String>;
}

/// Writes text files
pub trait FileWriter {
    /// # Errors
    ///
    /// `WRITE_ERROR` naming `path`.
    fn write(&self, path: &Path, text: &str) -> Result<()>;
}

impl<T: FileReader + ?Sized> FileReader for &T {
    fn read(&self, path: &Path) -> Result<String> {
        (**self).read(path)
    }
}

impl<T: FileWriter + ?Sized> FileWriter for &T {
    fn write(&self, path: &Path, text: &str) -> Result<()> {
        (**self).write(path, text)
    }
}

/// Filesystem-backed reader
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FrontweaveError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => FrontweaveError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
    }
}

/// Filesystem-backed writer, creating parent directories as needed
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl FileWriter for FsWriter {
    fn write(&self, path: &Path, text: &str) -> Result<()> {
        let write_error = |e: std::io::Error| FrontweaveError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, text).map_err(write_error)
    }
}

/// In-memory file store; clones share the same files
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.lock().insert(path.into(), text.into());
    }

    /// Current content of a file, if present
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().get(path.as_ref()).cloned()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.lock().contains_key(path.as_ref())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileReader for MemoryFs {
    fn read(&self, path: &Path) -> Result<String> {
        self.get(path).ok_or_else(|| FrontweaveError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

impl FileWriter for MemoryFs {
    fn write(&self, path: &Path, text: &str) -> Result<()> {
        self.insert(path, text);
        Ok(())
    }
}
