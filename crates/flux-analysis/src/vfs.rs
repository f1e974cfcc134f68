//! Layered file access for the program host.
//!
//! The host consults its overlay store first and falls through to a [`Vfs`]
//! implementation for everything else. `OsVfs` is the production
//! implementation; `MemoryVfs` backs tests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

/// File access capability injected into the program host.
pub trait Vfs: Send {
    /// Read a file's full text.
    fn read(&self, path: &Path) -> io::Result<String>;

    /// Whether a file exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem access.
#[derive(Debug, Default)]
pub struct OsVfs;

impl Vfs for OsVfs {
    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory filesystem for tests. Clones share the same underlying store,
/// so a test can keep one handle while the host owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
    files: Arc<Mutex<FxHashMap<PathBuf, String>>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file.
    pub fn insert(&self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.into(), text.into());
    }

    /// Remove a file.
    pub fn remove(&self, path: &Path) {
        self.files.lock().unwrap().remove(path);
    }
}

impl Vfs for MemoryVfs {
    fn read(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}
