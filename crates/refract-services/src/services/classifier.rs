//! Classification of file rename events into refactoring intents
//!
//! A client reports renames as bare `(old, new)` path pairs. Whether a pair
//! is a type rename, a package rename or a move to another package depends
//! on the shape of the paths and on what currently exists on disk. Each pair
//! maps to exactly one [`EventKind`].

use refract_foundation::paths::{leaf_name, normalize, parent_dir};
use std::path::Path;
use std::sync::Arc;

/// Refactoring intent of a single rename event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Source file renamed inside its directory
    FileRename,
    /// Directory renamed inside its parent
    FolderRename,
    /// Source file moved to another directory
    Move,
    /// Nothing to refactor
    Ignore,
}

/// Read-only view of the filesystem used during classification
pub trait FileSystemProbe: Send + Sync {
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Probe backed by `std::fs` metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystemProbe for OsFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

impl<T: FileSystemProbe + ?Sized> FileSystemProbe for Arc<T> {
    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }
}

/// Classifies rename events
///
/// Rules, first match wins:
/// 1. identical paths are ignored;
/// 2. a directory on either side with an unchanged parent is a folder rename;
/// 3. an existing source file at the new path with an unchanged parent is a file rename;
/// 4. a source file on either side with a changed parent is a move;
/// 5. anything else, including folder-to-folder moves, is ignored.
///
/// Moving a whole package subtree is deliberately not a [`EventKind::Move`]:
/// the engine only relocates individual units into another package.
#[derive(Debug, Clone)]
pub struct PathClassifier<F = OsFileSystem> {
    source_extension: String,
    fs: F,
}

impl PathClassifier<OsFileSystem> {
    pub fn new(source_extension: impl Into<String>) -> Self {
        Self::with_probe(source_extension, OsFileSystem)
    }
}

impl<F: FileSystemProbe> PathClassifier<F> {
    pub fn with_probe(source_extension: impl Into<String>, fs: F) -> Self {
        Self {
            source_extension: source_extension.into(),
            fs,
        }
    }

    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    pub fn probe(&self) -> &F {
        &self.fs
    }

    pub fn classify(&self, old_path: &Path, new_path: &Path) -> EventKind {
        let old_norm = normalize(old_path);
        let new_norm = normalize(new_path);
        if old_norm == new_norm {
            return EventKind::Ignore;
        }

        let same_parent = parent_dir(&old_norm) == parent_dir(&new_norm);

        if same_parent && (self.fs.is_dir(&old_norm) || self.fs.is_dir(&new_norm)) {
            return EventKind::FolderRename;
        }

        let both_sources = self.is_source_name(&old_norm) && self.is_source_name(&new_norm);
        if !both_sources {
            return EventKind::Ignore;
        }

        if same_parent {
            if self.fs.is_file(&new_norm) {
                return EventKind::FileRename;
            }
            return EventKind::Ignore;
        }

        if self.fs.is_file(&old_norm) || self.fs.is_file(&new_norm) {
            return EventKind::Move;
        }

        EventKind::Ignore
    }

    fn is_source_name(&self, path: &Path) -> bool {
        leaf_name(path)
            .map(|name| name.ends_with(&self.source_extension))
            .unwrap_or(false)
    }
}

/// Primary type name declared by a source file: the file name up to its last `.`
pub fn primary_type_name(path: &Path) -> Option<String> {
    let name = leaf_name(path)?;
    Some(match name.rfind('.') {
        Some(idx) => name[..idx].to_string(),
        None => name,
    })
}
