//! Source roots, logical locations and refactoring targets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A directory configured as the base of a package namespace for a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRoot {
    /// Absolute filesystem path of the root
    pub path: PathBuf,
    /// Opaque identifier of the build entry that declares this root
    pub build_entry_id: String,
    /// Name of the owning project
    pub project_name: String,
}

impl SourceRoot {
    pub fn new(
        path: impl Into<PathBuf>,
        build_entry_id: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            build_entry_id: build_entry_id.into(),
            project_name: project_name.into(),
        }
    }

    /// Length of the root path as written, used to order roots
    pub fn path_len(&self) -> usize {
        self.path.as_os_str().len()
    }
}

/// Package identity derived from a filesystem path and the source root containing it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicalLocation {
    pub project_name: String,
    pub build_entry_id: String,
    pub root_path: PathBuf,
    /// Dot-separated package name; empty for the default package
    pub dotted_name: String,
}

impl LogicalLocation {
    pub fn is_default_package(&self) -> bool {
        self.dotted_name.is_empty()
    }

    /// Last segment of the dotted name
    pub fn leaf(&self) -> &str {
        self.dotted_name
            .rsplit_once('.')
            .map(|(_, leaf)| leaf)
            .unwrap_or(&self.dotted_name)
    }

    /// Dotted name with only its last segment replaced by `new_leaf`
    ///
    /// `com.acme` with `widgets` becomes `com.widgets`; a single-segment
    /// name becomes `new_leaf`.
    pub fn with_leaf(&self, new_leaf: &str) -> String {
        match self.dotted_name.rsplit_once('.') {
            Some((parent, _)) => format!("{parent}.{new_leaf}"),
            None => new_leaf.to_string(),
        }
    }

    /// Filesystem directory of this package
    pub fn directory(&self) -> PathBuf {
        self.dotted_name
            .split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self.root_path.clone(), |dir, segment| dir.join(segment))
    }
}

impl fmt::Display for LogicalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_package() {
            write!(f, "{}/(default package)", self.project_name)
        } else {
            write!(f, "{}/{}", self.project_name, self.dotted_name)
        }
    }
}

/// A compilation unit as known to the project model
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    pub path: PathBuf,
    /// Owning project; `None` for files outside every project
    pub project_name: Option<String>,
    /// Dotted package the unit declares
    pub package: String,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, project_name: Option<String>, package: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            project_name,
            package: package.into(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Element handed to the refactoring engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefactorTarget {
    /// The primary type declared by a compilation unit
    Unit { unit: SourceUnit, type_name: String },
    /// A package, addressed through its logical location
    Package { location: LogicalLocation },
}

impl RefactorTarget {
    /// Project whose model is mutated by refactoring this target
    pub fn project_name(&self) -> Option<&str> {
        match self {
            RefactorTarget::Unit { unit, .. } => unit.project_name.as_deref(),
            RefactorTarget::Package { location } => Some(&location.project_name),
        }
    }

    pub fn element_name(&self) -> &str {
        match self {
            RefactorTarget::Unit { type_name, .. } => type_name,
            RefactorTarget::Package { location } => &location.dotted_name,
        }
    }
}
