//! Resolution of filesystem paths to logical package locations
//!
//! Roots are matched longest-first. The ordering compares the root paths as
//! written (string length), not their depth: two roots that both contain a
//! path always nest, so for normalized roots this is the same as "deepest
//! wins". Un-normalized roots (`/ws/./././src`) can sort ahead of a deeper
//! root; that ordering is kept as is.

use super::project::ProjectModel;
use refract_foundation::paths::normalize;
use refract_foundation::{LogicalLocation, RefractResult, SourceRoot};
use std::path::Path;
use tracing::{debug, warn};

/// Enumerates the source roots of every project in the workspace
#[cfg_attr(test, mockall::automock)]
pub trait BuildPathProvider: Send + Sync {
    fn list_source_paths(&self) -> RefractResult<Vec<SourceRoot>>;
}

/// Source roots ordered for longest-prefix matching
#[derive(Debug, Clone, Default)]
pub struct SourceRootIndex {
    roots: Vec<SourceRoot>,
}

impl SourceRootIndex {
    pub fn new(mut roots: Vec<SourceRoot>) -> Self {
        roots.sort_by(|a, b| b.path_len().cmp(&a.path_len()));
        Self { roots }
    }

    /// Build the index from the provider
    ///
    /// A failing or empty provider yields an empty index: without source
    /// roots no package-aware refactoring is possible, which is not an error.
    pub fn load(provider: &dyn BuildPathProvider) -> Self {
        match provider.list_source_paths() {
            Ok(roots) => {
                debug!(count = roots.len(), "Loaded source roots");
                Self::new(roots)
            }
            Err(e) => {
                warn!(error = %e, code = e.code(), "Failed to list source paths");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Roots in matching order
    pub fn roots(&self) -> &[SourceRoot] {
        &self.roots
    }

    /// First root, in matching order, whose path is a prefix of `path`
    pub fn matching_root(&self, path: &Path) -> Option<&SourceRoot> {
        let path = normalize(path);
        self.roots.iter().find(|root| path.starts_with(&root.path))
    }

    /// Logical location of `path` under its matching root
    ///
    /// Depends only on the root set and the path.
    pub fn locate(&self, path: &Path) -> Option<LogicalLocation> {
        let root = self.matching_root(path)?;
        let normalized = normalize(path);
        let relative = normalized.strip_prefix(&root.path).ok()?;

        let mut segments = Vec::new();
        for component in relative.components() {
            let Some(segment) = component.as_os_str().to_str() else {
                debug!(path = %path.display(), "Non UTF-8 path segment, cannot derive package");
                return None;
            };
            segments.push(segment);
        }

        Some(LogicalLocation {
            project_name: root.project_name.clone(),
            build_entry_id: root.build_entry_id.clone(),
            root_path: root.path.clone(),
            dotted_name: segments.join("."),
        })
    }

    /// Logical location of `path`, checked against the project model
    ///
    /// The owning project and its package root must both be known to the
    /// model. Every failure is reported as unresolved.
    pub fn resolve(&self, path: &Path, model: &dyn ProjectModel) -> Option<LogicalLocation> {
        let Some(location) = self.locate(path) else {
            debug!(path = %path.display(), "No source root contains path");
            return None;
        };

        if !model.has_project(&location.project_name) {
            debug!(
                project = %location.project_name,
                path = %path.display(),
                "Owning project not found"
            );
            return None;
        }

        if !model.has_package_root(&location.project_name, &location.build_entry_id) {
            debug!(
                project = %location.project_name,
                build_entry = %location.build_entry_id,
                "Package root not found in project"
            );
            return None;
        }

        Some(location)
    }
}
