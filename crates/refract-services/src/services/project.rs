//! Project model collaborator
//!
//! The project model owns the registry of projects, package roots and
//! compilation units. It is provided by the host language server; refract
//! only queries it and asks for the few structural updates a rename needs.

use refract_foundation::{LogicalLocation, RefractResult, SourceUnit};
use std::path::Path;

/// Registry of projects and compilation units
pub trait ProjectModel: Send + Sync {
    fn has_project(&self, project_name: &str) -> bool;

    /// Whether the project declares a package root for this build entry
    fn has_package_root(&self, project_name: &str, build_entry_id: &str) -> bool;

    /// Compilation unit handle for a path, whether or not the unit is known yet
    fn resolve_unit(&self, path: &Path) -> Option<SourceUnit>;

    /// Whether the model already tracks the unit
    fn unit_exists(&self, unit: &SourceUnit) -> bool;

    /// Register a unit that exists on disk but not yet in the model
    fn register_unit(&self, unit: &SourceUnit) -> RefractResult<SourceUnit>;

    fn type_exists(&self, unit: &SourceUnit, type_name: &str) -> bool;

    /// Re-read the package directory and its subtree from disk
    fn refresh_package(&self, location: &LogicalLocation) -> RefractResult<()>;

    fn package_exists(&self, location: &LogicalLocation) -> bool;

    /// Whether the unit belongs to its project's build configuration
    fn is_on_build_path(&self, unit: &SourceUnit) -> bool;

    /// Back the unit by an editable in-memory copy
    fn become_working_copy(&self, unit: &SourceUnit) -> RefractResult<()>;

    /// Release a copy created by [`ProjectModel::become_working_copy`]
    fn discard_working_copy(&self, unit: &SourceUnit) -> RefractResult<()>;
}
