//! File rename orchestration
//!
//! Turns `workspace/didRenameFiles` and `workspace/willRenameFiles`
//! notifications into a single workspace edit:
//!
//! - **did rename**: a source file renamed in place renames its primary type
//!   (`Foo.java` -> `Bar.java` renames `Foo` to `Bar` and its references).
//! - **will rename**: a renamed directory renames its package (including
//!   sub-packages); source files moved to another directory are moved to the
//!   destination package, updating package declarations and imports.
//!
//! # Failure model
//!
//! Each event is processed on its own. An event that cannot be resolved, or
//! for which the engine fails, is logged and contributes no edit; the rest of
//! the batch continues. Cancellation is checked between events and keeps the
//! edits computed so far.

use super::aggregator::EditAggregator;
use super::classifier::{primary_type_name, EventKind, FileSystemProbe, OsFileSystem, PathClassifier};
use super::engine::{RefactoringEngine, RenameOptions};
use super::locks::ProjectLocks;
use super::project::ProjectModel;
use super::source_roots::{BuildPathProvider, SourceRootIndex};
use super::working_copy::WorkingCopyGuard;
use lsp_types::{RenameFilesParams, WorkspaceEdit};
use refract_foundation::paths::{leaf_name, longest_common_ancestor, uri_to_path};
use refract_foundation::{ProgressHandle, RefactorTarget, RefractError, RefractResult, SourceUnit};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Work units credited per event
const EVENT_WEIGHT: u64 = 100;

/// A rename event with both URIs converted to paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEvent {
    pub old_path: PathBuf,
    pub new_path: PathBuf,
}

impl RenameEvent {
    pub fn new(old_path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }
}

/// Batch rename handler
pub struct RenameEventOrchestrator {
    model: Arc<dyn ProjectModel>,
    engine: Arc<dyn RefactoringEngine>,
    build_paths: Arc<dyn BuildPathProvider>,
    classifier: PathClassifier<Arc<dyn FileSystemProbe>>,
    locks: ProjectLocks,
}

impl RenameEventOrchestrator {
    pub fn new(
        model: Arc<dyn ProjectModel>,
        engine: Arc<dyn RefactoringEngine>,
        build_paths: Arc<dyn BuildPathProvider>,
        source_extension: impl Into<String>,
    ) -> Self {
        Self {
            model,
            engine,
            build_paths,
            classifier: PathClassifier::with_probe(source_extension, Arc::new(OsFileSystem)),
            locks: ProjectLocks::new(),
        }
    }

    /// Replace the filesystem probe used to classify events
    pub fn with_probe(mut self, probe: Arc<dyn FileSystemProbe>) -> Self {
        let extension = self.classifier.source_extension().to_string();
        self.classifier = PathClassifier::with_probe(extension, probe);
        self
    }

    /// Share project locks with other request handlers
    pub fn with_locks(mut self, locks: ProjectLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn locks(&self) -> &ProjectLocks {
        &self.locks
    }

    /// Convert the notification's URIs to paths, dropping non-file URIs
    pub fn events(params: &RenameFilesParams) -> Vec<RenameEvent> {
        params
            .files
            .iter()
            .filter_map(|file| match (uri_to_path(&file.old_uri), uri_to_path(&file.new_uri)) {
                (Some(old_path), Some(new_path)) => Some(RenameEvent { old_path, new_path }),
                _ => {
                    debug!(
                        old_uri = %file.old_uri,
                        new_uri = %file.new_uri,
                        "Ignoring rename event with non-file URI"
                    );
                    None
                }
            })
            .collect()
    }

    pub fn classify(&self, event: &RenameEvent) -> EventKind {
        self.classifier.classify(&event.old_path, &event.new_path)
    }

    /// Handle `workspace/didRenameFiles`: rename primary types of renamed source files
    pub async fn handle_renames(
        &self,
        params: &RenameFilesParams,
        progress: &ProgressHandle,
    ) -> Option<WorkspaceEdit> {
        let events: Vec<RenameEvent> = Self::events(params)
            .into_iter()
            .filter(|event| self.classify(event) == EventKind::FileRename)
            .collect();
        if events.is_empty() {
            return None;
        }

        info!(count = events.len(), "Computing rename updates");
        progress.begin(EVENT_WEIGHT * events.len() as u64);

        let mut edits = EditAggregator::new(true);
        for event in &events {
            if progress.is_cancelled() {
                info!("Rename computation cancelled, returning partial result");
                break;
            }

            let _unit = progress.split(EVENT_WEIGHT);
            match self.compute_type_rename(event).await {
                Ok(edit) => edits.push(edit),
                Err(e) => warn!(
                    old_path = %event.old_path.display(),
                    new_path = %event.new_path.display(),
                    error = %e,
                    code = e.code(),
                    "Failed to compute the rename edit"
                ),
            }
        }

        edits.finish()
    }

    /// Handle `workspace/willRenameFiles`: package renames and moves between packages
    pub async fn handle_will_rename(
        &self,
        params: &RenameFilesParams,
        progress: &ProgressHandle,
    ) -> Option<WorkspaceEdit> {
        let mut folder_renames = Vec::new();
        let mut moves = Vec::new();
        for event in Self::events(params) {
            match self.classify(&event) {
                EventKind::FolderRename => folder_renames.push(event),
                EventKind::Move => moves.push(event),
                EventKind::FileRename | EventKind::Ignore => self.log_ignored(&event),
            }
        }

        if folder_renames.is_empty() && moves.is_empty() {
            return None;
        }

        let index = SourceRootIndex::load(self.build_paths.as_ref());
        if index.is_empty() {
            debug!("No source roots configured, skipping package-aware rename");
            return None;
        }

        info!(
            folder_renames = folder_renames.len(),
            moves = moves.len(),
            "Computing will-rename updates"
        );
        progress.begin(EVENT_WEIGHT * (folder_renames.len() + moves.len()) as u64);

        let mut edits = EditAggregator::new(true);
        if !folder_renames.is_empty() {
            edits.push(self.compute_package_renames(&folder_renames, &index, progress).await);
        }

        if !moves.is_empty() {
            if progress.is_cancelled() {
                info!("Move computation cancelled, returning partial result");
            } else {
                let _unit = progress.split(EVENT_WEIGHT * moves.len() as u64);
                match self.compute_move(&moves, &index).await {
                    Ok(edit) => edits.push(edit),
                    Err(e) => warn!(
                        count = moves.len(),
                        error = %e,
                        code = e.code(),
                        "Failed to compute the move update"
                    ),
                }
            }
        }

        edits.finish()
    }

    fn log_ignored(&self, event: &RenameEvent) {
        let probe = self.classifier.probe();
        if probe.is_dir(&event.old_path) || probe.is_dir(&event.new_path) {
            let e = RefractError::unsupported_event(&event.old_path, &event.new_path);
            debug!(error = %e, code = e.code(), "Package moves are not supported");
        } else {
            debug!(
                old_path = %event.old_path.display(),
                new_path = %event.new_path.display(),
                "Ignoring rename event"
            );
        }
    }

    async fn compute_type_rename(&self, event: &RenameEvent) -> RefractResult<Option<WorkspaceEdit>> {
        let Some(mut unit) = self.model.resolve_unit(&event.new_path) else {
            debug!(path = %event.new_path.display(), "No compilation unit for renamed file");
            return Ok(None);
        };

        // The file may have been renamed on disk before the model noticed it
        if !self.model.unit_exists(&unit) {
            let _guard = match unit.project_name.as_deref() {
                Some(project) => Some(self.locks.lock(project).await),
                None => None,
            };
            match self.model.register_unit(&unit) {
                Ok(registered) => unit = registered,
                Err(e) => warn!(
                    path = %unit.path.display(),
                    error = %e,
                    "Failed to register renamed compilation unit"
                ),
            }
        }

        let (Some(old_type), Some(new_type)) = (
            primary_type_name(&event.old_path),
            primary_type_name(&event.new_path),
        ) else {
            return Ok(None);
        };

        if old_type == new_type
            || self.model.type_exists(&unit, &new_type)
            || !self.model.type_exists(&unit, &old_type)
        {
            debug!(
                old_type = %old_type,
                new_type = %new_type,
                "Primary type does not need renaming"
            );
            return Ok(None);
        }

        let target = RefactorTarget::Unit {
            unit,
            type_name: old_type,
        };
        let _guard = match target.project_name() {
            Some(project) => Some(self.locks.lock(project).await),
            None => None,
        };
        let outcome = self
            .engine
            .rename_element(&target, &new_type, RenameOptions::default())
            .await?;
        outcome.into_edit("type rename")
    }

    async fn compute_package_renames(
        &self,
        events: &[RenameEvent],
        index: &SourceRootIndex,
        progress: &ProgressHandle,
    ) -> Option<WorkspaceEdit> {
        let mut edits = EditAggregator::new(true);
        for event in events {
            if progress.is_cancelled() {
                info!("Package rename computation cancelled, returning partial result");
                break;
            }

            let _unit = progress.split(EVENT_WEIGHT);
            match self.compute_package_rename(event, index).await {
                Ok(edit) => edits.push(edit),
                Err(e) => warn!(
                    old_path = %event.old_path.display(),
                    new_path = %event.new_path.display(),
                    error = %e,
                    code = e.code(),
                    "Failed to compute the package rename update"
                ),
            }
        }
        edits.finish()
    }

    async fn compute_package_rename(
        &self,
        event: &RenameEvent,
        index: &SourceRootIndex,
    ) -> RefractResult<Option<WorkspaceEdit>> {
        let Some(location) = index.resolve(&event.old_path, self.model.as_ref()) else {
            let e = RefractError::unresolved(&event.old_path);
            debug!(error = %e, code = e.code(), "Skipping folder rename");
            return Ok(None);
        };

        if location.is_default_package() {
            debug!(path = %event.old_path.display(), "Source root renamed, no package to rename");
            return Ok(None);
        }

        let Some(new_leaf) = leaf_name(&event.new_path) else {
            return Ok(None);
        };
        let new_name = location.with_leaf(&new_leaf);

        let _guard = self.locks.lock(&location.project_name).await;
        self.model.refresh_package(&location)?;
        if !self.model.package_exists(&location) {
            debug!(package = %location, "Package does not exist, skipping");
            return Ok(None);
        }

        debug!(package = %location, new_name = %new_name, "Renaming package");
        let target = RefactorTarget::Package { location };
        let options = RenameOptions {
            update_references: true,
            rename_subpackages: true,
        };
        let outcome = self.engine.rename_element(&target, &new_name, options).await?;
        outcome.into_edit("package rename")
    }

    async fn compute_move(
        &self,
        events: &[RenameEvent],
        index: &SourceRootIndex,
    ) -> RefractResult<Option<WorkspaceEdit>> {
        let new_paths: Vec<PathBuf> = events.iter().map(|e| e.new_path.clone()).collect();
        let Some(destination_path) = longest_common_ancestor(&new_paths) else {
            debug!("Moved files share no common directory");
            return Ok(None);
        };

        let Some(destination) = index.resolve(&destination_path, self.model.as_ref()) else {
            let e = RefractError::unresolved(&destination_path);
            warn!(error = %e, code = e.code(), "No destination package for move");
            return Ok(None);
        };

        let probe = self.classifier.probe();
        let units: Vec<SourceUnit> = events
            .iter()
            .filter(|event| probe.is_file(&event.old_path))
            .filter_map(|event| self.model.resolve_unit(&event.old_path))
            .filter(|unit| unit.project_name.is_some())
            .collect();
        if units.is_empty() {
            return Ok(None);
        }

        let detached: Vec<SourceUnit> = units
            .iter()
            .filter(|unit| !self.model.is_on_build_path(unit))
            .cloned()
            .collect();

        let projects: BTreeSet<String> = units
            .iter()
            .filter_map(|unit| unit.project_name.clone())
            .chain(std::iter::once(destination.project_name.clone()))
            .collect();

        debug!(
            units = units.len(),
            detached = detached.len(),
            destination = %destination,
            "Moving compilation units"
        );

        // Declaration order matters: working copies are released before the locks
        let _locks = self.locks.lock_all(projects).await;
        let _working_copies = WorkingCopyGuard::acquire(Arc::clone(&self.model), detached)?;
        let outcome = self.engine.move_elements(&units, &destination, true).await?;
        outcome.into_edit("move")
    }
}
