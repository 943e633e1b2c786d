//! In-memory collaborators for service-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use lsp_types::{FileRename, Position, Range, RenameFilesParams, TextEdit, Uri, WorkspaceEdit};
use refract_foundation::paths::{parent_dir, path_to_uri};
use refract_foundation::{
    LogicalLocation, ProgressHandle, RefactorTarget, RefractError, RefractResult, SourceRoot,
    SourceUnit,
};
use refract_services::services::{
    BuildPathProvider, EngineOutcome, ProjectModel, RefactoringEngine, RefactoringStatus,
    RenameOptions, Severity,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const PROJECT: &str = "app";

/// A workspace on disk with a single source root at `<tmp>/src`
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        Self { dir }
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.src().join(relative)
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();
        path
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        std::fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn roots(&self) -> Vec<SourceRoot> {
        vec![SourceRoot::new(self.src(), "src", PROJECT)]
    }
}

pub fn uri(path: &Path) -> Uri {
    path_to_uri(path).unwrap()
}

pub fn rename_params(pairs: &[(&Path, &Path)]) -> RenameFilesParams {
    RenameFilesParams {
        files: pairs
            .iter()
            .map(|(old, new)| FileRename {
                old_uri: uri(old).to_string(),
                new_uri: uri(new).to_string(),
            })
            .collect(),
    }
}

/// Edit replacing the first characters of `path` with `text`
pub fn text_edit(path: &Path, text: &str) -> WorkspaceEdit {
    let edits = vec![TextEdit {
        range: Range::new(Position::new(0, 0), Position::new(0, 0)),
        new_text: text.to_string(),
    }];
    WorkspaceEdit::new([(uri(path), edits)].into_iter().collect())
}

/// Texts of every edit in the result, sorted
pub fn edit_texts(edit: &WorkspaceEdit) -> Vec<String> {
    let mut texts: Vec<String> = edit
        .changes
        .iter()
        .flat_map(|changes| changes.values())
        .flatten()
        .map(|edit| edit.new_text.clone())
        .collect();
    texts.sort();
    texts
}

pub struct StaticBuildPaths(pub Vec<SourceRoot>);

impl BuildPathProvider for StaticBuildPaths {
    fn list_source_paths(&self) -> RefractResult<Vec<SourceRoot>> {
        Ok(self.0.clone())
    }
}

pub struct FailingBuildPaths;

impl BuildPathProvider for FailingBuildPaths {
    fn list_source_paths(&self) -> RefractResult<Vec<SourceRoot>> {
        Err(RefractError::build_path("classpath container not initialized"))
    }
}

/// Project model over a single source root
///
/// Every call with a side effect is appended to a shared journal so tests
/// can assert on the interleaving with engine calls.
pub struct FakeModel {
    root: PathBuf,
    journal: Arc<Mutex<Vec<String>>>,
    known_units: Mutex<HashSet<PathBuf>>,
    types: HashSet<String>,
    packages: HashSet<String>,
    detached: HashSet<PathBuf>,
}

impl FakeModel {
    pub fn new(workspace: &Workspace, journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            root: workspace.src(),
            journal,
            known_units: Mutex::new(HashSet::new()),
            types: HashSet::new(),
            packages: HashSet::new(),
            detached: HashSet::new(),
        }
    }

    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types.extend(types.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_packages(mut self, packages: &[&str]) -> Self {
        self.packages.extend(packages.iter().map(|p| p.to_string()));
        self
    }

    pub fn with_known_unit(self, path: PathBuf) -> Self {
        self.known_units.lock().unwrap().insert(path);
        self
    }

    pub fn with_detached(mut self, path: PathBuf) -> Self {
        self.detached.insert(path);
        self
    }

    fn record(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl ProjectModel for FakeModel {
    fn has_project(&self, project_name: &str) -> bool {
        project_name == PROJECT
    }

    fn has_package_root(&self, project_name: &str, build_entry_id: &str) -> bool {
        project_name == PROJECT && build_entry_id == "src"
    }

    fn resolve_unit(&self, path: &Path) -> Option<SourceUnit> {
        let package_dir = parent_dir(path)?;
        let relative = package_dir.strip_prefix(&self.root).ok()?;
        let package: Vec<&str> = relative
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        Some(SourceUnit::new(path, Some(PROJECT.to_string()), package.join(".")))
    }

    fn unit_exists(&self, unit: &SourceUnit) -> bool {
        self.known_units.lock().unwrap().contains(&unit.path)
    }

    fn register_unit(&self, unit: &SourceUnit) -> RefractResult<SourceUnit> {
        self.record(format!("register {}", unit.file_name().unwrap_or_default()));
        self.known_units.lock().unwrap().insert(unit.path.clone());
        Ok(unit.clone())
    }

    fn type_exists(&self, _unit: &SourceUnit, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    fn refresh_package(&self, location: &LogicalLocation) -> RefractResult<()> {
        self.record(format!("refresh {}", location.dotted_name));
        Ok(())
    }

    fn package_exists(&self, location: &LogicalLocation) -> bool {
        self.packages.contains(&location.dotted_name)
    }

    fn is_on_build_path(&self, unit: &SourceUnit) -> bool {
        !self.detached.contains(&unit.path)
    }

    fn become_working_copy(&self, unit: &SourceUnit) -> RefractResult<()> {
        self.record(format!("promote {}", unit.file_name().unwrap_or_default()));
        Ok(())
    }

    fn discard_working_copy(&self, unit: &SourceUnit) -> RefractResult<()> {
        self.record(format!("release {}", unit.file_name().unwrap_or_default()));
        Ok(())
    }
}

/// How `move_elements` fails, if at all
#[derive(Debug, Clone, Copy)]
pub enum MoveFailure {
    Error,
    Fatal,
}

/// Engine answering every request with a one-line edit
pub struct FakeEngine {
    journal: Arc<Mutex<Vec<String>>>,
    failing: HashSet<String>,
    fatal: HashSet<String>,
    move_failure: Option<MoveFailure>,
    cancel_after_call: Mutex<Option<ProgressHandle>>,
}

impl FakeEngine {
    pub fn new(journal: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            journal,
            failing: HashSet::new(),
            fatal: HashSet::new(),
            move_failure: None,
            cancel_after_call: Mutex::new(None),
        }
    }

    /// Fail with an error when renaming this element
    pub fn failing_on(mut self, element: &str) -> Self {
        self.failing.insert(element.to_string());
        self
    }

    /// Report a fatal precondition when renaming this element
    pub fn fatal_on(mut self, element: &str) -> Self {
        self.fatal.insert(element.to_string());
        self
    }

    /// Make every move fail the given way
    pub fn failing_move(mut self, failure: MoveFailure) -> Self {
        self.move_failure = Some(failure);
        self
    }

    /// Cancel the batch once the first engine call returns
    pub fn cancelling(self, progress: &ProgressHandle) -> Self {
        *self.cancel_after_call.lock().unwrap() = Some(progress.clone());
        self
    }

    fn record(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
        if let Some(progress) = self.cancel_after_call.lock().unwrap().take() {
            progress.cancel();
        }
    }
}

#[async_trait]
impl RefactoringEngine for FakeEngine {
    async fn rename_element(
        &self,
        target: &RefactorTarget,
        new_name: &str,
        options: RenameOptions,
    ) -> RefractResult<EngineOutcome> {
        let element = target.element_name().to_string();
        self.record(format!(
            "rename {element} -> {new_name} (subpackages: {})",
            options.rename_subpackages
        ));

        if self.failing.contains(&element) {
            return Err(RefractError::engine(format!("cannot rename {element}")));
        }
        if self.fatal.contains(&element) {
            return Ok(EngineOutcome {
                status: RefactoringStatus::with_message(Severity::Fatal, "name clash"),
                edit: Some(WorkspaceEdit::default()),
            });
        }

        let file = match target {
            RefactorTarget::Unit { unit, .. } => unit.path.clone(),
            RefactorTarget::Package { location } => location.directory().join("package-info.java"),
        };
        Ok(EngineOutcome::ok(text_edit(&file, new_name)))
    }

    async fn move_elements(
        &self,
        units: &[SourceUnit],
        destination: &LogicalLocation,
        update_references: bool,
    ) -> RefractResult<EngineOutcome> {
        let names: Vec<&str> = units.iter().filter_map(|u| u.file_name()).collect();
        self.record(format!(
            "move {} -> {} (references: {update_references})",
            names.join(","),
            destination.dotted_name
        ));

        match self.move_failure {
            Some(MoveFailure::Error) => {
                return Err(RefractError::engine("destination package is read-only"))
            }
            Some(MoveFailure::Fatal) => {
                return Ok(EngineOutcome {
                    status: RefactoringStatus::with_message(Severity::Fatal, "type clash"),
                    edit: Some(WorkspaceEdit::default()),
                })
            }
            None => {}
        }

        let mut edit = WorkspaceEdit::default();
        for unit in units {
            let declaration = text_edit(&unit.path, &format!("package {};", destination.dotted_name));
            edit.changes
                .get_or_insert_with(Default::default)
                .extend(declaration.changes.unwrap_or_default());
        }
        Ok(EngineOutcome::ok(edit))
    }
}
