//! Refactoring engine collaborator
//!
//! The engine rewrites declarations and references. It runs its own
//! precondition checks and reports them in a [`RefactoringStatus`] next to
//! the computed edit; anything below [`Severity::Fatal`] is advisory.

use async_trait::async_trait;
use lsp_types::WorkspaceEdit;
use refract_foundation::{LogicalLocation, RefactorTarget, RefractError, RefractResult, SourceUnit};
use tracing::warn;

/// Severity of a precondition check, ordered from harmless to blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    Ok,
    Info,
    Warning,
    Error,
    Fatal,
}

/// Outcome of the engine's precondition checks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefactoringStatus {
    pub severity: Severity,
    pub messages: Vec<String>,
}

impl RefactoringStatus {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn with_message(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            messages: vec![message.into()],
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity >= Severity::Fatal
    }
}

/// Edit computed by the engine plus its precondition status
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOutcome {
    pub status: RefactoringStatus,
    pub edit: Option<WorkspaceEdit>,
}

impl EngineOutcome {
    pub fn ok(edit: WorkspaceEdit) -> Self {
        Self {
            status: RefactoringStatus::ok(),
            edit: Some(edit),
        }
    }

    /// Edit of a non-fatal outcome
    ///
    /// Warnings and errors are logged and the edit is kept; a fatal status
    /// becomes [`RefractError::EngineComputation`].
    pub fn into_edit(self, operation: &str) -> RefractResult<Option<WorkspaceEdit>> {
        if self.status.is_fatal() {
            return Err(RefractError::engine(format!(
                "{operation}: {}",
                self.status.messages.join("; ")
            )));
        }

        if self.status.severity >= Severity::Warning {
            warn!(
                operation = %operation,
                severity = ?self.status.severity,
                messages = ?self.status.messages,
                "Refactoring preconditions reported problems"
            );
        }

        Ok(self.edit)
    }
}

/// Options for [`RefactoringEngine::rename_element`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameOptions {
    pub update_references: bool,
    /// Rename packages nested under a renamed package as well
    pub rename_subpackages: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            update_references: true,
            rename_subpackages: false,
        }
    }
}

/// Symbol rename and move capability
#[async_trait]
pub trait RefactoringEngine: Send + Sync {
    async fn rename_element(
        &self,
        target: &RefactorTarget,
        new_name: &str,
        options: RenameOptions,
    ) -> RefractResult<EngineOutcome>;

    async fn move_elements(
        &self,
        units: &[SourceUnit],
        destination: &LogicalLocation,
        update_references: bool,
    ) -> RefractResult<EngineOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_status_is_engine_failure() {
        let outcome = EngineOutcome {
            status: RefactoringStatus::with_message(Severity::Fatal, "type already exists"),
            edit: Some(WorkspaceEdit::default()),
        };
        let err = outcome.into_edit("rename Foo").unwrap_err();
        assert!(matches!(err, RefractError::EngineComputation { .. }));
        assert!(err.to_string().contains("type already exists"));
    }

    #[test]
    fn test_non_fatal_status_keeps_edit() {
        for severity in [Severity::Info, Severity::Warning, Severity::Error] {
            let outcome = EngineOutcome {
                status: RefactoringStatus::with_message(severity, "shadowing"),
                edit: Some(WorkspaceEdit::default()),
            };
            assert_eq!(
                outcome.into_edit("rename Foo").unwrap(),
                Some(WorkspaceEdit::default())
            );
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Error < Severity::Fatal);
        assert!(!RefactoringStatus::ok().is_fatal());
    }
}
