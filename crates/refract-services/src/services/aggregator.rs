//! Merging of partial workspace edits
//!
//! Each event of a batch yields its own edit. They are folded into one
//! result with [`merge_edits`]; the result reaches the client only when
//! [`has_changes`] holds.

use lsp_types::{DocumentChangeOperation, DocumentChanges, WorkspaceEdit};
use std::collections::HashMap;

/// Merge `next` into `accumulated`
///
/// Per-file text edit lists are concatenated and new files are added.
/// Document changes are appended in order. Without `union_resource_ops`,
/// resource operations (create, rename, delete) are dropped from both sides,
/// so the result does not depend on argument order. `next == None` returns
/// `accumulated` untouched.
pub fn merge_edits(
    accumulated: Option<WorkspaceEdit>,
    next: Option<WorkspaceEdit>,
    union_resource_ops: bool,
) -> Option<WorkspaceEdit> {
    let Some(next) = next else {
        return accumulated;
    };

    let mut root = accumulated.unwrap_or_default();
    append(&mut root, next, union_resource_ops);
    Some(root)
}

fn append(root: &mut WorkspaceEdit, child: WorkspaceEdit, union_resource_ops: bool) {
    if let Some(changes) = child.changes.filter(|changes| !changes.is_empty()) {
        let target = root.changes.get_or_insert_with(HashMap::new);
        for (uri, edits) in changes {
            target.entry(uri).or_default().extend(edits);
        }
    }

    let existing = root.document_changes.take();
    root.document_changes = match child.document_changes {
        Some(next) => append_document_changes(existing, next, union_resource_ops),
        None if union_resource_ops => existing,
        None => existing.and_then(without_resource_ops),
    };

    if let Some(annotations) = child.change_annotations.filter(|a| !a.is_empty()) {
        root.change_annotations
            .get_or_insert_with(HashMap::new)
            .extend(annotations);
    }
}

fn append_document_changes(
    existing: Option<DocumentChanges>,
    next: DocumentChanges,
    union_resource_ops: bool,
) -> Option<DocumentChanges> {
    match (existing, next) {
        (None, DocumentChanges::Edits(edits)) => Some(DocumentChanges::Edits(edits)),
        (Some(DocumentChanges::Edits(mut edits)), DocumentChanges::Edits(more)) => {
            edits.extend(more);
            Some(DocumentChanges::Edits(edits))
        }
        (existing, next) => {
            let operations = existing
                .map(into_operations)
                .unwrap_or_default()
                .into_iter()
                .chain(into_operations(next))
                .filter(|op| union_resource_ops || is_text_edit(op))
                .collect::<Vec<_>>();
            (!operations.is_empty()).then_some(DocumentChanges::Operations(operations))
        }
    }
}

/// Document changes with create/rename/delete operations removed
fn without_resource_ops(changes: DocumentChanges) -> Option<DocumentChanges> {
    match changes {
        DocumentChanges::Edits(edits) => Some(DocumentChanges::Edits(edits)),
        DocumentChanges::Operations(operations) => {
            let operations = operations
                .into_iter()
                .filter(is_text_edit)
                .collect::<Vec<_>>();
            (!operations.is_empty()).then_some(DocumentChanges::Operations(operations))
        }
    }
}

fn is_text_edit(op: &DocumentChangeOperation) -> bool {
    matches!(op, DocumentChangeOperation::Edit(_))
}

fn into_operations(changes: DocumentChanges) -> Vec<DocumentChangeOperation> {
    match changes {
        DocumentChanges::Edits(edits) => edits
            .into_iter()
            .map(DocumentChangeOperation::Edit)
            .collect(),
        DocumentChanges::Operations(operations) => operations,
    }
}

/// Whether the edit would change anything when applied
///
/// True iff some file has a non-empty edit list or some resource operation
/// is present.
pub fn has_changes(edit: &WorkspaceEdit) -> bool {
    let text_changes = edit
        .changes
        .as_ref()
        .is_some_and(|changes| changes.values().any(|edits| !edits.is_empty()));

    let document_changes = match &edit.document_changes {
        None => false,
        Some(DocumentChanges::Edits(edits)) => edits.iter().any(|e| !e.edits.is_empty()),
        Some(DocumentChanges::Operations(operations)) => operations.iter().any(|op| match op {
            DocumentChangeOperation::Op(_) => true,
            DocumentChangeOperation::Edit(e) => !e.edits.is_empty(),
        }),
    };

    text_changes || document_changes
}

/// Accumulates the edits of a batch
#[derive(Debug, Clone, Default)]
pub struct EditAggregator {
    root: Option<WorkspaceEdit>,
    union_resource_ops: bool,
}

impl EditAggregator {
    pub fn new(union_resource_ops: bool) -> Self {
        Self {
            root: None,
            union_resource_ops,
        }
    }

    pub fn push(&mut self, edit: Option<WorkspaceEdit>) {
        self.root = merge_edits(self.root.take(), edit, self.union_resource_ops);
    }

    pub fn has_changes(&self) -> bool {
        self.root.as_ref().is_some_and(has_changes)
    }

    /// Merged edit, or `None` when nothing would change
    pub fn finish(self) -> Option<WorkspaceEdit> {
        self.root.filter(has_changes)
    }
}
