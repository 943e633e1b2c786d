//! Services turning file events and code action requests into workspace edits

pub mod action_cache;
pub mod aggregator;
pub mod classifier;
pub mod engine;
pub mod locks;
pub mod orchestrator;
pub mod project;
pub mod resolver;
pub mod source_roots;
pub mod working_copy;

pub use action_cache::{
    resolve_data, ActionProposalCache, DeferredActionProposal, LazyProposal, ProposalList,
};
pub use aggregator::{has_changes, merge_edits, EditAggregator};
pub use classifier::{primary_type_name, EventKind, FileSystemProbe, OsFileSystem, PathClassifier};
pub use engine::{EngineOutcome, RefactoringEngine, RefactoringStatus, RenameOptions, Severity};
pub use locks::ProjectLocks;
pub use orchestrator::{RenameEvent, RenameEventOrchestrator};
pub use project::ProjectModel;
pub use resolver::ActionResolver;
pub use source_roots::{BuildPathProvider, SourceRootIndex};
pub use working_copy::WorkingCopyGuard;
