pub mod services;

// Re-export commonly used types at crate root for convenience
pub use services::{
    ActionProposalCache, ActionResolver, EditAggregator, EventKind, PathClassifier,
    RenameEventOrchestrator, SourceRootIndex,
};
