//! Foundation Layer - shared types for refract
//!
//! - Error type and error codes used by every crate
//! - Source roots, logical locations, compilation units and refactoring targets
//! - Path/URI helpers for file events
//! - Progress and cancellation tracking

pub mod error;
pub mod model;
pub mod paths;
pub mod progress;

// Re-export commonly used types for convenience
pub use error::{RefractError, RefractResult};
pub use model::*;
pub use progress::{ProgressHandle, WorkUnit};
