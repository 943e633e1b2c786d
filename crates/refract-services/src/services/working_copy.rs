//! Scoped promotion of units to editable working copies
//!
//! The engine refuses to compute edits for units outside the build
//! configuration unless they are backed by an in-memory working copy. The
//! guard promotes such units for the duration of a computation and releases
//! every promoted unit when it goes out of scope, on success, on error and
//! on unwinding alike.

use super::project::ProjectModel;
use refract_foundation::{RefractError, RefractResult, SourceUnit};
use std::sync::Arc;
use tracing::{debug, error};

pub struct WorkingCopyGuard {
    model: Arc<dyn ProjectModel>,
    promoted: Vec<SourceUnit>,
}

impl WorkingCopyGuard {
    /// Promote every unit, or none
    ///
    /// If a promotion fails, the units promoted so far are released before
    /// the error is returned.
    pub fn acquire(model: Arc<dyn ProjectModel>, units: Vec<SourceUnit>) -> RefractResult<Self> {
        let mut guard = Self {
            model,
            promoted: Vec::with_capacity(units.len()),
        };

        for unit in units {
            guard.model.become_working_copy(&unit).map_err(|e| match e {
                RefractError::TemporaryStatePromotion { .. } => e,
                other => RefractError::temporary_state(&unit.path, other.to_string()),
            })?;
            debug!(path = %unit.path.display(), "Promoted unit to working copy");
            guard.promoted.push(unit);
        }

        Ok(guard)
    }

    pub fn promoted(&self) -> &[SourceUnit] {
        &self.promoted
    }
}

impl Drop for WorkingCopyGuard {
    fn drop(&mut self) {
        for unit in self.promoted.drain(..) {
            match self.model.discard_working_copy(&unit) {
                Ok(()) => debug!(path = %unit.path.display(), "Released working copy"),
                Err(e) => error!(
                    path = %unit.path.display(),
                    error = %e,
                    code = refract_foundation::error::error_codes::E2005_TEMPORARY_STATE,
                    "Failed to release working copy"
                ),
            }
        }
    }
}
