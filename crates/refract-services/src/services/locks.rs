//! Project-level locking to serialize structural refactorings
//!
//! The refactoring engine is not safe for concurrent structural mutation of
//! the same project, so every engine call, unit registration and working-copy
//! promotion runs while holding the lock of each project it touches.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::trace;

/// Manages one mutex per project name
#[derive(Clone, Default)]
pub struct ProjectLocks {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for a project
    async fn get_lock(&self, project: &str) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(project) {
            return lock.clone();
        }

        let mut locks = self.locks.write().await;
        locks
            .entry(project.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Acquire exclusive access to a project
    pub async fn lock(&self, project: &str) -> OwnedMutexGuard<()> {
        let guard = self.get_lock(project).await.lock_owned().await;
        trace!(project = %project, "Project lock acquired");
        guard
    }

    /// Acquire several projects at once
    ///
    /// Locks are taken in sorted name order so two batches touching the same
    /// projects cannot deadlock.
    pub async fn lock_all<I, S>(&self, projects: I) -> Vec<OwnedMutexGuard<()>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ordered: BTreeSet<String> = projects.into_iter().map(Into::into).collect();
        let mut guards = Vec::with_capacity(ordered.len());
        for project in &ordered {
            guards.push(self.lock(project).await);
        }
        guards
    }

    /// Check if a project is currently locked
    pub async fn is_locked(&self, project: &str) -> bool {
        match self.locks.read().await.get(project) {
            Some(lock) => lock.try_lock().is_err(),
            None => false,
        }
    }
}
