//! Deferred code action proposals
//!
//! Computing the edit of every proposed code action up front is expensive, so
//! `textDocument/codeAction` answers with titles only and keeps the proposals
//! here. A later `codeAction/resolve` finds them again through the
//! `(request id, proposal index)` pair carried in the action's `data` field.

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::BoxFuture;
use lsp_types::WorkspaceEdit;
use refract_config::ActionCacheConfig;
use refract_foundation::RefractResult;
use serde_json::{json, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// `data` key holding the code action request id
pub const DATA_FIELD_REQUEST_ID: &str = "rid";
/// `data` key holding the proposal index within the request
pub const DATA_FIELD_PROPOSAL_ID: &str = "pid";

/// Payload stored in a code action's `data` field
pub fn resolve_data(request_id: u64, proposal_id: usize) -> Value {
    json!({
        DATA_FIELD_REQUEST_ID: request_id.to_string(),
        DATA_FIELD_PROPOSAL_ID: proposal_id.to_string(),
    })
}

/// A code action whose edit is computed on demand
#[async_trait]
pub trait DeferredActionProposal: Send + Sync {
    fn title(&self) -> &str;

    /// Compute the edit; called again on every resolve
    async fn compute_edit(&self) -> RefractResult<Option<WorkspaceEdit>>;
}

type EditFn = dyn Fn() -> BoxFuture<'static, RefractResult<Option<WorkspaceEdit>>> + Send + Sync;

/// Proposal backed by a closure
pub struct LazyProposal {
    title: String,
    compute: Box<EditFn>,
}

impl LazyProposal {
    pub fn new<F>(title: impl Into<String>, compute: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, RefractResult<Option<WorkspaceEdit>>> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            compute: Box::new(compute),
        }
    }
}

impl fmt::Debug for LazyProposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyProposal")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DeferredActionProposal for LazyProposal {
    fn title(&self) -> &str {
        &self.title
    }

    async fn compute_edit(&self) -> RefractResult<Option<WorkspaceEdit>> {
        (self.compute)().await
    }
}

/// Proposals of one code action request, in the order they were offered
pub type ProposalList = Arc<[Arc<dyn DeferredActionProposal>]>;

struct CacheEntry {
    proposals: ProposalList,
    inserted_at: Instant,
}

/// Bounded map from code action request id to its proposals
///
/// Request ids are allocated from a counter starting at 1. When the cache
/// grows past its capacity the oldest requests (smallest ids) are evicted;
/// resolving an evicted request fails like resolving an unknown one.
pub struct ActionProposalCache {
    entries: DashMap<u64, CacheEntry>,
    next_id: AtomicU64,
    capacity: usize,
    ttl: Option<Duration>,
}

impl ActionProposalCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            next_id: AtomicU64::new(1),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &ActionCacheConfig) -> Self {
        Self::new(config.cache_capacity, config.ttl())
    }

    /// Allocate a fresh request id
    pub fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Store proposals under an explicit request id, replacing any previous entry
    pub fn put(&self, request_id: u64, proposals: Vec<Arc<dyn DeferredActionProposal>>) {
        // Keep allocated ids ahead of explicitly chosen ones
        self.next_id
            .fetch_max(request_id.saturating_add(1), Ordering::Relaxed);

        trace!(request_id, count = proposals.len(), "Caching code action proposals");
        self.entries.insert(
            request_id,
            CacheEntry {
                proposals: proposals.into(),
                inserted_at: Instant::now(),
            },
        );
        self.evict_over_capacity();
    }

    /// Store proposals under a newly allocated request id
    pub fn store(&self, proposals: Vec<Arc<dyn DeferredActionProposal>>) -> u64 {
        let request_id = self.next_request_id();
        self.put(request_id, proposals);
        request_id
    }

    /// Proposals for a request, or `None` if unknown, evicted or expired
    pub fn get(&self, request_id: u64) -> Option<ProposalList> {
        let expired = self
            .entries
            .remove_if(&request_id, |_, entry| self.is_expired(entry))
            .is_some();
        if expired {
            debug!(request_id, "Code action proposals expired");
            return None;
        }

        self.entries
            .get(&request_id)
            .map(|entry| entry.proposals.clone())
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() > ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn evict_over_capacity(&self) {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }

        let mut ids: Vec<u64> = self.entries.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        for id in ids.into_iter().take(excess) {
            self.entries.remove(&id);
            debug!(request_id = id, "Evicted code action proposals");
        }
    }
}

impl Default for ActionProposalCache {
    fn default() -> Self {
        Self::from_config(&ActionCacheConfig::default())
    }
}
