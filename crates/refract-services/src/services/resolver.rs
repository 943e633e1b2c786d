//! `codeAction/resolve` handling
//!
//! Looks up the deferred proposal named by a code action's `data` field and
//! attaches its freshly computed edit.

use super::action_cache::{ActionProposalCache, DATA_FIELD_PROPOSAL_ID, DATA_FIELD_REQUEST_ID};
use super::aggregator::has_changes;
use lsp_types::{CodeAction, WorkspaceEdit};
use refract_foundation::{RefractError, RefractResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

pub struct ActionResolver {
    cache: Arc<ActionProposalCache>,
}

impl ActionResolver {
    pub fn new(cache: Arc<ActionProposalCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<ActionProposalCache> {
        &self.cache
    }

    /// Compute the edit of proposal `proposal_id` from request `request_id`
    ///
    /// Unknown requests and out-of-range proposals are rejected. A failing
    /// computation is logged and yields no edit, as does an edit that would
    /// change nothing.
    pub async fn resolve_edit(
        &self,
        request_id: u64,
        proposal_id: usize,
    ) -> RefractResult<Option<WorkspaceEdit>> {
        let proposals = self.cache.get(request_id).ok_or_else(|| {
            RefractError::invalid_target(request_id, proposal_id, "no cached code action request")
        })?;

        let proposal = proposals.get(proposal_id).ok_or_else(|| {
            RefractError::invalid_target(
                request_id,
                proposal_id,
                format!("request has {} proposals", proposals.len()),
            )
        })?;

        debug!(request_id, proposal_id, title = %proposal.title(), "Resolving code action");
        match proposal.compute_edit().await {
            Ok(edit) => Ok(edit.filter(has_changes)),
            Err(e) => {
                error!(
                    request_id,
                    proposal_id,
                    title = %proposal.title(),
                    error = %e,
                    code = e.code(),
                    "Failed to compute code action edit"
                );
                Ok(None)
            }
        }
    }

    /// Resolve a code action received from the client
    ///
    /// The `data` field is consumed; the edit is attached only when it
    /// changes something.
    pub async fn resolve(&self, mut action: CodeAction) -> RefractResult<CodeAction> {
        let (request_id, proposal_id) = parse_resolve_data(action.data.take())?;
        if let Some(edit) = self.resolve_edit(request_id, proposal_id).await? {
            action.edit = Some(edit);
        }
        Ok(action)
    }
}

fn parse_resolve_data(data: Option<Value>) -> RefractResult<(u64, usize)> {
    let data = data.unwrap_or(Value::Null);
    let request_id = id_field(&data, DATA_FIELD_REQUEST_ID);
    let proposal_id = id_field(&data, DATA_FIELD_PROPOSAL_ID);

    match (request_id, proposal_id) {
        (Some(rid), Some(pid)) => {
            let pid = usize::try_from(pid).map_err(|_| {
                RefractError::invalid_target(rid, 0, format!("proposal id {pid} out of range"))
            })?;
            Ok((rid, pid))
        }
        _ => Err(RefractError::invalid_target(
            request_id.unwrap_or(0),
            0,
            format!("malformed resolve data: {data}"),
        )),
    }
}

/// Id stored either as a decimal string or as a number
fn id_field(data: &Value, key: &str) -> Option<u64> {
    match data.get(key)? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
