use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clock::{Clock, SystemClock};
use crate::error::SiteError;
use crate::index::{SiteIndexAction, mutate};
use crate::model::{ContentState, SiteIndex};
use crate::repository::SiteRepository;
use crate::store::Loaded;
use crate::warning::{INDEX_POSITION_ANCHOR_MISSING, Warning};

/// Attempts before a lost revision race is reported to the caller.
const MAX_ATTEMPTS: usize = 3;

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct IndexUpdateRequest {
    pub state: ContentState,
    pub action: SiteIndexAction,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct IndexUpdateOutcome {
    pub index: SiteIndex,
    /// `false` when the action resolved to the current state and nothing was written.
    pub changed: bool,
    pub warnings: Vec<Warning>,
}

/// Applies one [`SiteIndexAction`] to the stored index of a content state.
pub struct SiteIndexUpdatePipeline<R, C = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: SiteRepository> SiteIndexUpdatePipeline<R, SystemClock> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: SiteRepository, C: Clock> SiteIndexUpdatePipeline<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Reads, applies, stamps and writes. No-op actions never write.
    ///
    /// The write is conditional on the revision that was read; if another writer
    /// replaced the index in between, the action is re-applied to the fresh copy.
    pub fn run(&self, request: IndexUpdateRequest) -> Result<IndexUpdateOutcome, SiteError> {
        let IndexUpdateRequest { state, action } = request;
        self.repo.ensure_base()?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let Loaded {
                value: current,
                revision,
            } = self.repo.read_index_versioned(state)?;

            let change = mutate::apply(current, &action)?;
            let warnings = anchor_warnings(&action, change.missing_anchor.as_deref());

            if !change.changed {
                tracing::debug!(%state, action = action.name(), "index action is a no-op, skipping write");
                return Ok(IndexUpdateOutcome {
                    index: change.index,
                    changed: false,
                    warnings,
                });
            }

            let mut next = change.index;
            next.updated_at = self.clock.now();

            match self.repo.write_index_if(state, &next, &revision) {
                Ok(()) => {
                    tracing::debug!(%state, action = action.name(), pages = next.len(), "index updated");
                    return Ok(IndexUpdateOutcome {
                        index: next,
                        changed: true,
                        warnings,
                    });
                }
                Err(SiteError::Conflict { .. }) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(%state, attempt, "index changed during update, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn anchor_warnings(action: &SiteIndexAction, missing_anchor: Option<&str>) -> Vec<Warning> {
    let (Some(anchor), SiteIndexAction::EnsurePageListed { page, .. }) = (missing_anchor, action)
    else {
        return Vec::new();
    };
    tracing::warn!(
        code = INDEX_POSITION_ANCHOR_MISSING,
        anchor,
        page = %page.id,
        "position anchor not listed, appended instead"
    );
    vec![Warning::new(
        INDEX_POSITION_ANCHOR_MISSING,
        "action.position",
        json!({ "anchorId": anchor, "pageId": page.id, "fallback": "append" }),
    )]
}
