//! Draft persistence: saving in-progress site maps to a backing store.
//!
//! The editor autosaves aggressively, so multiple save requests for the same
//! draft can be in flight at once. `DraftSync` tags each request with a
//! monotonically increasing id and only the newest response is allowed to
//! settle; responses for superseded requests (successes and failures alike)
//! are discarded so a slow stale save can never clobber newer local state.

use crate::model::{DraftId, EditStep};
use crate::partition::SiteMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// One saved (or in-progress) planting-site design.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftSite {
    pub id: Option<DraftId>,
    pub name: String,
    pub site: SiteMap,
    pub step: EditStep,
    pub revision: u64,
}

impl DraftSite {
    pub fn new(name: impl Into<String>) -> Self {
        DraftSite {
            id: None,
            name: name.into(),
            site: SiteMap::new(),
            step: EditStep::Boundary,
            revision: 0,
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("store unreachable: {0}")]
    Network(String),
    #[error("draft rejected: {0}")]
    Validation(String),
    #[error("no draft with id {0}")]
    NotFound(DraftId),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Backing store for drafts. Implementations are shared across tasks.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn create(&self, draft: &DraftSite) -> Result<DraftId, PersistenceError>;
    async fn read(&self, id: DraftId) -> Result<DraftSite, PersistenceError>;
    async fn update(&self, draft: &DraftSite) -> Result<(), PersistenceError>;
    async fn delete(&self, id: DraftId) -> Result<(), PersistenceError>;
}

#[derive(Default)]
struct MemoryInner {
    next: DraftId,
    drafts: HashMap<DraftId, serde_json::Value>,
}

/// In-memory store. Drafts round-trip through JSON so reads hand back
/// independent copies, the same as a remote store would.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn create(&self, draft: &DraftSite) -> Result<DraftId, PersistenceError> {
        let mut inner = self.inner.lock().await;
        inner.next += 1;
        let id = inner.next;
        let mut stored = draft.clone();
        stored.id = Some(id);
        let value = serde_json::to_value(&stored)?;
        inner.drafts.insert(id, value);
        Ok(id)
    }

    async fn read(&self, id: DraftId) -> Result<DraftSite, PersistenceError> {
        let inner = self.inner.lock().await;
        let value = inner
            .drafts
            .get(&id)
            .ok_or(PersistenceError::NotFound(id))?;
        Ok(serde_json::from_value(value.clone())?)
    }

    async fn update(&self, draft: &DraftSite) -> Result<(), PersistenceError> {
        let id = draft
            .id
            .ok_or_else(|| PersistenceError::Validation("draft has no id".into()))?;
        let mut inner = self.inner.lock().await;
        if !inner.drafts.contains_key(&id) {
            return Err(PersistenceError::NotFound(id));
        }
        let value = serde_json::to_value(draft)?;
        inner.drafts.insert(id, value);
        Ok(())
    }

    async fn delete(&self, id: DraftId) -> Result<(), PersistenceError> {
        let mut inner = self.inner.lock().await;
        inner
            .drafts
            .remove(&id)
            .map(|_| ())
            .ok_or(PersistenceError::NotFound(id))
    }
}

/// Outcome of settling one save response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The response was for the newest request and took effect.
    Saved,
    /// A newer request was issued meanwhile; this response was discarded.
    Superseded,
}

/// Last-writer-wins coordinator for concurrent saves of one draft.
pub struct DraftSync {
    store: Arc<dyn DraftStore>,
    seq: u64,
    inflight: u64,
}

impl DraftSync {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        DraftSync {
            store,
            seq: 0,
            inflight: 0,
        }
    }

    /// Issue a request id. Issuing a new one supersedes every earlier request.
    pub fn begin_save(&mut self) -> u64 {
        self.seq += 1;
        self.inflight = self.seq;
        self.seq
    }

    /// Settle a response. Staleness is checked before the result is even
    /// looked at, so errors from superseded requests are dropped too.
    pub fn finish_save(
        &mut self,
        request: u64,
        result: Result<(), PersistenceError>,
    ) -> Result<SaveOutcome, PersistenceError> {
        if request != self.inflight {
            debug!(request, newest = self.inflight, "discarding stale save response");
            return Ok(SaveOutcome::Superseded);
        }
        result?;
        Ok(SaveOutcome::Saved)
    }

    /// Persist the draft, creating it on first save. Bumps the revision on
    /// success; a superseded or failed save leaves the local draft untouched.
    pub async fn save(&mut self, draft: &mut DraftSite) -> Result<SaveOutcome, PersistenceError> {
        let request = self.begin_save();
        let result = match draft.id {
            None => match self.store.create(draft).await {
                Ok(id) => {
                    draft.id = Some(id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
            Some(_) => self.store.update(draft).await,
        };
        let outcome = self.finish_save(request, result)?;
        if outcome == SaveOutcome::Saved {
            draft.revision += 1;
            debug!(id = ?draft.id, revision = draft.revision, "draft saved");
        }
        Ok(outcome)
    }

    pub async fn load(&self, id: DraftId) -> Result<DraftSite, PersistenceError> {
        self.store.read(id).await
    }

    pub async fn delete(&self, id: DraftId) -> Result<(), PersistenceError> {
        self.store.delete(id).await
    }
}
