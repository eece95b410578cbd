//! Local session cache.
//!
//! Remembers the last-active conversation and a snapshot of the
//! conversation list so a reload can pick up where the user left off and
//! the drawer still shows something when the list endpoint is down.
//!
//! Both entries are advisory. The snapshot is read once by [`SessionStore::load`]
//! and written through on every change; storage failures are logged and
//! otherwise ignored.

use std::cell::RefCell;
use std::rc::Rc;

use assistant_types::conversation::{ConversationId, ConversationSummary};

use crate::ports::StoragePort;

pub const LAST_ACTIVE_KEY: &str = "assistant:last_session_id";
pub const SUMMARIES_KEY: &str = "assistant:conversations";

#[derive(Debug, Default, Clone)]
struct Snapshot {
    last_active: Option<ConversationId>,
    summaries: Vec<ConversationSummary>,
}

pub struct SessionStore {
    storage: Rc<dyn StoragePort>,
    snapshot: RefCell<Snapshot>,
}

impl SessionStore {
    /// Read both entries from `storage`. Missing or unreadable entries start empty.
    pub async fn load(storage: Rc<dyn StoragePort>) -> Self {
        let last_active = match storage.get(LAST_ACTIVE_KEY).await {
            Ok(Some(bytes)) => String::from_utf8(bytes)
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(ConversationId::from),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Session store: cannot read last-active id: {}", e);
                None
            }
        };

        let summaries = match storage.get(SUMMARIES_KEY).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<ConversationSummary>>(&bytes) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("Session store: discarding corrupt summary cache: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Session store: cannot read summary cache: {}", e);
                Vec::new()
            }
        };

        log::debug!(
            "Session store loaded from {} ({} cached conversations)",
            storage.backend_name(),
            summaries.len()
        );

        Self {
            storage,
            snapshot: RefCell::new(Snapshot {
                last_active,
                summaries,
            }),
        }
    }

    pub fn last_active_id(&self) -> Option<ConversationId> {
        self.snapshot.borrow().last_active.clone()
    }

    pub async fn set_last_active_id(&self, id: &ConversationId) {
        self.snapshot.borrow_mut().last_active = Some(id.clone());
        self.save(LAST_ACTIVE_KEY, Some(id.as_str().as_bytes().to_vec()))
            .await;
    }

    pub async fn clear_last_active_id(&self) {
        self.snapshot.borrow_mut().last_active = None;
        self.save(LAST_ACTIVE_KEY, None).await;
    }

    pub async fn cache_summaries(&self, list: &[ConversationSummary]) {
        self.snapshot.borrow_mut().summaries = list.to_vec();
        match serde_json::to_vec(list) {
            Ok(json) => self.save(SUMMARIES_KEY, Some(json)).await,
            Err(e) => log::warn!("Session store: cannot serialize summaries: {}", e),
        }
    }

    /// Cached conversation list; empty when nothing was cached.
    /// Untitled entries carry the placeholder title.
    pub fn cached_summaries(&self) -> Vec<ConversationSummary> {
        self.snapshot.borrow().summaries.clone()
    }

    pub async fn clear_cached_summaries(&self) {
        self.snapshot.borrow_mut().summaries.clear();
        self.save(SUMMARIES_KEY, None).await;
    }

    async fn save(&self, key: &str, value: Option<Vec<u8>>) {
        let result = match value {
            Some(bytes) => self.storage.set(key, &bytes).await,
            None => self.storage.delete(key).await,
        };
        if let Err(e) = result {
            log::warn!("Session store: write of {} failed: {}", key, e);
        }
    }
}
