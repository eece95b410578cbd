//! WASM-target tests for assistant-platform (Node.js runtime).
//!
//! Tests MemoryStorage, backend selection and the session store on top of
//! it under wasm32-unknown-unknown via `wasm-pack test --node`.
//!
//! localStorage and fetch need a browser and are exercised by the app.

use wasm_bindgen_test::*;

use assistant_core::ports::StoragePort;
use assistant_core::session_store::{SessionStore, LAST_ACTIVE_KEY};
use assistant_platform::storage::{open_storage, MemoryStorage};
use assistant_types::config::StorageBackendType;
use assistant_types::conversation::ConversationId;
use std::rc::Rc;

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
async fn memory_storage_get_missing() {
    let storage = MemoryStorage::new();
    assert!(storage.get("nonexistent").await.unwrap().is_none());
}

#[wasm_bindgen_test]
async fn memory_storage_overwrite() {
    let storage = MemoryStorage::new();
    storage.set("key", b"v1").await.unwrap();
    storage.set("key", b"v2").await.unwrap();
    assert_eq!(storage.get("key").await.unwrap(), Some(b"v2".to_vec()));
}

#[wasm_bindgen_test]
async fn memory_storage_delete_nonexistent() {
    let storage = MemoryStorage::new();
    storage.delete("nonexistent").await.unwrap();
    assert!(storage.is_empty());
}

// ─── Backend Selection Tests ─────────────────────────────

#[wasm_bindgen_test]
fn open_storage_memory_backend() {
    let storage = open_storage(StorageBackendType::Memory);
    assert_eq!(storage.backend_name(), "memory");
}

// ─── SessionStore on MemoryStorage ───────────────────────

#[wasm_bindgen_test]
async fn session_store_over_memory_storage() {
    let storage = Rc::new(MemoryStorage::new());
    let store = SessionStore::load(storage.clone()).await;
    store.set_last_active_id(&ConversationId::new("s1")).await;

    assert_eq!(storage.get(LAST_ACTIVE_KEY).await.unwrap(), Some(b"s1".to_vec()));

    let reloaded = SessionStore::load(storage).await;
    assert_eq!(reloaded.last_active_id(), Some(ConversationId::new("s1")));
}
