//! Pick the storage backend.
//!
//! Priority for `Auto`: localStorage → Memory (fallback)

use std::rc::Rc;
use assistant_core::ports::StoragePort;
use assistant_types::config::StorageBackendType;
use super::{LocalStorage, MemoryStorage};

/// Open the best available backend. Never fails: without localStorage
/// the assistant still works, it just forgets on reload.
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    match LocalStorage::open() {
        Ok(storage) => {
            log::info!("Storage backend: localStorage");
            Rc::new(storage)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

/// Open the backend chosen in the settings.
pub fn open_storage(backend: StorageBackendType) -> Rc<dyn StoragePort> {
    match backend {
        StorageBackendType::Memory => {
            log::info!("Storage backend: memory");
            Rc::new(MemoryStorage::new())
        }
        StorageBackendType::Auto | StorageBackendType::LocalStorage => auto_detect_storage(),
    }
}
