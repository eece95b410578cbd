//! Browser `localStorage` backend.
//!
//! Survives page reloads. localStorage only holds strings, so values must
//! be UTF-8; everything the assistant stores is JSON or a bare id.

use async_trait::async_trait;
use web_sys::Storage;

use assistant_core::ports::StoragePort;
use assistant_types::{AssistantError, Result};

pub struct LocalStorage {
    storage: Storage,
}

fn js_err(e: wasm_bindgen::JsValue) -> AssistantError {
    AssistantError::Storage(format!("{:?}", e))
}

impl LocalStorage {
    /// Open `window.localStorage`. Fails when there is no window or the
    /// browser blocks storage (private mode, disabled cookies).
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| AssistantError::Storage("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| AssistantError::Storage("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }
}

#[async_trait(?Send)]
impl StoragePort for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .storage
            .get_item(key)
            .map_err(js_err)?
            .map(String::into_bytes))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let text = std::str::from_utf8(value)
            .map_err(|e| AssistantError::Storage(format!("value for {} is not UTF-8: {}", key, e)))?;
        self.storage.set_item(key, text).map_err(js_err)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_err)
    }

    fn backend_name(&self) -> &str {
        "localStorage"
    }
}
