//! `window.localStorage` backend.
//! Persistent across page reloads; synchronous, string values only.
//! Writes fail with a quota error once the origin's allowance is used up.

use web_sys::Storage;
use astro_core::ports::StoragePort;
use astro_types::{ChatError, Result};
use crate::js::describe;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open `window.localStorage`, failing when the browser denies access.
    pub fn open() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| ChatError::Storage("No window object".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ChatError::Storage(describe(&e)))?
            .ok_or_else(|| ChatError::Storage("localStorage not available".to_string()))?;

        Ok(Self { storage })
    }
}

impl StoragePort for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| ChatError::Storage(describe(&e)))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| ChatError::Storage(describe(&e)))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| ChatError::Storage(describe(&e)))
    }

    fn backend_name(&self) -> &str {
        "localStorage"
    }
}
