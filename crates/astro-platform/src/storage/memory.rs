//! In-memory storage backend.
//! Used when `localStorage` is unavailable (private mode, sandboxed
//! iframes) and in tests. Not persistent across page reloads.

use std::cell::RefCell;
use std::collections::HashMap;
use astro_core::ports::StoragePort;
use astro_types::Result;

#[derive(Default)]
pub struct MemoryStorage {
    data: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
