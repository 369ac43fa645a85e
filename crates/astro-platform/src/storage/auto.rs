//! Auto-detect the best available storage backend.
//!
//! Priority: localStorage → Memory (fallback)

use std::rc::Rc;
use astro_core::ports::StoragePort;
use super::MemoryStorage;

/// Open the best available storage backend.
/// Returns a trait object so callers are backend-agnostic.
#[cfg(target_arch = "wasm32")]
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    const PROBE_KEY: &str = "astro:probe";

    let probed = super::LocalStorage::open().and_then(|local| {
        // Safari private mode exposes localStorage but rejects every write
        local.set(PROBE_KEY, "1")?;
        local.delete(PROBE_KEY)?;
        Ok(local)
    });

    match probed {
        Ok(local) => {
            log::info!("Storage backend: localStorage");
            Rc::new(local)
        }
        Err(e) => {
            log::warn!("localStorage unavailable ({}), falling back to memory", e);
            Rc::new(MemoryStorage::new())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn auto_detect_storage() -> Rc<dyn StoragePort> {
    log::info!("Storage backend: memory");
    Rc::new(MemoryStorage::new())
}
