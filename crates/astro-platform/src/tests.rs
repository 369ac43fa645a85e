#[cfg(test)]
mod tests {
    use crate::storage::{auto_detect_storage, MemoryStorage};
    use astro_core::ports::StoragePort;
    use astro_core::store::{ConversationStore, HISTORY_KEY};
    use astro_types::message::Message;
    use std::rc::Rc;

    // ─── MemoryStorage Tests ─────────────────────────────────

    #[test]
    fn test_memory_storage_backend_name() {
        assert_eq!(MemoryStorage::new().backend_name(), "memory");
    }

    #[test]
    fn test_memory_storage_get_missing() {
        let storage = MemoryStorage::new();
        assert!(storage.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_set_get_overwrite() {
        let storage = MemoryStorage::new();
        storage.set("key", "v1").unwrap();
        storage.set("key", "v2").unwrap();
        assert_eq!(storage.get("key").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_memory_storage_delete() {
        let storage = MemoryStorage::new();
        storage.set("key", "val").unwrap();
        storage.delete("key").unwrap();
        storage.delete("nonexistent").unwrap();
        assert!(storage.is_empty());
    }

    // ─── Store over MemoryStorage ────────────────────────────

    #[test]
    fn test_store_writes_single_record() {
        let storage = Rc::new(MemoryStorage::new());
        let store = ConversationStore::new(storage.clone());
        store.save("a", &[Message::user("x")]);
        store.save("b", &[Message::user("y")]);

        assert_eq!(storage.len(), 1);
        let raw = storage.get(HISTORY_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["a"][0]["sender"], "user");
        assert_eq!(parsed["b"][0]["text"], "y");
    }

    #[test]
    fn test_auto_detect_falls_back_to_memory() {
        let storage = auto_detect_storage();
        assert_eq!(storage.backend_name(), "memory");
    }
}
