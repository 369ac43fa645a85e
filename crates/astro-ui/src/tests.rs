#[cfg(test)]
mod tests {
    use crate::markup::{self, Segment};
    use crate::panels::history::row_title;
    use crate::state::*;
    use astro_core::ports::StoragePort;
    use astro_core::store::ConversationStore;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use astro_types::event::ChatEvent;
    use astro_types::history::{HistoryEntry, HistoryListing};
    use astro_types::message::{Message, Sender};

    #[derive(Default)]
    struct MapStorage(RefCell<HashMap<String, String>>);

    impl StoragePort for MapStorage {
        fn get(&self, key: &str) -> astro_types::Result<Option<String>> {
            Ok(self.0.borrow().get(key).cloned())
        }
        fn set(&self, key: &str, value: &str) -> astro_types::Result<()> {
            self.0.borrow_mut().insert(key.to_string(), value.to_string());
            Ok(())
        }
        fn delete(&self, key: &str) -> astro_types::Result<()> {
            self.0.borrow_mut().remove(key);
            Ok(())
        }
        fn backend_name(&self) -> &str {
            "map"
        }
    }

    fn entry(channel: &str, text: &str, ts: &str) -> HistoryEntry {
        let mut message = Message::user(text);
        message.timestamp = Some(ts.to_string());
        HistoryEntry::from_messages(channel, vec![message])
    }

    // ─── UiState Tests ───────────────────────────────────────

    #[test]
    fn test_ui_state_initial() {
        let state = UiState::new();
        assert!(state.messages.is_empty());
        assert!(state.channel.is_empty());
        assert!(!state.is_busy());
        assert!(!state.can_send());
        assert!(state.history.is_empty());
        assert!(state.show_history);
        assert!(!state.show_settings);
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_turn_lifecycle() {
        let mut state = UiState::new();
        state.show_channel("chat_1", Vec::new());

        state.process_events(vec![
            ChatEvent::TurnStart { turn_id: 1 },
            ChatEvent::MessageAppended { message: Message::user("Hello") },
        ]);
        assert!(state.is_busy());
        assert!(!state.streaming);
        assert_eq!(state.status_text, "Thinking...");

        state.process_events(vec![
            ChatEvent::MessageAppended { message: Message::assistant("") },
            ChatEvent::AssistantDelta { text: "Hi".to_string() },
            ChatEvent::AssistantDelta { text: "Hi there!".to_string() },
        ]);
        assert!(state.streaming);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].text, "Hi there!");

        state.process_events(vec![ChatEvent::TurnEnd { turn_id: 1 }]);
        assert!(!state.is_busy());
        assert_eq!(state.status_text, "Ready");
    }

    #[test]
    fn test_ui_state_delta_without_placeholder() {
        let mut state = UiState::new();
        state.process_events(vec![
            ChatEvent::MessageAppended { message: Message::user("q") },
            ChatEvent::AssistantDelta { text: "a".to_string() },
        ]);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].sender, Sender::Assistant);
    }

    #[test]
    fn test_ui_state_error_survives_turn_end() {
        let mut state = UiState::new();
        state.process_events(vec![
            ChatEvent::TurnStart { turn_id: 1 },
            ChatEvent::Error { message: "Server error 502: boom".to_string() },
            ChatEvent::TurnEnd { turn_id: 1 },
        ]);
        assert!(!state.is_busy());
        assert!(state.status_text.starts_with("Error"));
    }

    #[test]
    fn test_ui_state_channel_resolved_renames_entry() {
        let mut state = UiState::new();
        state.show_channel("chat_local", Vec::new());
        state.set_history(HistoryListing {
            entries: vec![entry("chat_local", "hi", "2026-01-01T00:00:00Z")],
            error: None,
        });

        state.process_events(vec![ChatEvent::ChannelResolved {
            previous: "chat_local".to_string(),
            channel: "chat_server".to_string(),
        }]);
        assert_eq!(state.channel, "chat_server");
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].chat_channel, "chat_server");
    }

    #[test]
    fn test_ui_state_metadata_sets_bot_name() {
        let mut state = UiState::new();
        state.process_events(vec![ChatEvent::Metadata {
            bot_name: Some("Astro".to_string()),
            admin_name: None,
        }]);
        assert_eq!(state.bot_name.as_deref(), Some("Astro"));
    }

    #[test]
    fn test_ui_state_upsert_keeps_one_entry_per_channel() {
        let mut state = UiState::new();
        state.upsert_history(entry("a", "one", "2026-01-01T00:00:00Z"));
        state.upsert_history(entry("b", "two", "2026-02-01T00:00:00Z"));
        state.upsert_history(entry("a", "three", "2026-03-01T00:00:00Z"));

        let order: Vec<&str> = state.history.iter().map(|e| e.chat_channel.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(state.history[0].last_message, "three");
    }

    #[test]
    fn test_ui_state_remove_active_channel_clears_view() {
        let mut state = UiState::new();
        state.show_channel("a", vec![Message::user("x")]);
        state.upsert_history(entry("a", "x", "2026-01-01T00:00:00Z"));
        state.confirm_delete = Some("a".to_string());

        state.remove_history("a");
        assert!(state.history.is_empty());
        assert!(state.channel.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.confirm_delete.is_none());
    }

    #[test]
    fn test_ui_state_remove_other_channel_keeps_view() {
        let mut state = UiState::new();
        state.show_channel("a", vec![Message::user("x")]);
        state.upsert_history(entry("b", "y", "2026-01-01T00:00:00Z"));
        state.remove_history("b");
        assert_eq!(state.channel, "a");
        assert_eq!(state.messages.len(), 1);
    }

    #[test]
    fn test_ui_state_set_history_with_error() {
        let mut state = UiState::new();
        state.history_loading = true;
        state.set_history(HistoryListing {
            entries: vec![entry("a", "x", "2026-01-01T00:00:00Z")],
            error: Some("Network error: offline".to_string()),
        });
        assert!(!state.history_loading);
        assert_eq!(state.history.len(), 1);
        assert!(state.history_error.is_some());
    }

    #[test]
    fn test_ui_state_clear_history() {
        let mut state = UiState::new();
        state.show_channel("a", vec![Message::user("x")]);
        state.upsert_history(entry("a", "x", "2026-01-01T00:00:00Z"));
        state.confirm_delete_all = true;
        state.clear_history();
        assert!(state.history.is_empty());
        assert!(!state.confirm_delete_all);
        assert!(state.channel.is_empty());
    }

    #[test]
    fn test_ui_state_can_send() {
        let mut state = UiState::new();
        state.input_text = "hello".to_string();
        assert!(!state.can_send());
        state.show_channel("a", Vec::new());
        assert!(state.can_send());
        state.busy = true;
        assert!(!state.can_send());
    }

    #[test]
    fn test_ui_state_delete_waits_for_reply() {
        let mut state = UiState::new();
        state.show_channel("a", Vec::new());
        assert!(state.can_delete());

        state.process_events(vec![ChatEvent::TurnStart { turn_id: 1 }]);
        assert!(!state.can_delete());

        state.process_events(vec![ChatEvent::TurnEnd { turn_id: 1 }]);
        assert!(state.can_delete());
    }

    #[test]
    fn test_apply_events_syncs_entry_under_resolved_channel() {
        let store = ConversationStore::new(Rc::new(MapStorage::default()));
        let mut state = UiState::new();
        state.show_channel("chat_a", Vec::new());
        state.set_history(HistoryListing {
            entries: vec![entry("chat_a", "Hello", "2026-01-01T00:00:00Z")],
            error: None,
        });

        // The pane has already moved the conversation to the server's id
        let mut question = Message::user("Hello");
        question.timestamp = Some("2026-01-01T00:00:00Z".to_string());
        let mut answer = Message::assistant("Hi there!");
        answer.timestamp = Some("2026-01-01T00:00:05Z".to_string());
        store.save("chat_b", &[question, answer]);

        state.apply_events(
            vec![
                ChatEvent::ChannelResolved {
                    previous: "chat_a".to_string(),
                    channel: "chat_b".to_string(),
                },
                ChatEvent::TurnEnd { turn_id: 1 },
            ],
            &store,
        );

        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].chat_channel, "chat_b");
        assert_eq!(state.history[0].total_messages, 2);
        assert_eq!(state.history[0].last_message, "Hi there!");
    }

    #[test]
    fn test_apply_events_without_turn_end_leaves_history() {
        let store = ConversationStore::new(Rc::new(MapStorage::default()));
        let mut state = UiState::new();
        state.show_channel("chat_a", Vec::new());
        state.apply_events(vec![ChatEvent::TurnStart { turn_id: 1 }], &store);
        assert!(state.history.is_empty());
    }

    // ─── Sidebar Tests ───────────────────────────────────────

    #[test]
    fn test_row_title_truncates() {
        let long = "x".repeat(60);
        let title = row_title(&entry("a", &long, "2026-01-01T00:00:00Z"));
        assert_eq!(title.chars().count(), 41);
        assert!(title.ends_with('…'));
    }

    #[test]
    fn test_row_title_falls_back_to_channel() {
        let empty = HistoryEntry::from_messages("chat_42", Vec::new());
        assert_eq!(row_title(&empty), "chat_42");
    }

    // ─── Link Detection Tests ────────────────────────────────

    #[test]
    fn test_segments_plain_text() {
        assert_eq!(
            markup::segments("Hi there!"),
            vec![Segment::Text("Hi there!".to_string())]
        );
        assert!(!markup::has_links("Hi there!"));
    }

    #[test]
    fn test_segments_bare_domain() {
        let segs = markup::segments("Visit halfskirmish.com for more.");
        assert_eq!(
            segs,
            vec![
                Segment::Text("Visit ".to_string()),
                Segment::Link {
                    label: "halfskirmish.com".to_string(),
                    url: "https://halfskirmish.com".to_string(),
                },
                Segment::Text(" for more.".to_string()),
            ]
        );
    }

    #[test]
    fn test_segments_keeps_scheme_and_path() {
        let segs = markup::segments("See https://docs.example.io/guide/start.");
        assert_eq!(
            segs[1],
            Segment::Link {
                label: "https://docs.example.io/guide/start".to_string(),
                url: "https://docs.example.io/guide/start".to_string(),
            }
        );
        assert_eq!(segs[2], Segment::Text(".".to_string()));
    }

    #[test]
    fn test_segments_ignore_unknown_suffix() {
        assert!(!markup::has_links("Written in Node.js and main.rs"));
    }

    #[test]
    fn test_segments_concatenate_to_input() {
        let text = "a.com, b.dev and c.ai!";
        let joined: String = markup::segments(text)
            .into_iter()
            .map(|s| match s {
                Segment::Text(t) => t,
                Segment::Link { label, .. } => label,
            })
            .collect();
        assert_eq!(joined, text);
    }
}
