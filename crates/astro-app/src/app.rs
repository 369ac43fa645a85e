//! Main egui application. Composes the panels and drives the chat pane.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use astro_core::event_bus::EventBus;
use astro_core::pane::ChatPane;
use astro_core::ports::{HistoryPort, RelayPort, StoragePort};
use astro_core::reconcile::HistoryReconciler;
use astro_core::store::ConversationStore;
use astro_platform::history_client::HttpHistoryClient;
use astro_platform::relay_client::HttpRelayClient;
use astro_platform::storage::auto_detect_storage;
use astro_types::config::{ChatConfig, CONFIG_STORAGE_KEY};
use astro_types::history::HistoryListing;
use astro_types::message::Message;
use astro_ui::panels::history::HistoryAction;
use astro_ui::panels::settings::{SaveFeedback, SettingsAction};
use astro_ui::panels::{chat, history, settings};
use astro_ui::state::UiState;
use astro_ui::theme;

/// Results produced by background tasks, picked up on the next frame
#[derive(Default)]
struct Inbox {
    history: Option<HistoryListing>,
    greeting: Option<(String, String)>,
}

/// The main application state
pub struct AstroApp {
    ui_state: UiState,
    config: ChatConfig,
    event_bus: EventBus,
    storage: Rc<dyn StoragePort>,
    store: ConversationStore,
    pane: Rc<RefCell<ChatPane>>,
    relay: Rc<dyn RelayPort>,
    reconciler: HistoryReconciler,
    inbox: Rc<RefCell<Inbox>>,
    save_feedback: Option<SaveFeedback>,
    first_frame: bool,
}

impl AstroApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let storage = auto_detect_storage();
        let config = Self::restore_config(storage.as_ref());
        let store = ConversationStore::new(storage.clone());
        let event_bus = EventBus::new();
        let pane = ChatPane::new(config.clone(), store.clone(), event_bus.clone());

        let mut app = Self {
            ui_state: UiState::new(),
            relay: Rc::new(HttpRelayClient::new(config.relay_url.clone())),
            reconciler: Self::build_reconciler(&store, &config),
            config,
            event_bus,
            storage,
            store,
            pane: Rc::new(RefCell::new(pane)),
            inbox: Rc::new(RefCell::new(Inbox::default())),
            save_feedback: None,
            first_frame: true,
        };

        app.refresh_history(&cc.egui_ctx);
        app
    }

    fn build_reconciler(store: &ConversationStore, config: &ChatConfig) -> HistoryReconciler {
        let remote = HttpHistoryClient::from_config(config)
            .map(|client| Rc::new(client) as Rc<dyn HistoryPort>);
        HistoryReconciler::new(store.clone(), remote)
    }

    /// Restore config from storage, falling back to defaults
    fn restore_config(storage: &dyn StoragePort) -> ChatConfig {
        match storage.get(CONFIG_STORAGE_KEY) {
            Ok(Some(data)) => match serde_json::from_str::<ChatConfig>(&data) {
                Ok(config) => {
                    log::info!("Config restored from storage");
                    config
                }
                Err(e) => {
                    log::warn!("Stored config unreadable ({}), using defaults", e);
                    ChatConfig::default()
                }
            },
            Ok(None) => ChatConfig::default(),
            Err(e) => {
                log::warn!("Config not restored: {}", e);
                ChatConfig::default()
            }
        }
    }

    fn save_config(&mut self) {
        let result = serde_json::to_string(&self.config)
            .map_err(astro_types::ChatError::from)
            .and_then(|json| self.storage.set(CONFIG_STORAGE_KEY, &json));

        self.save_feedback = Some(match result {
            Ok(()) => {
                log::info!("Config saved to storage");
                SaveFeedback { message: "Saved".to_string(), success: true }
            }
            Err(e) => {
                log::error!("Config save failed: {}", e);
                SaveFeedback { message: format!("Save failed: {}", e), success: false }
            }
        });
    }

    /// Rebuild adapters after the settings changed
    fn apply_config(&mut self, ctx: &egui::Context) {
        self.relay = Rc::new(HttpRelayClient::new(self.config.relay_url.clone()));
        self.reconciler = Self::build_reconciler(&self.store, &self.config);
        match self.pane.try_borrow_mut() {
            Ok(mut pane) => pane.config = self.config.clone(),
            Err(_) => log::warn!("Settings apply to the next message once the current reply ends"),
        }
        self.refresh_history(ctx);
    }

    /// Fetch and merge the history listing in the background
    fn refresh_history(&mut self, ctx: &egui::Context) {
        self.ui_state.history_loading = true;
        let reconciler = self.reconciler.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let listing = reconciler.refresh().await;
            inbox.borrow_mut().history = Some(listing);
            ctx.request_repaint();
        });
    }

    /// Ask the history service for a greeting for an empty channel
    fn fetch_greeting(&self, channel: String, ctx: &egui::Context) {
        if !self.reconciler.has_remote() {
            return;
        }
        let reconciler = self.reconciler.clone();
        let user_id = self.config.user_id.clone();
        let inbox = self.inbox.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            if let Some(text) = reconciler.greeting(&channel, &user_id).await {
                inbox.borrow_mut().greeting = Some((channel, text));
                ctx.request_repaint();
            }
        });
    }

    /// Pick up results delivered by background tasks
    fn drain_inbox(&mut self) {
        let (listing, greeting) = {
            let mut inbox = self.inbox.borrow_mut();
            (inbox.history.take(), inbox.greeting.take())
        };

        if let Some(listing) = listing {
            self.ui_state.set_history(listing);
        }

        if let Some((channel, text)) = greeting {
            let Ok(mut pane) = self.pane.try_borrow_mut() else {
                return;
            };
            if pane.channel == channel && pane.messages.is_empty() {
                let greeting = Message::greeting(text, self.config.bot_name.clone());
                self.store.save(&channel, std::slice::from_ref(&greeting));
                pane.load_channel(&channel);
                self.ui_state.show_channel(&channel, pane.messages.clone());
            }
        }
    }

    fn handle_history_action(&mut self, action: HistoryAction, ctx: &egui::Context) {
        match action {
            HistoryAction::None => {}
            HistoryAction::Refresh => self.refresh_history(ctx),
            HistoryAction::NewChat => {
                let Ok(mut pane) = self.pane.try_borrow_mut() else {
                    self.ui_state.status_text = "Wait for the current reply to finish".to_string();
                    return;
                };
                let entry = pane.new_chat(&self.reconciler);
                self.ui_state.show_channel(&entry.chat_channel, pane.messages.clone());
                self.ui_state.upsert_history(entry);
            }
            HistoryAction::Select(channel) => {
                let Ok(mut pane) = self.pane.try_borrow_mut() else {
                    self.ui_state.status_text = "Wait for the current reply to finish".to_string();
                    return;
                };
                pane.load_channel(&channel);
                self.ui_state.show_channel(&channel, pane.messages.clone());
                if pane.messages.is_empty() {
                    drop(pane);
                    self.fetch_greeting(channel, ctx);
                }
            }
            HistoryAction::Delete(channel) => {
                let Ok(mut pane) = self.pane.try_borrow_mut() else {
                    self.ui_state.status_text = "Wait for the current reply to finish".to_string();
                    return;
                };
                if pane.channel == channel {
                    pane.reset();
                }
                drop(pane);
                self.ui_state.remove_history(&channel);

                let reconciler = self.reconciler.clone();
                let ctx = ctx.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    reconciler.delete_chat(&channel).await;
                    ctx.request_repaint();
                });
            }
            HistoryAction::DeleteAll => {
                let Ok(mut pane) = self.pane.try_borrow_mut() else {
                    self.ui_state.status_text = "Wait for the current reply to finish".to_string();
                    return;
                };
                if !self.reconciler.delete_all() {
                    self.ui_state.history_error = Some("Failed to delete all chats".to_string());
                    return;
                }
                pane.reset();
                drop(pane);
                self.ui_state.clear_history();
            }
        }
    }

    /// Dispatch a user message to the chat pane (async)
    fn dispatch_message(&self, text: String, ctx: &egui::Context) {
        let pane = self.pane.clone();
        let relay = self.relay.clone();
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let sent = {
                let mut pane = pane.borrow_mut();
                pane.submit(&text, relay.as_ref()).await
            };
            if !sent {
                log::warn!("Message not sent: a reply is in progress or no chat is selected");
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for AstroApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            self.first_frame = false;
        }

        // Drain events from the chat pane
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.apply_events(events, &self.store);
            ctx.request_repaint();
        }
        self.drain_inbox();

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.selectable_label(self.ui_state.show_history, "☰").clicked() {
                    self.ui_state.show_history = !self.ui_state.show_history;
                }
                ui.label(
                    RichText::new(&self.config.bot_name)
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_settings, "Settings")
                        .clicked()
                    {
                        self.ui_state.show_settings = !self.ui_state.show_settings;
                    }
                });
            });
        });

        // ── History sidebar ──────────────────────────────────
        if self.ui_state.show_history {
            let mut action = HistoryAction::None;
            SidePanel::left("history_panel")
                .min_width(240.0)
                .max_width(320.0)
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    action = history::history_panel(ui, &mut self.ui_state);
                });
            self.handle_history_action(action, ctx);
        }

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            let mut action = SettingsAction::None;
            SidePanel::right("settings_panel")
                .min_width(280.0)
                .max_width(350.0)
                .show(ctx, |ui| {
                    action = settings::settings_panel(
                        ui,
                        &mut self.config,
                        self.store.backend_name(),
                        self.save_feedback.as_ref(),
                    );
                });
            match action {
                SettingsAction::SaveClicked => {
                    self.save_config();
                    self.apply_config(ctx);
                }
                SettingsAction::Changed => self.save_feedback = None,
                SettingsAction::None => {}
            }
        }

        // ── Main content ─────────────────────────────────────
        let mut submitted = None;
        CentralPanel::default().show(ctx, |ui| {
            submitted = chat::chat_panel(ui, &mut self.ui_state, &self.config.bot_name);
        });
        if let Some(text) = submitted {
            self.dispatch_message(text, ctx);
        }
    }
}
