//! History sidebar: one row per conversation, newest first.
//!
//! Deleting asks for confirmation inline; "Delete all" asks once more
//! before wiping every local conversation.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use astro_types::history::HistoryEntry;
use crate::state::UiState;
use crate::theme::*;

/// What the caller should do after rendering the sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    None,
    NewChat,
    Refresh,
    Select(String),
    /// Confirmed deletion of one channel
    Delete(String),
    /// Confirmed deletion of every local conversation
    DeleteAll,
}

/// Render the history sidebar. Returns the action the user picked.
pub fn history_panel(ui: &mut egui::Ui, state: &mut UiState) -> HistoryAction {
    let mut action = HistoryAction::None;

    egui::Frame::default()
        .fill(BG_SIDEBAR)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    let new_chat = ui.add_enabled(
                        !state.history_loading,
                        egui::Button::new(RichText::new("+ New Chat").color(BG_SIDEBAR).strong())
                            .fill(BG_PRIMARY)
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(ui.available_width() - 40.0, 28.0)),
                    );
                    if new_chat.clicked() {
                        action = HistoryAction::NewChat;
                    }
                    if ui
                        .add_enabled(
                            !state.history_loading,
                            egui::Button::new(RichText::new("⟳").color(TEXT_ON_DARK)).frame(false),
                        )
                        .on_hover_text("Refresh")
                        .clicked()
                    {
                        action = HistoryAction::Refresh;
                    }
                });

                ui.add_space(6.0);
                ui.label(RichText::new("Chat History").color(TEXT_ON_DARK).strong());

                if let Some(err) = &state.history_error {
                    ui.label(
                        RichText::new(format!("Showing local chats only ({})", err))
                            .color(WARNING)
                            .small(),
                    );
                }

                if state.history_loading {
                    ui.label(RichText::new("Loading...").color(TEXT_ON_DARK).small());
                }

                let list_height = ui.available_height() - 48.0;
                ScrollArea::vertical()
                    .max_height(list_height)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        if state.history.is_empty() && !state.history_loading {
                            ui.label(
                                RichText::new("No chat history yet")
                                    .color(TEXT_ON_DARK)
                                    .italics()
                                    .small(),
                            );
                        }

                        let can_delete = state.can_delete();
                        for entry in &state.history {
                            let active = entry.chat_channel == state.channel;
                            let confirming =
                                state.confirm_delete.as_deref() == Some(entry.chat_channel.as_str());
                            match history_row(ui, entry, active, confirming, can_delete) {
                                RowAction::Select => {
                                    action = HistoryAction::Select(entry.chat_channel.clone());
                                }
                                RowAction::AskDelete => {
                                    state.confirm_delete = Some(entry.chat_channel.clone());
                                }
                                RowAction::ConfirmDelete => {
                                    action = HistoryAction::Delete(entry.chat_channel.clone());
                                }
                                RowAction::CancelDelete => state.confirm_delete = None,
                                RowAction::None => {}
                            }
                        }
                    });

                ui.separator();

                if state.confirm_delete_all {
                    ui.label(
                        RichText::new("Delete all chats? This cannot be undone.")
                            .color(TEXT_ON_DARK)
                            .small(),
                    );
                    ui.horizontal(|ui| {
                        if ui
                            .add_enabled(
                                state.can_delete(),
                                egui::Button::new(RichText::new("Delete all").color(ERROR)),
                            )
                            .clicked()
                        {
                            state.confirm_delete_all = false;
                            action = HistoryAction::DeleteAll;
                        }
                        if ui.button("Cancel").clicked() {
                            state.confirm_delete_all = false;
                        }
                    });
                } else if ui
                    .add_enabled(
                        !state.history.is_empty() && state.can_delete(),
                        egui::Button::new(RichText::new("Delete All Chats").color(TEXT_ON_DARK))
                            .fill(ERROR)
                            .corner_radius(PANEL_ROUNDING),
                    )
                    .clicked()
                {
                    state.confirm_delete_all = true;
                }
            });
        });

    action
}

enum RowAction {
    None,
    Select,
    AskDelete,
    ConfirmDelete,
    CancelDelete,
}

fn history_row(
    ui: &mut egui::Ui,
    entry: &HistoryEntry,
    active: bool,
    confirming: bool,
    can_delete: bool,
) -> RowAction {
    let mut action = RowAction::None;
    let fill = if active { BG_SIDEBAR_HOVER } else { BG_SIDEBAR };

    egui::Frame::default()
        .fill(fill)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                let title = row_title(entry);
                let label = ui.add(
                    egui::Label::new(RichText::new(title).color(TEXT_ON_DARK))
                        .truncate()
                        .sense(egui::Sense::click()),
                );
                if label.clicked() {
                    action = RowAction::Select;
                }

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if confirming {
                        if ui.small_button("No").clicked() {
                            action = RowAction::CancelDelete;
                        }
                        let yes = egui::Button::new(RichText::new("Yes").color(ERROR)).small();
                        if ui.add_enabled(can_delete, yes).clicked() {
                            action = RowAction::ConfirmDelete;
                        }
                    } else if ui
                        .add_enabled(can_delete, egui::Button::new("🗑").small())
                        .on_hover_text("Delete chat")
                        .clicked()
                    {
                        action = RowAction::AskDelete;
                    }
                });
            });
            ui.label(
                RichText::new(format!(
                    "{} messages · {} words",
                    entry.total_messages, entry.word_count
                ))
                .color(TEXT_ON_DARK)
                .small(),
            );
        });

    action
}

/// Last message preview, or the channel id when there is none.
pub fn row_title(entry: &HistoryEntry) -> String {
    const MAX_CHARS: usize = 40;
    let source = if entry.last_message.trim().is_empty() {
        entry.chat_channel.as_str()
    } else {
        entry.last_message.trim()
    };
    let mut title: String = source.chars().take(MAX_CHARS).collect();
    if source.chars().count() > MAX_CHARS {
        title.push('…');
    }
    title
}
