//! Chat panel: displays conversation messages and input field.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use astro_types::config::WELCOME_TEXT;
use astro_types::message::Message;
use crate::markup::{self, Segment};
use crate::state::UiState;
use crate::theme::*;

/// Render the chat panel. Returns Some(message) when user submits input.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState, default_bot_name: &str) -> Option<String> {
    let mut submitted = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header
                ui.horizontal(|ui| {
                    let title = state.bot_name.as_deref().unwrap_or(default_bot_name);
                    ui.heading(RichText::new(title).color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.status_text.starts_with("Error") {
                            ERROR
                        } else if state.is_busy() {
                            WARNING
                        } else {
                            SUCCESS
                        };
                        ui.label(RichText::new(&state.status_text).color(status_color).small());
                    });
                });

                ui.separator();

                // Messages area
                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if state.channel.is_empty() {
                            ui.add_space(24.0);
                            ui.vertical_centered(|ui| {
                                ui.label(RichText::new(WELCOME_TEXT).color(TEXT_SECONDARY));
                            });
                            return;
                        }

                        for message in &state.messages {
                            let name = message
                                .bot_name
                                .as_deref()
                                .or(state.bot_name.as_deref())
                                .unwrap_or(default_bot_name);
                            render_message(ui, message, name);
                            ui.add_space(4.0);
                        }

                        // Typing indicator until the first fragment arrives
                        if state.is_busy() && !state.streaming {
                            ui.label(RichText::new("…").color(ACCENT).strong());
                        }
                    });

                ui.add_space(8.0);

                // Input area
                ui.horizontal(|ui| {
                    let hint = if state.channel.is_empty() {
                        "Start a new chat first"
                    } else {
                        "Type your message..."
                    };
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text(hint)
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));

                    let response = ui.add_enabled(!state.channel.is_empty(), input);

                    let send_enabled = state.can_send();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_ON_DARK))
                            .fill(if send_enabled { ACCENT } else { TEXT_SECONDARY })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    // Submit on Enter or button click
                    if (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && send_enabled)
                        || send_btn.clicked()
                    {
                        submitted = Some(state.input_text.trim().to_string());
                        state.input_text.clear();
                        response.request_focus();
                    }
                });
            });
        });

    submitted
}

fn render_message(ui: &mut egui::Ui, message: &Message, bot_name: &str) {
    let (label, fill, text_color, layout) = if message.is_user() {
        ("You", BG_USER, TEXT_ON_DARK, Layout::right_to_left(Align::Min))
    } else {
        (bot_name, BG_ASSISTANT, TEXT_PRIMARY, Layout::left_to_right(Align::Min))
    };

    ui.with_layout(layout, |ui| {
        ui.set_max_width(ui.available_width() * 0.8);
        egui::Frame::default()
            .fill(fill)
            .corner_radius(BUBBLE_ROUNDING)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(label).color(text_color).strong().small());
                    if message.is_user() || !markup::has_links(&message.text) {
                        ui.label(RichText::new(&message.text).color(text_color));
                    } else {
                        render_with_links(ui, &message.text, text_color);
                    }
                });
            });
    });
}

fn render_with_links(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for segment in markup::segments(text) {
            match segment {
                Segment::Text(run) => {
                    ui.label(RichText::new(run).color(color));
                }
                Segment::Link { label, url } => {
                    ui.hyperlink_to(RichText::new(label).color(LINK), url);
                }
            }
        }
    });
}
