//! Settings panel: relay endpoint, remote history service and identity.

use egui::{self, RichText, Vec2};
use astro_types::config::ChatConfig;
use crate::theme::*;

/// What the caller should do after rendering the settings panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Nothing changed
    None,
    /// A field was changed (auto-save)
    Changed,
    /// The user clicked the explicit Save button
    SaveClicked,
}

/// Save feedback passed in from the app layer
#[derive(Clone)]
pub struct SaveFeedback {
    pub message: String,
    pub success: bool,
}

/// Render the settings panel. Returns an action for the caller to handle.
pub fn settings_panel(
    ui: &mut egui::Ui,
    config: &mut ChatConfig,
    storage_backend: &str,
    save_feedback: Option<&SaveFeedback>,
) -> SettingsAction {
    let mut changed = false;
    let mut save_clicked = false;

    egui::Frame::default()
        .fill(BG_ASSISTANT)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Settings").color(TEXT_PRIMARY));
            ui.separator();

            // ── Relay ────────────────────────────────────────
            ui.label(RichText::new("Relay").color(ACCENT).strong());
            ui.add_space(2.0);
            changed |= text_field(ui, "Endpoint", &mut config.relay_url, "http://localhost:3000/api/chat");

            ui.add_space(4.0);
            if ui.checkbox(&mut config.use_context, "Use conversation context").changed() {
                changed = true;
            }
            ui.label(RichText::new("Context messages").color(TEXT_SECONDARY).small());
            if ui
                .add_enabled(
                    config.use_context,
                    egui::Slider::new(&mut config.context_limit, 0..=10),
                )
                .changed()
            {
                changed = true;
            }

            ui.add_space(12.0);
            ui.separator();

            // ── History service ──────────────────────────────
            ui.label(RichText::new("History service").color(ACCENT).strong());
            ui.add_space(2.0);
            changed |= text_field(ui, "API base URL (optional)", &mut config.api_url, "https://api.example.com");
            changed |= text_field(ui, "Admin", &mut config.admin, "tenant tag");
            changed |= text_field(ui, "Username", &mut config.api_username, "");

            ui.label(RichText::new("Password").color(TEXT_SECONDARY).small());
            let password = egui::TextEdit::singleline(&mut config.api_password).password(true);
            if ui.add(password).changed() {
                changed = true;
            }

            ui.add_space(12.0);
            ui.separator();

            // ── Identity ─────────────────────────────────────
            ui.label(RichText::new("Identity").color(ACCENT).strong());
            ui.add_space(2.0);
            changed |= text_field(ui, "User id", &mut config.user_id, "demo_user");
            changed |= text_field(ui, "Bot name", &mut config.bot_name, "Astro Bot");

            ui.add_space(8.0);
            ui.label(
                RichText::new(format!("Chats are stored in {}", storage_backend))
                    .color(TEXT_SECONDARY)
                    .small()
                    .italics(),
            );

            // ── Save Button ──────────────────────────────────
            ui.add_space(16.0);
            ui.separator();
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn = ui.add(
                    egui::Button::new(RichText::new("Save Settings").color(TEXT_ON_DARK).strong())
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(120.0, 28.0)),
                );
                if btn.clicked() {
                    save_clicked = true;
                }

                if let Some(fb) = save_feedback {
                    let color = if fb.success { SUCCESS } else { ERROR };
                    ui.label(RichText::new(&fb.message).color(color).small());
                }
            });
        });

    if save_clicked {
        SettingsAction::SaveClicked
    } else if changed {
        SettingsAction::Changed
    } else {
        SettingsAction::None
    }
}

fn text_field(ui: &mut egui::Ui, label: &str, value: &mut String, hint: &str) -> bool {
    ui.label(RichText::new(label).color(TEXT_SECONDARY).small());
    let changed = ui
        .add(egui::TextEdit::singleline(value).hint_text(hint))
        .changed();
    ui.add_space(4.0);
    changed
}
