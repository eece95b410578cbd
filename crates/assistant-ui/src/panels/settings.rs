//! Settings panel: service address, account and storage backend.
//! Changes take effect after Save, which restarts the assistant.

use egui::{self, RichText, Vec2};
use assistant_types::config::{AssistantConfig, StorageBackendType};
use crate::theme::*;

/// What the caller should do after rendering the settings panel
pub enum SettingsAction {
    None,
    /// A field was edited; nothing is applied yet
    Changed,
    SaveClicked,
}

/// Save feedback passed in from the app layer
#[derive(Clone)]
pub struct SaveFeedback {
    pub message: String,
    pub success: bool,
}

pub fn settings_panel(
    ui: &mut egui::Ui,
    config: &mut AssistantConfig,
    save_feedback: Option<&SaveFeedback>,
) -> SettingsAction {
    let mut changed = false;
    let mut save_clicked = false;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("设置").color(TEXT_PRIMARY));
            ui.separator();

            // ── Service ──────────────────────────────────────
            ui.label(RichText::new("服务").color(ACCENT).strong());
            ui.add_space(2.0);

            ui.label(RichText::new("服务地址").color(TEXT_SECONDARY).small());
            changed |= ui
                .add(
                    egui::TextEdit::singleline(&mut config.api.base_url)
                        .hint_text("http://localhost:8000"),
                )
                .changed();

            ui.add_space(4.0);

            ui.label(RichText::new("用户 ID").color(TEXT_SECONDARY).small());
            changed |= ui
                .text_edit_singleline(&mut config.api.user_id)
                .changed();

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(4.0);

            // ── Storage ──────────────────────────────────────
            ui.label(RichText::new("本地存储").color(ACCENT).strong());
            ui.add_space(2.0);

            egui::ComboBox::from_id_salt("storage_backend")
                .selected_text(config.storage.backend.label())
                .show_ui(ui, |ui| {
                    for backend in StorageBackendType::all() {
                        changed |= ui
                            .selectable_value(&mut config.storage.backend, *backend, backend.label())
                            .changed();
                    }
                });

            ui.add_space(4.0);
            ui.label(
                RichText::new(storage_description(config.storage.backend))
                    .color(TEXT_SECONDARY)
                    .small()
                    .italics(),
            );

            ui.add_space(16.0);
            ui.separator();
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn = ui.add(
                    egui::Button::new(RichText::new("保存设置").color(ON_ACCENT).strong())
                        .fill(ACCENT)
                        .corner_radius(PANEL_ROUNDING)
                        .min_size(Vec2::new(120.0, 28.0)),
                );
                save_clicked = btn.clicked();

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

pub fn storage_description(backend: StorageBackendType) -> &'static str {
    match backend {
        StorageBackendType::Auto => "优先使用浏览器 localStorage，不可用时退回内存。",
        StorageBackendType::Memory => "仅保存在内存中，刷新页面后会话记录丢失。",
        StorageBackendType::LocalStorage => "保存在浏览器 localStorage，刷新后仍可恢复上次会话。",
    }
}

/// Problems that would make the assistant unusable, in display form.
pub fn validate(config: &AssistantConfig) -> Result<(), String> {
    let url = config.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err("服务地址需以 http:// 或 https:// 开头".to_string());
    }
    if config.api.user_id.trim().is_empty() {
        return Err("用户 ID 不能为空".to_string());
    }
    Ok(())
}
