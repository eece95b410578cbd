//! Conversation drawer: stored conversations with a per-row menu.
//!
//! Which menu is open, which title is being edited and which delete
//! awaits confirmation all live in `UiState`; rows render it and edit the
//! draft title in place.

use egui::{self, Align, Layout, RichText, ScrollArea};
use assistant_types::conversation::ConversationSummary;

use crate::action::UiAction;
use crate::state::UiState;
use crate::theme::*;

enum RowEvent {
    Open,
    ToggleMenu,
    Rename,
    Delete,
    Save,
    Cancel,
    ConfirmDelete,
    CancelDelete,
}

pub fn conversations_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new("历史会话").color(TEXT_PRIMARY).strong());
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            if ui
                .add_enabled(!state.loading, egui::Button::new("＋ 新会话"))
                .clicked()
            {
                action = Some(UiAction::NewConversation);
            }
        });
    });
    ui.separator();

    if state.summaries.is_empty() {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("暂无历史会话").color(TEXT_SECONDARY).small());
        });
        return action;
    }

    let summaries = state.summaries.clone();
    let mut events = Vec::new();
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for summary in &summaries {
                if let Some(event) = conversation_row(ui, state, summary) {
                    events.push((summary.id.clone(), event));
                }
                ui.add_space(4.0);
            }
        });

    for (id, event) in events {
        let result = match event {
            RowEvent::Open if !state.loading => {
                state.open_menu = None;
                Some(UiAction::SwitchConversation(id))
            }
            RowEvent::Open => None,
            RowEvent::ToggleMenu => {
                state.toggle_menu(&id);
                None
            }
            RowEvent::Rename => {
                state.begin_rename(&id);
                None
            }
            RowEvent::Delete => {
                state.request_delete(&id);
                None
            }
            RowEvent::Save => state.commit_rename(),
            RowEvent::Cancel => {
                state.cancel_rename();
                None
            }
            RowEvent::ConfirmDelete => state.confirm_delete(),
            RowEvent::CancelDelete => {
                state.cancel_delete();
                None
            }
        };
        if result.is_some() {
            action = result;
        }
    }

    action
}

fn conversation_row(
    ui: &mut egui::Ui,
    state: &mut UiState,
    summary: &ConversationSummary,
) -> Option<RowEvent> {
    let mut event = None;
    let active = state.conversation_id.as_ref() == Some(&summary.id);
    let fill = if active { BG_SURFACE } else { BG_SECONDARY };

    egui::Frame::default()
        .fill(fill)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            match state.editing.as_mut() {
                Some((id, draft)) if id == &summary.id => {
                    event = title_editor(ui, draft);
                }
                _ => {
                    ui.horizontal(|ui| {
                        let title = ui.add(
                            egui::Label::new(RichText::new(&summary.title).color(TEXT_PRIMARY))
                                .truncate()
                                .sense(egui::Sense::click()),
                        );
                        if title.clicked() {
                            event = Some(RowEvent::Open);
                        }
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.small_button("⋯").clicked() {
                                event = Some(RowEvent::ToggleMenu);
                            }
                            ui.label(
                                RichText::new(summary.display_date())
                                    .color(TEXT_SECONDARY)
                                    .small(),
                            );
                        });
                    });
                }
            }

            if state.open_menu.as_ref() == Some(&summary.id) {
                ui.horizontal(|ui| {
                    if ui.button("重命名").clicked() {
                        event = Some(RowEvent::Rename);
                    }
                    if ui.button(RichText::new("删除").color(ERROR)).clicked() {
                        event = Some(RowEvent::Delete);
                    }
                });
            }

            if state.confirm_delete.as_ref() == Some(&summary.id) {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("确定要删除这个会话吗？").color(ERROR).small());
                    if ui.small_button("删除").clicked() {
                        event = Some(RowEvent::ConfirmDelete);
                    }
                    if ui.small_button("取消").clicked() {
                        event = Some(RowEvent::CancelDelete);
                    }
                });
            }
        });

    event
}

/// Enter saves, Escape cancels.
fn title_editor(ui: &mut egui::Ui, draft: &mut String) -> Option<RowEvent> {
    let mut event = None;

    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(draft)
                .id_salt("rename_title")
                .desired_width(ui.available_width() - 90.0),
        );
        if !response.has_focus() && !response.lost_focus() {
            response.request_focus();
        }
        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
        if ui.small_button("保存").clicked() || enter {
            event = Some(RowEvent::Save);
        }
        if ui.small_button("取消").clicked() || escape {
            event = Some(RowEvent::Cancel);
        }
    });

    event
}
