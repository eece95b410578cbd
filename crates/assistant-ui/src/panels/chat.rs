//! Chat panel: error banner, greeting, transcript and input field.

use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};
use assistant_types::turn::{Role, Turn};

use crate::action::UiAction;
use crate::state::UiState;
use crate::theme::*;

pub const QUICK_QUESTIONS: [&str; 4] = [
    "今日A股行情如何？",
    "如何选择基金？",
    "什么是量化交易？",
    "新手如何理财？",
];

const GREETING_TITLE: &str = "您好！我是AI财经助手";
const GREETING_POINTS: [&str; 4] = [
    "分析市场行情和投资机会",
    "解答金融知识问题",
    "提供个性化理财建议",
    "解读财经新闻和政策",
];

/// Render the chat panel. Returns the action the user triggered, if any.
pub fn chat_panel(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                if let Some(a) = banners(ui, state) {
                    action = Some(a);
                }

                let available_height = ui.available_height() - 64.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if state.turns.is_empty() {
                            greeting(ui, state);
                        } else {
                            for (index, turn) in state.turns.iter().enumerate() {
                                if render_turn(ui, turn, state.loading) {
                                    action = Some(UiAction::DeleteTurn(index));
                                }
                                ui.add_space(6.0);
                            }
                        }
                    });

                ui.add_space(8.0);
                if let Some(a) = input_row(ui, state) {
                    action = Some(a);
                }
                ui.label(
                    RichText::new("AI助手可能会出错，请谨慎对待投资建议")
                        .color(TEXT_SECONDARY)
                        .small(),
                );
            });
        });

    action
}

fn banners(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    if state.service_available == Some(false) {
        banner_frame(ui, |ui| {
            ui.label(RichText::new("后端服务不可用").color(ERROR));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.add_enabled(!state.loading, egui::Button::new("重新连接")).clicked() {
                    action = Some(UiAction::Reconnect);
                }
            });
        });
        ui.add_space(4.0);
    }

    let mut dismissed = false;
    if let Some(message) = &state.error {
        banner_frame(ui, |ui| {
            ui.label(RichText::new(message).color(ERROR));
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.small_button("✕").clicked() {
                    dismissed = true;
                }
            });
        });
        ui.add_space(4.0);
    }
    if dismissed {
        state.dismiss_error();
    }

    action
}

fn banner_frame(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::default()
        .fill(ERROR_BG)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(add_contents);
        });
}

fn greeting(ui: &mut egui::Ui, state: &mut UiState) {
    egui::Frame::default()
        .fill(BG_SECONDARY)
        .corner_radius(BUBBLE_ROUNDING)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.label(RichText::new(GREETING_TITLE).color(TEXT_PRIMARY).strong());
            ui.label(RichText::new("很高兴为您服务。我可以帮您：").color(TEXT_SECONDARY));
            for point in GREETING_POINTS {
                ui.label(RichText::new(format!("• {}", point)).color(TEXT_SECONDARY));
            }
            ui.label(
                RichText::new("请问有什么可以帮助您的？")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
        });

    ui.add_space(12.0);
    ui.label(RichText::new("快速提问").color(TEXT_SECONDARY).small());
    ui.horizontal_wrapped(|ui| {
        for question in QUICK_QUESTIONS {
            if ui.add_enabled(!state.loading, egui::Button::new(question)).clicked() {
                state.use_quick_question(question);
            }
        }
    });
}

/// Returns true when the user asked to delete this turn.
fn render_turn(ui: &mut egui::Ui, turn: &Turn, busy: bool) -> bool {
    let mut delete = false;
    let (label, bg, fg, layout) = match turn.role {
        Role::User => ("我", USER_BUBBLE, ON_ACCENT, Layout::right_to_left(Align::Min)),
        Role::Assistant => ("AI助手", ASSISTANT_BUBBLE, TEXT_PRIMARY, Layout::left_to_right(Align::Min)),
    };

    ui.with_layout(layout, |ui| {
        egui::Frame::default()
            .fill(bg)
            .corner_radius(BUBBLE_ROUNDING)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.8);
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(label).color(fg).strong().small());
                        ui.label(RichText::new(turn.display_time()).color(fg).small());
                    });
                    if turn.is_pending() && turn.role == Role::Assistant {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(RichText::new(&turn.content).color(fg));
                            ui.label(RichText::new("▌").color(ACCENT).strong());
                        });
                    } else {
                        ui.label(RichText::new(&turn.content).color(fg));
                    }
                });
            })
            .response
            .context_menu(|ui| {
                if ui.add_enabled(!busy && !turn.is_pending(), egui::Button::new("删除消息")).clicked() {
                    delete = true;
                    ui.close();
                }
            });
    });

    delete
}

fn input_row(ui: &mut egui::Ui, state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        let hint = if state.service_available == Some(false) {
            "后端服务不可用"
        } else {
            "输入您的问题..."
        };
        let input = egui::TextEdit::singleline(&mut state.input_text)
            .hint_text(hint)
            .desired_width(ui.available_width() - 70.0)
            .font(egui::FontId::proportional(14.0));
        let response = ui.add_enabled(!state.loading, input);

        let send_enabled = state.can_send();
        let send_btn = ui.add_enabled(
            send_enabled,
            egui::Button::new(RichText::new("发送").color(ON_ACCENT))
                .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                .corner_radius(PANEL_ROUNDING)
                .min_size(Vec2::new(60.0, 0.0)),
        );

        let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if enter || send_btn.clicked() {
            action = state.take_input();
            response.request_focus();
        }
    });

    action
}
