//! Main egui application: composes the panels and owns the controller.
//!
//! The controller is built asynchronously because configuration and the
//! session cache are read through the async storage port. Until it is
//! ready the UI renders with an empty state.

use std::cell::RefCell;
use std::rc::Rc;

use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};

use assistant_core::controller::ConversationController;
use assistant_core::event_bus::EventBus;
use assistant_core::ports::StoragePort;
use assistant_core::session_store::SessionStore;
use assistant_platform::api::HttpConversationService;
use assistant_platform::storage::{auto_detect_storage, open_storage};
use assistant_types::config::AssistantConfig;
use assistant_ui::action::UiAction;
use assistant_ui::panels::settings::{self, SaveFeedback, SettingsAction};
use assistant_ui::panels::{chat, conversations};
use assistant_ui::state::UiState;
use assistant_ui::theme;

const CONFIG_STORAGE_KEY: &str = "assistant:config";
const CJK_FONT_URL: &str = "NotoSansSC-Regular.otf";

/// Controller plus the configuration it was built from
struct Session {
    controller: Rc<ConversationController>,
    config: AssistantConfig,
}

type Slot<T> = Rc<RefCell<Option<T>>>;

pub struct AssistantApp {
    ui_state: UiState,
    /// Settings being edited; applied on Save
    config: AssistantConfig,
    event_bus: EventBus,
    controller: Option<Rc<ConversationController>>,
    /// Filled by the boot task
    pending_session: Slot<Session>,
    /// Settings live outside the session storage so the backend choice
    /// itself can be persisted
    config_storage: Rc<dyn StoragePort>,
    save_feedback: Option<SaveFeedback>,
    first_frame: bool,
}

impl AssistantApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config_storage = auto_detect_storage();
        let event_bus = EventBus::new();
        let pending_session: Slot<Session> = Rc::new(RefCell::new(None));

        Self::boot(
            config_storage.clone(),
            None,
            event_bus.clone(),
            pending_session.clone(),
            cc.egui_ctx.clone(),
        );

        Self {
            ui_state: UiState::new(),
            config: AssistantConfig::default(),
            event_bus,
            controller: None,
            pending_session,
            config_storage,
            save_feedback: None,
            first_frame: true,
        }
    }

    /// Build the controller and restore the last session (async).
    ///
    /// `config` overrides the stored configuration, as after Save.
    fn boot(
        config_storage: Rc<dyn StoragePort>,
        config: Option<AssistantConfig>,
        event_bus: EventBus,
        slot: Slot<Session>,
        ctx: egui::Context,
    ) {
        wasm_bindgen_futures::spawn_local(async move {
            let config = match config {
                Some(config) => config,
                None => Self::restore_config(config_storage.as_ref()).await,
            };

            let store = SessionStore::load(open_storage(config.storage.backend)).await;
            let service = Rc::new(HttpConversationService::new(&config.api));
            log::info!("Conversation service at {}", service.base_url());

            let controller = Rc::new(ConversationController::new(service, store, event_bus));
            *slot.borrow_mut() = Some(Session {
                controller: controller.clone(),
                config,
            });
            ctx.request_repaint();

            if let Err(e) = controller.restore().await {
                log::warn!("Start-up restore incomplete: {}", e);
            }
            ctx.request_repaint();
        });
    }

    async fn restore_config(storage: &dyn StoragePort) -> AssistantConfig {
        match storage.get(CONFIG_STORAGE_KEY).await {
            Ok(Some(data)) => match serde_json::from_slice::<AssistantConfig>(&data) {
                Ok(config) => {
                    log::info!("Config restored from storage");
                    config
                }
                Err(e) => {
                    log::warn!("Stored config unreadable ({}), using defaults", e);
                    AssistantConfig::default()
                }
            },
            Ok(None) => AssistantConfig::default(),
            Err(e) => {
                log::warn!("Config storage unavailable ({}), using defaults", e);
                AssistantConfig::default()
            }
        }
    }

    /// Save config to storage (async, fire-and-forget)
    fn save_config(storage: Rc<dyn StoragePort>, config: &AssistantConfig) -> bool {
        match serde_json::to_vec(config) {
            Ok(json) => {
                wasm_bindgen_futures::spawn_local(async move {
                    match storage.set(CONFIG_STORAGE_KEY, &json).await {
                        Ok(()) => log::info!("Config saved to storage"),
                        Err(e) => log::error!("Config save failed: {}", e),
                    }
                });
                true
            }
            Err(e) => {
                log::error!("Config not serializable: {}", e);
                false
            }
        }
    }

    /// Persist the edited settings and rebuild the controller with them.
    fn apply_settings(&mut self, ctx: &egui::Context) {
        if let Err(message) = settings::validate(&self.config) {
            self.save_feedback = Some(SaveFeedback {
                message,
                success: false,
            });
            return;
        }

        let saved = Self::save_config(self.config_storage.clone(), &self.config);
        self.save_feedback = Some(SaveFeedback {
            message: if saved { "已保存" } else { "保存失败" }.to_string(),
            success: saved,
        });

        // Events of the old controller go to the old bus and are dropped
        self.event_bus = EventBus::new();
        self.controller = None;
        self.pending_session = Rc::new(RefCell::new(None));
        let show_settings = self.ui_state.show_settings;
        self.ui_state = UiState::new();
        self.ui_state.show_settings = show_settings;

        Self::boot(
            self.config_storage.clone(),
            Some(self.config.clone()),
            self.event_bus.clone(),
            self.pending_session.clone(),
            ctx.clone(),
        );
    }

    /// Fetch a CJK font and install it into egui
    fn load_cjk_font(ctx: egui::Context) {
        wasm_bindgen_futures::spawn_local(async move {
            let response = match gloo_net::http::Request::get(CJK_FONT_URL).send().await {
                Ok(r) if r.ok() => r,
                Ok(r) => {
                    log::warn!("CJK font unavailable: HTTP {}", r.status());
                    return;
                }
                Err(e) => {
                    log::warn!("Failed to fetch CJK font: {}", e);
                    return;
                }
            };
            match response.binary().await {
                Ok(bytes) => {
                    theme::install_cjk_font(&ctx, "noto_sans_sc", bytes);
                    ctx.request_repaint();
                    log::info!("CJK font loaded");
                }
                Err(e) => log::warn!("Failed to read CJK font: {}", e),
            }
        });
    }

    /// Run a UI action against the controller (async)
    fn dispatch(&self, action: UiAction, ctx: &egui::Context) {
        let Some(controller) = self.controller.clone() else {
            log::debug!("Controller not ready, dropping {:?}", action);
            return;
        };
        let ctx = ctx.clone();

        wasm_bindgen_futures::spawn_local(async move {
            let result = match action {
                UiAction::Send(text) => controller.send(&text).await,
                UiAction::NewConversation => controller.new_conversation().await,
                UiAction::SwitchConversation(id) => {
                    controller.switch_conversation(&id).await.map(|_| ())
                }
                UiAction::RenameConversation { id, title } => {
                    controller.rename_conversation(&id, &title).await.map(|_| ())
                }
                UiAction::DeleteConversation(id) => {
                    controller.delete_conversation(&id).await.map(|_| ())
                }
                UiAction::DeleteTurn(index) => controller.delete_turn(index).await,
                UiAction::Reconnect => controller.restore().await,
            };
            if let Err(e) = result {
                log::warn!("Action failed: {}", e);
            }
            ctx.request_repaint();
        });
    }
}

impl eframe::App for AssistantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.first_frame {
            theme::apply_theme(ctx);
            Self::load_cjk_font(ctx.clone());
            self.first_frame = false;
        }

        if let Some(session) = self.pending_session.borrow_mut().take() {
            self.config = session.config;
            self.controller = Some(session.controller);
        }

        // Drain events from the controller
        let events = self.event_bus.drain();
        if !events.is_empty() {
            self.ui_state.process_events(events);
            ctx.request_repaint();
        }

        if self.ui_state.is_busy() {
            ctx.request_repaint();
        }

        let mut actions = Vec::new();

        // ── Top bar ──────────────────────────────────────────
        TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(self.ui_state.show_conversations, "☰ 会话")
                    .clicked()
                {
                    self.ui_state.toggle_conversations();
                }
                ui.separator();
                ui.label(
                    RichText::new("AI助手")
                        .strong()
                        .color(theme::ACCENT)
                        .size(16.0),
                );
                ui.label(
                    RichText::new(&self.ui_state.status_text)
                        .color(theme::TEXT_SECONDARY)
                        .small(),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .selectable_label(self.ui_state.show_settings, "设置")
                        .clicked()
                    {
                        self.ui_state.show_settings = !self.ui_state.show_settings;
                    }
                    if ui
                        .add_enabled(!self.ui_state.is_busy(), egui::Button::new("新会话"))
                        .clicked()
                    {
                        actions.push(UiAction::NewConversation);
                    }
                });
            });
        });

        // ── Conversation drawer ──────────────────────────────
        if self.ui_state.show_conversations {
            SidePanel::left("conversations_panel")
                .min_width(220.0)
                .max_width(300.0)
                .show(ctx, |ui| {
                    if let Some(action) = conversations::conversations_panel(ui, &mut self.ui_state) {
                        actions.push(action);
                    }
                });
        }

        // ── Settings side panel ──────────────────────────────
        if self.ui_state.show_settings {
            let mut apply = false;
            SidePanel::right("settings_panel")
                .min_width(260.0)
                .max_width(340.0)
                .show(ctx, |ui| {
                    match settings::settings_panel(ui, &mut self.config, self.save_feedback.as_ref()) {
                        SettingsAction::SaveClicked => apply = true,
                        SettingsAction::Changed => self.save_feedback = None,
                        SettingsAction::None => {}
                    }
                });
            if apply {
                self.apply_settings(ctx);
            }
        }

        // ── Chat ─────────────────────────────────────────────
        CentralPanel::default().show(ctx, |ui| {
            if let Some(action) = chat::chat_panel(ui, &mut self.ui_state) {
                actions.push(action);
            }
        });

        for action in actions {
            self.dispatch(action, ctx);
        }
    }
}
