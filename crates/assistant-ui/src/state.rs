//! UI-level state that drives rendering.
//! The transcript, list and flags are a projection of the controller,
//! updated each frame by draining the EventBus. The rest is view state
//! owned by the panels.

use assistant_types::conversation::{ConversationId, ConversationSummary};
use assistant_types::event::AssistantEvent;
use assistant_types::turn::Turn;

use crate::action::UiAction;

/// State visible to UI panels
pub struct UiState {
    /// Transcript of the open conversation
    pub turns: Vec<Turn>,
    pub conversation_id: Option<ConversationId>,
    pub summaries: Vec<ConversationSummary>,
    /// A controller request is in flight
    pub loading: bool,
    /// `None` until the first health check
    pub service_available: Option<bool>,
    /// Error banner text
    pub error: Option<String>,
    pub input_text: String,
    pub show_conversations: bool,
    pub show_settings: bool,
    /// Conversation whose row menu is open; at most one at a time
    pub open_menu: Option<ConversationId>,
    /// Inline title editor: conversation and draft title
    pub editing: Option<(ConversationId, String)>,
    /// Conversation waiting for delete confirmation
    pub confirm_delete: Option<ConversationId>,
    pub status_text: String,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            conversation_id: None,
            summaries: Vec::new(),
            loading: false,
            service_available: None,
            error: None,
            input_text: String::new(),
            show_conversations: false,
            show_settings: false,
            open_menu: None,
            editing: None,
            confirm_delete: None,
            status_text: "就绪".to_string(),
        }
    }

    /// Process events from the EventBus and update UI state
    pub fn process_events(&mut self, events: Vec<AssistantEvent>) {
        for event in events {
            match event {
                AssistantEvent::LoadingChanged { loading } => {
                    self.loading = loading;
                    self.status_text = if loading { "思考中..." } else { "就绪" }.to_string();
                }
                AssistantEvent::TurnAppended { turn } => {
                    self.turns.push(turn);
                }
                AssistantEvent::TurnContent { turn_id, content } => {
                    if let Some(turn) = self.turns.iter_mut().find(|t| t.id == turn_id) {
                        turn.content = content;
                    }
                }
                AssistantEvent::TurnStatusChanged { turn_ids, status } => {
                    for turn in self.turns.iter_mut().filter(|t| turn_ids.contains(&t.id)) {
                        turn.status = status;
                    }
                }
                AssistantEvent::TurnsRemoved { turn_ids } => {
                    self.turns.retain(|t| !turn_ids.contains(&t.id));
                }
                AssistantEvent::TranscriptReplaced {
                    conversation_id,
                    turns,
                } => {
                    self.conversation_id = conversation_id;
                    self.turns = turns;
                }
                AssistantEvent::ConversationStarted { conversation_id } => {
                    self.conversation_id = Some(conversation_id);
                }
                AssistantEvent::SummariesRefreshed { summaries } => {
                    self.summaries = summaries;
                    self.drop_stale_view_state();
                }
                AssistantEvent::ServiceAvailability { available } => {
                    self.service_available = Some(available);
                }
                AssistantEvent::Error { message } => {
                    self.status_text = "出错了".to_string();
                    self.error = Some(message);
                }
                AssistantEvent::ErrorCleared => {
                    self.error = None;
                }
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.loading
    }

    pub fn can_send(&self) -> bool {
        !self.loading && self.service_available != Some(false) && !self.input_text.trim().is_empty()
    }

    /// Take the input as a send action, clearing the field.
    pub fn take_input(&mut self) -> Option<UiAction> {
        if !self.can_send() {
            return None;
        }
        let text = self.input_text.trim().to_string();
        self.input_text.clear();
        Some(UiAction::Send(text))
    }

    /// Quick questions fill the input; the user still presses send.
    pub fn use_quick_question(&mut self, question: &str) {
        self.input_text = question.to_string();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ─── Conversation drawer ─────────────────────────────────

    pub fn toggle_conversations(&mut self) {
        self.show_conversations = !self.show_conversations;
        if !self.show_conversations {
            self.open_menu = None;
            self.editing = None;
            self.confirm_delete = None;
        }
    }

    /// Open the row menu of `id`, or close it when it is already open.
    pub fn toggle_menu(&mut self, id: &ConversationId) {
        if self.open_menu.as_ref() == Some(id) {
            self.open_menu = None;
        } else {
            self.open_menu = Some(id.clone());
        }
    }

    pub fn begin_rename(&mut self, id: &ConversationId) {
        let title = self
            .summaries
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.title.clone())
            .unwrap_or_default();
        self.open_menu = None;
        self.editing = Some((id.clone(), title));
    }

    pub fn cancel_rename(&mut self) {
        self.editing = None;
    }

    /// Close the editor and return the rename to perform
    pub fn commit_rename(&mut self) -> Option<UiAction> {
        let (id, title) = self.editing.take()?;
        Some(UiAction::RenameConversation { id, title })
    }

    pub fn request_delete(&mut self, id: &ConversationId) {
        self.open_menu = None;
        self.confirm_delete = Some(id.clone());
    }

    pub fn confirm_delete(&mut self) -> Option<UiAction> {
        self.confirm_delete.take().map(UiAction::DeleteConversation)
    }

    pub fn cancel_delete(&mut self) {
        self.confirm_delete = None;
    }

    /// Menus and editors of conversations that are no longer listed
    fn drop_stale_view_state(&mut self) {
        let listed = |id: &ConversationId| self.summaries.iter().any(|s| &s.id == id);
        if self.open_menu.as_ref().is_some_and(|id| !listed(id)) {
            self.open_menu = None;
        }
        if let Some((id, _)) = self.editing.as_ref().filter(|(id, _)| !listed(id)) {
            log::debug!("Discarding title draft of removed conversation {}", id);
            self.editing = None;
        }
        if self.confirm_delete.as_ref().is_some_and(|id| !listed(id)) {
            self.confirm_delete = None;
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
