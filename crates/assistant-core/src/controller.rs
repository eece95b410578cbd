//! Conversation controller. Drives one chat view.
//!
//! A send moves through
//! `Idle → AwaitingConversationId? → Streaming → Reconciling → Idle`,
//! or ends in `Failed → Idle`:
//!
//! 1. Append the user turn as `Pending` before any network call
//! 2. Create a conversation on the service if none is active yet
//! 3. Stream the reply; the assistant turn appears with the first fragment
//! 4. Replace the assistant text with the final reply and confirm both turns
//! 5. Reload the conversation list
//!
//! Any failure marks the send's turns `Failed` and prunes them, so the
//! transcript ends up exactly as it was before the send.
//!
//! Methods take `&self` and keep state in a RefCell that is never borrowed
//! across an await, so the UI can read the controller while a reply streams.

use std::cell::RefCell;
use std::rc::Rc;

use assistant_types::{
    AssistantError, Result,
    conversation::{ConversationId, ConversationSummary},
    event::AssistantEvent,
    turn::{ChatMessage, Role, Turn, TurnId, TurnStatus},
};

use crate::assembler::assemble;
use crate::event_bus::EventBus;
use crate::ports::{ChatRequest, ConversationService};
use crate::session_store::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    AwaitingConversationId,
    Streaming,
    Reconciling,
    /// Switching, resetting or restoring the conversation
    Loading,
    Failed,
}

/// What `switch_conversation` ended up showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The requested conversation was loaded
    Loaded,
    /// The conversation could not be loaded; an empty one was opened instead
    StartedFresh,
    /// The conversation could not be loaded and the service is unreachable
    Unavailable,
}

struct ControllerState {
    phase: ControllerPhase,
    conversation_id: Option<ConversationId>,
    transcript: Vec<Turn>,
    summaries: Vec<ConversationSummary>,
    service_available: Option<bool>,
    last_error: Option<String>,
    next_turn_id: u64,
}

/// Bookkeeping for one in-flight send
struct StreamState {
    user_turn: TurnId,
    assistant_turn: Option<TurnId>,
    partial_content: String,
}

pub struct ConversationController {
    service: Rc<dyn ConversationService>,
    store: SessionStore,
    event_bus: EventBus,
    state: RefCell<ControllerState>,
}

impl ConversationController {
    pub fn new(service: Rc<dyn ConversationService>, store: SessionStore, event_bus: EventBus) -> Self {
        Self {
            service,
            store,
            event_bus,
            state: RefCell::new(ControllerState {
                phase: ControllerPhase::Idle,
                conversation_id: None,
                transcript: Vec::new(),
                summaries: Vec::new(),
                service_available: None,
                last_error: None,
                next_turn_id: 0,
            }),
        }
    }

    // ─── Accessors ───────────────────────────────────────────

    pub fn phase(&self) -> ControllerPhase {
        self.state.borrow().phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() != ControllerPhase::Idle
    }

    pub fn conversation_id(&self) -> Option<ConversationId> {
        self.state.borrow().conversation_id.clone()
    }

    pub fn transcript(&self) -> Vec<Turn> {
        self.state.borrow().transcript.clone()
    }

    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.state.borrow().summaries.clone()
    }

    /// `None` until the first health check
    pub fn service_available(&self) -> Option<bool> {
        self.state.borrow().service_available
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ─── Start-up ────────────────────────────────────────────

    /// Reopen where the user left off.
    ///
    /// Checks the service, reloads the conversation list and reopens the
    /// last-active conversation if it still exists. Otherwise starts empty.
    pub async fn restore(&self) -> Result<()> {
        self.begin(ControllerPhase::Loading)?;
        let result = self.restore_inner().await;
        self.finish();
        result
    }

    async fn restore_inner(&self) -> Result<()> {
        if !self.check_health().await {
            return Err(AssistantError::Unavailable);
        }

        // Only a live list is trusted at start-up
        self.store.clear_cached_summaries().await;
        self.refresh_summaries().await;

        if let Some(id) = self.store.last_active_id() {
            match self.load_conversation(&id).await {
                Ok(()) => {
                    log::info!("Restored conversation {}", id);
                    return Ok(());
                }
                Err(e) => log::warn!("Last conversation {} not restorable: {}", id, e),
            }
        }

        self.reset_transcript();
        self.store.clear_last_active_id().await;
        Ok(())
    }

    // ─── Sending ─────────────────────────────────────────────

    /// Send one user message and stream the reply into the transcript.
    ///
    /// Rejected with `Busy` while another request is in flight and with
    /// `EmptyInput` for blank text. On failure the transcript is rolled back
    /// and a readable message is recorded in [`last_error`](Self::last_error).
    pub async fn send(&self, text: &str) -> Result<()> {
        if text.trim().is_empty() {
            return Err(AssistantError::EmptyInput);
        }
        self.begin(ControllerPhase::AwaitingConversationId)?;
        self.clear_error();

        let user_turn = self.append_turn(Role::User, text, TurnStatus::Pending);
        let mut stream = StreamState {
            user_turn,
            assistant_turn: None,
            partial_content: String::new(),
        };

        let result = match self.run_send(&mut stream).await {
            Ok(reply) => {
                self.set_phase(ControllerPhase::Reconciling);
                self.reconcile(&stream, reply);
                self.refresh_summaries().await;
                Ok(())
            }
            Err(e) => {
                log::error!("Send failed: {}", e);
                self.set_phase(ControllerPhase::Failed);
                self.roll_back(&stream);
                self.set_error(format!("发送消息失败: {}", e.user_message()));
                Err(e)
            }
        };

        self.finish();
        result
    }

    async fn run_send(&self, stream: &mut StreamState) -> Result<String> {
        let conversation_id = match self.conversation_id() {
            Some(id) => id,
            None => self.create_conversation().await?,
        };

        let messages: Vec<ChatMessage> = self
            .state
            .borrow()
            .transcript
            .iter()
            .filter(|t| t.status != TurnStatus::Failed)
            .map(Turn::to_chat_message)
            .collect();

        self.set_phase(ControllerPhase::Streaming);
        log::debug!(
            "Streaming reply for {} ({} messages)",
            conversation_id,
            messages.len()
        );

        let body = self
            .service
            .open_chat_stream(ChatRequest {
                messages,
                conversation_id: Some(conversation_id),
                stream: true,
            })
            .await?;

        assemble(body, |fragment| self.on_fragment(stream, fragment)).await
    }

    async fn create_conversation(&self) -> Result<ConversationId> {
        let id = self.service.create_conversation().await?;
        log::info!("Created conversation {}", id);
        self.state.borrow_mut().conversation_id = Some(id.clone());
        self.store.set_last_active_id(&id).await;
        self.event_bus.emit(AssistantEvent::ConversationStarted {
            conversation_id: id.clone(),
        });
        Ok(id)
    }

    fn on_fragment(&self, stream: &mut StreamState, fragment: &str) {
        stream.partial_content.push_str(fragment);
        match stream.assistant_turn {
            None => {
                let id = self.append_turn(
                    Role::Assistant,
                    &stream.partial_content,
                    TurnStatus::Pending,
                );
                stream.assistant_turn = Some(id);
            }
            Some(id) => self.set_turn_content(id, &stream.partial_content),
        }
    }

    /// The assembled reply wins over what was displayed while streaming.
    fn reconcile(&self, stream: &StreamState, reply: String) {
        let assistant_turn = match stream.assistant_turn {
            Some(id) => {
                if reply != stream.partial_content {
                    self.set_turn_content(id, &reply);
                }
                id
            }
            // Nothing streamed; the reply is the fallback greeting
            None => self.append_turn(Role::Assistant, reply, TurnStatus::Pending),
        };
        self.set_status(&[stream.user_turn, assistant_turn], TurnStatus::Confirmed);
    }

    fn roll_back(&self, stream: &StreamState) {
        let mut ids = vec![stream.user_turn];
        ids.extend(stream.assistant_turn);
        self.set_status(&ids, TurnStatus::Failed);
        self.prune_failed();
    }

    // ─── Switching & resetting ───────────────────────────────

    /// Open a stored conversation.
    ///
    /// A conversation that can no longer be loaded (deleted elsewhere,
    /// stale cache) is not reported as an error: an empty conversation is
    /// opened instead.
    pub async fn switch_conversation(&self, id: &ConversationId) -> Result<SwitchOutcome> {
        self.begin(ControllerPhase::Loading)?;
        self.clear_error();

        let outcome = match self.load_conversation(id).await {
            Ok(()) => SwitchOutcome::Loaded,
            Err(e) => {
                log::warn!("Conversation {} could not be loaded ({}), starting fresh", id, e);
                match self.start_fresh().await {
                    Ok(()) => SwitchOutcome::StartedFresh,
                    Err(_) => SwitchOutcome::Unavailable,
                }
            }
        };

        self.finish();
        Ok(outcome)
    }

    /// Clear the chat view for a new conversation.
    ///
    /// The service is only asked to create the conversation on the next
    /// send. When the health check fails nothing changes except the
    /// availability flag and the error banner.
    pub async fn new_conversation(&self) -> Result<()> {
        self.begin(ControllerPhase::Loading)?;
        let result = self.start_fresh().await;
        self.finish();
        result
    }

    async fn load_conversation(&self, id: &ConversationId) -> Result<()> {
        let messages = self.service.conversation_messages(id).await?;
        let turns: Vec<Turn> = messages
            .into_iter()
            .map(|m| Turn::new(self.next_turn_id(), m.role, m.content, TurnStatus::Confirmed))
            .collect();

        {
            let mut state = self.state.borrow_mut();
            state.conversation_id = Some(id.clone());
            state.transcript = turns.clone();
        }
        self.event_bus.emit(AssistantEvent::TranscriptReplaced {
            conversation_id: Some(id.clone()),
            turns,
        });
        self.store.set_last_active_id(id).await;
        Ok(())
    }

    async fn start_fresh(&self) -> Result<()> {
        if !self.check_health().await {
            return Err(AssistantError::Unavailable);
        }
        self.clear_error();
        self.reset_transcript();
        self.store.clear_last_active_id().await;
        self.refresh_summaries().await;
        Ok(())
    }

    fn reset_transcript(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.conversation_id = None;
            state.transcript.clear();
        }
        self.event_bus.emit(AssistantEvent::TranscriptReplaced {
            conversation_id: None,
            turns: Vec::new(),
        });
    }

    async fn check_health(&self) -> bool {
        let healthy = self.service.health_check().await;
        self.state.borrow_mut().service_available = Some(healthy);
        self.event_bus
            .emit(AssistantEvent::ServiceAvailability { available: healthy });
        if !healthy {
            log::warn!("Conversation service is unreachable");
            self.set_error(AssistantError::Unavailable.user_message());
        }
        healthy
    }

    // ─── Conversation list ───────────────────────────────────

    /// Reload the conversation list, falling back to the cached copy.
    pub async fn refresh_summaries(&self) -> Vec<ConversationSummary> {
        let summaries = match self.service.list_conversations().await {
            Ok(list) => {
                let summaries: Vec<ConversationSummary> =
                    list.into_iter().map(ConversationSummary::from).collect();
                self.store.cache_summaries(&summaries).await;
                summaries
            }
            Err(e) => {
                log::warn!("Conversation list unavailable ({}), using cached copy", e);
                self.store.cached_summaries()
            }
        };

        self.state.borrow_mut().summaries = summaries.clone();
        self.event_bus.emit(AssistantEvent::SummariesRefreshed {
            summaries: summaries.clone(),
        });
        summaries
    }

    /// Returns `true` when the service accepted a new title.
    /// Blank titles and titles equal to the current one are ignored.
    pub async fn rename_conversation(&self, id: &ConversationId, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(false);
        }
        let unchanged = self
            .state
            .borrow()
            .summaries
            .iter()
            .any(|s| &s.id == id && s.title == title);
        if unchanged {
            return Ok(false);
        }

        match self.service.rename_conversation(id, title).await {
            Ok(true) => {
                log::info!("Renamed conversation {}", id);
                self.refresh_summaries().await;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                log::error!("Rename of {} failed: {}", id, e);
                self.set_error("修改会话标题失败，请重试".to_string());
                Err(e)
            }
        }
    }

    /// Delete a stored conversation. Deleting the open conversation resets
    /// the chat view as [`new_conversation`](Self::new_conversation) does.
    pub async fn delete_conversation(&self, id: &ConversationId) -> Result<bool> {
        let is_current = self.conversation_id().as_ref() == Some(id);
        if is_current && self.is_loading() {
            return Err(AssistantError::Busy);
        }

        match self.service.delete_conversation(id).await {
            Ok(true) => {
                log::info!("Deleted conversation {}", id);
                self.refresh_summaries().await;
                if self.store.last_active_id().as_ref() == Some(id) {
                    self.store.clear_last_active_id().await;
                }
                if is_current && self.begin(ControllerPhase::Loading).is_ok() {
                    if let Err(e) = self.start_fresh().await {
                        log::warn!("Could not reset after deleting {}: {}", id, e);
                    }
                    self.finish();
                }
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                log::error!("Delete of {} failed: {}", id, e);
                self.set_error("删除会话失败，请重试".to_string());
                Err(e)
            }
        }
    }

    /// Delete the message at `index` of the open conversation.
    pub async fn delete_turn(&self, index: usize) -> Result<()> {
        let id = self
            .conversation_id()
            .ok_or_else(|| AssistantError::Other("No open conversation".to_string()))?;
        let turn_id = self
            .state
            .borrow()
            .transcript
            .get(index)
            .map(|t| t.id)
            .ok_or_else(|| AssistantError::Other(format!("No message at index {}", index)))?;
        self.begin(ControllerPhase::Loading)?;

        let result = match self.service.delete_message(&id, index).await {
            Ok(true) => {
                self.state
                    .borrow_mut()
                    .transcript
                    .retain(|t| t.id != turn_id);
                self.event_bus.emit(AssistantEvent::TurnsRemoved {
                    turn_ids: vec![turn_id],
                });
                Ok(())
            }
            Ok(false) => Err(AssistantError::Service("删除消息失败".to_string())),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            log::error!("Delete of message {} in {} failed: {}", index, id, e);
            self.set_error(format!("删除消息失败: {}", e.user_message()));
        }

        self.finish();
        result
    }

    // ─── State helpers ───────────────────────────────────────

    fn begin(&self, phase: ControllerPhase) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.phase != ControllerPhase::Idle {
                return Err(AssistantError::Busy);
            }
            state.phase = phase;
        }
        self.event_bus
            .emit(AssistantEvent::LoadingChanged { loading: true });
        Ok(())
    }

    fn set_phase(&self, phase: ControllerPhase) {
        self.state.borrow_mut().phase = phase;
    }

    fn finish(&self) {
        self.set_phase(ControllerPhase::Idle);
        self.event_bus
            .emit(AssistantEvent::LoadingChanged { loading: false });
    }

    fn next_turn_id(&self) -> TurnId {
        let mut state = self.state.borrow_mut();
        state.next_turn_id += 1;
        TurnId(state.next_turn_id)
    }

    fn append_turn(&self, role: Role, content: impl Into<String>, status: TurnStatus) -> TurnId {
        let turn = Turn::new(self.next_turn_id(), role, content, status);
        let id = turn.id;
        self.state.borrow_mut().transcript.push(turn.clone());
        self.event_bus.emit(AssistantEvent::TurnAppended { turn });
        id
    }

    fn set_turn_content(&self, id: TurnId, content: &str) {
        let updated = {
            let mut state = self.state.borrow_mut();
            match state.transcript.iter_mut().find(|t| t.id == id) {
                Some(turn) => {
                    turn.content = content.to_string();
                    true
                }
                None => false,
            }
        };
        if updated {
            self.event_bus.emit(AssistantEvent::TurnContent {
                turn_id: id,
                content: content.to_string(),
            });
        }
    }

    fn set_status(&self, ids: &[TurnId], status: TurnStatus) {
        {
            let mut state = self.state.borrow_mut();
            for turn in state.transcript.iter_mut().filter(|t| ids.contains(&t.id)) {
                turn.status = status;
            }
        }
        self.event_bus.emit(AssistantEvent::TurnStatusChanged {
            turn_ids: ids.to_vec(),
            status,
        });
    }

    fn prune_failed(&self) {
        let removed: Vec<TurnId> = {
            let mut state = self.state.borrow_mut();
            let removed = state
                .transcript
                .iter()
                .filter(|t| t.status == TurnStatus::Failed)
                .map(|t| t.id)
                .collect();
            state.transcript.retain(|t| t.status != TurnStatus::Failed);
            removed
        };
        if !removed.is_empty() {
            self.event_bus
                .emit(AssistantEvent::TurnsRemoved { turn_ids: removed });
        }
    }

    fn set_error(&self, message: String) {
        self.state.borrow_mut().last_error = Some(message.clone());
        self.event_bus.emit(AssistantEvent::Error { message });
    }

    fn clear_error(&self) {
        let had_error = self.state.borrow_mut().last_error.take().is_some();
        if had_error {
            self.event_bus.emit(AssistantEvent::ErrorCleared);
        }
    }
}
