//! Port traits: the boundary between core and platform.
//!
//! These traits are defined here in `assistant-core` (pure Rust).
//! Implementations live in `assistant-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use assistant_types::{
    Result,
    conversation::{ConversationId, SessionInfo},
    turn::ChatMessage,
};

// ─── Conversation Service Port ───────────────────────────────

/// Raw body of a streamed chat completion. Finite, not restartable.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// Chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Full history of the active conversation, oldest first
    pub messages: Vec<ChatMessage>,
    pub conversation_id: Option<ConversationId>,
    pub stream: bool,
}

/// Remote conversation service. Every call is scoped to the account the
/// adapter was configured with.
#[async_trait(?Send)]
pub trait ConversationService {
    /// Reachability probe. Any failure counts as unhealthy.
    async fn health_check(&self) -> bool;

    async fn create_conversation(&self) -> Result<ConversationId>;

    /// Conversations, most recently updated first
    async fn list_conversations(&self) -> Result<Vec<SessionInfo>>;

    /// Stored history of one conversation.
    /// Unknown ids fail with `AssistantError::NotFound`.
    async fn conversation_messages(&self, id: &ConversationId) -> Result<Vec<ChatMessage>>;

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> Result<bool>;

    async fn delete_conversation(&self, id: &ConversationId) -> Result<bool>;

    /// Delete the message at `index` of a stored conversation
    async fn delete_message(&self, id: &ConversationId, index: usize) -> Result<bool>;

    /// Start a chat completion and hand back its body as it arrives.
    /// Non-2xx responses fail here, before any byte is read.
    async fn open_chat_stream(&self, req: ChatRequest) -> Result<ByteStream>;
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
