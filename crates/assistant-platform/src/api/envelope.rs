//! Response shapes of the conversation service.
//!
//! Every endpoint except `/health` and the chat stream answers with
//! `{"success": bool, "data": ..., "error": ...}`, usually with HTTP 200
//! even when `success` is false.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use assistant_types::{
    AssistantError, Result,
    conversation::SessionInfo,
    error::describe_error_payload,
    turn::{ChatMessage, Role},
};

/// Error code the service uses for unknown or foreign conversations
pub const NOT_FOUND_CODE: &str = "SESSION_NOT_FOUND";

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    /// `data` of a successful envelope (may be absent)
    pub fn into_result(self) -> Result<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(envelope_error(self.error.as_ref()))
        }
    }

    /// Like [`into_result`](Self::into_result) but `data` is required.
    pub fn into_data(self) -> Result<T> {
        self.into_result()?
            .ok_or_else(|| AssistantError::Serialization("response carries no data".to_string()))
    }
}

pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<ApiEnvelope<T>> {
    Ok(serde_json::from_str(body)?)
}

fn envelope_error(error: Option<&Value>) -> AssistantError {
    let code = error
        .and_then(|e| e.get("code"))
        .and_then(Value::as_str);
    let message = error.map(describe_error_payload).unwrap_or_default();
    match code {
        Some(NOT_FOUND_CODE) => AssistantError::NotFound(message),
        _ => AssistantError::Service(message),
    }
}

/// Error for a non-2xx response. The body's `error` field, when there is
/// one, becomes the message.
pub fn http_error(status: u16, body: &str) -> AssistantError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").filter(|e| !e.is_null()).map(describe_error_payload))
        .filter(|m| !m.trim().is_empty());
    AssistantError::Http { status, message }
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SessionCreated {
    pub session_id: String,
}

/// `data` of the list endpoint. A database failure is reported inside a
/// successful envelope as `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct SessionList {
    #[serde(default)]
    pub sessions: Vec<SessionInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionList {
    pub fn into_sessions(self) -> Result<Vec<SessionInfo>> {
        match self.error {
            Some(e) => Err(AssistantError::Service(e)),
            None => Ok(self.sessions),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoredMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionMessages {
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

impl SessionMessages {
    /// History as chat messages. Roles other than user/assistant are skipped.
    pub fn into_chat_messages(self) -> Vec<ChatMessage> {
        self.messages
            .into_iter()
            .filter_map(|m| {
                let role = match m.role.as_str() {
                    "user" => Role::User,
                    "assistant" => Role::Assistant,
                    other => {
                        log::debug!("Skipping stored message with role {}", other);
                        return None;
                    }
                };
                Some(ChatMessage {
                    role,
                    content: m.content,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
