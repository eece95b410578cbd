//! HTTP adapter for the conversation service.
//!
//! Uses browser `fetch()` via gloo-net. Every call is scoped to the
//! configured user id.

use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use assistant_core::ports::*;
use assistant_types::{
    AssistantError, Result,
    config::ApiConfig,
    conversation::{ConversationId, SessionInfo},
    turn::ChatMessage,
};

use super::body::byte_stream;
use super::envelope::*;

pub struct HttpConversationService {
    base_url: String,
    user_id: String,
}

impl HttpConversationService {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            base_url: config.normalized_base_url().to_string(),
            user_id: config.user_id.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn session_url(&self, id: &ConversationId, suffix: &str) -> String {
        let encoded: String = js_sys::encode_uri_component(id.as_str()).into();
        self.url(&format!("/api/session/{}{}", encoded, suffix))
    }

    fn user_query(&self) -> [(&str, &str); 1] {
        [("user_id", self.user_id.as_str())]
    }
}

fn network(e: gloo_net::Error) -> AssistantError {
    AssistantError::Network(e.to_string())
}

/// Read the body of `response` as an envelope and unwrap its `data`.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<ApiEnvelope<T>> {
    let status = response.status();
    let text = response.text().await.map_err(network)?;
    if !(200..300).contains(&status) {
        return Err(http_error(status, &text));
    }
    parse_envelope(&text)
}

#[async_trait(?Send)]
impl ConversationService for HttpConversationService {
    async fn health_check(&self) -> bool {
        let response = match Request::get(&self.url("/health")).send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Health check failed: {}", e);
                return false;
            }
        };
        if !response.ok() {
            log::warn!("Health check returned HTTP {}", response.status());
            return false;
        }
        match response.json::<HealthStatus>().await {
            Ok(health) => health.is_healthy(),
            Err(e) => {
                log::warn!("Health check body unreadable: {}", e);
                false
            }
        }
    }

    async fn create_conversation(&self) -> Result<ConversationId> {
        let response = Request::post(&self.url("/api/session/create"))
            .json(&json!({ "user_id": self.user_id }))
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;

        let created: SessionCreated = read_envelope(response).await?.into_data()?;
        Ok(ConversationId::from(created.session_id))
    }

    async fn list_conversations(&self) -> Result<Vec<SessionInfo>> {
        let response = Request::get(&self.url("/api/sessions"))
            .query(self.user_query())
            .send()
            .await
            .map_err(network)?;

        let list: SessionList = read_envelope(response).await?.into_data()?;
        list.into_sessions()
    }

    async fn conversation_messages(&self, id: &ConversationId) -> Result<Vec<ChatMessage>> {
        let response = Request::get(&self.session_url(id, ""))
            .query(self.user_query())
            .send()
            .await
            .map_err(network)?;

        let stored: SessionMessages = read_envelope(response).await?.into_data()?;
        Ok(stored.into_chat_messages())
    }

    async fn rename_conversation(&self, id: &ConversationId, title: &str) -> Result<bool> {
        let response = Request::put(&self.session_url(id, "/title"))
            .json(&json!({ "title": title, "user_id": self.user_id }))
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;

        read_envelope::<Value>(response).await?.into_result()?;
        Ok(true)
    }

    async fn delete_conversation(&self, id: &ConversationId) -> Result<bool> {
        let response = Request::delete(&self.session_url(id, ""))
            .query(self.user_query())
            .send()
            .await
            .map_err(network)?;

        read_envelope::<Value>(response).await?.into_result()?;
        Ok(true)
    }

    async fn delete_message(&self, id: &ConversationId, index: usize) -> Result<bool> {
        let response = Request::delete(&self.session_url(id, &format!("/message/{}", index)))
            .query(self.user_query())
            .send()
            .await
            .map_err(network)?;

        read_envelope::<Value>(response).await?.into_result()?;
        Ok(true)
    }

    async fn open_chat_stream(&self, req: ChatRequest) -> Result<ByteStream> {
        let mut body = json!({
            "messages": req.messages,
            "stream": req.stream,
            "user_id": self.user_id,
        });
        if let Some(id) = &req.conversation_id {
            body["session_id"] = json!(id);
        }

        let response = Request::post(&self.url("/api/chat"))
            .json(&body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;

        if !response.ok() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(http_error(status, &text));
        }

        let stream = response
            .body()
            .ok_or_else(|| AssistantError::Network("response has no body".to_string()))?;
        byte_stream(stream)
    }
}
