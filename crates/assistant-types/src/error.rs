use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssistantError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("HTTP {status}{}", http_detail(.message))]
    Http { status: u16, message: Option<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Another request is still in flight")]
    Busy,

    #[error("Message is empty")]
    EmptyInput,

    #[error("Service unavailable")]
    Unavailable,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("{0}")]
    Other(String),
}

fn http_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl AssistantError {
    /// Text suitable for the error banner.
    ///
    /// Transport problems get a retry hint; messages reported by the
    /// service are passed through when present.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::Network(_) | AssistantError::JsInterop(_) => {
                "网络连接失败，请检查网络后重试".to_string()
            }
            AssistantError::Service(msg) if !msg.trim().is_empty() => msg.clone(),
            AssistantError::Service(_) => "服务处理失败，请稍后重试".to_string(),
            AssistantError::Http {
                message: Some(msg),
                ..
            } if !msg.trim().is_empty() => msg.clone(),
            AssistantError::Http { status, .. } => {
                format!("服务器错误 (HTTP {})，请稍后重试", status)
            }
            AssistantError::NotFound(_) => "会话不存在或已被删除".to_string(),
            AssistantError::Busy => "正在处理上一个请求，请稍候".to_string(),
            AssistantError::EmptyInput => "请输入消息内容".to_string(),
            AssistantError::Unavailable => "后端服务不可用，请检查服务是否运行".to_string(),
            _ => "操作失败，请重试".to_string(),
        }
    }

    /// Transport-level failures, as opposed to answers from the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, AssistantError::Network(_) | AssistantError::JsInterop(_))
    }
}

/// Message carried by a service error payload.
///
/// The service reports errors either as a bare string or as
/// `{"code": ..., "message": ...}`.
pub fn describe_error_payload(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<serde_json::Error> for AssistantError {
    fn from(e: serde_json::Error) -> Self {
        AssistantError::Serialization(e.to_string())
    }
}
