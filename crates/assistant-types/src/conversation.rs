use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Title shown for conversations the service never named
pub const PLACEHOLDER_TITLE: &str = "未命名会话";

/// Opaque conversation identifier assigned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ConversationId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entry of the conversation list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(alias = "session_id")]
    pub id: ConversationId,
    #[serde(default = "placeholder_title", deserialize_with = "deserialize_title")]
    pub title: String,
    #[serde(default, alias = "updated_at")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub message_count: usize,
}

impl ConversationSummary {
    /// Month/day label, e.g. "3月7日". Empty when the timestamp is absent or unreadable.
    pub fn display_date(&self) -> String {
        self.last_updated
            .as_deref()
            .and_then(parse_timestamp)
            .map(|dt| dt.format("%-m月%-d日").to_string())
            .unwrap_or_default()
    }
}

impl From<SessionInfo> for ConversationSummary {
    fn from(info: SessionInfo) -> Self {
        Self {
            id: ConversationId(info.session_id),
            title: normalize_title(info.title.as_deref()),
            last_updated: info.updated_at,
            message_count: info.message_count,
        }
    }
}

/// Conversation record as listed by the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub message_count: usize,
}

/// Missing or blank titles become [`PLACEHOLDER_TITLE`].
pub fn normalize_title(title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => PLACEHOLDER_TITLE.to_string(),
    }
}

fn placeholder_title() -> String {
    PLACEHOLDER_TITLE.to_string()
}

fn deserialize_title<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(normalize_title(raw.as_deref()))
}

/// The service emits RFC 3339 as well as offset-less ISO timestamps.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
