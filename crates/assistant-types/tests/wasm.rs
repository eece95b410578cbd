//! WASM-target tests for assistant-types.
//!
//! Runs the wire-shape checks under wasm32-unknown-unknown
//! via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use assistant_types::turn::*;
use assistant_types::conversation::*;
use assistant_types::config::*;
use assistant_types::error::*;

// ─── Turn Tests ──────────────────────────────────────────

#[wasm_bindgen_test]
fn turn_timestamp_is_rfc3339() {
    let turn = Turn::new(TurnId(1), Role::User, "hello", TurnStatus::Pending);
    assert!(chrono::DateTime::parse_from_rfc3339(&turn.timestamp).is_ok());
    assert_eq!(turn.display_time().len(), 5);
}

#[wasm_bindgen_test]
fn chat_message_roundtrip() {
    let json = serde_json::to_string(&ChatMessage::assistant("大盘今日上涨")).unwrap();
    let msg: ChatMessage = serde_json::from_str(&json).unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.content, "大盘今日上涨");
}

// ─── Conversation Tests ──────────────────────────────────

#[wasm_bindgen_test]
fn session_info_list_to_summaries() {
    let infos: Vec<SessionInfo> = serde_json::from_str(
        r#"[{"session_id":"a","title":"基金","updated_at":"2026-01-02T03:04:05","message_count":2},
            {"session_id":"b","message_count":0}]"#,
    )
    .unwrap();
    let summaries: Vec<ConversationSummary> = infos.into_iter().map(Into::into).collect();
    assert_eq!(summaries[0].title, "基金");
    assert_eq!(summaries[0].display_date(), "1月2日");
    assert_eq!(summaries[1].title, PLACEHOLDER_TITLE);
}

// ─── Config / Error Tests ────────────────────────────────

#[wasm_bindgen_test]
fn config_default_roundtrip() {
    let json = serde_json::to_vec(&AssistantConfig::default()).unwrap();
    let config: AssistantConfig = serde_json::from_slice(&json).unwrap();
    assert_eq!(config, AssistantConfig::default());
}

#[wasm_bindgen_test]
fn unavailable_message() {
    assert_eq!(
        AssistantError::Unavailable.user_message(),
        "后端服务不可用，请检查服务是否运行"
    );
}
