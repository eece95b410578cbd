#[cfg(test)]
mod tests {
    use crate::api::envelope::*;
    use crate::storage::MemoryStorage;
    use assistant_core::ports::StoragePort;
    use assistant_types::AssistantError;
    use assistant_types::turn::Role;
    use futures::executor::block_on;
    use serde_json::Value;

    // ─── Envelope Tests ──────────────────────────────────────

    #[test]
    fn test_envelope_success_data() {
        let env: ApiEnvelope<SessionCreated> =
            parse_envelope(r#"{"success":true,"data":{"session_id":"abc"}}"#).unwrap();
        assert_eq!(env.into_data().unwrap().session_id, "abc");
    }

    #[test]
    fn test_envelope_success_without_data() {
        let env: ApiEnvelope<Value> = parse_envelope(r#"{"success":true}"#).unwrap();
        assert_eq!(env.into_result().unwrap(), None);

        let env: ApiEnvelope<SessionCreated> = parse_envelope(r#"{"success":true}"#).unwrap();
        assert!(matches!(env.into_data(), Err(AssistantError::Serialization(_))));
    }

    #[test]
    fn test_envelope_not_found_code() {
        let env: ApiEnvelope<SessionMessages> = parse_envelope(
            r#"{"success":false,"error":{"code":"SESSION_NOT_FOUND","message":"Session not found or not owned by user"}}"#,
        )
        .unwrap();
        assert_eq!(
            env.into_data().unwrap_err(),
            AssistantError::NotFound("Session not found or not owned by user".to_string())
        );
    }

    #[test]
    fn test_envelope_other_error_is_service() {
        let env: ApiEnvelope<Value> = parse_envelope(
            r#"{"success":false,"error":{"code":"SESSION_ERROR","message":"Session not found"}}"#,
        )
        .unwrap();
        assert_eq!(
            env.into_result().unwrap_err(),
            AssistantError::Service("Session not found".to_string())
        );

        let env: ApiEnvelope<Value> =
            parse_envelope(r#"{"success":false,"error":"boom"}"#).unwrap();
        assert_eq!(env.into_result().unwrap_err(), AssistantError::Service("boom".to_string()));
    }

    #[test]
    fn test_envelope_not_json() {
        let result = parse_envelope::<Value>("<html>502</html>");
        assert!(matches!(result, Err(AssistantError::Serialization(_))));
    }

    #[test]
    fn test_http_error_extracts_message() {
        assert_eq!(
            http_error(400, r#"{"error":"Messages is required"}"#),
            AssistantError::Http {
                status: 400,
                message: Some("Messages is required".to_string()),
            }
        );
        assert_eq!(
            http_error(502, "Bad Gateway"),
            AssistantError::Http { status: 502, message: None }
        );
        assert_eq!(
            http_error(500, r#"{"error":null}"#),
            AssistantError::Http { status: 500, message: None }
        );
    }

    #[test]
    fn test_session_list_payload() {
        let env: ApiEnvelope<SessionList> = parse_envelope(
            r#"{"success":true,"data":{"sessions":[
                {"session_id":"s1","title":"行情","created_at":"2026-03-07T09:00:00","updated_at":"2026-03-07T10:00:00"},
                {"session_id":"s2","title":null,"created_at":null,"updated_at":null}
            ]}}"#,
        )
        .unwrap();
        let sessions = env.into_data().unwrap().into_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].title.as_deref(), Some("行情"));
        assert!(sessions[1].title.is_none());
    }

    #[test]
    fn test_session_list_embedded_error() {
        let env: ApiEnvelope<SessionList> =
            parse_envelope(r#"{"success":true,"data":{"error":"database is locked"}}"#).unwrap();
        assert_eq!(
            env.into_data().unwrap().into_sessions().unwrap_err(),
            AssistantError::Service("database is locked".to_string())
        );
    }

    #[test]
    fn test_session_messages_skip_unknown_roles() {
        let env: ApiEnvelope<SessionMessages> = parse_envelope(
            r#"{"success":true,"data":{"messages":[
                {"role":"system","content":"你是财经助手"},
                {"role":"user","content":"如何选择基金？"},
                {"role":"assistant","content":"先看费率"}
            ]}}"#,
        )
        .unwrap();
        let messages = env.into_data().unwrap().into_chat_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].content, "先看费率");
    }

    #[test]
    fn test_health_status() {
        let ok: HealthStatus = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(ok.is_healthy());
        let degraded: HealthStatus = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!degraded.is_healthy());
        let empty: HealthStatus = serde_json::from_str("{}").unwrap();
        assert!(!empty.is_healthy());
    }

    // ─── MemoryStorage Tests ─────────────────────────────────

    #[test]
    fn test_memory_storage_set_get_delete() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        block_on(storage.set("assistant:last_session_id", b"s1")).unwrap();
        assert_eq!(
            block_on(storage.get("assistant:last_session_id")).unwrap(),
            Some(b"s1".to_vec())
        );
        assert!(block_on(storage.exists("assistant:last_session_id")).unwrap());
        assert_eq!(storage.len(), 1);

        block_on(storage.delete("assistant:last_session_id")).unwrap();
        assert!(block_on(storage.get("assistant:last_session_id")).unwrap().is_none());
        assert_eq!(storage.backend_name(), "memory");
    }
}
