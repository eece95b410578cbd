use assistant_types::conversation::ConversationId;

/// Something the user asked for that needs the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Send(String),
    NewConversation,
    SwitchConversation(ConversationId),
    RenameConversation { id: ConversationId, title: String },
    DeleteConversation(ConversationId),
    DeleteTurn(usize),
    /// Re-run the start-up health check and restore
    Reconnect,
}
