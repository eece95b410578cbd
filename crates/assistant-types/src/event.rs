use serde::{Deserialize, Serialize};

use crate::conversation::{ConversationId, ConversationSummary};
use crate::turn::{Turn, TurnId, TurnStatus};

/// Events emitted by the conversation controller.
/// UI subscribes to these for reactive updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssistantEvent {
    /// A request started or finished
    LoadingChanged { loading: bool },

    /// A turn was appended to the transcript
    TurnAppended { turn: Turn },

    /// The in-flight assistant turn has new display content
    TurnContent { turn_id: TurnId, content: String },

    /// Turns changed lifecycle state
    TurnStatusChanged { turn_ids: Vec<TurnId>, status: TurnStatus },

    /// Turns were removed (rollback or message deletion)
    TurnsRemoved { turn_ids: Vec<TurnId> },

    /// Transcript replaced wholesale (switch, reset)
    TranscriptReplaced {
        conversation_id: Option<ConversationId>,
        turns: Vec<Turn>,
    },

    /// The service assigned an id to the active conversation
    ConversationStarted { conversation_id: ConversationId },

    /// The conversation list was reloaded (live or from cache)
    SummariesRefreshed { summaries: Vec<ConversationSummary> },

    /// Result of the latest health check
    ServiceAvailability { available: bool },

    /// A human-readable failure for the error banner
    Error { message: String },

    /// The error banner should be cleared
    ErrorCleared,
}
