pub mod envelope;
pub mod body;
pub mod http;

pub use http::HttpConversationService;
