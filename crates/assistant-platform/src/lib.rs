//! Browser adapters for the assistant-core ports.
//!
//! `api` talks to the conversation service over `fetch`; `storage`
//! provides the key-value backends behind the session cache and settings.

pub mod api;
pub mod storage;

#[cfg(test)]
mod tests;
