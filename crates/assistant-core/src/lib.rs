//! Finance assistant core.
//!
//! Everything here is platform-free: the browser adapters implement the
//! traits in [`ports`] and the UI consumes [`event_bus`].

pub mod ports;
pub mod assembler;
pub mod session_store;
pub mod controller;
pub mod event_bus;
