//! egui front end of the finance assistant.
//!
//! Panels render from [`state::UiState`] and report what the user did as
//! [`action::UiAction`]s; the app turns those into controller calls.

pub mod action;
pub mod state;
pub mod theme;
pub mod panels;
