//! Conversation orchestration.

pub mod controller;

pub use controller::DialogueController;
