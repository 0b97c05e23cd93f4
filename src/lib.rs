//! fitcoach — conversational AI personal trainer core.
//!
//! A transport-agnostic engine for a WhatsApp-style coaching bot: a fixed
//! onboarding questionnaire, deterministic intent routing, versioned workout
//! and nutrition plans, and a generation seam with guaranteed fallbacks.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod extract;
pub mod genai;
pub mod intent;
pub mod onboarding;
pub mod plan;
pub mod profile;
pub mod scheduler;
pub mod store;
pub mod transport;

pub use config::CoachConfig;
pub use dialogue::DialogueController;
pub use error::{Error, Result};
