//! Onboarding — the fixed data-collection conversation for new users.

pub mod flow;
pub mod prompts;
pub mod state;

pub use flow::{FlowOutcome, apply_fields, apply_message};
pub use state::{ConversationSession, OnboardingStep};
