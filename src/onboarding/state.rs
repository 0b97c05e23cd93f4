//! Onboarding state machine — tracks which data-collection step the user is in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The steps of the onboarding conversation.
///
/// Progresses linearly: Welcome → PersonalInfo → PhysicalInfo → Goals →
/// ActivityLevel → DietaryInfo → Preferences → Complete. `Complete` is
/// terminal and never stored; the session is deleted on reaching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Welcome,
    PersonalInfo,
    PhysicalInfo,
    Goals,
    ActivityLevel,
    DietaryInfo,
    Preferences,
    Complete,
}

impl OnboardingStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (Welcome, PersonalInfo)
                | (PersonalInfo, PhysicalInfo)
                | (PhysicalInfo, Goals)
                | (Goals, ActivityLevel)
                | (ActivityLevel, DietaryInfo)
                | (DietaryInfo, Preferences)
                | (Preferences, Complete)
        )
    }

    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Welcome => Some(PersonalInfo),
            PersonalInfo => Some(PhysicalInfo),
            PhysicalInfo => Some(Goals),
            Goals => Some(ActivityLevel),
            ActivityLevel => Some(DietaryInfo),
            DietaryInfo => Some(Preferences),
            Preferences => Some(Complete),
            Complete => None,
        }
    }

    /// Fields this step collects, in the order they are asked.
    pub fn required_fields(&self) -> &'static [&'static str] {
        use OnboardingStep::*;
        match self {
            Welcome | Complete => &[],
            PersonalInfo => &["age", "gender"],
            PhysicalInfo => &["weight", "height", "target_weight"],
            Goals => &["goals"],
            ActivityLevel => &["activity_level"],
            DietaryInfo => &["dietary_restrictions"],
            Preferences => &["preferred_workout_time"],
        }
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::PersonalInfo => "personal_info",
            Self::PhysicalInfo => "physical_info",
            Self::Goals => "goals",
            Self::ActivityLevel => "activity_level",
            Self::DietaryInfo => "dietary_info",
            Self::Preferences => "preferences",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

/// Transient per-user record tracking progress through the data-collection
/// state machine. Created on first contact, deleted exactly once on
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub user_id: String,
    pub step: OnboardingStep,
    /// Validated fields collected so far. A field is only written after it
    /// passed its step's constraint, and never rewritten.
    pub fields: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            step: OnboardingStep::default(),
            fields: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The first field of the current step that has not been collected yet.
    pub fn next_missing_field(&self) -> Option<&'static str> {
        self.step
            .required_fields()
            .iter()
            .find(|f| !self.fields.contains_key(**f))
            .copied()
    }

    /// Store a validated field value. Writes to an already-collected field
    /// are ignored so that duplicate message delivery stays idempotent.
    pub fn store_field(&mut self, name: &str, value: Value) {
        if !self.fields.contains_key(name) {
            self.fields.insert(name.to_string(), value);
            self.updated_at = Utc::now();
        }
    }

    /// Advance to the next step. Returns an error string if already terminal
    /// or the transition is not on the fixed path.
    pub fn advance(&mut self) -> Result<OnboardingStep, String> {
        let next = self
            .step
            .next()
            .ok_or_else(|| "Already at terminal step".to_string())?;
        if !self.step.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.step, next));
        }
        self.step = next;
        self.updated_at = Utc::now();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use OnboardingStep::*;
        let transitions = [
            (Welcome, PersonalInfo),
            (PersonalInfo, PhysicalInfo),
            (PhysicalInfo, Goals),
            (Goals, ActivityLevel),
            (ActivityLevel, DietaryInfo),
            (DietaryInfo, Preferences),
            (Preferences, Complete),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use OnboardingStep::*;
        // Skip steps
        assert!(!Welcome.can_transition_to(Goals));
        assert!(!PersonalInfo.can_transition_to(ActivityLevel));
        // Go backward
        assert!(!Goals.can_transition_to(PhysicalInfo));
        // Terminal
        assert!(!Complete.can_transition_to(Welcome));
        // Self-transition
        assert!(!PhysicalInfo.can_transition_to(PhysicalInfo));
    }

    #[test]
    fn next_walks_all_steps() {
        use OnboardingStep::*;
        let expected = [
            PersonalInfo,
            PhysicalInfo,
            Goals,
            ActivityLevel,
            DietaryInfo,
            Preferences,
            Complete,
        ];
        let mut current = Welcome;
        for expected_next in expected {
            let next = current.next().unwrap();
            assert_eq!(next, expected_next);
            current = next;
        }
        assert!(current.next().is_none());
    }

    #[test]
    fn field_suborder_within_steps() {
        let mut session = ConversationSession::new("u1");
        session.step = OnboardingStep::PersonalInfo;
        assert_eq!(session.next_missing_field(), Some("age"));
        session.store_field("age", serde_json::json!(30));
        assert_eq!(session.next_missing_field(), Some("gender"));
        session.store_field("gender", serde_json::json!("M"));
        assert_eq!(session.next_missing_field(), None);
    }

    #[test]
    fn duplicate_field_write_is_ignored() {
        let mut session = ConversationSession::new("u1");
        session.step = OnboardingStep::PersonalInfo;
        session.store_field("age", serde_json::json!(30));
        session.store_field("age", serde_json::json!(99));
        assert_eq!(session.fields["age"], serde_json::json!(30));
    }

    #[test]
    fn display_matches_serde() {
        use OnboardingStep::*;
        for step in [
            Welcome,
            PersonalInfo,
            PhysicalInfo,
            Goals,
            ActivityLevel,
            DietaryInfo,
            Preferences,
            Complete,
        ] {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn session_serde_roundtrip() {
        let mut session = ConversationSession::new("wa-77");
        session.step = OnboardingStep::Goals;
        session.store_field("age", serde_json::json!(28));

        let json = serde_json::to_string(&session).unwrap();
        let parsed: ConversationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.step, OnboardingStep::Goals);
        assert_eq!(parsed.fields["age"], serde_json::json!(28));
    }
}
