//! Onboarding flow — applies one inbound message to a session.
//!
//! Pure with respect to storage: the caller loads the session, calls
//! [`apply_message`], persists (or deletes) the session, and delivers the
//! reply. Invalid input never mutates the session.

use serde_json::{Value, json};
use tracing::warn;

use crate::extract;
use crate::profile::{ActivityLevel, Gender, Language, UserProfile};
use crate::transport::Reply;

use super::prompts;
use super::state::{ConversationSession, OnboardingStep};

/// Result of applying one message to an onboarding session.
#[derive(Debug)]
pub struct FlowOutcome {
    pub reply: Reply,
    /// True exactly once, on the message that finishes the final step. The
    /// caller must then move the collected fields into the profile and
    /// delete the session.
    pub completed: bool,
}

impl FlowOutcome {
    fn reply(reply: Reply) -> Self {
        Self {
            reply,
            completed: false,
        }
    }
}

/// Apply one inbound message to the session, mutating it only on valid input.
pub fn apply_message(
    session: &mut ConversationSession,
    text: &str,
    language: Language,
) -> FlowOutcome {
    if session.step == OnboardingStep::Welcome {
        // First contact: any message starts the questionnaire.
        if session.advance().is_err() {
            warn!(user_id = %session.user_id, "welcome step had no successor");
        }
        return FlowOutcome::reply(Reply::text(prompts::welcome_greeting("", language)));
    }

    let Some(field) = session.next_missing_field() else {
        // Every field of the current step is already stored; this only
        // happens if a previous advance failed to persist. Re-advance.
        return advance_and_prompt(session, language);
    };

    let value = match parse_field(field, text, language) {
        Ok(value) => value,
        Err(reply) => return FlowOutcome::reply(reply),
    };
    session.store_field(field, value);

    match session.next_missing_field() {
        Some(next) => FlowOutcome::reply(prompts::field_prompt(next, language)),
        None => advance_and_prompt(session, language),
    }
}

fn advance_and_prompt(session: &mut ConversationSession, language: Language) -> FlowOutcome {
    match session.advance() {
        Ok(step) if step.is_terminal() => FlowOutcome {
            reply: prompts::completion_message(language),
            completed: true,
        },
        Ok(step) => FlowOutcome::reply(prompts::step_prompt(step, language)),
        Err(reason) => {
            warn!(user_id = %session.user_id, %reason, "onboarding advance failed");
            FlowOutcome::reply(prompts::step_prompt(session.step, language))
        }
    }
}

/// Validate raw text for one field. On failure returns the corrective reply
/// to send; the session stays untouched.
fn parse_field(field: &str, text: &str, language: Language) -> Result<Value, Reply> {
    let corrective = || prompts::corrective(field, language);
    match field {
        "age" => extract::parse_age(text)
            .map(|age| json!(age))
            .map_err(|_| corrective()),
        "gender" => extract::parse_gender(text)
            .map(|gender| json!(gender.code()))
            .map_err(|_| corrective()),
        "weight" | "target_weight" => extract::parse_weight_kg(text)
            .map(|kg| json!(kg))
            .map_err(|_| corrective()),
        "height" => extract::parse_height_cm(text)
            .map(|cm| json!(cm))
            .map_err(|_| corrective()),
        "goals" => extract::parse_goals(text)
            .map(|goals| json!(goals))
            .map_err(|_| corrective()),
        "activity_level" => parse_activity_choice(text)
            .map(|level| json!(level))
            .ok_or_else(corrective),
        "dietary_restrictions" => Ok(json!(extract::parse_dietary(text))),
        "preferred_workout_time" => parse_workout_time(text, language).ok_or_else(corrective),
        other => {
            warn!(field = other, "unknown onboarding field");
            Err(corrective())
        }
    }
}

/// Activity level by keyword, or by the 1-5 index of the numbered list.
fn parse_activity_choice(text: &str) -> Option<ActivityLevel> {
    if let Ok(level) = extract::parse_activity_level(text) {
        return Some(level);
    }
    let levels = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtremelyActive,
    ];
    match text.trim().parse::<usize>() {
        Ok(n) if (1..=levels.len()).contains(&n) => Some(levels[n - 1]),
        _ => None,
    }
}

/// Workout time: the 1-6 index of the numbered list, or free text.
fn parse_workout_time(text: &str, language: Language) -> Option<Value> {
    let options = prompts::workout_time_options(language);
    if let Ok(n) = text.trim().parse::<usize>() {
        if (1..=options.len()).contains(&n) {
            return Some(json!(options[n - 1]));
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(json!(trimmed))
    }
}

/// Move the collected session fields into the profile. Called once, when the
/// flow reports completion.
pub fn apply_fields(profile: &mut UserProfile, session: &ConversationSession) {
    let fields = &session.fields;
    if let Some(age) = fields.get("age").and_then(Value::as_u64) {
        profile.age = Some(age as u32);
    }
    if let Some(code) = fields.get("gender").and_then(Value::as_str) {
        profile.gender = match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            "O" => Some(Gender::Other),
            _ => None,
        };
    }
    if let Some(kg) = fields.get("weight").and_then(Value::as_f64) {
        profile.current_weight_kg = Some(kg);
    }
    if let Some(kg) = fields.get("target_weight").and_then(Value::as_f64) {
        profile.target_weight_kg = Some(kg);
    }
    if let Some(cm) = fields.get("height").and_then(Value::as_f64) {
        profile.height_cm = Some(cm);
    }
    if let Some(goals) = fields.get("goals").and_then(Value::as_str) {
        profile.fitness_goals = Some(goals.to_string());
    }
    if let Some(level) = fields
        .get("activity_level")
        .and_then(|v| serde_json::from_value::<ActivityLevel>(v.clone()).ok())
    {
        profile.activity_level = Some(level);
    }
    if let Some(diet) = fields.get("dietary_restrictions").and_then(Value::as_str) {
        profile.dietary_restrictions = diet.to_string();
    }
    if let Some(time) = fields.get("preferred_workout_time").and_then(Value::as_str) {
        profile.preferred_workout_time = Some(time.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(step: OnboardingStep) -> ConversationSession {
        let mut session = ConversationSession::new("u1");
        session.step = step;
        session
    }

    #[test]
    fn first_message_greets_and_starts_personal_info() {
        let mut session = ConversationSession::new("u1");
        let outcome = apply_message(&mut session, "hello", Language::English);
        assert_eq!(session.step, OnboardingStep::PersonalInfo);
        assert!(!outcome.completed);
        assert!(outcome.reply.text.contains("how old are you?"));
    }

    #[test]
    fn invalid_age_sends_corrective_without_mutation() {
        let mut session = session_at(OnboardingStep::PersonalInfo);
        let outcome = apply_message(&mut session, "I'm 12", Language::English);
        assert_eq!(session.step, OnboardingStep::PersonalInfo);
        assert!(session.fields.is_empty());
        assert!(outcome.reply.text.contains("between 13 and 100"));
    }

    #[test]
    fn personal_info_collects_age_then_gender_then_advances() {
        let mut session = session_at(OnboardingStep::PersonalInfo);

        let outcome = apply_message(&mut session, "I'm 30", Language::English);
        assert_eq!(session.fields["age"], json!(30));
        assert!(outcome.reply.text.contains("gender"));
        assert_eq!(session.step, OnboardingStep::PersonalInfo);

        let outcome = apply_message(&mut session, "male", Language::English);
        assert_eq!(session.fields["gender"], json!("M"));
        assert_eq!(session.step, OnboardingStep::PhysicalInfo);
        assert!(outcome.reply.text.contains("current weight"));
    }

    #[test]
    fn physical_info_walks_three_fields_then_asks_goals() {
        let mut session = session_at(OnboardingStep::PhysicalInfo);

        let outcome = apply_message(&mut session, "80", Language::English);
        assert!(outcome.reply.text.contains("height"));
        let outcome = apply_message(&mut session, "180", Language::English);
        assert!(outcome.reply.text.contains("target weight"));
        let outcome = apply_message(&mut session, "75", Language::English);

        assert_eq!(session.step, OnboardingStep::Goals);
        assert!(outcome.reply.text.to_lowercase().contains("goals"));
        assert_eq!(session.fields["weight"], json!(80.0));
        assert_eq!(session.fields["height"], json!(180.0));
        assert_eq!(session.fields["target_weight"], json!(75.0));
    }

    #[test]
    fn activity_level_accepts_numbered_choice() {
        let mut session = session_at(OnboardingStep::ActivityLevel);
        apply_message(&mut session, "3", Language::English);
        assert_eq!(session.fields["activity_level"], json!("moderately_active"));
        assert_eq!(session.step, OnboardingStep::DietaryInfo);
    }

    #[test]
    fn final_step_completes_exactly_once() {
        let mut session = session_at(OnboardingStep::Preferences);
        let outcome = apply_message(&mut session, "2", Language::English);
        assert!(outcome.completed);
        assert_eq!(session.step, OnboardingStep::Complete);
        assert_eq!(
            session.fields["preferred_workout_time"],
            json!("Morning (7-9 AM)")
        );
    }

    #[test]
    fn corrective_is_localized() {
        let mut session = session_at(OnboardingStep::PersonalInfo);
        let outcome = apply_message(&mut session, "doscientos", Language::Spanish);
        assert!(outcome.reply.text.contains("edad válida"));
    }

    #[test]
    fn collected_fields_transfer_to_profile() {
        let mut session = session_at(OnboardingStep::PersonalInfo);
        for text in ["30", "male", "80", "180", "75", "lose weight and gain muscle", "3", "none", "2"] {
            apply_message(&mut session, text, Language::English);
        }
        assert_eq!(session.step, OnboardingStep::Complete);

        let mut profile = UserProfile::new("u1", Language::English);
        apply_fields(&mut profile, &session);
        assert_eq!(profile.age, Some(30));
        assert_eq!(profile.gender, Some(Gender::Male));
        assert_eq!(profile.current_weight_kg, Some(80.0));
        assert_eq!(profile.height_cm, Some(180.0));
        assert_eq!(profile.target_weight_kg, Some(75.0));
        assert_eq!(profile.activity_level, Some(ActivityLevel::ModeratelyActive));
        assert_eq!(profile.dietary_restrictions, "");
        assert_eq!(profile.preferred_workout_time.as_deref(), Some("Morning (7-9 AM)"));
    }
}
