//! User profile and the enums collected during onboarding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Languages the coach speaks. Threaded explicitly through every call that
/// produces user-facing text; there is no ambient locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Spanish,
}

impl Default for Language {
    fn default() -> Self {
        Self::English
    }
}

impl Language {
    /// Map a transport-provided language hint (e.g. "es", "es_MX") to a
    /// supported language. Unknown hints fall back to English.
    pub fn from_hint(hint: &str) -> Self {
        if hint.to_ascii_lowercase().starts_with("es") {
            Self::Spanish
        } else {
            Self::English
        }
    }
}

/// Gender as collected during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }
}

/// Self-reported activity level, one of five fixed categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::LightlyActive => 1.375,
            Self::ModeratelyActive => 1.55,
            Self::VeryActive => 1.725,
            Self::ExtremelyActive => 1.9,
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sedentary => "sedentary",
            Self::LightlyActive => "lightly_active",
            Self::ModeratelyActive => "moderately_active",
            Self::VeryActive => "very_active",
            Self::ExtremelyActive => "extremely_active",
        };
        write!(f, "{s}")
    }
}

/// Subscription lifecycle as far as the conversational core cares.
/// Billing itself lives with an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    /// User asked to cancel; awaiting yes/no confirmation.
    CancelPending,
    Cancelled,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// User profile built during onboarding and enriched over time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Transport-level sender identity; the key for all per-user state.
    pub user_id: String,
    pub name: String,
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<ActivityLevel>,
    /// Free text; empty string means no restrictions.
    #[serde(default)]
    pub dietary_restrictions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_workout_time: Option<String>,
    pub onboarded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription: SubscriptionStatus,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, language: Language) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            language,
            age: None,
            gender: None,
            current_weight_kg: None,
            target_weight_kg: None,
            height_cm: None,
            fitness_goals: None,
            activity_level: None,
            dietary_restrictions: String::new(),
            preferred_workout_time: None,
            onboarded: false,
            onboarded_at: None,
            subscription: SubscriptionStatus::default(),
        }
    }

    /// BMI from stored weight and height, if both are known.
    pub fn bmi(&self) -> Option<f64> {
        let weight = self.current_weight_kg?;
        let height_m = self.height_cm? / 100.0;
        if height_m <= 0.0 {
            return None;
        }
        Some(weight / (height_m * height_m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_hint() {
        assert_eq!(Language::from_hint("es"), Language::Spanish);
        assert_eq!(Language::from_hint("es_MX"), Language::Spanish);
        assert_eq!(Language::from_hint("en"), Language::English);
        assert_eq!(Language::from_hint("fr"), Language::English);
    }

    #[test]
    fn activity_multipliers() {
        assert_eq!(ActivityLevel::Sedentary.multiplier(), 1.2);
        assert_eq!(ActivityLevel::LightlyActive.multiplier(), 1.375);
        assert_eq!(ActivityLevel::ModeratelyActive.multiplier(), 1.55);
        assert_eq!(ActivityLevel::VeryActive.multiplier(), 1.725);
        assert_eq!(ActivityLevel::ExtremelyActive.multiplier(), 1.9);
    }

    #[test]
    fn gender_serde_uses_single_letter_codes() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"M\"");
        assert_eq!(serde_json::to_string(&Gender::Other).unwrap(), "\"O\"");
        let parsed: Gender = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(parsed, Gender::Female);
    }

    #[test]
    fn bmi_requires_both_measurements() {
        let mut profile = UserProfile::new("u1", Language::English);
        assert!(profile.bmi().is_none());
        profile.current_weight_kg = Some(80.0);
        profile.height_cm = Some(180.0);
        let bmi = profile.bmi().unwrap();
        assert!((bmi - 24.69).abs() < 0.01);
    }

    #[test]
    fn profile_serde_roundtrip() {
        let mut profile = UserProfile::new("wa-12345", Language::Spanish);
        profile.age = Some(30);
        profile.gender = Some(Gender::Male);
        profile.activity_level = Some(ActivityLevel::ModeratelyActive);
        profile.onboarded = true;

        let json = serde_json::to_string(&profile).unwrap();
        let parsed: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.user_id, "wa-12345");
        assert_eq!(parsed.language, Language::Spanish);
        assert_eq!(parsed.activity_level, Some(ActivityLevel::ModeratelyActive));
        assert!(parsed.onboarded);
    }
}
