//! Field extractors — pure functions turning raw message text into typed,
//! range-checked values for the onboarding flow.

use regex::Regex;

use crate::error::ValidationError;
use crate::profile::{ActivityLevel, Gender};

pub const AGE_MIN: i64 = 13;
pub const AGE_MAX: i64 = 100;
pub const WEIGHT_MIN_KG: f64 = 30.0;
pub const WEIGHT_MAX_KG: f64 = 300.0;
pub const HEIGHT_MIN_CM: f64 = 120.0;
pub const HEIGHT_MAX_CM: f64 = 250.0;
pub const GOALS_MIN_CHARS: usize = 10;

/// First integer token in the text, if any.
pub fn extract_int(text: &str) -> Option<i64> {
    let re = Regex::new(r"\d+").expect("static regex");
    re.find(text)?.as_str().parse().ok()
}

/// First decimal token in the text, if any.
pub fn extract_decimal(text: &str) -> Option<f64> {
    let re = Regex::new(r"\d+\.?\d*").expect("static regex");
    re.find(text)?.as_str().parse().ok()
}

/// Parse an age in years, enforcing the [13, 100] range.
pub fn parse_age(text: &str) -> Result<u32, ValidationError> {
    let value = extract_int(text).ok_or(ValidationError::NotANumber)?;
    if (AGE_MIN..=AGE_MAX).contains(&value) {
        Ok(value as u32)
    } else {
        Err(ValidationError::AgeOutOfRange {
            value,
            min: AGE_MIN,
            max: AGE_MAX,
        })
    }
}

/// Parse a body weight (current or target) in kilograms, range [30, 300].
pub fn parse_weight_kg(text: &str) -> Result<f64, ValidationError> {
    let value = extract_decimal(text).ok_or(ValidationError::NotANumber)?;
    if (WEIGHT_MIN_KG..=WEIGHT_MAX_KG).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::WeightOutOfRange {
            value,
            min: WEIGHT_MIN_KG,
            max: WEIGHT_MAX_KG,
        })
    }
}

/// Parse a height in centimeters, range [120, 250].
pub fn parse_height_cm(text: &str) -> Result<f64, ValidationError> {
    let value = extract_decimal(text).ok_or(ValidationError::NotANumber)?;
    if (HEIGHT_MIN_CM..=HEIGHT_MAX_CM).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::HeightOutOfRange {
            value,
            min: HEIGHT_MIN_CM,
            max: HEIGHT_MAX_CM,
        })
    }
}

/// Parse a gender token. Recognizes English and Spanish vocabulary.
pub fn parse_gender(text: &str) -> Result<Gender, ValidationError> {
    let lower = text.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if has(&["male", "man", "boy", "masculino", "hombre"]) && !has(&["female", "woman", "femenino", "mujer"]) {
        Ok(Gender::Male)
    } else if has(&["female", "woman", "girl", "femenino", "mujer"]) {
        Ok(Gender::Female)
    } else if has(&["other", "otro", "non-binary", "prefer not"]) {
        Ok(Gender::Other)
    } else if lower.trim() == "m" {
        Ok(Gender::Male)
    } else if lower.trim() == "f" {
        Ok(Gender::Female)
    } else if lower.trim() == "o" {
        Ok(Gender::Other)
    } else {
        Err(ValidationError::UnknownGender)
    }
}

/// Match one of the five activity categories by keyword.
pub fn parse_activity_level(text: &str) -> Result<ActivityLevel, ValidationError> {
    let lower = text.to_lowercase();
    // Ordered: more specific keywords first so "extremely active" does not
    // match on "active" alone.
    let mapping: &[(&str, ActivityLevel)] = &[
        ("sedentary", ActivityLevel::Sedentary),
        ("sedentario", ActivityLevel::Sedentary),
        ("lightly", ActivityLevel::LightlyActive),
        ("ligeramente", ActivityLevel::LightlyActive),
        ("moderately", ActivityLevel::ModeratelyActive),
        ("moderadamente", ActivityLevel::ModeratelyActive),
        ("extremely", ActivityLevel::ExtremelyActive),
        ("extremadamente", ActivityLevel::ExtremelyActive),
        ("very", ActivityLevel::VeryActive),
        ("muy", ActivityLevel::VeryActive),
    ];
    for (keyword, level) in mapping {
        if lower.contains(keyword) {
            return Ok(*level);
        }
    }
    Err(ValidationError::UnknownActivityLevel)
}

/// Parse a yes/no answer. Returns `None` when the text is neither.
pub fn parse_yes_no(text: &str) -> Option<bool> {
    let lower = text.trim().to_lowercase();
    let yes = ["yes", "y", "yeah", "yep", "sure", "ok", "sí", "si", "claro"];
    let no = ["no", "n", "nope", "nah", "cancel that"];
    if yes.iter().any(|w| lower == *w || lower.starts_with(&format!("{w} "))) {
        Some(true)
    } else if no.iter().any(|w| lower == *w || lower.starts_with(&format!("{w} "))) {
        Some(false)
    } else {
        None
    }
}

/// Validate goals free text: must carry more than 10 characters.
pub fn parse_goals(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.chars().count() > GOALS_MIN_CHARS {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::GoalsTooShort {
            len: trimmed.chars().count(),
            min: GOALS_MIN_CHARS,
        })
    }
}

/// Normalize dietary restrictions: a literal "none" (any case) means empty.
pub fn parse_dietary(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("ninguna") {
        String::new()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_number() {
        assert_eq!(extract_int("I am 34 years old"), Some(34));
        assert_eq!(extract_decimal("around 75.5 kg now"), Some(75.5));
        assert_eq!(extract_int("no digits here"), None);
    }

    #[test]
    fn age_range_enforced() {
        assert_eq!(parse_age("25").unwrap(), 25);
        assert_eq!(parse_age("I'm 13").unwrap(), 13);
        assert_eq!(parse_age("100 years").unwrap(), 100);
        assert!(matches!(
            parse_age("12"),
            Err(ValidationError::AgeOutOfRange { value: 12, .. })
        ));
        assert!(matches!(
            parse_age("101"),
            Err(ValidationError::AgeOutOfRange { value: 101, .. })
        ));
        assert_eq!(parse_age("old"), Err(ValidationError::NotANumber));
    }

    #[test]
    fn weight_and_height_ranges() {
        assert_eq!(parse_weight_kg("82.4").unwrap(), 82.4);
        assert!(parse_weight_kg("29.9").is_err());
        assert!(parse_weight_kg("301").is_err());
        assert_eq!(parse_height_cm("180").unwrap(), 180.0);
        assert!(parse_height_cm("119").is_err());
        assert!(parse_height_cm("251").is_err());
    }

    #[test]
    fn gender_tokens_both_languages() {
        assert_eq!(parse_gender("Male").unwrap(), Gender::Male);
        assert_eq!(parse_gender("soy hombre").unwrap(), Gender::Male);
        assert_eq!(parse_gender("female").unwrap(), Gender::Female);
        assert_eq!(parse_gender("mujer").unwrap(), Gender::Female);
        assert_eq!(parse_gender("non-binary").unwrap(), Gender::Other);
        assert_eq!(parse_gender("prefer not to say").unwrap(), Gender::Other);
        assert_eq!(parse_gender("m").unwrap(), Gender::Male);
        assert!(parse_gender("purple").is_err());
    }

    #[test]
    fn activity_level_keywords() {
        assert_eq!(
            parse_activity_level("Sedentary (little/no exercise)").unwrap(),
            ActivityLevel::Sedentary
        );
        assert_eq!(
            parse_activity_level("lightly active").unwrap(),
            ActivityLevel::LightlyActive
        );
        assert_eq!(
            parse_activity_level("I'd say moderately active, 3-5 days").unwrap(),
            ActivityLevel::ModeratelyActive
        );
        assert_eq!(
            parse_activity_level("very active").unwrap(),
            ActivityLevel::VeryActive
        );
        // "extremely active" must not be swallowed by the "very" keyword
        assert_eq!(
            parse_activity_level("extremely active (very hard exercise)").unwrap(),
            ActivityLevel::ExtremelyActive
        );
        assert!(parse_activity_level("couch potato").is_err());
    }

    #[test]
    fn yes_no_parsing() {
        assert_eq!(parse_yes_no("yes"), Some(true));
        assert_eq!(parse_yes_no("Sí"), Some(true));
        assert_eq!(parse_yes_no("nope"), Some(false));
        assert_eq!(parse_yes_no("maybe later"), None);
    }

    #[test]
    fn goals_length_check() {
        assert!(parse_goals("get fit").is_err());
        let goals = parse_goals("  lose 10kg and run a 5k  ").unwrap();
        assert_eq!(goals, "lose 10kg and run a 5k");
    }

    #[test]
    fn dietary_none_normalized_to_empty() {
        assert_eq!(parse_dietary("None"), "");
        assert_eq!(parse_dietary("NONE"), "");
        assert_eq!(parse_dietary("ninguna"), "");
        assert_eq!(parse_dietary("lactose intolerant"), "lactose intolerant");
    }
}
