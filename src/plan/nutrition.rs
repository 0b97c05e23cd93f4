//! Daily calorie and macro targets from the Mifflin-St Jeor equation.

use crate::plan::model::NutritionTargets;
use crate::profile::{Gender, UserProfile};

/// Used when weight, height, or age is missing from the profile.
pub const DEFAULT_TARGETS: NutritionTargets = NutritionTargets {
    calories: 2000,
    protein_g: 120,
    carbs_g: 200,
    fat_g: 70,
};

const MIN_CALORIES: f64 = 1200.0;
const LOSS_DEFICIT: f64 = 500.0;
const GAIN_SURPLUS: f64 = 300.0;
const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.55;

/// Compute the user's daily targets. Falls back to [`DEFAULT_TARGETS`] when
/// the profile lacks the measurements the equation needs.
pub fn nutrition_targets(profile: &UserProfile) -> NutritionTargets {
    let (Some(weight), Some(height), Some(age)) =
        (profile.current_weight_kg, profile.height_cm, profile.age)
    else {
        return DEFAULT_TARGETS;
    };
    let age = age as f64;

    // Mifflin-St Jeor; the female coefficients also cover other/unknown.
    let bmr = match profile.gender {
        Some(Gender::Male) => 88.362 + 13.397 * weight + 4.799 * height - 5.677 * age,
        _ => 447.593 + 9.247 * weight + 3.098 * height - 4.330 * age,
    };

    let multiplier = profile
        .activity_level
        .map(|level| level.multiplier())
        .unwrap_or(DEFAULT_ACTIVITY_MULTIPLIER);
    let tdee = bmr * multiplier;

    let calories = match profile.target_weight_kg {
        Some(target) if target < weight => tdee - LOSS_DEFICIT,
        Some(target) if target > weight => tdee + GAIN_SURPLUS,
        _ => tdee,
    };
    let calories = calories.max(MIN_CALORIES);

    // 25% protein, 45% carbs, 30% fat, from the un-truncated calorie figure.
    NutritionTargets {
        calories: calories as u32,
        protein_g: (calories * 0.25 / 4.0) as u32,
        carbs_g: (calories * 0.45 / 4.0) as u32,
        fat_g: (calories * 0.30 / 9.0) as u32,
    }
}
