//! Plan domain objects — versioned workout and nutrition plans with typed
//! structured content.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GenerationError;
use crate::profile::{ActivityLevel, Language};

/// The two plan kinds. The single-active invariant is per (user, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Workout,
    Nutrition,
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workout => write!(f, "workout"),
            Self::Nutrition => write!(f, "nutrition"),
        }
    }
}

/// Workout difficulty, derived from the user's activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// sedentary/lightly → beginner, moderately/very → intermediate,
    /// extremely → advanced, unknown → beginner.
    pub fn from_activity(level: Option<ActivityLevel>) -> Self {
        match level {
            Some(ActivityLevel::Sedentary) | Some(ActivityLevel::LightlyActive) | None => {
                Self::Beginner
            }
            Some(ActivityLevel::ModeratelyActive) | Some(ActivityLevel::VeryActive) => {
                Self::Intermediate
            }
            Some(ActivityLevel::ExtremelyActive) => Self::Advanced,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    /// Rep scheme as prose, e.g. "12-15" or "30-60 seconds".
    pub reps: String,
    pub rest: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub day: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutContent {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: u32,
    #[serde(rename = "workouts")]
    pub days: Vec<WorkoutDay>,
}

fn default_duration_weeks() -> u32 {
    4
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub amount: String,
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fats: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    #[serde(rename = "meal")]
    pub name: String,
    pub time: String,
    pub foods: Vec<FoodItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionContent {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_protein: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_carbs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_fats: Option<u32>,
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Structured plan content, tagged per kind. Validated at the generation
/// adapter boundary before anything is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanContent {
    Workout(WorkoutContent),
    Nutrition(NutritionContent),
}

impl PlanContent {
    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Workout(_) => PlanKind::Workout,
            Self::Nutrition(_) => PlanKind::Nutrition,
        }
    }

    /// Check the required sub-fields for persistence: a workout needs at
    /// least one day with exercises, a nutrition plan at least one meal with
    /// foods, and both need a title.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let fail = |reason: &str| {
            Err(GenerationError::InvalidResponse {
                reason: reason.to_string(),
            })
        };
        match self {
            Self::Workout(w) => {
                if w.title.trim().is_empty() {
                    return fail("workout plan missing title");
                }
                if w.days.is_empty() || w.days.iter().all(|d| d.exercises.is_empty()) {
                    return fail("workout plan has no exercises");
                }
            }
            Self::Nutrition(n) => {
                if n.title.trim().is_empty() {
                    return fail("nutrition plan missing title");
                }
                if n.meals.is_empty() || n.meals.iter().all(|m| m.foods.is_empty()) {
                    return fail("nutrition plan has no foods");
                }
            }
        }
        Ok(())
    }
}

/// Daily nutrition targets attached to a nutrition plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// A versioned plan. At most one plan per (user, kind) is active at a time;
/// superseded plans stay around with an end date for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: String,
    pub kind: PlanKind,
    pub title: String,
    pub description: String,
    pub content: PlanContent,
    pub is_active: bool,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Daily targets; present for nutrition plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<NutritionTargets>,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(user_id: impl Into<String>, content: PlanContent, today: NaiveDate) -> Self {
        let (title, description) = match &content {
            PlanContent::Workout(w) => (w.title.clone(), w.description.clone()),
            PlanContent::Nutrition(n) => (n.title.clone(), n.description.clone()),
        };
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            kind: content.kind(),
            title,
            description,
            content,
            is_active: true,
            start_date: today,
            end_date: None,
            targets: None,
            created_at: Utc::now(),
        }
    }

    /// Human-readable summary for a "view plan" reply.
    pub fn summary(&self, language: Language) -> String {
        match (&self.content, language) {
            (PlanContent::Workout(w), Language::English) => {
                let mut lines = vec![format!("🏋️ {}", w.title), w.description.clone()];
                for day in &w.days {
                    lines.push(format!("\n{} — {}:", day.day, day.name));
                    for ex in &day.exercises {
                        lines.push(format!("  • {} — {}x{}, rest {}", ex.name, ex.sets, ex.reps, ex.rest));
                    }
                }
                lines.join("\n")
            }
            (PlanContent::Workout(w), Language::Spanish) => {
                let mut lines = vec![format!("🏋️ {}", w.title), w.description.clone()];
                for day in &w.days {
                    lines.push(format!("\n{} — {}:", day.day, day.name));
                    for ex in &day.exercises {
                        lines.push(format!(
                            "  • {} — {}x{}, descanso {}",
                            ex.name, ex.sets, ex.reps, ex.rest
                        ));
                    }
                }
                lines.join("\n")
            }
            (PlanContent::Nutrition(n), lang) => {
                let mut lines = vec![format!("🍽️ {}", n.title), n.description.clone()];
                if let Some(t) = self.targets {
                    let label = match lang {
                        Language::English => "Daily targets",
                        Language::Spanish => "Objetivos diarios",
                    };
                    lines.push(format!(
                        "{label}: {} kcal, {}g protein / {}g carbs / {}g fat",
                        t.calories, t.protein_g, t.carbs_g, t.fat_g
                    ));
                }
                for meal in &n.meals {
                    lines.push(format!("\n{} ({}):", meal.name, meal.time));
                    for food in &meal.foods {
                        lines.push(format!(
                            "  • {} ({}) — {} kcal",
                            food.name, food.amount, food.calories
                        ));
                    }
                }
                if !n.tips.is_empty() {
                    lines.push(String::new());
                    for tip in &n.tips {
                        lines.push(format!("💡 {tip}"));
                    }
                }
                lines.join("\n")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_workout() -> WorkoutContent {
        WorkoutContent {
            title: "Test Plan".into(),
            description: "desc".into(),
            difficulty: Difficulty::Beginner,
            duration_weeks: 4,
            days: vec![WorkoutDay {
                day: "Monday".into(),
                name: "Full Body".into(),
                exercises: vec![Exercise {
                    name: "Push-ups".into(),
                    sets: 3,
                    reps: "10-15".into(),
                    rest: "60 seconds".into(),
                    instructions: "Keep core tight".into(),
                }],
            }],
        }
    }

    #[test]
    fn difficulty_mapping() {
        use ActivityLevel::*;
        assert_eq!(Difficulty::from_activity(Some(Sedentary)), Difficulty::Beginner);
        assert_eq!(Difficulty::from_activity(Some(LightlyActive)), Difficulty::Beginner);
        assert_eq!(
            Difficulty::from_activity(Some(ModeratelyActive)),
            Difficulty::Intermediate
        );
        assert_eq!(Difficulty::from_activity(Some(VeryActive)), Difficulty::Intermediate);
        assert_eq!(
            Difficulty::from_activity(Some(ExtremelyActive)),
            Difficulty::Advanced
        );
        assert_eq!(Difficulty::from_activity(None), Difficulty::Beginner);
    }

    #[test]
    fn workout_validation() {
        let content = PlanContent::Workout(sample_workout());
        assert!(content.validate().is_ok());

        let mut empty = sample_workout();
        empty.days.clear();
        assert!(PlanContent::Workout(empty).validate().is_err());

        let mut untitled = sample_workout();
        untitled.title = "  ".into();
        assert!(PlanContent::Workout(untitled).validate().is_err());
    }

    #[test]
    fn nutrition_validation_requires_foods() {
        let content = PlanContent::Nutrition(NutritionContent {
            title: "N".into(),
            description: "d".into(),
            daily_calories: Some(2000),
            daily_protein: None,
            daily_carbs: None,
            daily_fats: None,
            meals: vec![Meal {
                name: "Breakfast".into(),
                time: "07:00".into(),
                foods: vec![],
            }],
            tips: vec![],
        });
        assert!(content.validate().is_err());
    }

    #[test]
    fn new_plan_starts_active_without_end_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let plan = Plan::new("u1", PlanContent::Workout(sample_workout()), today);
        assert!(plan.is_active);
        assert_eq!(plan.start_date, today);
        assert!(plan.end_date.is_none());
        assert_eq!(plan.kind, PlanKind::Workout);
        assert_eq!(plan.title, "Test Plan");
    }

    #[test]
    fn plan_content_serde_is_tagged() {
        let content = PlanContent::Workout(sample_workout());
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "workout");
        let parsed: PlanContent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind(), PlanKind::Workout);
    }
}
