//! Prompt assembly for every generation use case.

use crate::intent::Topic;
use crate::plan::model::NutritionTargets;
use crate::profile::{Language, UserProfile};
use crate::store::{ProgressSnapshot, WeightRecord};

/// Everything the prompt builders may mention about a user. Borrowed from
/// storage for the duration of one generation call.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub profile: &'a UserProfile,
    /// Most recent first, as returned by storage.
    pub recent_weights: &'a [WeightRecord],
    pub snapshot: Option<&'a ProgressSnapshot>,
}

impl<'a> PromptContext<'a> {
    pub fn new(profile: &'a UserProfile) -> Self {
        Self {
            profile,
            recent_weights: &[],
            snapshot: None,
        }
    }

    pub fn with_weights(mut self, weights: &'a [WeightRecord]) -> Self {
        self.recent_weights = weights;
        self
    }

    pub fn with_snapshot(mut self, snapshot: Option<&'a ProgressSnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn language(&self) -> Language {
        self.profile.language
    }

    /// Plain-text profile block shared by every user prompt.
    fn context_block(&self) -> String {
        let p = self.profile;
        let mut lines = Vec::new();
        if let Some(age) = p.age {
            lines.push(format!("Age: {age}"));
        }
        if let Some(gender) = p.gender {
            lines.push(format!("Gender: {}", gender.code()));
        }
        if let Some(kg) = p.current_weight_kg {
            lines.push(format!("Current weight: {kg} kg"));
        }
        if let Some(kg) = p.target_weight_kg {
            lines.push(format!("Target weight: {kg} kg"));
        }
        if let Some(cm) = p.height_cm {
            lines.push(format!("Height: {cm} cm"));
        }
        if let Some(bmi) = p.bmi() {
            lines.push(format!("BMI: {bmi:.1}"));
        }
        if let Some(goals) = &p.fitness_goals {
            lines.push(format!("Goals: {goals}"));
        }
        if let Some(level) = p.activity_level {
            lines.push(format!("Activity level: {level}"));
        }
        if !p.dietary_restrictions.is_empty() {
            lines.push(format!("Dietary restrictions: {}", p.dietary_restrictions));
        }
        if let Some(time) = &p.preferred_workout_time {
            lines.push(format!("Preferred workout time: {time}"));
        }
        if !self.recent_weights.is_empty() {
            let history: Vec<String> = self
                .recent_weights
                .iter()
                .map(|w| format!("{}: {} kg", w.date, w.weight_kg))
                .collect();
            lines.push(format!("Recent weigh-ins: {}", history.join(", ")));
        }
        if let Some(s) = self.snapshot {
            if let Some(energy) = s.energy_level {
                lines.push(format!("Energy level this week: {energy}/5"));
            }
            if let Some(adherence) = s.workout_adherence {
                lines.push(format!("Workout adherence this week: {adherence}/5"));
            }
            if let Some(adherence) = s.diet_adherence {
                lines.push(format!("Diet adherence this week: {adherence}/5"));
            }
            if !s.notes.is_empty() {
                lines.push(format!("Check-in notes: {}", s.notes));
            }
        }
        lines.join("\n")
    }
}

fn language_directive(language: Language) -> &'static str {
    match language {
        Language::English => "",
        Language::Spanish => " Responde en español.",
    }
}

pub fn workout_system_prompt(language: Language) -> String {
    format!(
        "You are a certified personal trainer. Create a weekly workout plan \
         tailored to the user's profile. Respond ONLY with valid JSON in \
         exactly this structure, no prose before or after:\n\
         {{\n\
         \"title\": \"...\",\n\
         \"description\": \"...\",\n\
         \"difficulty\": \"beginner|intermediate|advanced\",\n\
         \"duration_weeks\": 4,\n\
         \"workouts\": [\n\
         {{\"day\": \"Monday\", \"name\": \"...\", \"exercises\": [\n\
         {{\"name\": \"...\", \"sets\": 3, \"reps\": \"10-15\", \
         \"rest\": \"60 seconds\", \"instructions\": \"...\"}}\n\
         ]}}\n\
         ]\n\
         }}{}",
        language_directive(language)
    )
}

pub fn workout_user_prompt(ctx: &PromptContext<'_>) -> String {
    format!(
        "Create a personalized workout plan for this user:\n{}",
        ctx.context_block()
    )
}

pub fn nutrition_system_prompt(language: Language) -> String {
    format!(
        "You are a registered nutritionist. Create a daily meal plan tailored \
         to the user's profile and calorie targets. Respond ONLY with valid \
         JSON in exactly this structure, no prose before or after:\n\
         {{\n\
         \"title\": \"...\",\n\
         \"description\": \"...\",\n\
         \"daily_calories\": 2000,\n\
         \"daily_protein\": 120,\n\
         \"daily_carbs\": 200,\n\
         \"daily_fats\": 70,\n\
         \"meals\": [\n\
         {{\"meal\": \"Breakfast\", \"time\": \"07:00\", \"foods\": [\n\
         {{\"name\": \"...\", \"amount\": \"...\", \"calories\": 300, \
         \"protein\": 20, \"carbs\": 30, \"fats\": 10}}\n\
         ]}}\n\
         ],\n\
         \"tips\": [\"...\"]\n\
         }}{}",
        language_directive(language)
    )
}

pub fn nutrition_user_prompt(ctx: &PromptContext<'_>, targets: NutritionTargets) -> String {
    format!(
        "Create a personalized nutrition plan for this user:\n{}\n\
         Daily targets: {} kcal, {} g protein, {} g carbs, {} g fat. \
         The meals must add up to roughly these targets and respect the \
         dietary restrictions.",
        ctx.context_block(),
        targets.calories,
        targets.protein_g,
        targets.carbs_g,
        targets.fat_g
    )
}

pub fn conversational_system_prompt(language: Language, topic: Option<Topic>) -> String {
    let base = "You are a friendly, encouraging personal trainer chatting with \
                a client over a messaging app. Keep answers short (2-4 \
                sentences), concrete, and safe. Never give medical diagnoses; \
                suggest seeing a professional for pain or injury.";
    let overlay = match topic {
        Some(Topic::Workout) => {
            " Focus on exercise technique, programming, and recovery."
        }
        Some(Topic::Nutrition) => {
            " Focus on practical food choices that fit the user's plan and restrictions."
        }
        Some(Topic::Progress) => {
            " Ground your answer in the user's recorded progress where possible."
        }
        Some(Topic::Motivation) => {
            " The user needs encouragement. Acknowledge the struggle, then give one small actionable step."
        }
        Some(Topic::General) | None => "",
    };
    format!("{base}{overlay}{}", language_directive(language))
}

pub fn conversational_user_prompt(ctx: &PromptContext<'_>, question: &str) -> String {
    format!(
        "Client profile:\n{}\n\nClient message: {question}",
        ctx.context_block()
    )
}

pub fn progress_system_prompt(language: Language) -> String {
    format!(
        "You are a personal trainer reviewing a client's progress. Summarize \
         the trend in their recent weigh-ins relative to their target, call \
         out one win, and suggest one adjustment. 3-5 sentences.{}",
        language_directive(language)
    )
}

pub fn motivational_system_prompt(language: Language) -> String {
    format!(
        "You are a personal trainer sending a short unprompted motivational \
         message to a client who just finished onboarding. One or two \
         sentences, warm, specific to their goals, with one emoji.{}",
        language_directive(language)
    )
}
