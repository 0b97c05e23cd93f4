//! Content generator — typed, infallible surface over the generation seam.
//!
//! Every method returns usable content. Failures of the underlying service
//! are logged at warn level and replaced with the fixed fallbacks; callers
//! never see a generation error.

use std::sync::Arc;

use tracing::warn;

use crate::error::GenerationError;
use crate::plan::model::{Difficulty, NutritionContent, NutritionTargets, WorkoutContent};
use crate::profile::Language;

use super::prompts::{self, PromptContext};
use super::{GenerationRequest, GenerationService, fallback};

const PLAN_MAX_TOKENS: u32 = 2000;
const PLAN_TEMPERATURE: f32 = 0.6;
const CHAT_MAX_TOKENS: u32 = 1000;
const CHAT_TEMPERATURE: f32 = 0.7;
const ANALYSIS_MAX_TOKENS: u32 = 1500;
const ANALYSIS_TEMPERATURE: f32 = 0.7;
const MOTIVATION_MAX_TOKENS: u32 = 300;
// Higher temperature so repeated messages do not read identically.
const MOTIVATION_TEMPERATURE: f32 = 0.8;

/// Typed generation surface used by the plan engine and the controller.
#[derive(Clone)]
pub struct ContentGenerator {
    service: Arc<dyn GenerationService>,
}

impl ContentGenerator {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    /// Free-form coaching answer for a general query.
    pub async fn conversational_reply(
        &self,
        ctx: &PromptContext<'_>,
        topic: Option<crate::intent::Topic>,
        question: &str,
    ) -> String {
        let request = GenerationRequest {
            system_prompt: prompts::conversational_system_prompt(ctx.language(), topic),
            user_prompt: prompts::conversational_user_prompt(ctx, question),
            max_tokens: CHAT_MAX_TOKENS,
            temperature: CHAT_TEMPERATURE,
        };
        match self.service.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                warn!(user_id = %ctx.profile.user_id, %error, "conversational generation failed");
                fallback::conversational_reply(ctx.language())
            }
        }
    }

    /// Structured weekly workout plan.
    pub async fn workout_plan(&self, ctx: &PromptContext<'_>) -> WorkoutContent {
        let difficulty = Difficulty::from_activity(ctx.profile.activity_level);
        let request = GenerationRequest {
            system_prompt: prompts::workout_system_prompt(ctx.language()),
            user_prompt: prompts::workout_user_prompt(ctx),
            max_tokens: PLAN_MAX_TOKENS,
            temperature: PLAN_TEMPERATURE,
        };
        match self.generate_parsed::<WorkoutContent>(request).await {
            Ok(content) => content,
            Err(error) => {
                warn!(user_id = %ctx.profile.user_id, %error, "workout generation failed");
                fallback::workout_plan(difficulty, ctx.language())
            }
        }
    }

    /// Structured daily meal plan aimed at the given targets.
    pub async fn nutrition_plan(
        &self,
        ctx: &PromptContext<'_>,
        targets: NutritionTargets,
    ) -> NutritionContent {
        let request = GenerationRequest {
            system_prompt: prompts::nutrition_system_prompt(ctx.language()),
            user_prompt: prompts::nutrition_user_prompt(ctx, targets),
            max_tokens: PLAN_MAX_TOKENS,
            temperature: PLAN_TEMPERATURE,
        };
        match self.generate_parsed::<NutritionContent>(request).await {
            Ok(content) => content,
            Err(error) => {
                warn!(user_id = %ctx.profile.user_id, %error, "nutrition generation failed");
                fallback::nutrition_plan(targets, ctx.language())
            }
        }
    }

    /// Short narrative read on the user's recorded progress.
    pub async fn progress_analysis(&self, ctx: &PromptContext<'_>) -> String {
        let request = GenerationRequest {
            system_prompt: prompts::progress_system_prompt(ctx.language()),
            user_prompt: prompts::conversational_user_prompt(ctx, "How is my progress going?"),
            max_tokens: ANALYSIS_MAX_TOKENS,
            temperature: ANALYSIS_TEMPERATURE,
        };
        match self.service.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                warn!(user_id = %ctx.profile.user_id, %error, "progress analysis failed");
                fallback::progress_analysis(ctx.language())
            }
        }
    }

    /// Unprompted motivational nudge.
    pub async fn motivational(&self, ctx: &PromptContext<'_>) -> String {
        let request = GenerationRequest {
            system_prompt: prompts::motivational_system_prompt(ctx.language()),
            user_prompt: prompts::conversational_user_prompt(ctx, ""),
            max_tokens: MOTIVATION_MAX_TOKENS,
            temperature: MOTIVATION_TEMPERATURE,
        };
        match self.service.generate(request).await {
            Ok(text) => text.trim().to_string(),
            Err(error) => {
                warn!(user_id = %ctx.profile.user_id, %error, "motivational generation failed");
                fallback::motivational_message(ctx.language())
            }
        }
    }

    async fn generate_parsed<T: serde::de::DeserializeOwned>(
        &self,
        request: GenerationRequest,
    ) -> Result<T, GenerationError> {
        let raw = self.service.generate(request).await?;
        let json = extract_json(&raw).ok_or_else(|| GenerationError::InvalidResponse {
            reason: "no JSON object in completion".to_string(),
        })?;
        serde_json::from_str(json).map_err(|e| GenerationError::InvalidResponse {
            reason: format!("completion JSON did not match schema: {e}"),
        })
    }
}

/// First balanced `{...}` object in the text, tolerant of surrounding prose
/// and markdown fences. String literals and escapes are respected so braces
/// inside values do not unbalance the scan.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
