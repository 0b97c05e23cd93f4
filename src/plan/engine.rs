//! Plan engine — generation, versioning, and the single-active invariant.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use crate::error::{InvariantViolation, Result};
use crate::genai::{ContentGenerator, PromptContext};
use crate::plan::model::{Plan, PlanContent, PlanKind};
use crate::plan::nutrition::nutrition_targets;
use crate::profile::UserProfile;
use crate::store::Storage;

const WEIGHT_HISTORY_LIMIT: usize = 8;

/// Owns plan lifecycle: generates content for a profile, persists a new
/// version, and retires whatever was active before it.
#[derive(Clone)]
pub struct PlanEngine {
    store: Arc<dyn Storage>,
    generator: ContentGenerator,
}

impl PlanEngine {
    pub fn new(store: Arc<dyn Storage>, generator: ContentGenerator) -> Self {
        Self { store, generator }
    }

    /// Generate and activate a plan of the given kind. Any previously active
    /// plan of the same kind is deactivated with today's end date.
    ///
    /// Used both for the initial plans after onboarding and for later
    /// regeneration; recorded weights and the latest check-in are folded into
    /// the generation context either way, so a fresh user simply contributes
    /// an empty history.
    pub async fn generate(&self, profile: &UserProfile, kind: PlanKind) -> Result<Plan> {
        let weights = self
            .store
            .recent_weights(&profile.user_id, WEIGHT_HISTORY_LIMIT)
            .await?;
        let snapshot = self.store.latest_snapshot(&profile.user_id).await?;
        let ctx = PromptContext::new(profile)
            .with_weights(&weights)
            .with_snapshot(snapshot.as_ref());

        let today = Utc::now().date_naive();
        let mut plan = match kind {
            PlanKind::Workout => {
                let content = self.generator.workout_plan(&ctx).await;
                Plan::new(&profile.user_id, PlanContent::Workout(content), today)
            }
            PlanKind::Nutrition => {
                let computed = nutrition_targets(profile);
                let content = self.generator.nutrition_plan(&ctx, computed).await;
                let mut plan = Plan::new(&profile.user_id, PlanContent::Nutrition(content), today);
                plan.targets = Some(match &plan.content {
                    // Prefer the generated daily numbers when complete.
                    PlanContent::Nutrition(n) => match (
                        n.daily_calories,
                        n.daily_protein,
                        n.daily_carbs,
                        n.daily_fats,
                    ) {
                        (Some(calories), Some(protein_g), Some(carbs_g), Some(fat_g)) => {
                            crate::plan::model::NutritionTargets {
                                calories,
                                protein_g,
                                carbs_g,
                                fat_g,
                            }
                        }
                        _ => computed,
                    },
                    PlanContent::Workout(_) => computed,
                });
                plan
            }
        };
        plan.content.validate()?;

        self.activate(&mut plan, today).await?;
        info!(user_id = %profile.user_id, %kind, plan_id = %plan.id, "plan activated");
        Ok(plan)
    }

    /// Insert the plan, then retire every other active plan of its kind.
    /// Finding more than one predecessor means stored data already broke the
    /// single-active invariant; it is corrected and logged.
    async fn activate(&self, plan: &mut Plan, today: NaiveDate) -> Result<()> {
        self.store.insert_plan(plan).await?;

        let active = self.store.active_plans(&plan.user_id, plan.kind).await?;
        let predecessors: Vec<Plan> = active.into_iter().filter(|p| p.id != plan.id).collect();
        if predecessors.len() > 1 {
            let violation = InvariantViolation::MultipleActivePlans {
                user_id: plan.user_id.clone(),
                kind: plan.kind.to_string(),
                count: predecessors.len(),
            };
            error!(%violation, "correcting stored plan state");
        }
        for mut old in predecessors {
            old.is_active = false;
            old.end_date = Some(today);
            self.store.update_plan(&old).await?;
        }
        Ok(())
    }

    /// The single active plan of a kind, if any.
    pub async fn active_plan(&self, user_id: &str, kind: PlanKind) -> Result<Option<Plan>> {
        let mut active = self.store.active_plans(user_id, kind).await?;
        active.sort_by_key(|p| p.created_at);
        Ok(active.pop())
    }
}
