//! Background jobs — plan generation and delayed messages.
//!
//! The controller never blocks a conversation on plan generation; it
//! enqueues a job and answers immediately. [`InProcessScheduler`] is the
//! default single-process implementation; a queue-backed collaborator can
//! replace it behind [`JobScheduler`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::{Result, SchedulerError};
use crate::genai::{ContentGenerator, PromptContext};
use crate::plan::model::{NutritionTargets, PlanContent};
use crate::plan::{PlanEngine, PlanKind};
use crate::profile::{Language, UserProfile};
use crate::store::Storage;
use crate::transport::{OutboundSender, Reply};

/// Default delay before the post-onboarding motivational nudge.
pub const MOTIVATION_DELAY: Duration = Duration::from_secs(60 * 60);

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// Generate both initial plans after onboarding, message the user a
    /// summary, and schedule a motivational follow-up.
    GenerateInitialPlans { user_id: String },
    /// Regenerate one plan kind with the user's accumulated history.
    RegeneratePlans { user_id: String, kind: PlanKind },
    /// Deliver a fixed text.
    SendMessage { user_id: String, text: String },
    /// Generate and deliver a motivational message with fresh context.
    SendMotivation { user_id: String },
}

impl Job {
    fn name(&self) -> &'static str {
        match self {
            Self::GenerateInitialPlans { .. } => "generate_initial_plans",
            Self::RegeneratePlans { .. } => "regenerate_plans",
            Self::SendMessage { .. } => "send_message",
            Self::SendMotivation { .. } => "send_motivation",
        }
    }
}

/// Scheduling seam used by the controller and the runner itself.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    async fn enqueue(
        &self,
        job: Job,
        delay: Option<Duration>,
    ) -> std::result::Result<(), SchedulerError>;
}

/// Executes jobs against the same collaborators the controller uses.
pub struct JobRunner {
    store: Arc<dyn Storage>,
    generator: ContentGenerator,
    engine: PlanEngine,
    sender: Arc<dyn OutboundSender>,
    pub motivation_delay: Duration,
}

impl JobRunner {
    pub fn new(
        store: Arc<dyn Storage>,
        generator: ContentGenerator,
        engine: PlanEngine,
        sender: Arc<dyn OutboundSender>,
    ) -> Self {
        Self {
            store,
            generator,
            engine,
            sender,
            motivation_delay: MOTIVATION_DELAY,
        }
    }

    pub async fn run(&self, job: Job, scheduler: &dyn JobScheduler) -> Result<()> {
        match job {
            Job::GenerateInitialPlans { user_id } => {
                self.generate_initial_plans(&user_id, scheduler).await
            }
            Job::RegeneratePlans { user_id, kind } => self.regenerate(&user_id, kind).await,
            Job::SendMessage { user_id, text } => {
                self.sender.send(&user_id, Reply::text(text)).await?;
                Ok(())
            }
            Job::SendMotivation { user_id } => self.send_motivation(&user_id).await,
        }
    }

    async fn generate_initial_plans(
        &self,
        user_id: &str,
        scheduler: &dyn JobScheduler,
    ) -> Result<()> {
        let Some(profile) = self.store.get_profile(user_id).await? else {
            warn!(user_id, "initial plan job for unknown user");
            return Ok(());
        };

        let workout = self.engine.generate(&profile, PlanKind::Workout).await?;
        let nutrition = self.engine.generate(&profile, PlanKind::Nutrition).await?;
        info!(user_id, "initial plans generated");

        let summary = plans_ready_message(&profile, &workout.content, nutrition.targets);
        self.sender.send(user_id, Reply::text(summary)).await?;

        scheduler
            .enqueue(
                Job::SendMotivation {
                    user_id: user_id.to_string(),
                },
                Some(self.motivation_delay),
            )
            .await?;
        Ok(())
    }

    async fn regenerate(&self, user_id: &str, kind: PlanKind) -> Result<()> {
        let Some(profile) = self.store.get_profile(user_id).await? else {
            warn!(user_id, "regeneration job for unknown user");
            return Ok(());
        };
        let plan = self.engine.generate(&profile, kind).await?;
        let text = match profile.language {
            Language::English => format!(
                "✅ Your updated {kind} plan is ready: {}. Type \"my {kind} plan\" to see it!",
                plan.title
            ),
            Language::Spanish => format!(
                "✅ Tu plan de {} actualizado está listo: {}. ¡Escribe \"mi plan\" para verlo!",
                spanish_kind(kind),
                plan.title
            ),
        };
        self.sender.send(user_id, Reply::text(text)).await?;
        Ok(())
    }

    async fn send_motivation(&self, user_id: &str) -> Result<()> {
        let Some(profile) = self.store.get_profile(user_id).await? else {
            warn!(user_id, "motivation job for unknown user");
            return Ok(());
        };
        let ctx = PromptContext::new(&profile);
        let text = self.generator.motivational(&ctx).await;
        self.sender.send(user_id, Reply::text(text)).await?;
        Ok(())
    }
}

fn spanish_kind(kind: PlanKind) -> &'static str {
    match kind {
        PlanKind::Workout => "entrenamiento",
        PlanKind::Nutrition => "nutrición",
    }
}

fn plans_ready_message(
    profile: &UserProfile,
    workout: &PlanContent,
    targets: Option<NutritionTargets>,
) -> String {
    let difficulty = match workout {
        PlanContent::Workout(w) => w.difficulty.to_string(),
        PlanContent::Nutrition(_) => String::new(),
    };
    let title = match workout {
        PlanContent::Workout(w) => w.title.clone(),
        PlanContent::Nutrition(n) => n.title.clone(),
    };
    match profile.language {
        Language::English => {
            let mut text = format!(
                "🎉 Your personalized plans are ready!\n\n🏋️ {title} ({difficulty})"
            );
            if let Some(t) = targets {
                text.push_str(&format!(
                    "\n🍽️ Daily nutrition: {} kcal, {}g protein",
                    t.calories, t.protein_g
                ));
            }
            text.push_str("\n\nType \"my plan\" anytime to see the details.");
            text
        }
        Language::Spanish => {
            let mut text = format!(
                "🎉 ¡Tus planes personalizados están listos!\n\n🏋️ {title} ({difficulty})"
            );
            if let Some(t) = targets {
                text.push_str(&format!(
                    "\n🍽️ Nutrición diaria: {} kcal, {}g de proteína",
                    t.calories, t.protein_g
                ));
            }
            text.push_str("\n\nEscribe \"mi plan\" cuando quieras para ver los detalles.");
            text
        }
    }
}

/// Tokio-task scheduler for the single-process deployment. Delayed jobs are
/// parked on their own task and joined into the same worker queue, so jobs
/// still execute one at a time.
pub struct InProcessScheduler {
    tx: mpsc::UnboundedSender<Job>,
}

impl InProcessScheduler {
    /// Spawn the worker loop and return the handle used to enqueue.
    pub fn start(runner: JobRunner) -> Arc<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let scheduler = Arc::new(Self { tx });
        let handle = Arc::clone(&scheduler);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let name = job.name();
                if let Err(error) = runner.run(job, handle.as_ref()).await {
                    error!(job = name, %error, "background job failed");
                }
            }
        });
        scheduler
    }
}

#[async_trait]
impl JobScheduler for InProcessScheduler {
    async fn enqueue(
        &self,
        job: Job,
        delay: Option<Duration>,
    ) -> std::result::Result<(), SchedulerError> {
        let failed = |job: &Job| SchedulerError::EnqueueFailed {
            job: job.name().to_string(),
            reason: "worker stopped".to_string(),
        };
        match delay {
            None => self.tx.send(job.clone()).map_err(|_| failed(&job)),
            Some(delay) => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if tx.send(job).is_err() {
                        warn!("delayed job dropped, worker stopped");
                    }
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, TransportError};
    use crate::genai::{GenerationRequest, GenerationService};
    use crate::profile::{ActivityLevel, Gender};
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    struct DownService;

    #[async_trait]
    impl GenerationService for DownService {
        async fn generate(&self, _request: GenerationRequest) -> std::result::Result<String, GenerationError> {
            Err(GenerationError::RequestFailed {
                reason: "down".to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl OutboundSender for RecordingSender {
        async fn send(
            &self,
            user_id: &str,
            reply: Reply,
        ) -> std::result::Result<(), TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push((user_id.to_string(), reply.render()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingScheduler {
        jobs: Mutex<Vec<(Job, Option<Duration>)>>,
    }

    #[async_trait]
    impl JobScheduler for RecordingScheduler {
        async fn enqueue(
            &self,
            job: Job,
            delay: Option<Duration>,
        ) -> std::result::Result<(), SchedulerError> {
            self.jobs.lock().unwrap().push((job, delay));
            Ok(())
        }
    }

    fn onboarded_profile() -> UserProfile {
        let mut p = UserProfile::new("u1", Language::English);
        p.age = Some(30);
        p.gender = Some(Gender::Male);
        p.current_weight_kg = Some(80.0);
        p.height_cm = Some(180.0);
        p.target_weight_kg = Some(75.0);
        p.activity_level = Some(ActivityLevel::ModeratelyActive);
        p.onboarded = true;
        p
    }

    fn runner_with(store: Arc<MemoryStore>, sender: Arc<RecordingSender>) -> JobRunner {
        let generator = ContentGenerator::new(Arc::new(DownService));
        let engine = PlanEngine::new(store.clone() as Arc<dyn Storage>, generator.clone());
        JobRunner::new(store as Arc<dyn Storage>, generator, engine, sender)
    }

    #[tokio::test]
    async fn initial_plans_job_generates_both_kinds_and_messages_user() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(&onboarded_profile()).await.unwrap();
        let sender = Arc::new(RecordingSender::default());
        let scheduler = RecordingScheduler::default();
        let runner = runner_with(store.clone(), sender.clone());

        runner
            .run(
                Job::GenerateInitialPlans {
                    user_id: "u1".into(),
                },
                &scheduler,
            )
            .await
            .unwrap();

        assert_eq!(
            store.active_plans("u1", PlanKind::Workout).await.unwrap().len(),
            1
        );
        assert_eq!(
            store.active_plans("u1", PlanKind::Nutrition).await.unwrap().len(),
            1
        );

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("plans are ready"));
        assert!(sent[0].1.contains("2373 kcal"));

        let jobs = scheduler.jobs.lock().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            jobs[0].0,
            Job::SendMotivation {
                user_id: "u1".into()
            }
        );
        assert_eq!(jobs[0].1, Some(MOTIVATION_DELAY));
    }

    #[tokio::test]
    async fn jobs_for_unknown_users_are_dropped_quietly() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let scheduler = RecordingScheduler::default();
        let runner = runner_with(store, sender.clone());

        runner
            .run(
                Job::GenerateInitialPlans {
                    user_id: "ghost".into(),
                },
                &scheduler,
            )
            .await
            .unwrap();
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn motivation_job_uses_fallback_when_generation_is_down() {
        let store = Arc::new(MemoryStore::new());
        store.put_profile(&onboarded_profile()).await.unwrap();
        let sender = Arc::new(RecordingSender::default());
        let scheduler = RecordingScheduler::default();
        let runner = runner_with(store, sender.clone());

        runner
            .run(Job::SendMotivation { user_id: "u1".into() }, &scheduler)
            .await
            .unwrap();
        let sent = sender.sent.lock().unwrap();
        assert!(sent[0].1.contains("You've got this"));
    }

    #[tokio::test]
    async fn in_process_scheduler_executes_enqueued_jobs() {
        let store = Arc::new(MemoryStore::new());
        let sender = Arc::new(RecordingSender::default());
        let runner = runner_with(store, sender.clone());
        let scheduler = InProcessScheduler::start(runner);

        scheduler
            .enqueue(
                Job::SendMessage {
                    user_id: "u1".into(),
                    text: "hello".into(),
                },
                None,
            )
            .await
            .unwrap();

        // The worker runs on its own task; poll briefly for delivery.
        for _ in 0..50 {
            if !sender.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent[0], ("u1".to_string(), "hello".to_string()));
    }

    #[test]
    fn job_serde_is_tagged() {
        let job = Job::RegeneratePlans {
            user_id: "u1".into(),
            kind: PlanKind::Nutrition,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["type"], "regenerate_plans");
        assert_eq!(json["kind"], "nutrition");
        let parsed: Job = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, job);
    }
}
