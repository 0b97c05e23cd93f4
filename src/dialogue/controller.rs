//! Dialogue controller — routes every inbound message to exactly one
//! handler and always produces a reply.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::error::Result;
use crate::genai::{ContentGenerator, PromptContext};
use crate::intent::{Command, Intent, IntentClassifier};
use crate::onboarding::{self, ConversationSession};
use crate::plan::{PlanEngine, PlanKind};
use crate::profile::{Language, SubscriptionStatus, UserProfile};
use crate::scheduler::{Job, JobScheduler};
use crate::store::{Message, MessageRole, Storage, WeightRecord};
use crate::transport::{InboundMessage, Reply};

const RECENT_WEIGHTS_FOR_CONTEXT: usize = 8;

/// One instance serves every user; all per-user state lives in storage.
#[derive(Clone)]
pub struct DialogueController {
    store: Arc<dyn Storage>,
    generator: ContentGenerator,
    engine: PlanEngine,
    classifier: Arc<IntentClassifier>,
    scheduler: Arc<dyn JobScheduler>,
    default_language: Language,
}

impl DialogueController {
    pub fn new(
        store: Arc<dyn Storage>,
        generator: ContentGenerator,
        engine: PlanEngine,
        scheduler: Arc<dyn JobScheduler>,
    ) -> Self {
        Self {
            store,
            generator,
            engine,
            classifier: Arc::new(IntentClassifier::new()),
            scheduler,
            default_language: Language::default(),
        }
    }

    /// Language for users whose transport gives no hint.
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Handle one message. Never fails: internal errors are logged and
    /// turned into a generic apology in the user's language.
    pub async fn handle(&self, message: InboundMessage) -> Reply {
        let language = match self.store.get_profile(&message.sender_id).await {
            Ok(Some(profile)) => profile.language,
            _ => message
                .language_hint
                .as_deref()
                .map(Language::from_hint)
                .unwrap_or(self.default_language),
        };
        match self.handle_inner(&message).await {
            Ok(reply) => reply,
            Err(err) => {
                error!(user_id = %message.sender_id, error = %err, "message handling failed");
                Reply::text(generic_apology(language))
            }
        }
    }

    async fn handle_inner(&self, message: &InboundMessage) -> Result<Reply> {
        let text = clean_text(&message.text);
        let mut profile = self.load_or_create_profile(message).await?;

        self.store
            .append_message(&Message::new(&profile.user_id, MessageRole::User, &text))
            .await?;

        let classification = self.classifier.classify(&text);
        let reply = if let Intent::SpecialCommand(command) = classification.intent {
            match self.handle_command(&mut profile, command).await? {
                Some(reply) => reply,
                None => self.dispatch(&mut profile, &text, &classification).await?,
            }
        } else {
            self.dispatch(&mut profile, &text, &classification).await?
        };

        self.store
            .append_message(&Message::new(
                &profile.user_id,
                MessageRole::Assistant,
                reply.render(),
            ))
            .await?;
        Ok(reply)
    }

    async fn dispatch(
        &self,
        profile: &mut UserProfile,
        text: &str,
        classification: &crate::intent::Classification,
    ) -> Result<Reply> {
        if profile.subscription == SubscriptionStatus::CancelPending {
            return self.confirm_cancellation(profile, text).await;
        }
        if !profile.onboarded {
            return self.continue_onboarding(profile, text).await;
        }
        match classification.intent {
            Intent::CancelSubscription => self.start_cancellation(profile).await,
            Intent::TrackProgress => {
                self.track_progress(profile, classification.entities.weight_kg)
                    .await
            }
            Intent::ViewPlan => {
                self.view_plan(profile, classification.entities.plan_kind)
                    .await
            }
            Intent::GeneralQuery | Intent::SpecialCommand(_) => {
                self.general_query(profile, text, classification.entities.topic)
                    .await
            }
        }
    }

    async fn load_or_create_profile(&self, message: &InboundMessage) -> Result<UserProfile> {
        if let Some(profile) = self.store.get_profile(&message.sender_id).await? {
            return Ok(profile);
        }
        let language = message
            .language_hint
            .as_deref()
            .map(Language::from_hint)
            .unwrap_or(self.default_language);
        let profile = UserProfile::new(&message.sender_id, language);
        self.store.put_profile(&profile).await?;
        info!(user_id = %profile.user_id, "new user");
        Ok(profile)
    }

    /// Commands that apply regardless of conversation state. Returns `None`
    /// when the command should instead flow into the current conversation
    /// (a greeting while onboarding is just the next onboarding message).
    async fn handle_command(
        &self,
        profile: &mut UserProfile,
        command: Command,
    ) -> Result<Option<Reply>> {
        match command {
            Command::Menu => Ok(Some(menu(profile.language))),
            Command::SwitchLanguage(language) => {
                profile.language = language;
                self.store.put_profile(profile).await?;
                let confirmation = match language {
                    Language::English => "Done! I'll reply in English from now on.",
                    Language::Spanish => "¡Listo! A partir de ahora te responderé en español.",
                };
                Ok(Some(Reply::text(confirmation)))
            }
            Command::Greeting => {
                if !profile.onboarded
                    || profile.subscription == SubscriptionStatus::CancelPending
                {
                    // Let onboarding or the pending confirmation consume it.
                    return Ok(None);
                }
                let greeting = match profile.language {
                    Language::English => {
                        "Hey! 👋 Good to hear from you. Ask me anything about your \
                         training or nutrition, or type \"menu\" to see what I can do."
                    }
                    Language::Spanish => {
                        "¡Hola! 👋 Qué bueno saber de ti. Pregúntame lo que quieras \
                         sobre tu entrenamiento o nutrición, o escribe \"menú\"."
                    }
                };
                Ok(Some(Reply::text(greeting)))
            }
            Command::Thanks => Ok(Some(Reply::text(match profile.language {
                Language::English => "You're welcome! 💪 Happy to help anytime.",
                Language::Spanish => "¡De nada! 💪 Aquí estoy cuando me necesites.",
            }))),
            Command::Farewell => Ok(Some(Reply::text(match profile.language {
                Language::English => "Talk soon! Keep moving. 👋",
                Language::Spanish => "¡Hasta pronto! Sigue en movimiento. 👋",
            }))),
        }
    }

    // ── Onboarding ──────────────────────────────────────────────────

    async fn continue_onboarding(&self, profile: &mut UserProfile, text: &str) -> Result<Reply> {
        let mut session = match self.store.get_session(&profile.user_id).await? {
            Some(session) => session,
            None => ConversationSession::new(&profile.user_id),
        };

        let outcome = onboarding::apply_message(&mut session, text, profile.language);
        if outcome.completed {
            self.finish_onboarding(profile, &session).await?;
        } else {
            self.store.put_session(&session).await?;
        }
        Ok(outcome.reply)
    }

    async fn finish_onboarding(
        &self,
        profile: &mut UserProfile,
        session: &ConversationSession,
    ) -> Result<()> {
        onboarding::apply_fields(profile, session);
        profile.onboarded = true;
        profile.onboarded_at = Some(Utc::now());
        self.store.put_profile(profile).await?;

        // Baseline weigh-in, only if today has none yet.
        if let Some(weight_kg) = profile.current_weight_kg {
            let today = Utc::now().date_naive();
            if self.store.weight_on(&profile.user_id, today).await?.is_none() {
                self.store
                    .upsert_weight(&WeightRecord {
                        user_id: profile.user_id.clone(),
                        date: today,
                        weight_kg,
                    })
                    .await?;
            }
        }

        self.store.delete_session(&profile.user_id).await?;
        self.scheduler
            .enqueue(
                Job::GenerateInitialPlans {
                    user_id: profile.user_id.clone(),
                },
                None,
            )
            .await?;
        info!(user_id = %profile.user_id, "onboarding complete");
        Ok(())
    }

    // ── Subscription ────────────────────────────────────────────────

    async fn start_cancellation(&self, profile: &mut UserProfile) -> Result<Reply> {
        profile.subscription = SubscriptionStatus::CancelPending;
        self.store.put_profile(profile).await?;
        let (text, yes, no) = match profile.language {
            Language::English => (
                "I'm sorry to see you go! Are you sure you want to cancel your subscription?",
                "Yes",
                "No",
            ),
            Language::Spanish => (
                "¡Lamento que quieras irte! ¿Seguro que quieres cancelar tu suscripción?",
                "Sí",
                "No",
            ),
        };
        Ok(Reply::buttons(text, vec![yes.to_string(), no.to_string()]))
    }

    async fn confirm_cancellation(&self, profile: &mut UserProfile, text: &str) -> Result<Reply> {
        match crate::extract::parse_yes_no(text) {
            Some(true) => {
                profile.subscription = SubscriptionStatus::Cancelled;
                self.store.put_profile(profile).await?;
                info!(user_id = %profile.user_id, "subscription cancelled");
                Ok(Reply::text(match profile.language {
                    Language::English => {
                        "Your subscription is cancelled. Your data stays safe if you \
                         ever want to come back. Take care! 💙"
                    }
                    Language::Spanish => {
                        "Tu suscripción está cancelada. Tus datos quedan guardados por \
                         si quieres volver. ¡Cuídate! 💙"
                    }
                }))
            }
            Some(false) => {
                profile.subscription = SubscriptionStatus::Active;
                self.store.put_profile(profile).await?;
                Ok(Reply::text(match profile.language {
                    Language::English => "Great, glad you're staying! 💪 What can I help you with?",
                    Language::Spanish => "¡Genial, me alegra que te quedes! 💪 ¿En qué te ayudo?",
                }))
            }
            None => Ok(Reply::buttons(
                match profile.language {
                    Language::English => {
                        "Just to confirm: do you want to cancel your subscription? \
                         Please answer yes or no."
                    }
                    Language::Spanish => {
                        "Para confirmar: ¿quieres cancelar tu suscripción? \
                         Responde sí o no."
                    }
                },
                vec!["Yes".to_string(), "No".to_string()],
            )),
        }
    }

    // ── Progress ────────────────────────────────────────────────────

    async fn track_progress(
        &self,
        profile: &mut UserProfile,
        weight_kg: Option<f64>,
    ) -> Result<Reply> {
        // Implausible numbers are not saved; treat the message as a
        // progress question instead.
        let weight_kg = weight_kg.filter(|kg| {
            (crate::extract::WEIGHT_MIN_KG..=crate::extract::WEIGHT_MAX_KG).contains(kg)
        });
        let Some(weight_kg) = weight_kg else {
            // No number in the message; give a narrative progress read.
            let weights = self
                .store
                .recent_weights(&profile.user_id, RECENT_WEIGHTS_FOR_CONTEXT)
                .await?;
            let snapshot = self.store.latest_snapshot(&profile.user_id).await?;
            let ctx = PromptContext::new(profile)
                .with_weights(&weights)
                .with_snapshot(snapshot.as_ref());
            return Ok(Reply::text(self.generator.progress_analysis(&ctx).await));
        };

        let today = Utc::now().date_naive();
        let previous = self
            .store
            .recent_weights(&profile.user_id, RECENT_WEIGHTS_FOR_CONTEXT)
            .await?
            .into_iter()
            .find(|w| w.date < today);

        // Same-day repeats overwrite; the last report of the day wins.
        self.store
            .upsert_weight(&WeightRecord {
                user_id: profile.user_id.clone(),
                date: today,
                weight_kg,
            })
            .await?;
        profile.current_weight_kg = Some(weight_kg);
        self.store.put_profile(profile).await?;

        Ok(Reply::text(weigh_in_reply(
            profile.language,
            weight_kg,
            previous.map(|w| w.weight_kg),
        )))
    }

    // ── Plans ───────────────────────────────────────────────────────

    async fn view_plan(
        &self,
        profile: &mut UserProfile,
        requested: Option<PlanKind>,
    ) -> Result<Reply> {
        let kind = requested.unwrap_or(PlanKind::Workout);
        if let Some(plan) = self.engine.active_plan(&profile.user_id, kind).await? {
            return Ok(Reply::text(plan.summary(profile.language)));
        }

        // Nothing active yet; generate in the background and say so.
        self.scheduler
            .enqueue(
                Job::RegeneratePlans {
                    user_id: profile.user_id.clone(),
                    kind,
                },
                None,
            )
            .await?;
        Ok(Reply::text(match profile.language {
            Language::English => format!(
                "You don't have a {kind} plan yet. I'm creating one now and will \
                 message you the moment it's ready!"
            ),
            Language::Spanish => format!(
                "Todavía no tienes un plan de {}. Lo estoy creando ahora y te \
                 escribiré en cuanto esté listo.",
                match kind {
                    PlanKind::Workout => "entrenamiento",
                    PlanKind::Nutrition => "nutrición",
                }
            ),
        }))
    }

    // ── Free chat ───────────────────────────────────────────────────

    async fn general_query(
        &self,
        profile: &UserProfile,
        text: &str,
        topic: Option<crate::intent::Topic>,
    ) -> Result<Reply> {
        let weights = self
            .store
            .recent_weights(&profile.user_id, RECENT_WEIGHTS_FOR_CONTEXT)
            .await?;
        let snapshot = self.store.latest_snapshot(&profile.user_id).await?;
        let ctx = PromptContext::new(profile)
            .with_weights(&weights)
            .with_snapshot(snapshot.as_ref());
        Ok(Reply::text(
            self.generator.conversational_reply(&ctx, topic, text).await,
        ))
    }
}

/// Trim and collapse internal whitespace runs.
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn generic_apology(language: Language) -> &'static str {
    match language {
        Language::English => {
            "Sorry, something went wrong on my side. Please try again in a moment."
        }
        Language::Spanish => {
            "Lo siento, algo salió mal de mi lado. Inténtalo de nuevo en un momento."
        }
    }
}

fn menu(language: Language) -> Reply {
    match language {
        Language::English => Reply::text(
            "Here's what I can do:\n\
             🏋️ \"my workout plan\" — see your current workout\n\
             🍽️ \"my nutrition plan\" — see your meal plan\n\
             ⚖️ \"I weigh 80 kg\" — log a weigh-in\n\
             📈 \"how's my progress?\" — get a progress read\n\
             💬 Or just ask me anything about training or nutrition!",
        ),
        Language::Spanish => Reply::text(
            "Esto es lo que puedo hacer:\n\
             🏋️ \"mi plan de entrenamiento\" — ver tu rutina actual\n\
             🍽️ \"mi plan de nutrición\" — ver tu plan de comidas\n\
             ⚖️ \"peso 80 kg\" — registrar tu peso\n\
             📈 \"¿cómo va mi progreso?\" — un resumen de tu progreso\n\
             💬 ¡O pregúntame lo que quieras sobre entrenamiento o nutrición!",
        ),
    }
}

fn weigh_in_reply(language: Language, weight_kg: f64, previous_kg: Option<f64>) -> String {
    match (language, previous_kg) {
        (Language::English, None) => format!(
            "Got it, {weight_kg} kg recorded! 📊 This is your first weigh-in, \
             so we now have a baseline to track against."
        ),
        (Language::Spanish, None) => format!(
            "¡Anotado, {weight_kg} kg! 📊 Es tu primer registro de peso, así \
             que ya tenemos una base para comparar."
        ),
        (language, Some(previous)) => {
            let delta = weight_kg - previous;
            match language {
                Language::English => {
                    if delta.abs() < 0.05 {
                        format!("Got it, {weight_kg} kg recorded! Holding steady since last time.")
                    } else if delta < 0.0 {
                        format!(
                            "Got it, {weight_kg} kg recorded! You're down {:.1} kg since \
                             your last weigh-in. 📉",
                            -delta
                        )
                    } else {
                        format!(
                            "Got it, {weight_kg} kg recorded! You're up {delta:.1} kg since \
                             your last weigh-in."
                        )
                    }
                }
                Language::Spanish => {
                    if delta.abs() < 0.05 {
                        format!("¡Anotado, {weight_kg} kg! Te mantienes igual desde la última vez.")
                    } else if delta < 0.0 {
                        format!(
                            "¡Anotado, {weight_kg} kg! Has bajado {:.1} kg desde tu \
                             último registro. 📉",
                            -delta
                        )
                    } else {
                        format!(
                            "¡Anotado, {weight_kg} kg! Has subido {delta:.1} kg desde tu \
                             último registro."
                        )
                    }
                }
            }
        }
    }
}
