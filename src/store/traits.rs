//! Storage collaborator trait — single async interface for all persistence.
//!
//! The core never traverses an object graph; every lookup goes through this
//! trait with an explicit user id. Persistence engine internals (SQL,
//! migrations, pooling) belong to the implementing collaborator.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::StorageError;
use crate::onboarding::state::ConversationSession;
use crate::plan::model::{Plan, PlanKind};
use crate::profile::UserProfile;

/// Who authored a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in the append-only conversation log. Never mutated.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub user_id: String,
    pub role: MessageRole,
    pub text: String,
    pub kind: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(user_id: impl Into<String>, role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            role,
            text: text.into(),
            kind: "text".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One weight measurement. At most one per (user, date); later writes to the
/// same date overwrite.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WeightRecord {
    pub user_id: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
}

/// Weekly check-in data, keyed by (user, week start). At most one per week.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ProgressSnapshot {
    pub user_id: String,
    pub week_start: NaiveDate,
    /// 1–5 scales, as in the weekly check-in questionnaire.
    pub energy_level: Option<u8>,
    pub workout_adherence: Option<u8>,
    pub diet_adherence: Option<u8>,
    /// Optional body measurements in cm, e.g. ("waist", 82.0).
    pub measurements: Vec<(String, f64)>,
    pub notes: String,
}

/// Backend-agnostic storage trait covering profiles, sessions, plans,
/// weights, progress snapshots, and the message log.
#[async_trait]
pub trait Storage: Send + Sync {
    // ── Profiles ────────────────────────────────────────────────────

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError>;

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StorageError>;

    // ── Onboarding sessions ─────────────────────────────────────────

    async fn get_session(&self, user_id: &str)
    -> Result<Option<ConversationSession>, StorageError>;

    async fn put_session(&self, session: &ConversationSession) -> Result<(), StorageError>;

    /// Delete the session; deleting an absent session is a no-op so that
    /// duplicate completion deliveries stay idempotent.
    async fn delete_session(&self, user_id: &str) -> Result<(), StorageError>;

    // ── Message log ─────────────────────────────────────────────────

    async fn append_message(&self, message: &Message) -> Result<(), StorageError>;

    /// Most recent messages, newest last.
    async fn recent_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError>;

    // ── Plans ───────────────────────────────────────────────────────

    async fn insert_plan(&self, plan: &Plan) -> Result<(), StorageError>;

    async fn update_plan(&self, plan: &Plan) -> Result<(), StorageError>;

    /// All currently active plans of a kind for a user. The plan engine
    /// expects at most one; more than one is an invariant violation it will
    /// correct.
    async fn active_plans(
        &self,
        user_id: &str,
        kind: PlanKind,
    ) -> Result<Vec<Plan>, StorageError>;

    // ── Weight records ──────────────────────────────────────────────

    /// Insert or overwrite the record for (user, date).
    async fn upsert_weight(&self, record: &WeightRecord) -> Result<(), StorageError>;

    async fn weight_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<WeightRecord>, StorageError>;

    /// Most recent records first, up to `limit`.
    async fn recent_weights(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<WeightRecord>, StorageError>;

    // ── Progress snapshots ──────────────────────────────────────────

    async fn upsert_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError>;

    async fn latest_snapshot(
        &self,
        user_id: &str,
    ) -> Result<Option<ProgressSnapshot>, StorageError>;
}
