//! In-memory storage backend.
//!
//! Backs the default binary and every test. A SQL-backed collaborator can
//! replace it behind the same trait without touching the core.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::onboarding::state::ConversationSession;
use crate::plan::model::{Plan, PlanKind};
use crate::profile::UserProfile;

use super::traits::{Message, ProgressSnapshot, Storage, WeightRecord};

#[derive(Default)]
struct Inner {
    profiles: HashMap<String, UserProfile>,
    sessions: HashMap<String, ConversationSession>,
    messages: Vec<Message>,
    plans: Vec<Plan>,
    weights: HashMap<(String, NaiveDate), WeightRecord>,
    snapshots: HashMap<(String, NaiveDate), ProgressSnapshot>,
}

/// Thread-safe in-memory store.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.inner.read().await.profiles.get(user_id).cloned())
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        user_id: &str,
    ) -> Result<Option<ConversationSession>, StorageError> {
        Ok(self.inner.read().await.sessions.get(user_id).cloned())
    }

    async fn put_session(&self, session: &ConversationSession) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .sessions
            .insert(session.user_id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, user_id: &str) -> Result<(), StorageError> {
        self.inner.write().await.sessions.remove(user_id);
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), StorageError> {
        self.inner.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn recent_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        let inner = self.inner.read().await;
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect();
        let skip = messages.len().saturating_sub(limit);
        Ok(messages.split_off(skip))
    }

    async fn insert_plan(&self, plan: &Plan) -> Result<(), StorageError> {
        self.inner.write().await.plans.push(plan.clone());
        Ok(())
    }

    async fn update_plan(&self, plan: &Plan) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        match inner.plans.iter_mut().find(|p| p.id == plan.id) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(StorageError::NotFound {
                entity: "plan".to_string(),
                id: plan.id.to_string(),
            }),
        }
    }

    async fn active_plans(
        &self,
        user_id: &str,
        kind: PlanKind,
    ) -> Result<Vec<Plan>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && p.kind == kind && p.is_active)
            .cloned()
            .collect())
    }

    async fn upsert_weight(&self, record: &WeightRecord) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .weights
            .insert((record.user_id.clone(), record.date), record.clone());
        Ok(())
    }

    async fn weight_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Option<WeightRecord>, StorageError> {
        Ok(self
            .inner
            .read()
            .await
            .weights
            .get(&(user_id.to_string(), date))
            .cloned())
    }

    async fn recent_weights(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<WeightRecord>, StorageError> {
        let inner = self.inner.read().await;
        let mut records: Vec<WeightRecord> = inner
            .weights
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(limit);
        Ok(records)
    }

    async fn upsert_snapshot(&self, snapshot: &ProgressSnapshot) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .snapshots
            .insert((snapshot.user_id.clone(), snapshot.week_start), snapshot.clone());
        Ok(())
    }

    async fn latest_snapshot(
        &self,
        user_id: &str,
    ) -> Result<Option<ProgressSnapshot>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .snapshots
            .values()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.week_start)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Language;
    use crate::store::traits::MessageRole;

    #[tokio::test]
    async fn profile_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get_profile("u1").await.unwrap().is_none());

        let profile = UserProfile::new("u1", Language::English);
        store.put_profile(&profile).await.unwrap();
        let loaded = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(loaded.user_id, "u1");
    }

    #[tokio::test]
    async fn weight_upsert_overwrites_same_date() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        store
            .upsert_weight(&WeightRecord {
                user_id: "u1".into(),
                date,
                weight_kg: 80.0,
            })
            .await
            .unwrap();
        store
            .upsert_weight(&WeightRecord {
                user_id: "u1".into(),
                date,
                weight_kg: 79.5,
            })
            .await
            .unwrap();

        let records = store.recent_weights("u1", 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].weight_kg, 79.5);
    }

    #[tokio::test]
    async fn recent_weights_sorted_newest_first() {
        let store = MemoryStore::new();
        for (day, kg) in [(1, 82.0), (15, 81.0), (8, 81.5)] {
            store
                .upsert_weight(&WeightRecord {
                    user_id: "u1".into(),
                    date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
                    weight_kg: kg,
                })
                .await
                .unwrap();
        }
        let records = store.recent_weights("u1", 2).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].weight_kg, 81.0);
        assert_eq!(records[1].weight_kg, 81.5);
    }

    #[tokio::test]
    async fn message_log_is_append_only_per_user() {
        let store = MemoryStore::new();
        store
            .append_message(&Message::new("u1", MessageRole::User, "hi"))
            .await
            .unwrap();
        store
            .append_message(&Message::new("u2", MessageRole::User, "hola"))
            .await
            .unwrap();
        store
            .append_message(&Message::new("u1", MessageRole::Assistant, "hello!"))
            .await
            .unwrap();

        let messages = store.recent_messages("u1", 10).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "hello!");
    }

    #[tokio::test]
    async fn delete_session_is_idempotent() {
        let store = MemoryStore::new();
        store.delete_session("nobody").await.unwrap();
        store.delete_session("nobody").await.unwrap();
    }
}
