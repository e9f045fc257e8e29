use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::{RecordStore, ResponseRecord};
use crate::errors::StoreError;
use crate::model::UserId;

/// Store en memoria con la misma semántica de upsert que el backend real.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    responses: DashMap<(UserId, String), ResponseRecord>,
    completed: DashMap<UserId, DateTime<Utc>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respuestas de un usuario ordenadas por (paso, key).
    pub fn responses_for(&self, user_id: UserId) -> Vec<ResponseRecord> {
        let mut rows: Vec<ResponseRecord> = self.responses
                                                .iter()
                                                .filter(|entry| entry.key().0 == user_id)
                                                .map(|entry| entry.value().clone())
                                                .collect();
        rows.sort_by(|a, b| (a.step_number, &a.question_key).cmp(&(b.step_number, &b.question_key)));
        rows
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    pub fn is_onboarding_completed(&self, user_id: UserId) -> bool {
        self.completed.contains_key(&user_id)
    }

    pub fn completed_at(&self, user_id: UserId) -> Option<DateTime<Utc>> {
        self.completed.get(&user_id).map(|ts| *ts)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn upsert_responses(&self, records: &[ResponseRecord]) -> Result<(), StoreError> {
        for record in records {
            self.responses.insert((record.user_id, record.question_key.clone()), record.clone());
        }
        Ok(())
    }

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError> {
        self.completed.entry(user_id).or_insert_with(Utc::now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;
    use uuid::Uuid;

    fn record(user_id: UserId, key: &str, value: i64) -> ResponseRecord {
        ResponseRecord { user_id,
                         step_number: 1,
                         question_key: key.into(),
                         response_value: AnswerValue::Scale(value) }
    }

    #[test]
    fn upsert_is_idempotent_per_user_and_key() {
        let store = InMemoryRecordStore::new();
        let user = UserId::new(Uuid::new_v4());
        let other = UserId::new(Uuid::new_v4());
        tokio_test::block_on(async {
            store.upsert_responses(&[record(user, "mood", 3), record(user, "energy", 5)]).await.unwrap();
            store.upsert_responses(&[record(user, "mood", 8)]).await.unwrap();
            store.upsert_responses(&[record(other, "mood", 1)]).await.unwrap();
        });
        let rows = store.responses_for(user);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().find(|r| r.question_key == "mood").map(|r| &r.response_value),
                   Some(&AnswerValue::Scale(8)));
        assert_eq!(store.response_count(), 3);
    }

    #[test]
    fn completion_marker_keeps_first_timestamp() {
        let store = InMemoryRecordStore::new();
        let user = UserId::new(Uuid::new_v4());
        assert!(!store.is_onboarding_completed(user));
        tokio_test::block_on(store.mark_onboarding_completed(user)).unwrap();
        let first = store.completed_at(user);
        tokio_test::block_on(store.mark_onboarding_completed(user)).unwrap();
        assert!(store.is_onboarding_completed(user));
        assert_eq!(store.completed_at(user), first);
    }
}
