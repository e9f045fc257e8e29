#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use onboarding_core::{InMemoryEventStore, InMemoryRecordStore, QuestionDefinition, QuestionnaireDefinition, QuestionnaireFlow,
                      RecordStore, ResponseRecord, SessionIdentity, StepDefinition, StoreError, UserId};
use uuid::Uuid;

/// Store en memoria con fallos programables y contadores de llamadas.
#[derive(Default)]
pub struct ScriptedStore {
    pub inner: InMemoryRecordStore,
    fail_upserts: AtomicUsize,
    fail_markers: AtomicUsize,
    upsert_calls: AtomicUsize,
    marker_calls: AtomicUsize,
    rows_sent: AtomicUsize,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Las próximas `n` llamadas a `upsert_responses` fallan.
    pub fn failing_upserts(self, n: usize) -> Self {
        self.fail_upserts.store(n, Ordering::SeqCst);
        self
    }

    /// Las próximas `n` llamadas a `mark_onboarding_completed` fallan.
    pub fn failing_markers(self, n: usize) -> Self {
        self.fail_markers.store(n, Ordering::SeqCst);
        self
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn marker_calls(&self) -> usize {
        self.marker_calls.load(Ordering::SeqCst)
    }

    /// Total de filas enviadas en todos los upserts exitosos.
    pub fn rows_sent(&self) -> usize {
        self.rows_sent.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)).is_ok()
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn upsert_responses(&self, records: &[ResponseRecord]) -> Result<(), StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_upserts) {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.rows_sent.fetch_add(records.len(), Ordering::SeqCst);
        self.inner.upsert_responses(records).await
    }

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError> {
        self.marker_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_markers) {
            return Err(StoreError::Rejected("profile update failed".into()));
        }
        self.inner.mark_onboarding_completed(user_id).await
    }
}

/// Store cuyo `upsert_responses` nunca termina; cuenta las llamadas.
#[derive(Default)]
pub struct PendingStore {
    pub inner: InMemoryRecordStore,
    upsert_calls: AtomicUsize,
    marker_calls: AtomicUsize,
}

impl PendingStore {
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn marker_calls(&self) -> usize {
        self.marker_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for PendingStore {
    async fn upsert_responses(&self, _records: &[ResponseRecord]) -> Result<(), StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError> {
        self.marker_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.mark_onboarding_completed(user_id).await
    }
}

pub type TestFlow = QuestionnaireFlow<Arc<SessionIdentity>, Arc<ScriptedStore>, InMemoryEventStore>;

/// Paso 1: `age_range` (select obligatorio). Paso 2: `mood` (escala 1–10).
pub fn two_step_definition() -> QuestionnaireDefinition {
    QuestionnaireDefinition::new(vec![
        StepDefinition::new(1, "About you", vec![QuestionDefinition::select("age_range", "What is your age range?", ["18-24", "25+"])]),
        StepDefinition::new(2, "Mood", vec![QuestionDefinition::scale("mood", "How is your mood?", (1, 10), "Very low", "Excellent")]),
    ]).expect("two step definition")
}

pub fn new_user() -> UserId {
    UserId::new(Uuid::new_v4())
}

pub fn flow_with(definition: QuestionnaireDefinition, identity: Arc<SessionIdentity>, store: Arc<ScriptedStore>) -> TestFlow {
    QuestionnaireFlow::new_with_collaborators(definition, identity, store, InMemoryEventStore::default())
}
