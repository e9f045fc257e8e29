//! Puerto de persistencia de respuestas (`RecordStore`) y su implementación
//! en memoria.
//!
//! Contrato:
//! - `upsert_responses` escribe el lote completo como una sola operación
//!   lógica. Es idempotente por `(user_id, question_key)`: repetir el mismo
//!   lote sobrescribe en vez de duplicar filas.
//! - `mark_onboarding_completed` fija la marca booleana del perfil.
//! - Ambas son llamadas de red con sus propios modos de fallo; el flujo sólo
//!   distingue éxito de `StoreError`.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::model::{AnswerValue, UserId};

pub use memory::InMemoryRecordStore;

/// Fila persistida por respuesta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub user_id: UserId,
    pub step_number: u32,
    pub question_key: String,
    pub response_value: AnswerValue,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn upsert_responses(&self, records: &[ResponseRecord]) -> Result<(), StoreError>;

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn upsert_responses(&self, records: &[ResponseRecord]) -> Result<(), StoreError> {
        (**self).upsert_responses(records).await
    }

    async fn mark_onboarding_completed(&self, user_id: UserId) -> Result<(), StoreError> {
        (**self).mark_onboarding_completed(user_id).await
    }
}
