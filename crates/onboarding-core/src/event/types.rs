//! Tipos de evento del flujo y estructura `FlowEvent`.
//!
//! Rol en el flujo:
//! - Cada operación que muta el `FlowState` emite un evento a un
//!   `EventStore` append-only.
//! - Las llamadas rechazadas (respuesta inválida, paso incompleto, flujo ya
//!   enviado) no emiten nada.
//! - El enum `FlowEventKind` es el contrato observable del flujo para la capa
//!   de presentación y para auditoría.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{StoreError, WriteStage};
use crate::model::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FlowEventKind {
    /// Primer evento de un `flow_id`: fija la versión del cuestionario.
    FlowStarted { definition_hash: String, step_count: usize },
    /// Se aceptó (o sobrescribió) una respuesta.
    AnswerRecorded { step_number: u32, question_key: String },
    StepAdvanced { from: usize, to: usize },
    StepReverted { from: usize, to: usize },
    /// Inicio de un intento de envío (primer intento o reintento).
    SubmissionStarted { user_id: UserId, record_count: usize },
    /// El lote de respuestas quedó persistido.
    ResponsesStored { record_count: usize, batch_fingerprint: String },
    /// Reintento: el mismo lote ya estaba persistido, sólo falta la marca.
    ResponsesAlreadyStored { batch_fingerprint: String },
    CompletionMarked { user_id: UserId },
    SubmissionFailed { stage: WriteStage, error: StoreError },
    /// Cierre exitoso; estado terminal.
    FlowSubmitted { batch_fingerprint: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEvent {
    pub seq: u64, // asignado por el EventStore (orden append)
    pub flow_id: Uuid,
    pub kind: FlowEventKind,
    pub ts: DateTime<Utc>,
}
