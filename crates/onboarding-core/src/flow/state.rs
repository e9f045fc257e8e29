//! Estado del flujo y resultados de sus operaciones.

use serde::{Deserialize, Serialize};

use crate::model::{DraftAnswers, UserId};

/// Estado de envío del flujo.
///
/// Transiciones válidas:
/// - `Editing` -> `Submitting` (advance desde el último paso)
/// - `Submitting` -> `Submitted` | `Failed`
/// - `Failed` -> `Submitting` (reintento)
///
/// `Submitted` es terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Editing,
    Submitting,
    Submitted,
    Failed,
}

/// Estado exclusivo de una instancia de flujo. Nunca se persiste a mitad de
/// camino.
#[derive(Debug, Clone, Serialize)]
pub struct FlowState {
    pub(crate) current_step_index: usize,
    pub(crate) answers: DraftAnswers,
    pub(crate) submission_status: SubmissionStatus,
}

impl FlowState {
    pub(crate) fn fresh() -> Self {
        Self { current_step_index: 0,
               answers: DraftAnswers::new(),
               submission_status: SubmissionStatus::Editing }
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn answers(&self) -> &DraftAnswers {
        &self.answers
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.submission_status
    }
}

/// Comprobante de un envío exitoso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub user_id: UserId,
    pub record_count: usize,
    /// Hash del lote (usuario + respuestas) persistido.
    pub batch_fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Se pasó al paso indicado.
    Moved { step_index: usize },
    /// Era el último paso: el envío terminó bien.
    Submitted(SubmissionReceipt),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved { step_index: usize },
    /// Ya en el primer paso; el llamador decide si sale del flujo.
    AtFirstStep,
    /// El flujo ya fue enviado (o se está enviando) y no admite navegación.
    Locked,
}
