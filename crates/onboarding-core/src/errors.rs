//! Errores del core: validación de respuestas, navegación, envío y carga de
//! definiciones.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::QuestionKindTag;

/// Motivo por el que una respuesta fue rechazada por `record_answer`.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum AnswerRejection {
    #[error("question does not belong to step {step_number}")]
    NotInCurrentStep { step_number: u32 },
    #[error("expected a {expected} answer, got a {found} answer")]
    KindMismatch { expected: QuestionKindTag, found: QuestionKindTag },
    #[error("'{0}' is not one of the allowed options")]
    UnknownOption(String),
    #[error("{value} is outside [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

/// Cuál de las dos escrituras del envío falló.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteStage {
    /// Inserción (upsert) del lote de respuestas.
    Responses,
    /// Actualización de la marca `onboarding_completed` del perfil.
    CompletionMarker,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStage::Responses => f.write_str("responses batch"),
            WriteStage::CompletionMarker => f.write_str("completion marker"),
        }
    }
}

/// Error devuelto por un `RecordStore`.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum StoreError {
    /// Fallo transitorio (red, pool, conflicto de serialización).
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// El backend rechazó la escritura (constraint, fila inexistente, ...).
    #[error("write rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum FlowError {
    #[error("invalid answer for '{key}': {reason}")]
    InvalidAnswer { key: String, reason: AnswerRejection },
    #[error("step {step_number} is incomplete (missing: {missing:?})")]
    StepIncomplete { step_number: u32, missing: Vec<String> },
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("{stage} write failed: {source}")]
    StoreWriteFailed { stage: WriteStage, source: StoreError },
    #[error("submission already in progress")]
    SubmissionInProgress,
    #[error("flow already submitted")]
    FlowCompleted,
    #[error("internal: {0}")]
    Internal(String),
}

impl FlowError {
    /// Etapa fallida si el error proviene del store.
    pub fn failed_stage(&self) -> Option<WriteStage> {
        match self {
            FlowError::StoreWriteFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// `true` si el usuario puede reintentar `submit()` sin reingresar datos.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::StoreWriteFailed { .. } | FlowError::NotAuthenticated)
    }
}

/// Errores al construir una `QuestionnaireDefinition`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DefinitionError {
    #[error("questionnaire has no steps")]
    Empty,
    #[error("expected step number {expected}, found {found}")]
    StepNumberGap { expected: u32, found: u32 },
    #[error("step {0} has no questions")]
    EmptyStep(u32),
    #[error("duplicate question key '{0}'")]
    DuplicateKey(String),
    #[error("question '{0}' has no options")]
    NoOptions(String),
    #[error("question '{key}' repeats option '{option}'")]
    DuplicateOption { key: String, option: String },
    #[error("question '{key}' has an invalid scale [{min}, {max}]")]
    InvalidScale { key: String, min: i64, max: i64 },
    #[error("could not parse questionnaire: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for DefinitionError {
    fn from(e: serde_json::Error) -> Self {
        DefinitionError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_write_failed_reports_stage() {
        let err = FlowError::StoreWriteFailed { stage: WriteStage::CompletionMarker,
                                                source: StoreError::Unavailable("timeout".into()) };
        assert_eq!(err.to_string(), "completion marker write failed: store unavailable: timeout");
        assert_eq!(err.failed_stage(), Some(WriteStage::CompletionMarker));
        assert!(err.is_retryable());
    }

    #[test]
    fn local_errors_are_not_retryable() {
        let err = FlowError::StepIncomplete { step_number: 2, missing: vec!["mood".into()] };
        assert!(!err.is_retryable());
        assert_eq!(err.failed_stage(), None);
    }

    #[test]
    fn rejection_messages() {
        let r = AnswerRejection::OutOfRange { value: 11, min: 1, max: 10 };
        assert_eq!(r.to_string(), "11 is outside [1, 10]");
        let r = AnswerRejection::KindMismatch { expected: QuestionKindTag::Scale,
                                                found: QuestionKindTag::Select };
        assert_eq!(r.to_string(), "expected a scale answer, got a select answer");
    }
}
