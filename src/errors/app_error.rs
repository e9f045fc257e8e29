use onboarding_core::{DefinitionError, FlowError};
use onboarding_persistence::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Cuestionario inválido: {0}")]
    Definition(#[from] DefinitionError),
    #[error("Error del flujo: {0}")]
    Flow(#[from] FlowError),
    #[error("Error de persistencia: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Error de terminal: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tarea bloqueante abortada: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Código de salida del proceso.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Definition(_) => 2,
            AppError::Flow(FlowError::NotAuthenticated) => 3,
            AppError::Flow(FlowError::StoreWriteFailed { .. }) | AppError::Persistence(_) => 4,
            AppError::Flow(_) => 5,
            AppError::Prompt(_) | AppError::Io(_) | AppError::Task(_) => 1,
        }
    }
}
