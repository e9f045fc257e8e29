//! Configuración de la aplicación.
//! Carga variables de entorno (.env) una sola vez; los flags de línea de
//! comandos tienen prioridad sobre el entorno.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dotenvy::dotenv;
use once_cell::sync::Lazy;
use onboarding_core::catalog::default_questionnaire;
use onboarding_core::{QuestionnaireDefinition, UserId};

use crate::errors::AppError;

static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv();
});

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const USER_ID_VAR: &str = "ONBOARDING_USER_ID";
pub const QUESTIONNAIRE_VAR: &str = "ONBOARDING_QUESTIONNAIRE";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Sin URL se usa el store en memoria.
    pub database_url: Option<String>,
    /// Usuario autenticado al iniciar; sin él, se pide al enviar.
    pub user_id: Option<UserId>,
    /// JSON con los pasos; sin él, el cuestionario por defecto.
    pub questionnaire_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Lazy::force(&DOTENV_LOADED);
        let user_id = match non_empty_var(USER_ID_VAR) {
            Some(raw) => Some(raw.parse::<UserId>()
                                 .map_err(|e| AppError::Config(format!("{USER_ID_VAR} inválido: {e}")))?),
            None => None,
        };
        Ok(Self { database_url: non_empty_var(DATABASE_URL_VAR),
                  user_id,
                  questionnaire_path: non_empty_var(QUESTIONNAIRE_VAR).map(PathBuf::from) })
    }

    /// Aplica los valores provistos por la línea de comandos.
    pub fn with_overrides(mut self, user_id: Option<UserId>, questionnaire_path: Option<PathBuf>, in_memory: bool) -> Self {
        if user_id.is_some() {
            self.user_id = user_id;
        }
        if questionnaire_path.is_some() {
            self.questionnaire_path = questionnaire_path;
        }
        if in_memory {
            self.database_url = None;
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Carga el cuestionario desde `path` o devuelve el cuestionario por defecto.
pub fn load_questionnaire(path: Option<&Path>) -> Result<QuestionnaireDefinition, AppError> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            Ok(QuestionnaireDefinition::from_json(&raw)?)
        }
        None => Ok(default_questionnaire()?),
    }
}
