//! Constantes del core.

/// Versión del esquema de cuestionarios. Forma parte del input de
/// `definition_hash`: cambiarla invalida los hashes de definiciones previas
/// aunque los pasos no cambien.
pub const QUESTIONNAIRE_SCHEMA_VERSION: &str = "Q1.0";

/// Tabla (lógica) donde se persisten las respuestas.
pub const RESPONSES_TABLE: &str = "questionnaire_responses";

/// Tabla (lógica) de perfiles que contiene la marca de onboarding completado.
pub const PROFILES_TABLE: &str = "user_profiles";
