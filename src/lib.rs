//! wellness-onboarding
//!
//! Aplicación de terminal del cuestionario de onboarding:
//! - `config`: variables de entorno (.env) y carga del cuestionario.
//! - `errors`: `AppError` y su código de salida.
//! - `presenter`: renderers por tipo de pregunta y bucle interactivo.
//!
//! El flujo y la persistencia viven en `onboarding-core` y
//! `onboarding-persistence`.

pub mod config;
pub mod errors;
pub mod presenter;

pub use config::{load_questionnaire, AppConfig};
pub use errors::AppError;
pub use presenter::{run_flow, RunOutcome};
