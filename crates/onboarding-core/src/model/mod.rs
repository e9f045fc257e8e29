//! Modelo del cuestionario: preguntas tipadas, respuestas, pasos y la
//! definición validada completa.

pub mod answer;
pub mod question;
pub mod questionnaire;
pub mod step;
pub mod user;

pub use answer::{AnswerValue, DraftAnswers};
pub use question::{QuestionDefinition, QuestionKind, QuestionKindTag};
pub use questionnaire::{QuestionLocation, QuestionnaireDefinition};
pub use step::StepDefinition;
pub use user::UserId;
