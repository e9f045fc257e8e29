use serde::{Deserialize, Serialize};

use super::QuestionDefinition;

/// Una pantalla del cuestionario: preguntas agrupadas bajo un título.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// 1-based; define el orden de presentación y el `step_number` persistido.
    #[serde(rename = "step")]
    pub step_number: u32,
    pub title: String,
    pub questions: Vec<QuestionDefinition>,
}

impl StepDefinition {
    pub fn new(step_number: u32, title: impl Into<String>, questions: Vec<QuestionDefinition>) -> Self {
        Self { step_number,
               title: title.into(),
               questions }
    }

    pub fn question(&self, key: &str) -> Option<&QuestionDefinition> {
        self.questions.iter().find(|q| q.key == key)
    }

    pub fn required_questions(&self) -> impl Iterator<Item = &QuestionDefinition> {
        self.questions.iter().filter(|q| q.required)
    }
}
