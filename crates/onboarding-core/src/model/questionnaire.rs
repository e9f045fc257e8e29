//! Definición validada e inmutable del cuestionario.
//!
//! `QuestionnaireDefinition::new` es el único punto de entrada y garantiza:
//! - al menos un paso, con `step_number` contiguos `1..=N` en orden;
//! - cada paso con al menos una pregunta;
//! - `key` únicas en todo el cuestionario;
//! - opciones no vacías y sin repetir; escalas con `min < max`.
//!
//! Además mantiene un índice `key -> (paso, pregunta)` para etiquetar cada
//! respuesta con su paso exacto al momento del envío, y un `definition_hash`
//! que identifica la versión del cuestionario.
use std::collections::{HashMap, HashSet};

use serde_json::json;

use super::{QuestionDefinition, QuestionKind, StepDefinition};
use crate::constants::QUESTIONNAIRE_SCHEMA_VERSION;
use crate::errors::DefinitionError;
use crate::hashing::hash_value;

/// Posición de una pregunta dentro de la definición.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuestionLocation {
    pub step_index: usize,
    pub question_index: usize,
}

#[derive(Debug, Clone)]
pub struct QuestionnaireDefinition {
    steps: Vec<StepDefinition>,
    index: HashMap<String, QuestionLocation>,
    definition_hash: String,
}

impl QuestionnaireDefinition {
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self, DefinitionError> {
        if steps.is_empty() {
            return Err(DefinitionError::Empty);
        }
        let mut index = HashMap::new();
        for (step_index, step) in steps.iter().enumerate() {
            let expected = step_index as u32 + 1;
            if step.step_number != expected {
                return Err(DefinitionError::StepNumberGap { expected,
                                                            found: step.step_number });
            }
            if step.questions.is_empty() {
                return Err(DefinitionError::EmptyStep(step.step_number));
            }
            for (question_index, question) in step.questions.iter().enumerate() {
                check_question(question)?;
                let location = QuestionLocation { step_index, question_index };
                if index.insert(question.key.clone(), location).is_some() {
                    return Err(DefinitionError::DuplicateKey(question.key.clone()));
                }
            }
        }
        let definition_hash = hash_value(&json!({
                                             "schema_version": QUESTIONNAIRE_SCHEMA_VERSION,
                                             "steps": serde_json::to_value(&steps)?,
                                         }));
        Ok(Self { steps,
                  index,
                  definition_hash })
    }

    /// Carga una definición desde JSON (arreglo de pasos en la forma de
    /// configuración original) y la valida.
    pub fn from_json(raw: &str) -> Result<Self, DefinitionError> {
        let steps: Vec<StepDefinition> = serde_json::from_str(raw)?;
        Self::new(steps)
    }

    pub fn steps(&self) -> &[StepDefinition] {
        &self.steps
    }

    pub fn step(&self, step_index: usize) -> Option<&StepDefinition> {
        self.steps.get(step_index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Siempre `false` para una definición construida con `new`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn locate(&self, key: &str) -> Option<QuestionLocation> {
        self.index.get(key).copied()
    }

    pub fn question(&self, key: &str) -> Option<&QuestionDefinition> {
        let loc = self.locate(key)?;
        self.steps.get(loc.step_index)?.questions.get(loc.question_index)
    }
}

fn check_question(question: &QuestionDefinition) -> Result<(), DefinitionError> {
    match &question.kind {
        QuestionKind::Select { options } | QuestionKind::MultiSelect { options } => {
            if options.is_empty() {
                return Err(DefinitionError::NoOptions(question.key.clone()));
            }
            let mut seen = HashSet::new();
            for option in options {
                if !seen.insert(option.as_str()) {
                    return Err(DefinitionError::DuplicateOption { key: question.key.clone(),
                                                                  option: option.clone() });
                }
            }
            Ok(())
        }
        QuestionKind::Scale { min, max, .. } if min >= max => Err(DefinitionError::InvalidScale { key: question.key.clone(),
                                                                                                  min: *min,
                                                                                                  max: *max }),
        QuestionKind::Scale { .. } => Ok(()),
    }
}
