//! Definición de preguntas como variante etiquetada por `kind`.
//!
//! Cada variante lleva sus propias restricciones (opciones o rango), de modo
//! que la validación de una respuesta es un `match` sobre el par
//! `(kind, valor)` y la capa de presentación elige su renderer a partir de
//! `QuestionKindTag`.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AnswerValue;
use crate::errors::AnswerRejection;

/// Tipo de pregunta con sus restricciones.
///
/// Se (de)serializa con la forma de configuración original:
/// `{"type": "select", "options": [...]}` o
/// `{"type": "scale", "min": 1, "max": 10, "minLabel": "...", "maxLabel": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Select {
        options: Vec<String>,
    },
    MultiSelect {
        options: Vec<String>,
    },
    Scale {
        min: i64,
        max: i64,
        #[serde(rename = "minLabel")]
        min_label: String,
        #[serde(rename = "maxLabel")]
        max_label: String,
    },
}

/// Discriminante sin datos de `QuestionKind` (y de `AnswerValue`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKindTag {
    Select,
    MultiSelect,
    Scale,
}

impl fmt::Display for QuestionKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKindTag::Select => f.write_str("select"),
            QuestionKindTag::MultiSelect => f.write_str("multiselect"),
            QuestionKindTag::Scale => f.write_str("scale"),
        }
    }
}

impl QuestionKind {
    pub fn tag(&self) -> QuestionKindTag {
        match self {
            QuestionKind::Select { .. } => QuestionKindTag::Select,
            QuestionKind::MultiSelect { .. } => QuestionKindTag::MultiSelect,
            QuestionKind::Scale { .. } => QuestionKindTag::Scale,
        }
    }

    /// Opciones permitidas (sólo select / multiselect).
    pub fn options(&self) -> Option<&[String]> {
        match self {
            QuestionKind::Select { options } | QuestionKind::MultiSelect { options } => Some(options),
            QuestionKind::Scale { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Único en todo el cuestionario; es la clave de la respuesta y el
    /// `question_key` persistido.
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default)]
    pub required: bool,
}

impl QuestionDefinition {
    pub fn select<I, S>(key: impl Into<String>, label: impl Into<String>, options: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { key: key.into(),
               label: label.into(),
               kind: QuestionKind::Select { options: options.into_iter().map(Into::into).collect() },
               required: true }
    }

    pub fn multiselect<I, S>(key: impl Into<String>, label: impl Into<String>, options: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self { key: key.into(),
               label: label.into(),
               kind: QuestionKind::MultiSelect { options: options.into_iter().map(Into::into).collect() },
               required: true }
    }

    pub fn scale(key: impl Into<String>,
                 label: impl Into<String>,
                 (min, max): (i64, i64),
                 min_label: impl Into<String>,
                 max_label: impl Into<String>)
                 -> Self {
        Self { key: key.into(),
               label: label.into(),
               kind: QuestionKind::Scale { min,
                                           max,
                                           min_label: min_label.into(),
                                           max_label: max_label.into() },
               required: true }
    }

    /// Marca la pregunta como opcional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn tag(&self) -> QuestionKindTag {
        self.kind.tag()
    }

    /// Verifica que `value` cumpla las restricciones del tipo de pregunta.
    ///
    /// Un multiselect vacío es válido (refleja deseleccionar todo); la
    /// obligatoriedad se evalúa aparte en `is_satisfied_by`.
    pub fn validate(&self, value: &AnswerValue) -> Result<(), AnswerRejection> {
        match (&self.kind, value) {
            (QuestionKind::Select { options }, AnswerValue::Choice(choice)) => {
                if options.iter().any(|o| o == choice) {
                    Ok(())
                } else {
                    Err(AnswerRejection::UnknownOption(choice.clone()))
                }
            }
            (QuestionKind::MultiSelect { options }, AnswerValue::Choices(choices)) => {
                match choices.iter().find(|c| !options.contains(c)) {
                    Some(unknown) => Err(AnswerRejection::UnknownOption(unknown.clone())),
                    None => Ok(()),
                }
            }
            (QuestionKind::Scale { min, max, .. }, AnswerValue::Scale(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(AnswerRejection::OutOfRange { value: *n, min: *min, max: *max })
                }
            }
            (kind, value) => Err(AnswerRejection::KindMismatch { expected: kind.tag(),
                                                                 found: value.tag() }),
        }
    }

    /// `true` si `value` cuenta como respuesta presente para el gating de
    /// pasos: válida y, para multiselect, no vacía.
    pub fn is_satisfied_by(&self, value: &AnswerValue) -> bool {
        self.validate(value).is_ok() && !value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mood() -> QuestionDefinition {
        QuestionDefinition::scale("mood", "How is your mood?", (1, 10), "Very low", "Excellent")
    }

    #[test]
    fn scale_bounds_are_inclusive() {
        let q = mood();
        assert!(q.validate(&AnswerValue::Scale(1)).is_ok());
        assert!(q.validate(&AnswerValue::Scale(10)).is_ok());
        assert_eq!(q.validate(&AnswerValue::Scale(11)),
                   Err(AnswerRejection::OutOfRange { value: 11, min: 1, max: 10 }));
        assert!(q.validate(&AnswerValue::Scale(0)).is_err());
    }

    #[test]
    fn select_rejects_unknown_option_and_wrong_kind() {
        let q = QuestionDefinition::select("age_range", "Age", ["18-24", "25+"]);
        assert!(q.validate(&AnswerValue::choice("18-24")).is_ok());
        assert_eq!(q.validate(&AnswerValue::choice("12-17")),
                   Err(AnswerRejection::UnknownOption("12-17".into())));
        assert_eq!(q.validate(&AnswerValue::Scale(3)),
                   Err(AnswerRejection::KindMismatch { expected: QuestionKindTag::Select,
                                                       found: QuestionKindTag::Scale }));
    }

    #[test]
    fn empty_multiselect_is_valid_but_not_satisfied() {
        let q = QuestionDefinition::multiselect("goals", "Goals", ["A", "B", "C"]);
        let empty = AnswerValue::choices(Vec::<String>::new());
        assert!(q.validate(&empty).is_ok());
        assert!(!q.is_satisfied_by(&empty));
        assert!(q.is_satisfied_by(&AnswerValue::choices(["A"])));
        assert_eq!(q.validate(&AnswerValue::choices(["A", "Z"])),
                   Err(AnswerRejection::UnknownOption("Z".into())));
    }

    #[test]
    fn deserializes_original_configuration_shape() {
        let q: QuestionDefinition = serde_json::from_value(json!({
            "key": "current_mood",
            "label": "How would you rate your overall mood this week?",
            "type": "scale",
            "min": 1,
            "max": 10,
            "minLabel": "Very low",
            "maxLabel": "Excellent",
            "required": true
        })).expect("scale question");
        assert_eq!(q.tag(), QuestionKindTag::Scale);
        assert!(q.required);

        let q: QuestionDefinition = serde_json::from_value(json!({
            "key": "goals", "label": "Goals", "type": "multiselect", "options": ["A"]
        })).expect("multiselect question");
        assert_eq!(q.tag(), QuestionKindTag::MultiSelect);
        assert!(!q.required, "required defaults to false when omitted");
    }
}
