//! Valores de respuesta y el borrador en memoria (`DraftAnswers`).

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::QuestionKindTag;

/// Respuesta a una pregunta. La forma depende del tipo de pregunta.
///
/// Se serializa sin etiqueta (string, arreglo o entero), que es la forma
/// persistida en `response_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(String),
    Choices(BTreeSet<String>),
    Scale(i64),
}

impl AnswerValue {
    pub fn choice(value: impl Into<String>) -> Self {
        AnswerValue::Choice(value.into())
    }

    pub fn choices<I, S>(values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        AnswerValue::Choices(values.into_iter().map(Into::into).collect())
    }

    /// Tipo de pregunta al que corresponde esta forma de respuesta.
    pub fn tag(&self) -> QuestionKindTag {
        match self {
            AnswerValue::Choice(_) => QuestionKindTag::Select,
            AnswerValue::Choices(_) => QuestionKindTag::MultiSelect,
            AnswerValue::Scale(_) => QuestionKindTag::Scale,
        }
    }

    /// Sólo un multiselect sin elementos (o un select vacío) cuenta como vacío.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Choice(s) => s.is_empty(),
            AnswerValue::Choices(set) => set.is_empty(),
            AnswerValue::Scale(_) => false,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AnswerValue::Choice(s) => serde_json::Value::String(s.clone()),
            AnswerValue::Choices(set) => serde_json::Value::Array(set.iter().cloned().map(serde_json::Value::String).collect()),
            AnswerValue::Scale(n) => serde_json::Value::from(*n),
        }
    }
}

/// Borrador de respuestas por `key`, en orden de primera inserción.
///
/// Vive sólo en memoria dentro del flujo; nunca se persiste parcialmente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DraftAnswers {
    inner: IndexMap<String, AnswerValue>,
}

impl DraftAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.inner.get(key)
    }

    /// Inserta o sobrescribe; devuelve el valor previo.
    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        self.inner.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Objeto JSON `key -> response_value` (entrada del fingerprint del lote).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.inner.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn untagged_serialization_matches_response_value_shape() {
        assert_eq!(serde_json::to_value(AnswerValue::choice("18-24")).unwrap(), json!("18-24"));
        assert_eq!(serde_json::to_value(AnswerValue::Scale(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(AnswerValue::choices(["Work", "Health"])).unwrap(),
                   json!(["Health", "Work"]));
        let back: AnswerValue = serde_json::from_value(json!(["Work"])).unwrap();
        assert_eq!(back, AnswerValue::choices(["Work"]));
        let back: AnswerValue = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(back, AnswerValue::Scale(4));
    }

    #[test]
    fn insert_overwrites_without_moving_position() {
        let mut draft = DraftAnswers::new();
        draft.insert("a", AnswerValue::Scale(1));
        draft.insert("b", AnswerValue::Scale(2));
        let prev = draft.insert("a", AnswerValue::Scale(9));
        assert_eq!(prev, Some(AnswerValue::Scale(1)));
        let keys: Vec<&str> = draft.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(draft.get("a"), Some(&AnswerValue::Scale(9)));
        assert_eq!(draft.to_json(), json!({"a": 9, "b": 2}));
    }
}
