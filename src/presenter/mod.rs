//! Presentación en terminal del cuestionario.
//!
//! Cada `QuestionKindTag` tiene un `Renderer` (prompt de dialoguer) que
//! devuelve el `AnswerValue` elegido; el flujo valida y registra el valor.
//! Los textos (encabezado, progreso, etiqueta de avance) son funciones puras.

mod terminal;

use dialoguer::{Input, MultiSelect, Select};
use onboarding_core::{AnswerValue, QuestionDefinition, QuestionKind, QuestionKindTag};

use crate::errors::AppError;

pub use terminal::{run_flow, RunOutcome};

/// Prompt para una pregunta; recibe la respuesta actual (si existe) como
/// valor inicial.
pub type Renderer = fn(&QuestionDefinition, Option<&AnswerValue>) -> Result<AnswerValue, AppError>;

pub fn renderer_for(tag: QuestionKindTag) -> Renderer {
    match tag {
        QuestionKindTag::Select => render_select,
        QuestionKindTag::MultiSelect => render_multiselect,
        QuestionKindTag::Scale => render_scale,
    }
}

fn options_of(question: &QuestionDefinition) -> &[String] {
    question.kind.options().unwrap_or(&[])
}

pub fn render_select(question: &QuestionDefinition, current: Option<&AnswerValue>) -> Result<AnswerValue, AppError> {
    let options = options_of(question);
    let default = match current {
        Some(AnswerValue::Choice(chosen)) => options.iter().position(|o| o == chosen).unwrap_or(0),
        _ => 0,
    };
    let index = Select::new().with_prompt(&question.label)
                             .items(options)
                             .default(default)
                             .interact()?;
    Ok(AnswerValue::choice(options[index].clone()))
}

pub fn render_multiselect(question: &QuestionDefinition, current: Option<&AnswerValue>) -> Result<AnswerValue, AppError> {
    let options = options_of(question);
    let checked: Vec<bool> = match current {
        Some(AnswerValue::Choices(selected)) => options.iter().map(|o| selected.contains(o)).collect(),
        _ => vec![false; options.len()],
    };
    let picked = MultiSelect::new().with_prompt(format!("{} (space to toggle, enter to confirm)", question.label))
                                   .items(options)
                                   .defaults(&checked)
                                   .interact()?;
    Ok(AnswerValue::choices(picked.into_iter().map(|i| options[i].clone())))
}

pub fn render_scale(question: &QuestionDefinition, current: Option<&AnswerValue>) -> Result<AnswerValue, AppError> {
    let (min, max) = match &question.kind {
        QuestionKind::Scale { min, max, .. } => (*min, *max),
        _ => (i64::MIN, i64::MAX),
    };
    let prompt = match scale_hint(question) {
        Some(hint) => format!("{} [{hint}]", question.label),
        None => question.label.clone(),
    };
    let mut input = Input::<i64>::new().with_prompt(prompt)
                                       .validate_with(move |value: &i64| -> Result<(), String> {
                                           if (min..=max).contains(value) {
                                               Ok(())
                                           } else {
                                               Err(format!("enter a number between {min} and {max}"))
                                           }
                                       });
    if let Some(AnswerValue::Scale(value)) = current {
        input = input.default(*value);
    }
    Ok(AnswerValue::Scale(input.interact_text()?))
}

/// "1 = Very low, 10 = Excellent" para preguntas de escala.
pub fn scale_hint(question: &QuestionDefinition) -> Option<String> {
    match &question.kind {
        QuestionKind::Scale { min,
                              max,
                              min_label,
                              max_label, } => Some(format!("{min} = {min_label}, {max} = {max_label}")),
        _ => None,
    }
}

/// Encabezado del paso; `percent` es `QuestionnaireFlow::progress_percent`.
pub fn step_header(step_index: usize, step_count: usize, percent: f32, title: &str) -> String {
    format!("\nStep {} of {} ({percent:.0}% complete)\n{title}", step_index + 1, step_count)
}

/// Etiqueta del botón de avance: el último paso envía.
pub fn advance_label(is_last_step: bool) -> &'static str {
    if is_last_step {
        "Complete"
    } else {
        "Continue"
    }
}

pub fn missing_message(missing: &[String]) -> String {
    format!("Please answer before continuing: {}", missing.join(", "))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavChoice {
    Advance,
    Back,
    Quit,
}

/// Acciones ofrecidas al final de un paso, con su etiqueta.
pub fn nav_choices(is_last_step: bool) -> Vec<(NavChoice, &'static str)> {
    vec![(NavChoice::Advance, advance_label(is_last_step)), (NavChoice::Back, "Back"), (NavChoice::Quit, "Quit")]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_shows_position_and_percent() {
        assert_eq!(step_header(1, 5, 40.0, "Your mental health goals"),
                   "\nStep 2 of 5 (40% complete)\nYour mental health goals");
        assert_eq!(step_header(0, 3, 100.0 / 3.0, "Mood"), "\nStep 1 of 3 (33% complete)\nMood");
    }

    #[test]
    fn advance_label_switches_on_last_step() {
        assert_eq!(advance_label(false), "Continue");
        assert_eq!(advance_label(true), "Complete");
        assert_eq!(nav_choices(true)[0], (NavChoice::Advance, "Complete"));
    }

    #[test]
    fn scale_hint_uses_bound_labels() {
        let q = QuestionDefinition::scale("current_mood", "Mood", (1, 10), "Very low", "Excellent");
        assert_eq!(scale_hint(&q).as_deref(), Some("1 = Very low, 10 = Excellent"));
        let s = QuestionDefinition::select("gender", "Gender", ["Male", "Female"]);
        assert_eq!(scale_hint(&s), None);
    }

    #[test]
    fn missing_message_lists_keys() {
        assert_eq!(missing_message(&["gender".to_string(), "age_range".to_string()]),
                   "Please answer before continuing: gender, age_range");
    }
}
