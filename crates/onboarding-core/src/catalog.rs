//! Cuestionario de onboarding por defecto de la aplicación (cinco pasos).

use crate::errors::DefinitionError;
use crate::model::{QuestionDefinition, QuestionnaireDefinition, StepDefinition};

pub fn default_steps() -> Vec<StepDefinition> {
    vec![StepDefinition::new(1,
                             "Tell us about yourself",
                             vec![QuestionDefinition::select("age_range",
                                                             "What is your age range?",
                                                             ["18-24", "25-34", "35-44", "45-54", "55-64", "65+"]),
                                  QuestionDefinition::select("gender",
                                                             "How do you identify?",
                                                             ["Male", "Female", "Non-binary", "Prefer not to say", "Other"]),]),
         StepDefinition::new(2,
                             "Your mental health goals",
                             vec![QuestionDefinition::multiselect("primary_goals",
                                                                  "What are your primary mental health goals?",
                                                                  ["Reduce anxiety",
                                                                   "Manage depression",
                                                                   "Improve sleep",
                                                                   "Build resilience",
                                                                   "Manage stress",
                                                                   "Improve relationships",
                                                                   "Increase self-awareness",
                                                                   "Other"]),]),
         StepDefinition::new(3,
                             "Current well-being",
                             vec![QuestionDefinition::scale("current_mood",
                                                            "How would you rate your overall mood this week?",
                                                            (1, 10),
                                                            "Very low",
                                                            "Excellent"),
                                  QuestionDefinition::scale("energy_level",
                                                            "How would you rate your energy levels?",
                                                            (1, 10),
                                                            "Exhausted",
                                                            "Energized"),]),
         StepDefinition::new(4,
                             "Support preferences",
                             vec![QuestionDefinition::select("therapy_experience",
                                                             "Have you worked with a mental health professional before?",
                                                             ["Yes, currently",
                                                              "Yes, in the past",
                                                              "No, but interested",
                                                              "No, not interested"]),
                                  QuestionDefinition::multiselect("preferred_support",
                                                                  "What type of support are you looking for?",
                                                                  ["Daily check-ins",
                                                                   "Mood tracking",
                                                                   "Guided exercises",
                                                                   "Educational resources",
                                                                   "Community support",
                                                                   "Professional referrals"]),]),
         StepDefinition::new(5,
                             "Lifestyle and habits",
                             vec![QuestionDefinition::scale("sleep_quality",
                                                            "How would you rate your sleep quality?",
                                                            (1, 10),
                                                            "Very poor",
                                                            "Excellent"),
                                  QuestionDefinition::select("exercise_frequency",
                                                             "How often do you exercise?",
                                                             ["Daily", "3-5 times per week", "1-2 times per week", "Rarely", "Never"]),
                                  QuestionDefinition::multiselect("stress_triggers",
                                                                  "What are your main sources of stress?",
                                                                  ["Work", "Relationships", "Health", "Finances", "Family", "School", "Other"]),]),]
}

/// Cuestionario por defecto ya validado.
pub fn default_questionnaire() -> Result<QuestionnaireDefinition, DefinitionError> {
    QuestionnaireDefinition::new(default_steps())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionKindTag;

    #[test]
    fn default_questionnaire_is_valid() {
        let def = default_questionnaire().expect("catalog must satisfy definition invariants");
        assert_eq!(def.len(), 5);
        let keys: Vec<&str> = def.steps().iter().flat_map(|s| s.questions.iter().map(|q| q.key.as_str())).collect();
        assert_eq!(keys.len(), 10);
        assert!(def.steps().iter().flat_map(|s| s.questions.iter()).all(|q| q.required));
        assert_eq!(def.question("stress_triggers").map(|q| q.tag()), Some(QuestionKindTag::MultiSelect));
        let sleep = def.locate("sleep_quality").and_then(|loc| def.step(loc.step_index)).map(|s| s.step_number);
        assert_eq!(sleep, Some(5));
    }
}
