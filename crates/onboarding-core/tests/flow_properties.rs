//! Propiedades del flujo: gating, sobrescritura, retroceso, atomicidad,
//! reintento idempotente y estado terminal.

mod test_support;

use std::sync::Arc;

use onboarding_core::catalog::default_questionnaire;
use onboarding_core::{AnswerValue, BackOutcome, FlowError, InMemoryEventStore, QuestionnaireFlow, SessionIdentity,
                      SubmissionStatus, WriteStage};
use test_support::*;

fn answered_flow(store: Arc<ScriptedStore>) -> (TestFlow, onboarding_core::UserId) {
    let user = new_user();
    let mut flow = flow_with(two_step_definition(), Arc::new(SessionIdentity::authenticated(user)), store);
    flow.record_answer("age_range", AnswerValue::choice("18-24")).unwrap();
    tokio_test::block_on(flow.advance()).unwrap();
    flow.record_answer("mood", AnswerValue::Scale(5)).unwrap();
    (flow, user)
}

#[test]
fn advance_never_skips_an_incomplete_step() {
    let mut flow = flow_with(default_questionnaire().unwrap(),
                             Arc::new(SessionIdentity::authenticated(new_user())),
                             Arc::new(ScriptedStore::new()));
    flow.record_answer("age_range", AnswerValue::choice("25-34")).unwrap();
    let err = tokio_test::block_on(flow.advance()).unwrap_err();
    assert_eq!(err,
               FlowError::StepIncomplete { step_number: 1,
                                           missing: vec!["gender".into()] });
    assert_eq!(flow.current_step_index(), 0);
    assert_eq!(flow.event_variants(), vec!["I", "A"], "rejected advance appends nothing");
}

#[test]
fn later_answer_overwrites_earlier_one() {
    let mut flow = flow_with(two_step_definition(),
                             Arc::new(SessionIdentity::authenticated(new_user())),
                             Arc::new(ScriptedStore::new()));
    flow.record_answer("age_range", AnswerValue::choice("18-24")).unwrap();
    flow.record_answer("age_range", AnswerValue::choice("25+")).unwrap();
    assert_eq!(flow.answers().len(), 1);
    assert_eq!(flow.answer("age_range"), Some(&AnswerValue::choice("25+")));
}

#[test]
fn back_keeps_answers_and_stops_at_first_step() {
    let (mut flow, _) = answered_flow(Arc::new(ScriptedStore::new()));
    let before = flow.answers().clone();

    assert_eq!(flow.back(), BackOutcome::Moved { step_index: 0 });
    assert_eq!(flow.answers(), &before);
    assert_eq!(flow.back(), BackOutcome::AtFirstStep);
    assert_eq!(flow.current_step_index(), 0);

    assert!(flow.is_step_complete(0));
    tokio_test::block_on(flow.advance()).unwrap();
    assert_eq!(flow.answer("mood"), Some(&AnswerValue::Scale(5)));
}

#[test]
fn failed_batch_never_writes_the_marker() {
    let store = Arc::new(ScriptedStore::new().failing_upserts(1));
    let (mut flow, user) = answered_flow(store.clone());

    let err = tokio_test::block_on(flow.submit()).unwrap_err();
    assert_eq!(err.failed_stage(), Some(WriteStage::Responses));
    assert!(err.is_retryable());
    assert_eq!(flow.status(), SubmissionStatus::Failed);
    assert_eq!(store.marker_calls(), 0);
    assert!(store.inner.responses_for(user).is_empty());
    assert!(!store.inner.is_onboarding_completed(user));

    // answers and position survive the failure
    assert_eq!(flow.current_step_index(), 1);
    assert_eq!(flow.answers().len(), 2);

    tokio_test::block_on(flow.submit()).expect("retry writes both");
    assert_eq!(store.upsert_calls(), 2);
    assert_eq!(store.marker_calls(), 1);
    assert!(store.inner.is_onboarding_completed(user));
}

#[test]
fn repeated_marker_failures_never_duplicate_rows() {
    let store = Arc::new(ScriptedStore::new().failing_markers(3));
    let (mut flow, user) = answered_flow(store.clone());

    for _ in 0..3 {
        let err = tokio_test::block_on(flow.submit()).unwrap_err();
        assert_eq!(err.failed_stage(), Some(WriteStage::CompletionMarker));
    }
    tokio_test::block_on(flow.submit()).unwrap();

    assert_eq!(store.upsert_calls(), 1);
    assert_eq!(store.rows_sent(), 2);
    assert_eq!(store.marker_calls(), 4);
    assert_eq!(store.inner.responses_for(user).len(), 2);
    assert_eq!(store.inner.response_count(), 2);
}

#[test]
fn editing_after_failure_rewrites_the_batch_by_key() {
    let store = Arc::new(ScriptedStore::new().failing_markers(1));
    let (mut flow, user) = answered_flow(store.clone());
    tokio_test::block_on(flow.submit()).unwrap_err();

    flow.record_answer("mood", AnswerValue::Scale(8)).unwrap();
    assert_eq!(flow.status(), SubmissionStatus::Failed);
    tokio_test::block_on(flow.submit()).unwrap();

    assert_eq!(store.upsert_calls(), 2, "changed answers are written again");
    let rows = store.inner.responses_for(user);
    assert_eq!(rows.len(), 2);
    let mood = rows.iter().find(|r| r.question_key == "mood").unwrap();
    assert_eq!(mood.response_value, AnswerValue::Scale(8));
}

#[test]
fn submitted_flow_is_terminal() {
    let store = Arc::new(ScriptedStore::new());
    let (mut flow, _) = answered_flow(store.clone());
    let receipt = tokio_test::block_on(flow.advance()).unwrap();
    assert!(matches!(receipt, onboarding_core::AdvanceOutcome::Submitted(_)));
    let events_after_submit = flow.events().len();

    assert_eq!(tokio_test::block_on(flow.submit()).unwrap_err(), FlowError::FlowCompleted);
    assert_eq!(tokio_test::block_on(flow.advance()).unwrap_err(), FlowError::FlowCompleted);
    assert_eq!(flow.record_answer("mood", AnswerValue::Scale(1)).unwrap_err(), FlowError::FlowCompleted);
    assert_eq!(flow.toggle_option("mood", "x").unwrap_err(), FlowError::FlowCompleted);
    assert_eq!(flow.back(), BackOutcome::Locked);

    assert_eq!(flow.answer("mood"), Some(&AnswerValue::Scale(5)));
    assert_eq!(flow.events().len(), events_after_submit);
    assert_eq!(store.upsert_calls(), 1);
    assert_eq!(store.marker_calls(), 1);
}

#[test]
fn submit_requires_every_step() {
    let store = Arc::new(ScriptedStore::new());
    let mut flow = flow_with(two_step_definition(), Arc::new(SessionIdentity::authenticated(new_user())), store.clone());
    flow.record_answer("age_range", AnswerValue::choice("18-24")).unwrap();
    let err = tokio_test::block_on(flow.submit()).unwrap_err();
    assert_eq!(err,
               FlowError::StepIncomplete { step_number: 2,
                                           missing: vec!["mood".into()] });
    assert_eq!(flow.status(), SubmissionStatus::Editing);
    assert_eq!(store.upsert_calls(), 0);
}

#[test]
fn interrupted_submission_rejects_reentry() {
    let user = new_user();
    let store = Arc::new(PendingStore::default());
    let mut flow = QuestionnaireFlow::new_with_collaborators(two_step_definition(),
                                                             Arc::new(SessionIdentity::authenticated(user)),
                                                             store.clone(),
                                                             InMemoryEventStore::default());
    flow.record_answer("age_range", AnswerValue::choice("18-24")).unwrap();
    tokio_test::block_on(flow.advance()).unwrap();
    flow.record_answer("mood", AnswerValue::Scale(5)).unwrap();

    {
        let mut pending = tokio_test::task::spawn(flow.submit());
        assert!(pending.poll().is_pending());
    }
    assert_eq!(flow.status(), SubmissionStatus::Submitting);

    assert_eq!(tokio_test::block_on(flow.submit()).unwrap_err(), FlowError::SubmissionInProgress);
    assert_eq!(tokio_test::block_on(flow.advance()).unwrap_err(), FlowError::SubmissionInProgress);
    assert_eq!(flow.record_answer("mood", AnswerValue::Scale(9)).unwrap_err(), FlowError::SubmissionInProgress);
    assert_eq!(flow.back(), BackOutcome::Locked);

    assert_eq!(store.upsert_calls(), 1);
    assert_eq!(store.marker_calls(), 0);
    assert!(store.inner.responses_for(user).is_empty());
    assert!(!store.inner.is_onboarding_completed(user));
    assert_eq!(flow.answer("mood"), Some(&AnswerValue::Scale(5)));
}
