//! Bucle interactivo: pregunta, valida, navega y envía.

use std::sync::Arc;

use dialoguer::{Confirm, Input, Select};
use log::{debug, warn};
use onboarding_core::{AdvanceOutcome, BackOutcome, EventStore, FlowError, QuestionDefinition, QuestionnaireFlow,
                      RecordStore, SessionIdentity, SubmissionReceipt, UserId};

use super::{missing_message, nav_choices, renderer_for, step_header, NavChoice};
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(SubmissionReceipt),
    /// El usuario salió antes de enviar; nada se persistió.
    Exited,
}

type TerminalFlow<S, E> = QuestionnaireFlow<Arc<SessionIdentity>, S, E>;

/// Recorre el cuestionario en la terminal hasta enviarlo o salir.
pub async fn run_flow<S, E>(flow: &mut TerminalFlow<S, E>, identity: &SessionIdentity) -> Result<RunOutcome, AppError>
    where S: RecordStore,
          E: EventStore
{
    loop {
        let step = flow.current_step().clone();
        println!("{}",
                 step_header(flow.current_step_index(), flow.step_count(), flow.progress_percent(), &step.title));
        for question in &step.questions {
            ask(flow, question)?;
        }

        let choices = nav_choices(flow.is_last_step());
        let labels: Vec<&str> = choices.iter().map(|(_, label)| *label).collect();
        let picked = Select::new().items(&labels).default(0).interact()?;
        match choices[picked].0 {
            NavChoice::Quit => return Ok(RunOutcome::Exited),
            NavChoice::Back => {
                if flow.back() == BackOutcome::AtFirstStep {
                    return Ok(RunOutcome::Exited);
                }
                continue;
            }
            NavChoice::Advance => {}
        }

        match flow.advance().await {
            Ok(AdvanceOutcome::Moved { step_index }) => debug!("moved to step_index={step_index}"),
            Ok(AdvanceOutcome::Submitted(receipt)) => return Ok(RunOutcome::Completed(receipt)),
            Err(FlowError::StepIncomplete { missing, .. }) => println!("{}", missing_message(&missing)),
            Err(err) if err.is_retryable() => return recover_submission(flow, identity, err).await,
            Err(err) => return Err(err.into()),
        }
    }
}

/// Repite el prompt hasta que el flujo acepte la respuesta.
fn ask<S, E>(flow: &mut TerminalFlow<S, E>, question: &QuestionDefinition) -> Result<(), AppError>
    where S: RecordStore,
          E: EventStore
{
    let render = renderer_for(question.tag());
    loop {
        let value = render(question, flow.answer(&question.key))?;
        match flow.record_answer(&question.key, value) {
            Ok(()) => return Ok(()),
            Err(FlowError::InvalidAnswer { reason, .. }) => println!("  {reason}"),
            Err(err) => return Err(err.into()),
        }
    }
}

/// Pide identidad o confirmación de reintento hasta enviar o rendirse.
async fn recover_submission<S, E>(flow: &mut TerminalFlow<S, E>,
                                  identity: &SessionIdentity,
                                  first: FlowError)
                                  -> Result<RunOutcome, AppError>
    where S: RecordStore,
          E: EventStore
{
    let mut last = first;
    loop {
        if matches!(last, FlowError::NotAuthenticated) {
            println!("You need to sign in to save your answers.");
            let raw: String = Input::new().with_prompt("User id (UUID)").interact_text()?;
            match raw.trim().parse::<UserId>() {
                Ok(user) => identity.sign_in(user),
                Err(e) => println!("  invalid user id: {e}"),
            }
        } else if let Some(stage) = last.failed_stage() {
            warn!("submission failed at {stage}: {last}");
            println!("We could not save your answers ({stage}).");
            let retry = Confirm::new().with_prompt("Retry submission?").default(true).interact()?;
            if !retry {
                return Err(last.into());
            }
        } else {
            return Err(last.into());
        }

        match flow.submit().await {
            Ok(receipt) => return Ok(RunOutcome::Completed(receipt)),
            Err(err) => last = err,
        }
    }
}
