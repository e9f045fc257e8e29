//! Core QuestionnaireFlow implementation

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde_json::json;
use uuid::Uuid;

use super::state::{AdvanceOutcome, BackOutcome, FlowState, SubmissionReceipt, SubmissionStatus};
use crate::errors::{AnswerRejection, FlowError, StoreError, WriteStage};
use crate::event::{EventStore, FlowEvent, FlowEventKind};
use crate::hashing::hash_value;
use crate::identity::IdentityProvider;
use crate::model::{AnswerValue, DraftAnswers, QuestionnaireDefinition, StepDefinition, UserId};
use crate::store::{RecordStore, ResponseRecord};

/// Flujo de onboarding multi-paso.
///
/// Secuencia al usuario por los pasos de una `QuestionnaireDefinition`,
/// acumula respuestas válidas en un borrador en memoria y, al terminar el
/// último paso, realiza un único envío atómico (lote de respuestas + marca de
/// onboarding completado) contra el `RecordStore`.
///
/// La identidad y el store se inyectan al construir; el flujo no lee estado
/// global. Todas las operaciones toman `&mut self`: existe un solo mutador.
pub struct QuestionnaireFlow<I, S, E>
    where I: IdentityProvider,
          S: RecordStore,
          E: EventStore
{
    flow_id: Uuid,
    definition: QuestionnaireDefinition,
    identity: I,
    store: S,
    event_store: E,
    state: FlowState,
    // fingerprint del último lote persistido con éxito
    stored_batch: Option<String>,
}

impl<I, S, E> QuestionnaireFlow<I, S, E>
    where I: IdentityProvider,
          S: RecordStore,
          E: EventStore
{
    /// Crea un flujo nuevo con un `flow_id` aleatorio.
    pub fn new_with_collaborators(definition: QuestionnaireDefinition, identity: I, store: S, event_store: E) -> Self {
        Self::start(Uuid::new_v4(), definition, identity, store, event_store)
    }

    pub(crate) fn start(flow_id: Uuid,
                        definition: QuestionnaireDefinition,
                        identity: I,
                        store: S,
                        mut event_store: E)
                        -> Self {
        event_store.append_kind(flow_id,
                                FlowEventKind::FlowStarted { definition_hash: definition.definition_hash().to_string(),
                                                             step_count: definition.len() });
        debug!("flow_started flow_id={flow_id} steps={}", definition.len());
        Self { flow_id,
               definition,
               identity,
               store,
               event_store,
               state: FlowState::fresh(),
               stored_batch: None }
    }

    pub fn flow_id(&self) -> Uuid {
        self.flow_id
    }

    pub fn definition(&self) -> &QuestionnaireDefinition {
        &self.definition
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.submission_status
    }

    pub fn answers(&self) -> &DraftAnswers {
        &self.state.answers
    }

    pub fn answer(&self, key: &str) -> Option<&AnswerValue> {
        self.state.answers.get(key)
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn current_step(&self) -> &StepDefinition {
        &self.definition.steps()[self.state.current_step_index]
    }

    pub fn step_count(&self) -> usize {
        self.definition.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.state.current_step_index + 1 == self.definition.len()
    }

    /// Porcentaje de avance mostrado en la barra de progreso (paso actual
    /// incluido).
    pub fn progress_percent(&self) -> f32 {
        (self.state.current_step_index + 1) as f32 / self.definition.len() as f32 * 100.0
    }

    /// Registra (o sobrescribe) la respuesta a una pregunta del paso actual.
    ///
    /// Si la pregunta no pertenece al paso actual o el valor no cumple sus
    /// restricciones devuelve `InvalidAnswer` y el borrador queda intacto.
    pub fn record_answer(&mut self, key: &str, value: AnswerValue) -> Result<(), FlowError> {
        self.ensure_editable()?;
        let step = &self.definition.steps()[self.state.current_step_index];
        let step_number = step.step_number;
        let question = step.question(key)
                           .ok_or_else(|| FlowError::InvalidAnswer { key: key.to_string(),
                                                                     reason: AnswerRejection::NotInCurrentStep { step_number } })?;
        question.validate(&value)
                .map_err(|reason| FlowError::InvalidAnswer { key: key.to_string(), reason })?;

        self.state.answers.insert(key, value);
        debug!("answer_recorded flow_id={} step={step_number} key={key}", self.flow_id);
        self.push_event(FlowEventKind::AnswerRecorded { step_number,
                                                        question_key: key.to_string() });
        Ok(())
    }

    /// Alterna `option` en una pregunta multiselect del paso actual y
    /// devuelve si quedó seleccionada.
    pub fn toggle_option(&mut self, key: &str, option: &str) -> Result<bool, FlowError> {
        self.ensure_editable()?;
        let mut selected = match self.state.answers.get(key) {
            Some(AnswerValue::Choices(set)) => set.clone(),
            _ => BTreeSet::new(),
        };
        let now_selected = if selected.remove(option) {
            false
        } else {
            selected.insert(option.to_string());
            true
        };
        self.record_answer(key, AnswerValue::Choices(selected))?;
        Ok(now_selected)
    }

    /// `true` si todas las preguntas obligatorias del paso tienen una
    /// respuesta presente y válida. Se recalcula siempre desde el borrador.
    pub fn is_step_complete(&self, step_index: usize) -> bool {
        self.definition.step(step_index).is_some() && self.missing_answers(step_index).is_empty()
    }

    /// Keys de preguntas obligatorias que bloquean el paso.
    pub fn missing_answers(&self, step_index: usize) -> Vec<&str> {
        let Some(step) = self.definition.step(step_index) else {
            return Vec::new();
        };
        step.required_questions()
            .filter(|q| !self.state.answers.get(&q.key).is_some_and(|v| q.is_satisfied_by(v)))
            .map(|q| q.key.as_str())
            .collect()
    }

    /// Avanza al siguiente paso; desde el último paso dispara `submit()`.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, FlowError> {
        self.ensure_editable()?;
        let from = self.state.current_step_index;
        self.require_complete(from)?;

        if self.is_last_step() {
            return self.submit().await.map(AdvanceOutcome::Submitted);
        }

        let to = from + 1;
        self.state.current_step_index = to;
        debug!("step_advanced flow_id={} {from}->{to}", self.flow_id);
        self.push_event(FlowEventKind::StepAdvanced { from, to });
        Ok(AdvanceOutcome::Moved { step_index: to })
    }

    /// Retrocede un paso sin descartar respuestas.
    pub fn back(&mut self) -> BackOutcome {
        if matches!(self.state.submission_status,
                    SubmissionStatus::Submitted | SubmissionStatus::Submitting)
        {
            return BackOutcome::Locked;
        }
        let from = self.state.current_step_index;
        if from == 0 {
            return BackOutcome::AtFirstStep;
        }
        let to = from - 1;
        self.state.current_step_index = to;
        debug!("step_reverted flow_id={} {from}->{to}", self.flow_id);
        self.push_event(FlowEventKind::StepReverted { from, to });
        BackOutcome::Moved { step_index: to }
    }

    /// Envía todas las respuestas y marca el onboarding como completado.
    ///
    /// - Sin identidad: `NotAuthenticated`, sin escrituras y sin cambiar el
    ///   estado de envío.
    /// - La marca sólo se escribe si el lote se persistió.
    /// - Un reintento con el mismo usuario y las mismas respuestas que ya
    ///   quedaron persistidas omite el lote y sólo reintenta la marca.
    /// - Cualquier fallo de escritura deja el flujo en `Failed`; no hay
    ///   reintento automático.
    pub async fn submit(&mut self) -> Result<SubmissionReceipt, FlowError> {
        self.ensure_editable()?;
        for step_index in 0..self.definition.len() {
            self.require_complete(step_index)?;
        }
        let Some(user_id) = self.identity.current_user() else {
            warn!("submit:not_authenticated flow_id={}", self.flow_id);
            return Err(FlowError::NotAuthenticated);
        };
        let records = self.build_batch(user_id)?;
        let batch_fingerprint = fingerprint_batch(user_id, &self.state.answers);

        self.state.submission_status = SubmissionStatus::Submitting;
        info!("submit:start flow_id={} user_id={user_id} records={}", self.flow_id, records.len());
        self.push_event(FlowEventKind::SubmissionStarted { user_id,
                                                           record_count: records.len() });

        if self.stored_batch.as_deref() == Some(batch_fingerprint.as_str()) {
            debug!("submit:responses_already_stored flow_id={}", self.flow_id);
            self.push_event(FlowEventKind::ResponsesAlreadyStored { batch_fingerprint: batch_fingerprint.clone() });
        } else {
            if let Err(source) = self.store.upsert_responses(&records).await {
                return Err(self.fail(WriteStage::Responses, source));
            }
            self.stored_batch = Some(batch_fingerprint.clone());
            self.push_event(FlowEventKind::ResponsesStored { record_count: records.len(),
                                                             batch_fingerprint: batch_fingerprint.clone() });
        }

        if let Err(source) = self.store.mark_onboarding_completed(user_id).await {
            return Err(self.fail(WriteStage::CompletionMarker, source));
        }
        self.push_event(FlowEventKind::CompletionMarked { user_id });

        self.state.submission_status = SubmissionStatus::Submitted;
        info!("submit:done flow_id={} user_id={user_id}", self.flow_id);
        self.push_event(FlowEventKind::FlowSubmitted { batch_fingerprint: batch_fingerprint.clone() });
        Ok(SubmissionReceipt { user_id,
                               record_count: records.len(),
                               batch_fingerprint })
    }

    /// Eventos del flujo en orden de emisión.
    pub fn events(&self) -> Vec<FlowEvent> {
        self.event_store.list(self.flow_id)
    }

    /// Variante compacta de eventos (una letra por evento).
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|e| match e.kind {
                FlowEventKind::FlowStarted { .. } => "I",
                FlowEventKind::AnswerRecorded { .. } => "A",
                FlowEventKind::StepAdvanced { .. } => "N",
                FlowEventKind::StepReverted { .. } => "B",
                FlowEventKind::SubmissionStarted { .. } => "S",
                FlowEventKind::ResponsesStored { .. } => "R",
                FlowEventKind::ResponsesAlreadyStored { .. } => "r",
                FlowEventKind::CompletionMarked { .. } => "M",
                FlowEventKind::SubmissionFailed { .. } => "X",
                FlowEventKind::FlowSubmitted { .. } => "C",
            })
            .collect()
    }

    fn ensure_editable(&self) -> Result<(), FlowError> {
        match self.state.submission_status {
            SubmissionStatus::Submitted => Err(FlowError::FlowCompleted),
            SubmissionStatus::Submitting => Err(FlowError::SubmissionInProgress),
            SubmissionStatus::Editing | SubmissionStatus::Failed => Ok(()),
        }
    }

    fn require_complete(&self, step_index: usize) -> Result<(), FlowError> {
        let missing = self.missing_answers(step_index);
        if missing.is_empty() {
            return Ok(());
        }
        let step_number = self.definition.step(step_index).map_or(step_index as u32 + 1, |s| s.step_number);
        Err(FlowError::StepIncomplete { step_number,
                                        missing: missing.into_iter().map(str::to_string).collect() })
    }

    /// Un registro por respuesta, etiquetado con su paso exacto y ordenado
    /// como en la definición.
    fn build_batch(&self, user_id: UserId) -> Result<Vec<ResponseRecord>, FlowError> {
        let mut located = Vec::with_capacity(self.state.answers.len());
        for (key, value) in self.state.answers.iter() {
            let location = self.definition
                               .locate(key)
                               .ok_or_else(|| FlowError::Internal(format!("answer '{key}' has no owning step")))?;
            let step_number = self.definition.steps()[location.step_index].step_number;
            located.push((location,
                          ResponseRecord { user_id,
                                           step_number,
                                           question_key: key.to_string(),
                                           response_value: value.clone() }));
        }
        located.sort_by_key(|(location, _)| *location);
        Ok(located.into_iter().map(|(_, record)| record).collect())
    }

    fn fail(&mut self, stage: WriteStage, source: StoreError) -> FlowError {
        warn!("submit:failed flow_id={} stage={stage} err={source}", self.flow_id);
        self.state.submission_status = SubmissionStatus::Failed;
        self.push_event(FlowEventKind::SubmissionFailed { stage,
                                                          error: source.clone() });
        FlowError::StoreWriteFailed { stage, source }
    }

    fn push_event(&mut self, kind: FlowEventKind) {
        self.event_store.append_kind(self.flow_id, kind);
    }
}

fn fingerprint_batch(user_id: UserId, answers: &DraftAnswers) -> String {
    hash_value(&json!({
        "user_id": user_id.to_string(),
        "answers": answers.to_json(),
    }))
}
