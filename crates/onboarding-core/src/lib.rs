//! onboarding-core: flujo de cuestionario de onboarding multi-paso.
//!
//! Un `QuestionnaireFlow` recorre los pasos de una `QuestionnaireDefinition`,
//! valida respuestas tipadas (select / multiselect / scale), bloquea el
//! avance hasta completar cada paso y al final realiza un envío atómico e
//! idempotente contra un `RecordStore`, usando la identidad provista por un
//! `IdentityProvider`.
pub mod catalog;
pub mod constants;
pub mod errors;
pub mod event;
pub mod flow;
pub mod hashing;
pub mod identity;
pub mod model;
pub mod store;

pub use errors::{AnswerRejection, DefinitionError, FlowError, StoreError, WriteStage};
pub use event::{EventStore, FlowEvent, FlowEventKind, InMemoryEventStore};
pub use flow::{AdvanceOutcome, BackOutcome, FlowBuilder, FlowBuilderInit, FlowState, QuestionnaireFlow, SubmissionReceipt,
               SubmissionStatus};
pub use identity::{IdentityProvider, SessionIdentity};
pub use model::{AnswerValue, DraftAnswers, QuestionDefinition, QuestionKind, QuestionKindTag, QuestionnaireDefinition,
                StepDefinition, UserId};
pub use store::{InMemoryRecordStore, RecordStore, ResponseRecord};
