//! Flujo de cuestionario multi-paso.
//!
//! Provee el estado del flujo (`FlowState`), la máquina de estados
//! `QuestionnaireFlow` y su builder.

pub mod builder;
pub mod core;
pub mod state;

pub use builder::{FlowBuilder, FlowBuilderInit};
pub use self::core::QuestionnaireFlow;
pub use state::{AdvanceOutcome, BackOutcome, FlowState, SubmissionReceipt, SubmissionStatus};
