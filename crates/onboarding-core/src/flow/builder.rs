//! Builder para `QuestionnaireFlow`.
//!
//! - `FlowBuilderInit` parte de la definición validada y de un event store
//!   (en memoria por defecto); permite fijar el `flow_id`.
//! - `collaborators` inyecta identidad y record store y devuelve el
//!   `FlowBuilder` final. No existe forma de construir el flujo sin ellos.
//!
//! ```ignore
//! let mut flow = FlowBuilderInit::new(definition)
//!     .collaborators(identity, store)
//!     .build();
//! ```

use uuid::Uuid;

use super::QuestionnaireFlow;
use crate::event::{EventStore, InMemoryEventStore};
use crate::identity::IdentityProvider;
use crate::model::QuestionnaireDefinition;
use crate::store::RecordStore;

/// Estado inicial del builder.
#[derive(Debug)]
pub struct FlowBuilderInit<E: EventStore> {
    definition: QuestionnaireDefinition,
    event_store: E,
    flow_id: Option<Uuid>,
}

impl FlowBuilderInit<InMemoryEventStore> {
    #[inline]
    pub fn new(definition: QuestionnaireDefinition) -> Self {
        Self { definition,
               event_store: InMemoryEventStore::default(),
               flow_id: None }
    }
}

impl<E: EventStore> FlowBuilderInit<E> {
    /// Reemplaza el event store por defecto.
    #[inline]
    pub fn with_event_store<E2: EventStore>(self, event_store: E2) -> FlowBuilderInit<E2> {
        FlowBuilderInit { definition: self.definition,
                          event_store,
                          flow_id: self.flow_id }
    }

    /// Fija explícitamente el `flow_id` (por defecto uno aleatorio).
    #[inline]
    pub fn flow_id(mut self, flow_id: Uuid) -> Self {
        self.flow_id = Some(flow_id);
        self
    }

    #[inline]
    pub fn collaborators<I, S>(self, identity: I, store: S) -> FlowBuilder<I, S, E>
        where I: IdentityProvider,
              S: RecordStore
    {
        FlowBuilder { init: self, identity, store }
    }
}

/// Builder con todos los colaboradores presentes.
pub struct FlowBuilder<I, S, E>
    where I: IdentityProvider,
          S: RecordStore,
          E: EventStore
{
    init: FlowBuilderInit<E>,
    identity: I,
    store: S,
}

impl<I, S, E> FlowBuilder<I, S, E>
    where I: IdentityProvider,
          S: RecordStore,
          E: EventStore
{
    #[inline]
    pub fn build(self) -> QuestionnaireFlow<I, S, E> {
        let FlowBuilderInit { definition, event_store, flow_id } = self.init;
        QuestionnaireFlow::start(flow_id.unwrap_or_else(Uuid::new_v4),
                                 definition,
                                 self.identity,
                                 self.store,
                                 event_store)
    }
}
