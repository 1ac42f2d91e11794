//! Document construction options

use crate::time::{Clock, SystemClock};
use crate::ActorId;
use std::sync::Arc;

/// Options for creating or loading a document
///
/// # Example
///
/// ```rust
/// use convergent_core::{Document, InitOptions};
///
/// let doc = Document::with_options(InitOptions::new().with_actor("laptop"));
/// assert_eq!(doc.actor(), "laptop");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    actor: Option<ActorId>,
    clock: Option<Arc<dyn Clock>>,
}

impl InitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute changes to this actor instead of a random one
    ///
    /// Two live replicas must never share an actor id.
    pub fn with_actor(mut self, actor: impl Into<ActorId>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Time source for change timestamps
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub(crate) fn actor_or_random(&self) -> ActorId {
        self.actor.clone().unwrap_or_else(random_actor)
    }

    pub(crate) fn clock_or_system(&self) -> Arc<dyn Clock> {
        self.clock
            .clone()
            .unwrap_or_else(|| Arc::new(SystemClock))
    }
}

/// Fresh random actor id
pub fn random_actor() -> ActorId {
    uuid::Uuid::new_v4().simple().to_string()
}
