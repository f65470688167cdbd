//! Active selection slot
//!
//! Holds the one detail bundle currently on display. Every new selection (and
//! every close) advances a generation counter; a resolve that finishes after
//! the generation has moved on is discarded instead of committed, so the
//! latest selection always wins without cancelling in-flight fetches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::models::DetailBundle;

/// What the detail view currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    #[default]
    None,
    Resolving {
        app_id: String,
    },
    Resolved(Box<DetailBundle>),
}

impl Selection {
    pub fn app_id(&self) -> Option<&str> {
        match self {
            Selection::None => None,
            Selection::Resolving { app_id } => Some(app_id.as_str()),
            Selection::Resolved(bundle) => Some(bundle.app.id.as_str()),
        }
    }

    pub fn bundle(&self) -> Option<&DetailBundle> {
        match self {
            Selection::Resolved(bundle) => Some(bundle.as_ref()),
            _ => None,
        }
    }
}

/// Proof of which selection a resolve was started for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    app_id: String,
}

impl SelectionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[derive(Debug, Default)]
struct SlotState {
    generation: u64,
    selection: Selection,
}

/// Shared handle to the selection; clones refer to the same slot
#[derive(Debug, Clone, Default)]
pub struct SelectionSlot {
    inner: Arc<Mutex<SlotState>>,
}

impl SelectionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving `app_id`, superseding whatever was selected before
    pub fn begin(&self, app_id: &str) -> SelectionTicket {
        let mut state = self.lock();
        state.generation += 1;
        state.selection = Selection::Resolving {
            app_id: app_id.to_string(),
        };
        SelectionTicket {
            generation: state.generation,
            app_id: app_id.to_string(),
        }
    }

    /// Store a finished bundle if its selection is still the current one.
    /// Returns false when the result was stale and dropped.
    pub fn commit(&self, ticket: &SelectionTicket, bundle: DetailBundle) -> bool {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            log::debug!(
                "Discarding details for {} (generation {} superseded by {})",
                ticket.app_id,
                ticket.generation,
                state.generation
            );
            return false;
        }
        state.selection = Selection::Resolved(Box::new(bundle));
        true
    }

    /// Clear the selection; results still in flight will be discarded
    pub fn close(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.selection = Selection::None;
    }

    pub fn current(&self) -> Selection {
        self.lock().selection.clone()
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.lock().generation == ticket.generation
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
