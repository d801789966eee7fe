//! What an active item hands to the collector at the end of a phase.

use influx_core::{ActiveItemId, Influence};
use serde::Serialize;

/// A message between active items.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Mail {
    /// Sender.
    pub from: ActiveItemId,
    /// Recipient, or `None` for every other agent.
    pub to: Option<ActiveItemId>,
    /// Body.
    pub text: String,
}

/// The phase-specific part of an [`Outcome`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The item has taken in its perception.
    Perception,
    /// Mail sent during the talk phase.
    Communication {
        /// Outgoing mail, possibly empty.
        mails: Vec<Mail>,
    },
    /// The influence proposed for this cycle.
    Action {
        /// The proposal.
        influence: Influence,
    },
}

/// One active item's result for one phase, with the sync set it must be
/// dispatched together with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// The producing item.
    pub entity: ActiveItemId,
    /// Items this outcome must be grouped with.
    pub sync_set: Vec<ActiveItemId>,
    /// Phase payload.
    pub kind: OutcomeKind,
}

impl Outcome {
    /// An outcome for `entity` with the given sync set.
    pub fn new(entity: ActiveItemId, sync_set: Vec<ActiveItemId>, kind: OutcomeKind) -> Self {
        Self {
            entity,
            sync_set,
            kind,
        }
    }

    /// The proposed influence, for action outcomes.
    pub fn influence(&self) -> Option<&Influence> {
        match &self.kind {
            OutcomeKind::Action { influence } => Some(influence),
            _ => None,
        }
    }
}
