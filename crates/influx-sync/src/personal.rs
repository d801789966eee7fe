//! One active item's view of the handshake.

use indexmap::IndexMap;
use influx_core::ActiveItemId;

use crate::element::{SyncElement, SyncState};
use crate::message::{Message, MessageKind};

/// The handshake state an active item keeps for each partner it may
/// conflict with.
///
/// Each cycle starts with [`begin_cycle`](Self::begin_cycle), which resets
/// every relationship and drops partners that are no longer candidates.
/// The owning [`DistributedSynchronization`](crate::DistributedSynchronization)
/// then alternates [`outgoing`](Self::outgoing) and [`receive`](Self::receive)
/// until no messages remain.
#[derive(Clone, Debug)]
pub struct PersonalSynchronizer {
    owner: ActiveItemId,
    time: u64,
    elements: IndexMap<ActiveItemId, SyncElement>,
}

impl PersonalSynchronizer {
    /// An empty synchronizer for `owner`.
    pub fn new(owner: ActiveItemId) -> Self {
        Self {
            owner,
            time: 0,
            elements: IndexMap::new(),
        }
    }

    /// The active item this synchronizer belongs to.
    pub fn owner(&self) -> ActiveItemId {
        self.owner
    }

    /// Logical time of the current cycle.
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Element tracked for `partner`.
    pub fn element(&self, partner: ActiveItemId) -> Option<&SyncElement> {
        self.elements.get(&partner)
    }

    /// All tracked elements, ordered by partner.
    pub fn elements(&self) -> impl Iterator<Item = &SyncElement> {
        self.elements.values()
    }

    /// Number of tracked partners.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no partner is tracked.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Start a new cycle at logical `time` with the current candidates.
    ///
    /// Departed partners are discarded, kept ones restart from `ini`, new
    /// ones are created in `ini` (or `add` when `bootstrap`).
    pub fn begin_cycle(&mut self, time: u64, candidates: &[ActiveItemId], bootstrap: bool) {
        self.time = time;
        let owner = self.owner;
        self.elements
            .retain(|partner, _| *partner != owner && candidates.contains(partner));
        for element in self.elements.values_mut() {
            element.state = SyncState::Ini;
            element.time = time;
        }
        for &partner in candidates {
            if partner != owner && !self.elements.contains_key(&partner) {
                self.elements
                    .insert(partner, SyncElement::new(partner, bootstrap, time));
            }
        }
        self.elements.sort_keys();
    }

    /// Advance every element that can act on its own and return the
    /// messages that doing so sends.
    pub fn outgoing(&mut self) -> Vec<Message> {
        let mut out = Vec::new();
        let (owner, now) = (self.owner, self.time);
        for element in self.elements.values_mut() {
            let kind = match element.state {
                SyncState::Ini | SyncState::Add => {
                    element.state = SyncState::ReqS;
                    MessageKind::Request
                }
                SyncState::ReqR => {
                    element.state = SyncState::AckS;
                    MessageKind::Ack
                }
                SyncState::AckR if element.committable(now) => {
                    element.state = SyncState::ComS;
                    MessageKind::Commit
                }
                SyncState::ComR => {
                    element.state = SyncState::Sync;
                    MessageKind::Confirm
                }
                _ => continue,
            };
            out.push(Message {
                kind,
                from: owner,
                to: element.partner,
                time: now,
            });
        }
        out
    }

    /// Apply a message addressed to this synchronizer.
    ///
    /// A request from an unknown partner creates its element. When two
    /// requests cross, the side with the larger id yields and answers.
    pub fn receive(&mut self, msg: &Message) {
        if msg.to != self.owner || msg.from == self.owner {
            return;
        }
        if !self.elements.contains_key(&msg.from) {
            if msg.kind != MessageKind::Request {
                return;
            }
            self.elements
                .insert(msg.from, SyncElement::new(msg.from, false, self.time));
            self.elements.sort_keys();
        }
        let owner = self.owner;
        let Some(element) = self.elements.get_mut(&msg.from) else {
            return;
        };
        match (msg.kind, element.state) {
            (MessageKind::Request, SyncState::Ini | SyncState::Add) => {
                element.state = SyncState::ReqR;
            }
            (MessageKind::Request, SyncState::ReqS) if msg.from < owner => {
                element.state = SyncState::ReqR;
            }
            (MessageKind::Ack, SyncState::ReqS) => {
                element.state = SyncState::AckR;
                element.time = msg.time;
            }
            (MessageKind::Commit, SyncState::AckS) => {
                element.state = SyncState::ComR;
            }
            (MessageKind::Confirm, SyncState::ComS) => {
                element.state = SyncState::Sync;
            }
            _ => {}
        }
    }

    /// The least-progressed state across all partners, `sync` when there
    /// are none.
    pub fn effective_state(&self) -> SyncState {
        self.elements
            .values()
            .fold(SyncState::Sync, |acc, e| acc.worst(e.state))
    }

    /// Partners whose element counts as agreed.
    pub fn sync_set(&self) -> Vec<ActiveItemId> {
        self.elements
            .values()
            .filter(|e| e.syncable())
            .map(|e| e.partner)
            .collect()
    }

    /// Partners whose element may be stuck.
    pub fn blocked_partners(&self) -> Vec<ActiveItemId> {
        self.elements
            .values()
            .filter(|e| e.possibly_blocked())
            .map(|e| e.partner)
            .collect()
    }

    /// Whether there is at least one partner and every one is possibly
    /// blocked.
    pub fn stalled(&self) -> bool {
        !self.elements.is_empty() && self.elements.values().all(SyncElement::possibly_blocked)
    }
}
