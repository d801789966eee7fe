//! Per-partner handshake state.

use influx_core::ActiveItemId;
use serde::Serialize;
use std::fmt;

/// Handshake state of one partner relationship.
///
/// `R` / `S` suffixes distinguish having *received* versus *sent* the
/// message of that phase. `Add` is the bootstrap state of elements
/// created during the first cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SyncState {
    /// Fresh relationship; nothing exchanged yet.
    Ini,
    /// Created during bootstrap.
    Add,
    /// A request was received.
    ReqR,
    /// A request was sent.
    ReqS,
    /// An acknowledgement was received.
    AckR,
    /// An acknowledgement was sent.
    AckS,
    /// A commit was received.
    ComR,
    /// A commit was sent.
    ComS,
    /// Mutually synchronized for this cycle.
    Sync,
}

impl SyncState {
    /// How far from synchronized this state is. Higher is worse.
    ///
    /// Order: `ini > add > reqR > reqS > ackR > ackS > comR > comS > sync`.
    pub fn severity(self) -> u8 {
        match self {
            SyncState::Ini => 8,
            SyncState::Add => 7,
            SyncState::ReqR => 6,
            SyncState::ReqS => 5,
            SyncState::AckR => 4,
            SyncState::AckS => 3,
            SyncState::ComR => 2,
            SyncState::ComS => 1,
            SyncState::Sync => 0,
        }
    }

    /// The least-progressed of two states.
    pub fn worst(self, other: SyncState) -> SyncState {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Short protocol name.
    pub fn name(self) -> &'static str {
        match self {
            SyncState::Ini => "ini",
            SyncState::Add => "add",
            SyncState::ReqR => "reqR",
            SyncState::ReqS => "reqS",
            SyncState::AckR => "ackR",
            SyncState::AckS => "ackS",
            SyncState::ComR => "comR",
            SyncState::ComS => "comS",
            SyncState::Sync => "sync",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One partner relationship held by a personal synchronizer.
///
/// Mutated only by protocol message handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SyncElement {
    /// The other side.
    pub partner: ActiveItemId,
    /// Current handshake state.
    pub state: SyncState,
    /// Logical time recorded with the last acknowledgement.
    pub time: u64,
}

impl SyncElement {
    /// A fresh element in `ini`, or `add` during bootstrap.
    pub fn new(partner: ActiveItemId, bootstrap: bool, time: u64) -> Self {
        Self {
            partner,
            state: if bootstrap { SyncState::Add } else { SyncState::Ini },
            time,
        }
    }

    /// Whether a commit may be issued given the caller's current time.
    ///
    /// True for `sync`, `comS`, `comR`, `add`, and `ack*` whose recorded
    /// time is not ahead of `now`.
    pub fn committable(&self, now: u64) -> bool {
        match self.state {
            SyncState::Sync | SyncState::ComS | SyncState::ComR | SyncState::Add => true,
            SyncState::AckR | SyncState::AckS => self.time <= now,
            _ => false,
        }
    }

    /// Whether this partner counts as agreed for the cycle.
    pub fn syncable(&self) -> bool {
        matches!(self.state, SyncState::Sync | SyncState::ComR | SyncState::Add)
    }

    /// Whether this relationship may be stuck waiting on the partner.
    pub fn possibly_blocked(&self) -> bool {
        matches!(self.state, SyncState::ComR | SyncState::ReqS | SyncState::Add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: ActiveItemId = ActiveItemId::agent(2);

    fn el(state: SyncState, time: u64) -> SyncElement {
        SyncElement {
            partner: P,
            state,
            time,
        }
    }

    #[test]
    fn severity_order_matches_protocol() {
        let order = [
            SyncState::Ini,
            SyncState::Add,
            SyncState::ReqR,
            SyncState::ReqS,
            SyncState::AckR,
            SyncState::AckS,
            SyncState::ComR,
            SyncState::ComS,
            SyncState::Sync,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].severity() > pair[1].severity());
            assert_eq!(pair[0].worst(pair[1]), pair[0]);
            assert_eq!(pair[1].worst(pair[0]), pair[0]);
        }
    }

    #[test]
    fn committable_respects_ack_time() {
        assert!(el(SyncState::AckR, 5).committable(5));
        assert!(!el(SyncState::AckR, 6).committable(5));
        assert!(!el(SyncState::AckS, 6).committable(5));
        assert!(el(SyncState::Add, 99).committable(0));
        assert!(el(SyncState::Sync, 99).committable(0));
        assert!(!el(SyncState::ReqS, 0).committable(10));
        assert!(!el(SyncState::Ini, 0).committable(10));
    }

    #[test]
    fn syncable_and_blocked_sets() {
        let syncable: Vec<_> = [
            SyncState::Ini,
            SyncState::Add,
            SyncState::ReqR,
            SyncState::ReqS,
            SyncState::AckR,
            SyncState::AckS,
            SyncState::ComR,
            SyncState::ComS,
            SyncState::Sync,
        ]
        .into_iter()
        .filter(|s| el(*s, 0).syncable())
        .collect();
        assert_eq!(syncable, vec![SyncState::Add, SyncState::ComR, SyncState::Sync]);

        assert!(el(SyncState::ReqS, 0).possibly_blocked());
        assert!(el(SyncState::ComR, 0).possibly_blocked());
        assert!(el(SyncState::Add, 0).possibly_blocked());
        assert!(!el(SyncState::Sync, 0).possibly_blocked());
    }

    #[test]
    fn bootstrap_elements_start_in_add() {
        assert_eq!(SyncElement::new(P, true, 0).state, SyncState::Add);
        assert_eq!(SyncElement::new(P, false, 0).state, SyncState::Ini);
    }
}
