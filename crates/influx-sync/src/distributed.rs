//! Pairwise handshake synchronization.

use indexmap::IndexMap;
use influx_core::ActiveItemId;
use tracing::{debug, trace, warn};

use crate::error::SyncError;
use crate::personal::PersonalSynchronizer;
use crate::strategy::{Candidates, LivenessWarning, SyncReport, Synchronization};

/// Runs the request/ack/commit/confirm handshake between personal
/// synchronizers.
///
/// Synchronizers are handed out in ascending id order up to the granted
/// count. An entity without one has an empty sync set and never answers,
/// so partners waiting on it stall and raise a [`LivenessWarning`].
#[derive(Debug)]
pub struct DistributedSynchronization {
    granted: usize,
    personal: IndexMap<ActiveItemId, PersonalSynchronizer>,
    max_rounds: u32,
    stall_grace: u32,
    stalls: IndexMap<ActiveItemId, u32>,
    cycles: u64,
}

impl DistributedSynchronization {
    /// Create with `synchronizers` personal synchronizers available.
    pub fn new(
        synchronizers: usize,
        max_handshake_rounds: u32,
        stall_grace_cycles: u32,
    ) -> Result<Self, SyncError> {
        if synchronizers == 0 {
            return Err(SyncError::NoSynchronizers);
        }
        if max_handshake_rounds == 0 {
            return Err(SyncError::NoHandshakeRounds);
        }
        Ok(Self {
            granted: synchronizers,
            personal: IndexMap::new(),
            max_rounds: max_handshake_rounds,
            stall_grace: stall_grace_cycles,
            stalls: IndexMap::new(),
            cycles: 0,
        })
    }

    /// Make `n` more synchronizers available from the next cycle on.
    pub fn grant(&mut self, n: usize) {
        self.granted = self.granted.saturating_add(n);
        debug!(granted = self.granted, "synchronizers granted");
    }

    /// Synchronizers available in total.
    pub fn synchronizer_count(&self) -> usize {
        self.granted
    }

    /// Synchronizers already handed to entities.
    pub fn assigned(&self) -> usize {
        self.personal.len()
    }

    /// The personal synchronizer of `id`, if it has one.
    pub fn personal(&self, id: ActiveItemId) -> Option<&PersonalSynchronizer> {
        self.personal.get(&id)
    }

    /// Consecutive stalled cycles recorded for `id`.
    pub fn stall_count(&self, id: ActiveItemId) -> u32 {
        self.stalls.get(&id).copied().unwrap_or(0)
    }

    fn assign(&mut self, candidates: &Candidates) {
        let mut ids: Vec<_> = candidates.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if self.personal.len() >= self.granted {
                break;
            }
            if !self.personal.contains_key(&id) {
                self.personal.insert(id, PersonalSynchronizer::new(id));
            }
        }
        self.personal.sort_keys();
    }
}

impl Synchronization for DistributedSynchronization {
    fn name(&self) -> &str {
        "distributed"
    }

    fn grant(&mut self, n: usize) -> bool {
        DistributedSynchronization::grant(self, n);
        true
    }

    fn synchronize(&mut self, time: u64, candidates: &Candidates) -> SyncReport {
        let bootstrap = self.cycles == 0;
        self.assign(candidates);
        for (id, sync) in self.personal.iter_mut() {
            let partners = candidates.get(id).map(Vec::as_slice).unwrap_or(&[]);
            sync.begin_cycle(time, partners, bootstrap);
        }

        let mut report = SyncReport::default();
        for _ in 0..self.max_rounds {
            let outbox: Vec<_> = self
                .personal
                .values_mut()
                .flat_map(PersonalSynchronizer::outgoing)
                .collect();
            if outbox.is_empty() {
                break;
            }
            report.rounds += 1;
            report.messages += outbox.len();
            for msg in &outbox {
                match self.personal.get_mut(&msg.to) {
                    Some(sync) => sync.receive(msg),
                    None => trace!(from = %msg.from, to = %msg.to, "no synchronizer, message dropped"),
                }
            }
        }

        for &id in candidates.keys() {
            let set = self
                .personal
                .get(&id)
                .map(PersonalSynchronizer::sync_set)
                .unwrap_or_default();
            report.sets.insert(id, set);
        }

        for (&id, sync) in &self.personal {
            if !sync.stalled() {
                self.stalls.swap_remove(&id);
                continue;
            }
            let count = self.stalls.entry(id).or_insert(0);
            *count += 1;
            let warning = LivenessWarning {
                entity: id,
                time,
                partners: sync.blocked_partners(),
                consecutive: *count,
                escalated: *count > self.stall_grace,
            };
            warn!(
                entity = %id,
                partners = warning.partners.len(),
                consecutive = warning.consecutive,
                escalated = warning.escalated,
                "synchronizer stalled"
            );
            report.warnings.push(warning);
        }

        debug!(
            time,
            rounds = report.rounds,
            messages = report.messages,
            stalled = report.warnings.len(),
            "distributed sync done"
        );
        self.cycles += 1;
        report
    }
}
