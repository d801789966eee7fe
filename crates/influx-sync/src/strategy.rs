//! The synchronization seam used by the kernel.

use indexmap::IndexMap;
use influx_core::ActiveItemId;
use serde::Serialize;

use crate::central::CentralSynchronization;
use crate::distributed::DistributedSynchronization;
use crate::error::SyncError;

/// Per-entity candidate partners for one cycle.
///
/// Every active item appears as a key, even with no candidates.
pub type Candidates = IndexMap<ActiveItemId, Vec<ActiveItemId>>;

/// A stalled entity: every partner relationship is possibly blocked.
///
/// Never fatal. The pair is retried next cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LivenessWarning {
    /// The stalled entity.
    pub entity: ActiveItemId,
    /// Logical time of the cycle the stall was seen in.
    pub time: u64,
    /// Partners it is waiting on.
    pub partners: Vec<ActiveItemId>,
    /// Consecutive cycles this entity has stalled, including this one.
    pub consecutive: u32,
    /// Whether `consecutive` exceeded the configured grace.
    pub escalated: bool,
}

/// Outcome of one synchronization pass.
#[derive(Clone, Debug, Default)]
pub struct SyncReport {
    /// Sync set per entity.
    pub sets: IndexMap<ActiveItemId, Vec<ActiveItemId>>,
    /// Entities that stalled this cycle.
    pub warnings: Vec<LivenessWarning>,
    /// Handshake rounds that carried at least one message.
    pub rounds: u32,
    /// Messages exchanged.
    pub messages: usize,
}

impl SyncReport {
    /// Sync set of `id`; empty when unknown.
    pub fn sync_set(&self, id: ActiveItemId) -> &[ActiveItemId] {
        self.sets.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A strategy deciding, once per cycle, whom each entity must agree with.
pub trait Synchronization: Send + 'static {
    /// Strategy name for logs.
    fn name(&self) -> &str;

    /// Run one cycle's agreement at logical `time`.
    fn synchronize(&mut self, time: u64, candidates: &Candidates) -> SyncReport;

    /// Make `n` more personal synchronizers available. Returns whether the
    /// strategy uses them; a global barrier does not.
    fn grant(&mut self, n: usize) -> bool {
        let _ = n;
        false
    }
}

/// Which strategy to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SyncMode {
    /// Global barrier.
    #[default]
    Central,
    /// Pairwise handshake with `synchronizers` personal synchronizers.
    Distributed {
        /// Personal synchronizers to create before the first cycle.
        synchronizers: usize,
    },
}

impl SyncMode {
    /// Build the strategy for the active items in `ids`.
    pub fn build(
        self,
        ids: &[ActiveItemId],
        max_handshake_rounds: u32,
        stall_grace_cycles: u32,
    ) -> Result<Box<dyn Synchronization>, SyncError> {
        match self {
            SyncMode::Central => Ok(Box::new(CentralSynchronization::new(ids.iter().copied()))),
            SyncMode::Distributed { synchronizers } => Ok(Box::new(
                DistributedSynchronization::new(
                    synchronizers,
                    max_handshake_rounds,
                    stall_grace_cycles,
                )?,
            )),
        }
    }
}
