//! Per-cycle performance metrics for the simulation kernel.
//!
//! [`CycleMetrics`] captures timing and counts for a single cycle.

/// Timing and count metrics collected during a single cycle.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleMetrics {
    /// Wall-clock time for the entire cycle.
    pub total_us: u64,
    /// Time spent building perceptions.
    pub perception_us: u64,
    /// Time spent in the synchronization strategy.
    pub sync_us: u64,
    /// Time spent in the talk and act phases of active items.
    pub decide_us: u64,
    /// Time spent validating and applying influences.
    pub apply_us: u64,
    /// Influences the laws accepted.
    pub applied: u32,
    /// Influences the laws rejected.
    pub rejected: u32,
    /// Spheres dispatched across all phases.
    pub spheres: u32,
    /// Entities that raised a liveness warning.
    pub stalled: u32,
    /// Handshake messages exchanged.
    pub sync_messages: u64,
    /// Mail delivered.
    pub mails: u32,
    /// Pheromones that expired.
    pub expired_pheromones: u32,
}
