//! Errors raised while running a cycle.

use influx_core::{ActiveItemId, InfluenceKind};
use influx_law::LawError;
use influx_world::WorldError;

/// Errors from [`Kernel::step`](crate::Kernel::step) and the runners.
///
/// A rejected influence is not an error; it shows up as a
/// `succeeded = false` event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleError {
    /// A stop was requested before the cycle started.
    #[error("stop requested")]
    Stopped,
    /// An earlier apply left the world inconsistent; the kernel refuses to
    /// run further cycles.
    #[error("kernel disabled after an inconsistent apply")]
    Disabled,
    /// An outcome named an active item the kernel does not know.
    #[error("unknown active item {id}")]
    UnknownActiveItem {
        /// The unknown id.
        id: ActiveItemId,
    },
    /// A legal influence could not be applied.
    #[error("applying {kind} by {entity} failed: {source}")]
    Inconsistent {
        /// The proposer.
        entity: ActiveItemId,
        /// The influence kind.
        kind: InfluenceKind,
        /// The world mutation that failed.
        #[source]
        source: WorldError,
    },
    /// Law lookup failed.
    #[error("law: {0}")]
    Law(#[from] LawError),
    /// A worker thread panicked during a parallel act phase.
    #[error("worker thread panicked")]
    WorkerPanicked,
}
