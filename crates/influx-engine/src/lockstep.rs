//! Lockstep (synchronous) simulation.
//!
//! [`LockstepSimulation`] runs every cycle on the calling thread. Each
//! call to [`step()`](LockstepSimulation::step) completes one full cycle
//! and returns its [`CycleReport`].
//!
//! # Ownership model
//!
//! `LockstepSimulation` is [`Send`] (can be moved between threads) but
//! all stepping takes `&mut self`. No background threads are involved.

use crossbeam_channel::Receiver;
use influx_core::{CycleId, Event};
use influx_world::World;
use tracing::info;

use crate::config::{ConfigError, WorldConfig};
use crate::error::CycleError;
use crate::kernel::{Behaviors, CycleReport, Kernel};
use crate::metrics::CycleMetrics;

// Compile-time assertion: LockstepSimulation is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepSimulation>();
    }
};

/// How a [`run()`](LockstepSimulation::run) ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEnd {
    /// The world drained.
    GameOver,
    /// The cycle limit was reached.
    MaxCycles,
}

/// Summary of a [`run()`](LockstepSimulation::run).
#[derive(Clone, Debug)]
pub struct RunSummary {
    /// Cycles completed by this call.
    pub cycles: u64,
    /// Why the run stopped.
    pub end: RunEnd,
    /// Packets delivered in the world after the run.
    pub delivered: u32,
    /// Liveness warnings raised across the run.
    pub warnings: usize,
}

/// Single-threaded simulation for lockstep execution.
///
/// # Example
///
/// ```
/// use influx_engine::{Behaviors, ItemSpec, LockstepSimulation, WorldConfig};
///
/// let config = WorldConfig::new(4, 4).with_item(ItemSpec::agent(1, 1, 2, 1, "a"));
/// let mut sim = LockstepSimulation::new(config, Behaviors::new()).unwrap();
/// let report = sim.step().unwrap();
/// assert_eq!(report.cycle.0, 0);
/// // Nothing to deliver, so the world starts out drained.
/// assert!(report.game_over);
/// ```
pub struct LockstepSimulation {
    kernel: Kernel,
}

impl LockstepSimulation {
    /// Build the kernel from `config` and `behaviors`.
    pub fn new(config: WorldConfig, behaviors: Behaviors) -> Result<Self, ConfigError> {
        Ok(Self {
            kernel: Kernel::new(config, behaviors)?,
        })
    }

    /// Wrap an existing kernel, e.g. one recovered from a
    /// [`SimulationThread`](crate::SimulationThread).
    pub fn from_kernel(kernel: Kernel) -> Self {
        Self { kernel }
    }

    /// Run one full cycle.
    pub fn step(&mut self) -> Result<CycleReport, CycleError> {
        self.kernel.step()
    }

    /// Run cycles until the world drains or the configured cycle limit is
    /// reached. A kernel without a limit stops only at game over.
    pub fn run(&mut self) -> Result<RunSummary, CycleError> {
        let mut cycles = 0;
        let mut warnings = 0;
        let end = loop {
            if self
                .kernel
                .max_cycles()
                .is_some_and(|max| self.kernel.current_cycle().0 >= max)
            {
                break RunEnd::MaxCycles;
            }
            let report = self.kernel.step()?;
            cycles += 1;
            warnings += report.warnings.len();
            if report.game_over {
                break RunEnd::GameOver;
            }
        };
        let summary = RunSummary {
            cycles,
            end,
            delivered: self.kernel.world().delivered_total(),
            warnings,
        };
        info!(cycles, end = ?summary.end, delivered = summary.delivered, "run finished");
        Ok(summary)
    }

    /// The world after the last cycle.
    pub fn world(&self) -> &World {
        self.kernel.world()
    }

    /// The cycle the next step will run.
    pub fn current_cycle(&self) -> CycleId {
        self.kernel.current_cycle()
    }

    /// Subscribe to published events.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        self.kernel.subscribe()
    }

    /// Metrics from the most recent cycle.
    pub fn last_metrics(&self) -> &CycleMetrics {
        self.kernel.last_metrics()
    }

    /// The simulation seed.
    pub fn seed(&self) -> u64 {
        self.kernel.seed()
    }

    /// Whether the kernel is disabled.
    pub fn is_disabled(&self) -> bool {
        self.kernel.is_disabled()
    }

    /// The underlying kernel.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Mutable access to the underlying kernel.
    pub fn kernel_mut(&mut self) -> &mut Kernel {
        &mut self.kernel
    }

    /// Give the kernel back.
    pub fn into_kernel(self) -> Kernel {
        self.kernel
    }
}

impl std::fmt::Debug for LockstepSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepSimulation")
            .field("current_cycle", &self.kernel.current_cycle())
            .field("seed", &self.kernel.seed())
            .field("disabled", &self.kernel.is_disabled())
            .finish()
    }
}
