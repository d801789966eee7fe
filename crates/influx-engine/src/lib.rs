//! Environment kernel and runners for Influx simulations.
//!
//! The [`Kernel`] drives the five-phase cycle: perception, communication,
//! synchronization, action and application. Active items propose
//! [`Influence`](influx_core::Influence)s; the [`Reactor`] judges them
//! against the world's laws and applies the survivors in deterministic
//! priority order. Agents are programmed through the [`Behavior`] trait.
//!
//! Two runners are provided: [`LockstepSimulation`] steps on the calling
//! thread, [`SimulationThread`] cycles on a background thread.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod behavior;
pub mod bus;
pub mod collector;
pub mod config;
pub mod energy;
pub mod error;
pub mod kernel;
pub mod lockstep;
pub mod metrics;
pub mod outcome;
pub mod policy;
pub mod postal;
pub mod reactor;
pub mod runtime;
pub mod thread;

pub use agent::{AgentContext, Memory, Phase, MEMORY_CAPACITY};
pub use behavior::{Behavior, BehaviorGraph, BehaviorGraphBuilder, IdleBehavior};
pub use bus::EventBus;
pub use collector::{Collector, Sphere};
pub use config::{Arg, ConfigError, EnergyConfig, ItemSpec, WorldConfig};
pub use error::CycleError;
pub use kernel::{Behaviors, CycleReport, Kernel};
pub use lockstep::{LockstepSimulation, RunEnd, RunSummary};
pub use metrics::CycleMetrics;
pub use outcome::{Mail, Outcome, OutcomeKind};
pub use postal::PostalService;
pub use reactor::{ApplyStats, Reactor};
pub use runtime::ActiveItemRuntime;
pub use thread::{ExitReason, SimulationThread, REPORT_BUFFER};
