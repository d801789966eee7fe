//! Influx: an influence-based multi-agent grid simulation.
//!
//! Agents never write the world directly. Each cycle they perceive,
//! exchange mail, and propose an influence; the kernel checks every
//! proposal against the world's laws and applies the legal ones in a
//! fixed priority order, so a run is fully determined by its
//! configuration and seed.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Influx sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use influx::prelude::*;
//!
//! // Walks east until something is in the way.
//! struct EastBound;
//! impl Behavior for EastBound {
//!     fn name(&self) -> &str { "east" }
//!     fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
//!         let next = ctx.coordinate().step(Direction::East);
//!         if ctx.can_walk(next.x, next.y) { ctx.step(next) } else { ctx.skip() }
//!     }
//! }
//!
//! let config = WorldConfig::new(8, 3)
//!     .with_item(ItemSpec::agent(0, 1, 2, 1, "walker"))
//!     .with_item(ItemSpec::packet(7, 0, Color::Red));
//! let mut behaviors = Behaviors::new();
//! behaviors.insert(ActiveItemId::agent(1), Box::new(EastBound) as Box<dyn Behavior>);
//!
//! let mut sim = LockstepSimulation::new(config, behaviors).unwrap();
//! for _ in 0..3 {
//!     sim.step().unwrap();
//! }
//! assert_eq!(
//!     sim.world().locate(ActiveItemId::agent(1)),
//!     Some(Coordinate::new(3, 1))
//! );
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `influx-core` | Coordinates, ids, influences, representations, events |
//! | [`world`] | `influx-world` | Layered grid, items, gradients, generator queue |
//! | [`law`] | `influx-law` | Action laws and the law registry |
//! | [`sync`] | `influx-sync` | Central and distributed synchronization |
//! | [`obs`] | `influx-obs` | Perception windows and perception laws |
//! | [`engine`] | `influx-engine` | Kernel, behaviors, runners |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`influx-core`).
pub use influx_core as types;

/// The layered grid and its items (`influx-world`).
pub use influx_world as world;

/// Action laws (`influx-law`).
///
/// Extend [`law::LawRegistry`] with [`law::FnLaw`] to add or replace the
/// rule for an influence kind.
pub use influx_law as law;

/// Synchronization strategies (`influx-sync`).
pub use influx_sync as sync;

/// Perception (`influx-obs`).
pub use influx_obs as obs;

/// Kernel and runners (`influx-engine`).
///
/// [`engine::LockstepSimulation`] steps on the calling thread,
/// [`engine::SimulationThread`] cycles in the background.
pub use influx_engine as engine;

/// Common imports for typical Influx usage.
///
/// ```rust
/// use influx::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use influx_core::{
        ActionCode, ActiveItemId, Color, Coordinate, CycleId, Direction, Event, Influence,
        InfluenceKind, LayerKind, Representation,
    };

    // World
    pub use influx_world::World;

    // Laws and sync
    pub use influx_law::LawRegistry;
    pub use influx_sync::SyncMode;

    // Perception
    pub use influx_obs::{Perception, PerceptionLawKind};

    // Engine
    pub use influx_engine::{
        AgentContext, Behavior, BehaviorGraph, Behaviors, ConfigError, CycleError, CycleReport,
        IdleBehavior, ItemSpec, Kernel, LockstepSimulation, SimulationThread, WorldConfig,
    };
}
