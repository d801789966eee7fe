//! World layers for the Influx simulation kernel.
//!
//! A [`World`] owns one sparse [`Layer`] per item category. A coordinate
//! may hold many items across different layers but never two in the same
//! layer; cross-layer coexistence is governed by the pure functions in
//! [`collision`]. Laws only read a `World`; the kernel's apply step is the
//! single writer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod collision;
pub mod error;
pub mod gradient;
pub mod item;
pub mod layer;
pub mod queue;
pub mod world;

pub use bounds::GridBounds;
pub use error::WorldError;
pub use item::{
    AgentBody, Conveyor, Crumb, Destination, EnergyStation, Flag, Generator, GeneratorRate,
    Gradient, Packet, Pheromone, PlacedItem, Wall,
};
pub use layer::Layer;
pub use queue::{GeneratorQueue, PhaseLock};
pub use world::World;
