//! Perception construction for the Influx simulation kernel.
//!
//! A [`Perception`] is a rectangular window of cells centered on an
//! active item and clipped to the grid. The raw window is then passed
//! through an ordered [`PerceptionChain`] of [`PerceptionLaw`]s, each a
//! pure transform that may degrade what the item sees.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod line;
pub mod perception;
pub mod see_nothing;
pub mod wall_obstacle;

pub use chain::{PerceptionChain, PerceptionLaw, PerceptionLawKind};
pub use perception::{CellView, Perception};
pub use see_nothing::SeeNothing;
pub use wall_obstacle::WallObstacle;
