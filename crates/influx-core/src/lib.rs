//! Core types and traits for the Influx simulation kernel.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types shared across the Influx workspace: coordinates and
//! directions, active-item identities, influences, item representations,
//! event records, and the shared error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod color;
pub mod coord;
pub mod error;
pub mod event;
pub mod id;
pub mod influence;
pub mod repr;
pub mod traits;

pub use color::Color;
pub use coord::{Coordinate, Direction};
pub use error::ParseError;
pub use event::{ActionCode, ActionEvent, ActionPayload, BehaviorChange, Event, MessageEvent};
pub use id::{ActiveItemId, CycleId, PriorityClass};
pub use influence::{Influence, InfluenceKind, InfluencePayload};
pub use repr::{LayerKind, Representation};
pub use traits::Representable;
