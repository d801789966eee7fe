//! Layer tags and read-only item representations.
//!
//! A [`Representation`] is the serializable snapshot of one item that
//! perception and rendering consume. Representations never alias live
//! world state: they are rebuilt from the layers every cycle.

use serde::Serialize;
use std::fmt;

use crate::color::Color;
use crate::coord::{Coordinate, Direction};
use crate::id::ActiveItemId;

/// Tag of a world layer. Each cell holds at most one item per layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum LayerKind {
    /// Agents.
    Agent,
    /// Loose packets.
    Packet,
    /// Packet destinations.
    Destination,
    /// Solid or glass walls.
    Wall,
    /// Energy stations.
    EnergyStation,
    /// Packet generators.
    Generator,
    /// Conveyor belts.
    Conveyor,
    /// Colored flags.
    Flag,
    /// Crumb piles.
    Crumb,
    /// Decaying pheromones.
    Pheromone,
    /// Distance-to-station gradient values.
    Gradient,
}

impl LayerKind {
    /// Every layer, in rendering order (bottom first).
    pub const ALL: [LayerKind; 11] = [
        LayerKind::Gradient,
        LayerKind::Pheromone,
        LayerKind::Crumb,
        LayerKind::Flag,
        LayerKind::Destination,
        LayerKind::Generator,
        LayerKind::Conveyor,
        LayerKind::EnergyStation,
        LayerKind::Wall,
        LayerKind::Packet,
        LayerKind::Agent,
    ];

    /// Lower-case layer name.
    pub fn name(self) -> &'static str {
        match self {
            LayerKind::Agent => "agent",
            LayerKind::Packet => "packet",
            LayerKind::Destination => "destination",
            LayerKind::Wall => "wall",
            LayerKind::EnergyStation => "energy_station",
            LayerKind::Generator => "generator",
            LayerKind::Conveyor => "conveyor",
            LayerKind::Flag => "flag",
            LayerKind::Crumb => "crumb",
            LayerKind::Pheromone => "pheromone",
            LayerKind::Gradient => "gradient",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only snapshot of one item, tagged by layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Representation {
    /// An agent as other items see it.
    Agent {
        /// Identity.
        id: ActiveItemId,
        /// Display name.
        name: String,
        /// Color of the carried packet, if any.
        carry: Option<Color>,
        /// Current battery level.
        battery: u32,
        /// Color restriction, if any.
        color_restriction: Option<Color>,
    },
    /// A loose packet.
    Packet {
        /// Packet color.
        color: Color,
    },
    /// A destination.
    Destination {
        /// Accepted color.
        color: Color,
        /// Number of packets delivered here.
        delivered: u32,
    },
    /// A wall.
    Wall {
        /// Glass walls do not block sight.
        see_through: bool,
    },
    /// An energy station.
    EnergyStation {
        /// Identity.
        id: ActiveItemId,
    },
    /// A packet generator.
    Generator {
        /// Identity.
        id: ActiveItemId,
        /// Color of produced packets.
        color: Color,
        /// Packets waiting in the buffer.
        buffered: u32,
    },
    /// A conveyor belt.
    Conveyor {
        /// Identity.
        id: ActiveItemId,
        /// Transport direction.
        direction: Direction,
    },
    /// A flag.
    Flag {
        /// Flag color.
        color: Color,
    },
    /// A crumb pile.
    Crumb {
        /// Number of crumbs.
        count: u32,
    },
    /// A pheromone, optionally pointing at a cell.
    Pheromone {
        /// Remaining lifetime in cycles.
        lifetime: u32,
        /// Pointed-at cell for directed pheromones.
        target: Option<Coordinate>,
    },
    /// A gradient value.
    Gradient {
        /// Hop distance to the nearest energy station.
        value: u32,
    },
}

impl Representation {
    /// The layer this representation belongs to.
    pub fn layer(&self) -> LayerKind {
        match self {
            Representation::Agent { .. } => LayerKind::Agent,
            Representation::Packet { .. } => LayerKind::Packet,
            Representation::Destination { .. } => LayerKind::Destination,
            Representation::Wall { .. } => LayerKind::Wall,
            Representation::EnergyStation { .. } => LayerKind::EnergyStation,
            Representation::Generator { .. } => LayerKind::Generator,
            Representation::Conveyor { .. } => LayerKind::Conveyor,
            Representation::Flag { .. } => LayerKind::Flag,
            Representation::Crumb { .. } => LayerKind::Crumb,
            Representation::Pheromone { .. } => LayerKind::Pheromone,
            Representation::Gradient { .. } => LayerKind::Gradient,
        }
    }

    /// The active item behind this representation, if any.
    pub fn active_id(&self) -> Option<ActiveItemId> {
        match self {
            Representation::Agent { id, .. }
            | Representation::EnergyStation { id }
            | Representation::Generator { id, .. }
            | Representation::Conveyor { id, .. } => Some(*id),
            _ => None,
        }
    }
}
