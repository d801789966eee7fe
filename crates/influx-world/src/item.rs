//! Concrete item types, one per layer, and the [`PlacedItem`] sum type.

use influx_core::{
    ActiveItemId, Color, Coordinate, Direction, LayerKind, Representable, Representation,
};
use serde::Serialize;

use crate::queue::GeneratorQueue;

/// Lifetime a pheromone gets when none is requested.
pub const PHEROMONE_DEFAULT_LIFETIME: u32 = 100;
/// Lifetime added when a pheromone is reinforced without a requested value.
pub const PHEROMONE_REINFORCE: u32 = 75;
/// Upper bound on pheromone lifetime.
pub const PHEROMONE_MAX_LIFETIME: u32 = 2000;

// ── Passive items ──────────────────────────────────────────────────

/// A packet, either loose on the grid or carried by an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Packet {
    /// Packet color.
    pub color: Color,
}

/// A delivery point for packets of one color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Destination {
    /// Accepted color.
    pub color: Color,
    /// Number of packets delivered so far.
    pub delivered: u32,
}

/// A wall. Glass walls block movement but not sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Wall {
    /// Whether sight passes through.
    pub see_through: bool,
}

/// A colored marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Flag {
    /// Flag color.
    pub color: Color,
}

/// A pile of crumbs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Crumb {
    /// Number of crumbs; a pile with zero crumbs is removed.
    pub count: u32,
}

/// A decaying scent marker, optionally pointing at a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pheromone {
    /// Remaining lifetime in cycles.
    pub lifetime: u32,
    /// Pointed-at cell for directed pheromones.
    pub target: Option<Coordinate>,
}

impl Pheromone {
    /// A fresh pheromone. A `lifetime` of zero selects the default.
    pub fn new(lifetime: u32, target: Option<Coordinate>) -> Self {
        let lifetime = if lifetime == 0 {
            PHEROMONE_DEFAULT_LIFETIME
        } else {
            lifetime.min(PHEROMONE_MAX_LIFETIME)
        };
        Self { lifetime, target }
    }

    /// Extend the lifetime, capped at [`PHEROMONE_MAX_LIFETIME`].
    ///
    /// A `boost` of zero adds [`PHEROMONE_REINFORCE`].
    pub fn reinforce(&mut self, boost: u32) {
        let boost = if boost == 0 { PHEROMONE_REINFORCE } else { boost };
        self.lifetime = self
            .lifetime
            .saturating_add(boost)
            .min(PHEROMONE_MAX_LIFETIME);
    }

    /// Lose one cycle of lifetime. Returns `true` when the pheromone expired.
    pub fn decay(&mut self) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        self.lifetime == 0
    }
}

/// Hop distance to the nearest energy station.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Gradient {
    /// The distance.
    pub value: u32,
}

// ── Active items ───────────────────────────────────────────────────

/// The world-side state of an agent.
///
/// Behavior and memory live in the engine; the world holds only what
/// laws and perception need.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentBody {
    /// Identity.
    pub id: ActiveItemId,
    /// Display name.
    pub name: String,
    /// Perception radius.
    pub view: u32,
    /// Current battery level.
    pub battery: u32,
    /// The carried packet.
    pub carry: Option<Packet>,
    /// Restrict handled packets to one color.
    pub color_restriction: Option<Color>,
}

impl AgentBody {
    /// An agent with a full battery of `battery` units and nothing in hand.
    pub fn new(id: u32, name: impl Into<String>, view: u32, battery: u32) -> Self {
        Self {
            id: ActiveItemId::agent(id),
            name: name.into(),
            view,
            battery,
            carry: None,
            color_restriction: None,
        }
    }

    /// Whether this agent may handle a packet of `color`.
    pub fn handles(&self, color: Color) -> bool {
        color.admits(self.color_restriction)
    }
}

/// A charging station. It charges the agent standing north of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnergyStation {
    /// Identity.
    pub id: ActiveItemId,
}

impl EnergyStation {
    /// The cell this station charges, relative to its own position.
    pub fn charge_cell(at: Coordinate) -> Coordinate {
        at.step(Direction::North)
    }
}

/// When a generator produces a packet.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum GeneratorRate {
    /// Every `every`-th decision, starting with the first.
    Fixed {
        /// Period in cycles.
        every: u32,
    },
    /// With probability `chance` per decision.
    Random {
        /// Probability in `[0, 1]`.
        chance: f64,
    },
}

/// A packet generator with a finite production budget.
#[derive(Clone, Debug, Serialize)]
pub struct Generator {
    /// Identity.
    pub id: ActiveItemId,
    /// Color of produced packets.
    pub color: Color,
    /// Production schedule.
    pub rate: GeneratorRate,
    /// Packets left to produce.
    pub remaining: u32,
    /// Produced but unreleased packets.
    #[serde(skip)]
    pub queue: GeneratorQueue,
}

impl Generator {
    /// A generator with an empty buffer.
    pub fn new(id: ActiveItemId, color: Color, rate: GeneratorRate, threshold: u32) -> Self {
        Self {
            id,
            color,
            rate,
            remaining: threshold,
            queue: GeneratorQueue::new(),
        }
    }

    /// Whether the production budget is spent.
    pub fn hit_threshold(&self) -> bool {
        self.remaining == 0
    }

    /// Whether the generator will never release another packet.
    pub fn exhausted(&self) -> bool {
        self.hit_threshold() && self.queue.is_empty()
    }
}

/// A conveyor belt moving packets one cell per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Conveyor {
    /// Identity.
    pub id: ActiveItemId,
    /// Transport direction.
    pub direction: Direction,
}

// ── Representable ──────────────────────────────────────────────────

impl Representable for Packet {
    fn layer(&self) -> LayerKind {
        LayerKind::Packet
    }
    fn representation(&self) -> Representation {
        Representation::Packet { color: self.color }
    }
}

impl Representable for Destination {
    fn layer(&self) -> LayerKind {
        LayerKind::Destination
    }
    fn representation(&self) -> Representation {
        Representation::Destination {
            color: self.color,
            delivered: self.delivered,
        }
    }
}

impl Representable for Wall {
    fn layer(&self) -> LayerKind {
        LayerKind::Wall
    }
    fn representation(&self) -> Representation {
        Representation::Wall {
            see_through: self.see_through,
        }
    }
}

impl Representable for Flag {
    fn layer(&self) -> LayerKind {
        LayerKind::Flag
    }
    fn representation(&self) -> Representation {
        Representation::Flag { color: self.color }
    }
}

impl Representable for Crumb {
    fn layer(&self) -> LayerKind {
        LayerKind::Crumb
    }
    fn representation(&self) -> Representation {
        Representation::Crumb { count: self.count }
    }
}

impl Representable for Pheromone {
    fn layer(&self) -> LayerKind {
        LayerKind::Pheromone
    }
    fn representation(&self) -> Representation {
        Representation::Pheromone {
            lifetime: self.lifetime,
            target: self.target,
        }
    }
}

impl Representable for Gradient {
    fn layer(&self) -> LayerKind {
        LayerKind::Gradient
    }
    fn representation(&self) -> Representation {
        Representation::Gradient { value: self.value }
    }
}

impl Representable for AgentBody {
    fn layer(&self) -> LayerKind {
        LayerKind::Agent
    }
    fn representation(&self) -> Representation {
        Representation::Agent {
            id: self.id,
            name: self.name.clone(),
            carry: self.carry.map(|p| p.color),
            battery: self.battery,
            color_restriction: self.color_restriction,
        }
    }
}

impl Representable for EnergyStation {
    fn layer(&self) -> LayerKind {
        LayerKind::EnergyStation
    }
    fn representation(&self) -> Representation {
        Representation::EnergyStation { id: self.id }
    }
}

impl Representable for Generator {
    fn layer(&self) -> LayerKind {
        LayerKind::Generator
    }
    fn representation(&self) -> Representation {
        Representation::Generator {
            id: self.id,
            color: self.color,
            buffered: self.queue.len() as u32,
        }
    }
}

impl Representable for Conveyor {
    fn layer(&self) -> LayerKind {
        LayerKind::Conveyor
    }
    fn representation(&self) -> Representation {
        Representation::Conveyor {
            id: self.id,
            direction: self.direction,
        }
    }
}

// ── PlacedItem ─────────────────────────────────────────────────────

/// Any item together with its layer tag, ready to be placed on the grid.
#[derive(Clone, Debug)]
pub enum PlacedItem {
    /// An agent.
    Agent(AgentBody),
    /// A loose packet.
    Packet(Packet),
    /// A destination.
    Destination(Destination),
    /// A wall.
    Wall(Wall),
    /// An energy station.
    EnergyStation(EnergyStation),
    /// A packet generator.
    Generator(Generator),
    /// A conveyor.
    Conveyor(Conveyor),
    /// A flag.
    Flag(Flag),
    /// A crumb pile.
    Crumb(Crumb),
    /// A pheromone.
    Pheromone(Pheromone),
    /// A gradient value.
    Gradient(Gradient),
}

impl PlacedItem {
    /// The layer this item goes into.
    pub fn layer(&self) -> LayerKind {
        match self {
            PlacedItem::Agent(_) => LayerKind::Agent,
            PlacedItem::Packet(_) => LayerKind::Packet,
            PlacedItem::Destination(_) => LayerKind::Destination,
            PlacedItem::Wall(_) => LayerKind::Wall,
            PlacedItem::EnergyStation(_) => LayerKind::EnergyStation,
            PlacedItem::Generator(_) => LayerKind::Generator,
            PlacedItem::Conveyor(_) => LayerKind::Conveyor,
            PlacedItem::Flag(_) => LayerKind::Flag,
            PlacedItem::Crumb(_) => LayerKind::Crumb,
            PlacedItem::Pheromone(_) => LayerKind::Pheromone,
            PlacedItem::Gradient(_) => LayerKind::Gradient,
        }
    }

    /// The active item id, for agents, stations, generators and conveyors.
    pub fn active_id(&self) -> Option<ActiveItemId> {
        match self {
            PlacedItem::Agent(a) => Some(a.id),
            PlacedItem::EnergyStation(s) => Some(s.id),
            PlacedItem::Generator(g) => Some(g.id),
            PlacedItem::Conveyor(c) => Some(c.id),
            _ => None,
        }
    }
}
