//! Event records published once per cycle to external observers.
//!
//! The kernel never assumes a subscriber exists; it buffers [`Event`]s
//! during a cycle and flushes them to the event bus after the apply phase.

use serde::Serialize;

use crate::color::Color;
use crate::coord::Coordinate;
use crate::id::{ActiveItemId, CycleId};
use crate::influence::InfluenceKind;

/// Stable numeric action codes carried in action events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum ActionCode {
    /// A packet was picked from the grid.
    PickPacket = 1,
    /// A packet was put down on a free cell.
    PutPacket = 2,
    /// A packet was put on a matching destination.
    DeliverPacket = 3,
    /// An agent moved.
    Step = 4,
    /// An item skipped its turn.
    Skip = 5,
    /// A flag was placed.
    PutFlag = 6,
    /// A pheromone was placed or reinforced.
    PutPheromone = 7,
    /// A pheromone was removed.
    RemovePheromone = 8,
    /// Crumbs were dropped.
    PutCrumb = 9,
    /// Crumbs were picked.
    PickCrumb = 10,
    /// A station charged a cell.
    LoadEnergy = 12,
    /// An item without energy idled.
    IdleEnergy = 13,
    /// A packet was taken from a generator.
    PickGenerator = 14,
    /// A generator produced or released a packet.
    GeneratePacket = 15,
    /// A packet was taken from another agent.
    StealPacket = 16,
    /// A conveyor moved a packet.
    ConveyPacket = 20,
}

impl ActionCode {
    /// The numeric wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The code for an influence kind; deliveries are distinguished by the
    /// kernel after application.
    pub fn for_kind(kind: InfluenceKind) -> ActionCode {
        match kind {
            InfluenceKind::Step => ActionCode::Step,
            InfluenceKind::PickPacket => ActionCode::PickPacket,
            InfluenceKind::PutPacket => ActionCode::PutPacket,
            InfluenceKind::PickGeneratorPacket => ActionCode::PickGenerator,
            InfluenceKind::StealPacket => ActionCode::StealPacket,
            InfluenceKind::ConveyPacket => ActionCode::ConveyPacket,
            InfluenceKind::PutFlag => ActionCode::PutFlag,
            InfluenceKind::PutCrumb => ActionCode::PutCrumb,
            InfluenceKind::PickCrumb => ActionCode::PickCrumb,
            InfluenceKind::PutPheromone | InfluenceKind::PutDirectedPheromone => {
                ActionCode::PutPheromone
            }
            InfluenceKind::RemovePheromone => ActionCode::RemovePheromone,
            InfluenceKind::Energy => ActionCode::LoadEnergy,
            InfluenceKind::GeneratePacket | InfluenceKind::PopGeneratorPacket => {
                ActionCode::GeneratePacket
            }
            InfluenceKind::Skip => ActionCode::Skip,
            InfluenceKind::Nop => ActionCode::IdleEnergy,
        }
    }
}

/// Kind-specific detail attached to an action event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ActionPayload {
    /// No extra detail.
    #[default]
    None,
    /// A packet of this color moved.
    Packet {
        /// Packet color.
        color: Color,
    },
    /// A packet of this color reached a destination.
    Delivery {
        /// Packet color.
        color: Color,
        /// The destination's delivered count after this delivery.
        delivered: u32,
    },
    /// A flag of this color was placed.
    Flag {
        /// Flag color.
        color: Color,
    },
    /// Crumbs changed by this amount.
    Crumbs {
        /// Crumb count in the influence.
        count: u32,
    },
    /// A pheromone now has this lifetime.
    Pheromone {
        /// Lifetime after placement or reinforcement.
        lifetime: u32,
    },
    /// Energy was transferred.
    Energy {
        /// Battery units added to the charged agent.
        load: u32,
        /// The charged agent, if one stood on the target.
        charged: Option<ActiveItemId>,
    },
}

/// One applied or rejected influence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionEvent {
    /// Cycle in which the influence was evaluated.
    pub cycle: CycleId,
    /// The proposing active item.
    pub entity: ActiveItemId,
    /// Influence kind.
    pub kind: InfluenceKind,
    /// Stable action code.
    pub code: ActionCode,
    /// Position of the proposer.
    pub from: Coordinate,
    /// Target cell.
    pub to: Coordinate,
    /// Whether the law accepted the influence.
    pub succeeded: bool,
    /// Kind-specific detail.
    pub payload: ActionPayload,
}

/// An active item's behavior changed name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BehaviorChange {
    /// Cycle in which the transition happened.
    pub cycle: CycleId,
    /// The agent that changed behavior.
    pub entity: ActiveItemId,
    /// Name of the new behavior.
    pub behavior_name: String,
}

/// A mail was sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageEvent {
    /// Cycle in which the mail was sent.
    pub cycle: CycleId,
    /// Sender.
    pub from: ActiveItemId,
    /// Recipient, or `None` for a broadcast.
    pub to: Option<ActiveItemId>,
    /// Message body.
    pub text: String,
}

/// Anything published on the event bus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Event {
    /// An influence was evaluated.
    Action(ActionEvent),
    /// A behavior transition.
    Behavior(BehaviorChange),
    /// A mail was sent.
    Message(MessageEvent),
}

impl Event {
    /// The entity this event is about.
    pub fn entity(&self) -> ActiveItemId {
        match self {
            Event::Action(a) => a.entity,
            Event::Behavior(b) => b.entity,
            Event::Message(m) => m.from,
        }
    }

    /// The cycle this event belongs to.
    pub fn cycle(&self) -> CycleId {
        match self {
            Event::Action(a) => a.cycle,
            Event::Behavior(b) => b.cycle,
            Event::Message(m) => m.cycle,
        }
    }

    /// The action record, if this is one.
    pub fn as_action(&self) -> Option<&ActionEvent> {
        match self {
            Event::Action(a) => Some(a),
            _ => None,
        }
    }
}
