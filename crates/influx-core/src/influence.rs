//! Influence values: proposed, not-yet-applied state changes.
//!
//! An [`Influence`] is created by an active item during its action phase,
//! validated by the law registered for its [`InfluenceKind`], and either
//! applied or discarded by the kernel within the same cycle.

use serde::Serialize;
use std::fmt;

use crate::color::Color;
use crate::coord::Coordinate;
use crate::id::ActiveItemId;

/// Tag identifying the kind of an influence.
///
/// Laws are registered per tag; the kernel refuses to start unless every
/// tag in [`InfluenceKind::ALL`] has exactly one law.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum InfluenceKind {
    /// Move an agent one cell.
    Step,
    /// Pick a packet lying on the grid.
    PickPacket,
    /// Put down (or deliver) the carried packet.
    PutPacket,
    /// Take a buffered packet from a generator.
    PickGeneratorPacket,
    /// Take the packet carried by a neighbouring agent.
    StealPacket,
    /// Move a packet along a conveyor.
    ConveyPacket,
    /// Place a flag.
    PutFlag,
    /// Drop crumbs.
    PutCrumb,
    /// Pick up crumbs.
    PickCrumb,
    /// Place or reinforce a pheromone.
    PutPheromone,
    /// Place or reinforce a directed pheromone.
    PutDirectedPheromone,
    /// Remove a pheromone.
    RemovePheromone,
    /// Charge whatever agent stands on the target cell.
    Energy,
    /// Produce a packet into a generator's buffer.
    GeneratePacket,
    /// Release a buffered packet onto the generator cell.
    PopGeneratorPacket,
    /// Do nothing this cycle.
    Skip,
    /// Do nothing because the battery is empty.
    Nop,
}

impl InfluenceKind {
    /// Every influence kind, in declaration order.
    pub const ALL: [InfluenceKind; 17] = [
        InfluenceKind::Step,
        InfluenceKind::PickPacket,
        InfluenceKind::PutPacket,
        InfluenceKind::PickGeneratorPacket,
        InfluenceKind::StealPacket,
        InfluenceKind::ConveyPacket,
        InfluenceKind::PutFlag,
        InfluenceKind::PutCrumb,
        InfluenceKind::PickCrumb,
        InfluenceKind::PutPheromone,
        InfluenceKind::PutDirectedPheromone,
        InfluenceKind::RemovePheromone,
        InfluenceKind::Energy,
        InfluenceKind::GeneratePacket,
        InfluenceKind::PopGeneratorPacket,
        InfluenceKind::Skip,
        InfluenceKind::Nop,
    ];

    /// Upper-snake name used in logs and event records.
    pub fn name(self) -> &'static str {
        match self {
            InfluenceKind::Step => "STEP",
            InfluenceKind::PickPacket => "PICK_PACKET",
            InfluenceKind::PutPacket => "PUT_PACKET",
            InfluenceKind::PickGeneratorPacket => "PICK_GENERATOR",
            InfluenceKind::StealPacket => "STEAL_PACKET",
            InfluenceKind::ConveyPacket => "CONVEY_PACKET",
            InfluenceKind::PutFlag => "PUT_FLAG",
            InfluenceKind::PutCrumb => "PUT_CRUMB",
            InfluenceKind::PickCrumb => "PICK_CRUMB",
            InfluenceKind::PutPheromone => "PUT_PHEROMONE",
            InfluenceKind::PutDirectedPheromone => "PUT_DIR_PHEROMONE",
            InfluenceKind::RemovePheromone => "REMOVE_PHEROMONE",
            InfluenceKind::Energy => "LOAD_ENERGY",
            InfluenceKind::GeneratePacket => "GENERATE_PACKET",
            InfluenceKind::PopGeneratorPacket => "POP_GENERATOR_PACKET",
            InfluenceKind::Skip => "SKIP",
            InfluenceKind::Nop => "NOP",
        }
    }

    /// Whether this kind is a no-effect placeholder.
    pub fn is_idle(self) -> bool {
        matches!(self, InfluenceKind::Skip | InfluenceKind::Nop)
    }
}

impl fmt::Display for InfluenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind-specific data carried by an influence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum InfluencePayload {
    /// See [`InfluenceKind::Step`].
    Step,
    /// See [`InfluenceKind::PickPacket`].
    PickPacket,
    /// See [`InfluenceKind::PutPacket`].
    PutPacket,
    /// See [`InfluenceKind::PickGeneratorPacket`].
    PickGeneratorPacket,
    /// See [`InfluenceKind::StealPacket`].
    StealPacket,
    /// Move the packet on the conveyor at `origin` to `target`.
    ConveyPacket,
    /// Place a flag of this color.
    PutFlag {
        /// Flag color.
        color: Color,
    },
    /// Drop this many crumbs.
    PutCrumb {
        /// Number of crumbs.
        count: u32,
    },
    /// Pick this many crumbs.
    PickCrumb {
        /// Number of crumbs.
        count: u32,
    },
    /// Place or reinforce a pheromone.
    PutPheromone {
        /// Requested lifetime; `0` selects the default lifetime.
        lifetime: u32,
    },
    /// Place or reinforce a pheromone pointing at `toward`.
    PutDirectedPheromone {
        /// Requested lifetime; `0` selects the default lifetime.
        lifetime: u32,
        /// The cell the pheromone points at.
        toward: Coordinate,
    },
    /// See [`InfluenceKind::RemovePheromone`].
    RemovePheromone,
    /// Charge the agent on `target` by `load` units.
    Energy {
        /// Battery units to add.
        load: u32,
    },
    /// See [`InfluenceKind::GeneratePacket`].
    GeneratePacket,
    /// See [`InfluenceKind::PopGeneratorPacket`].
    PopGeneratorPacket,
    /// See [`InfluenceKind::Skip`].
    Skip,
    /// See [`InfluenceKind::Nop`].
    Nop,
}

impl InfluencePayload {
    /// The tag for this payload.
    pub fn kind(&self) -> InfluenceKind {
        match self {
            InfluencePayload::Step => InfluenceKind::Step,
            InfluencePayload::PickPacket => InfluenceKind::PickPacket,
            InfluencePayload::PutPacket => InfluenceKind::PutPacket,
            InfluencePayload::PickGeneratorPacket => InfluenceKind::PickGeneratorPacket,
            InfluencePayload::StealPacket => InfluenceKind::StealPacket,
            InfluencePayload::ConveyPacket => InfluenceKind::ConveyPacket,
            InfluencePayload::PutFlag { .. } => InfluenceKind::PutFlag,
            InfluencePayload::PutCrumb { .. } => InfluenceKind::PutCrumb,
            InfluencePayload::PickCrumb { .. } => InfluenceKind::PickCrumb,
            InfluencePayload::PutPheromone { .. } => InfluenceKind::PutPheromone,
            InfluencePayload::PutDirectedPheromone { .. } => InfluenceKind::PutDirectedPheromone,
            InfluencePayload::RemovePheromone => InfluenceKind::RemovePheromone,
            InfluencePayload::Energy { .. } => InfluenceKind::Energy,
            InfluencePayload::GeneratePacket => InfluenceKind::GeneratePacket,
            InfluencePayload::PopGeneratorPacket => InfluenceKind::PopGeneratorPacket,
            InfluencePayload::Skip => InfluenceKind::Skip,
            InfluencePayload::Nop => InfluenceKind::Nop,
        }
    }
}

/// A proposed state change submitted by one active item for one cycle.
///
/// `origin` is where the proposing item stood when it proposed; `target`
/// is the affected cell. Idle influences use the origin for both.
///
/// # Examples
///
/// ```
/// use influx_core::{ActiveItemId, Coordinate, Influence, InfluenceKind};
///
/// let inf = Influence::step(ActiveItemId::agent(1), Coordinate::new(5, 5), Coordinate::new(5, 6));
/// assert_eq!(inf.kind(), InfluenceKind::Step);
/// assert_eq!(inf.origin.chebyshev(inf.target), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Influence {
    /// The proposing active item.
    pub source: ActiveItemId,
    /// Position of the proposer when the influence was created.
    pub origin: Coordinate,
    /// The affected cell.
    pub target: Coordinate,
    /// Kind-specific data.
    pub payload: InfluencePayload,
}

impl Influence {
    /// Construct an influence.
    pub fn new(
        source: ActiveItemId,
        origin: Coordinate,
        target: Coordinate,
        payload: InfluencePayload,
    ) -> Self {
        Self {
            source,
            origin,
            target,
            payload,
        }
    }

    /// A step from `origin` to `target`.
    pub fn step(source: ActiveItemId, origin: Coordinate, target: Coordinate) -> Self {
        Self::new(source, origin, target, InfluencePayload::Step)
    }

    /// A skip at `origin`.
    pub fn skip(source: ActiveItemId, origin: Coordinate) -> Self {
        Self::new(source, origin, origin, InfluencePayload::Skip)
    }

    /// A no-op at `origin` for an item that cannot afford to act.
    pub fn nop(source: ActiveItemId, origin: Coordinate) -> Self {
        Self::new(source, origin, origin, InfluencePayload::Nop)
    }

    /// The kind tag.
    pub fn kind(&self) -> InfluenceKind {
        self.payload.kind()
    }

    /// Key giving the kernel's total application order.
    pub fn order_key(&self) -> (u8, u32) {
        (self.source.class.rank(), self.source.id)
    }
}

impl fmt::Display for Influence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} {} -> {}",
            self.kind(),
            self.source,
            self.origin,
            self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PriorityClass;

    #[test]
    fn all_kinds_listed_once() {
        let mut kinds = InfluenceKind::ALL.to_vec();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), InfluenceKind::ALL.len());
    }

    #[test]
    fn payload_kind_matches_constructor() {
        let id = ActiveItemId::agent(3);
        let at = Coordinate::new(1, 1);
        assert_eq!(Influence::skip(id, at).kind(), InfluenceKind::Skip);
        assert_eq!(Influence::nop(id, at).kind(), InfluenceKind::Nop);
        let flag = Influence::new(id, at, at, InfluencePayload::PutFlag { color: Color::Red });
        assert_eq!(flag.kind(), InfluenceKind::PutFlag);
    }

    #[test]
    fn order_key_sorts_by_class_then_id() {
        let at = Coordinate::new(0, 0);
        let mut batch = [
            Influence::skip(ActiveItemId::new(2, PriorityClass::Agent), at),
            Influence::skip(ActiveItemId::new(9, PriorityClass::EnergyStation), at),
            Influence::skip(ActiveItemId::new(1, PriorityClass::Agent), at),
        ];
        batch.sort_by_key(Influence::order_key);
        let ids: Vec<u32> = batch.iter().map(|i| i.source.id).collect();
        assert_eq!(ids, vec![9, 1, 2]);
    }
}
