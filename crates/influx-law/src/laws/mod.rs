//! The standard law library, one predicate per influence kind.
//!
//! Every predicate re-reads the proposer's position from the world rather
//! than trusting [`Influence::origin`], so an influence proposed against a
//! stale perception is judged against the state it would actually change.

use influx_core::{Coordinate, Influence, InfluenceKind};
use influx_world::{AgentBody, World};

use crate::law::FnLaw;

pub mod energy;
pub mod generator;
pub mod idle;
pub mod marker;
pub mod movement;
pub mod packet;

/// The built-in law for every kind in [`InfluenceKind::ALL`].
pub fn standard() -> [FnLaw; 17] {
    [
        FnLaw::new("step", InfluenceKind::Step, movement::step),
        FnLaw::new("pick_packet", InfluenceKind::PickPacket, packet::pick),
        FnLaw::new("put_packet", InfluenceKind::PutPacket, packet::put),
        FnLaw::new(
            "pick_generator_packet",
            InfluenceKind::PickGeneratorPacket,
            packet::pick_from_generator,
        ),
        FnLaw::new("steal_packet", InfluenceKind::StealPacket, packet::steal),
        FnLaw::new("convey_packet", InfluenceKind::ConveyPacket, packet::convey),
        FnLaw::new("put_flag", InfluenceKind::PutFlag, marker::put_flag),
        FnLaw::new("put_crumb", InfluenceKind::PutCrumb, marker::put_crumb),
        FnLaw::new("pick_crumb", InfluenceKind::PickCrumb, marker::pick_crumb),
        FnLaw::new("put_pheromone", InfluenceKind::PutPheromone, marker::put_pheromone),
        FnLaw::new(
            "put_directed_pheromone",
            InfluenceKind::PutDirectedPheromone,
            marker::put_pheromone,
        ),
        FnLaw::new(
            "remove_pheromone",
            InfluenceKind::RemovePheromone,
            marker::remove_pheromone,
        ),
        FnLaw::new("energy", InfluenceKind::Energy, energy::charge),
        FnLaw::new("generate_packet", InfluenceKind::GeneratePacket, generator::generate),
        FnLaw::new(
            "pop_generator_packet",
            InfluenceKind::PopGeneratorPacket,
            generator::pop,
        ),
        FnLaw::new("skip", InfluenceKind::Skip, idle::always),
        FnLaw::new("nop", InfluenceKind::Nop, idle::always),
    ]
}

/// The proposing agent and where it currently stands.
pub(crate) fn acting_agent<'w>(
    influence: &Influence,
    world: &'w World,
) -> Option<(Coordinate, &'w AgentBody)> {
    let at = world.locate(influence.source)?;
    world.agent(influence.source).map(|a| (at, a))
}

/// The proposing agent, if it stands within `reach` of the target.
pub(crate) fn agent_within<'w>(
    influence: &Influence,
    world: &'w World,
    reach: u32,
) -> Option<(Coordinate, &'w AgentBody)> {
    acting_agent(influence, world)
        .filter(|(at, _)| at.chebyshev(influence.target) <= reach)
        .filter(|_| world.bounds().contains(influence.target))
}

#[cfg(test)]
pub(crate) mod fixture {
    use influx_core::{ActiveItemId, Color, Coordinate, Influence, InfluencePayload};
    use influx_world::{AgentBody, Packet, PlacedItem, World};

    pub const ME: ActiveItemId = ActiveItemId::agent(1);

    /// A 10x10 world with agent 1 at (5, 5).
    pub fn world_with_agent() -> World {
        let mut w = World::new(10, 10).unwrap();
        w.place(
            Coordinate::new(5, 5),
            PlacedItem::Agent(AgentBody::new(1, "me", 3, 1000)),
        )
        .unwrap();
        w
    }

    pub fn give(w: &mut World, id: ActiveItemId, color: Color) {
        w.agent_mut(id).unwrap().carry = Some(Packet { color });
    }

    pub fn inf(target: (i32, i32), payload: InfluencePayload) -> Influence {
        Influence::new(ME, Coordinate::new(5, 5), Coordinate::new(target.0, target.1), payload)
    }
}
