//! Flags, crumbs and pheromones. All reach at most one cell.

use influx_core::{Influence, InfluencePayload, LayerKind};
use influx_world::World;

use super::agent_within;

/// Legal iff the target is within reach and a flag may stand there.
pub fn put_flag(influence: &Influence, world: &World) -> bool {
    agent_within(influence, world, 1).is_some()
        && world.may_stand(LayerKind::Flag, influence.target)
}

/// Legal iff the target is within reach, crumbs may go there and at least
/// one crumb is dropped.
pub fn put_crumb(influence: &Influence, world: &World) -> bool {
    let InfluencePayload::PutCrumb { count } = influence.payload else {
        return false;
    };
    count > 0
        && agent_within(influence, world, 1).is_some()
        && world.may_stand(LayerKind::Crumb, influence.target)
}

/// Legal iff the target is within reach and holds at least `count` crumbs.
pub fn pick_crumb(influence: &Influence, world: &World) -> bool {
    let InfluencePayload::PickCrumb { count } = influence.payload else {
        return false;
    };
    count > 0
        && agent_within(influence, world, 1).is_some()
        && world
            .crumbs()
            .get(influence.target)
            .is_some_and(|pile| pile.count >= count)
}

/// Legal iff the target is within reach and a pheromone may go there.
///
/// An existing pheromone does not block: it gets reinforced.
pub fn put_pheromone(influence: &Influence, world: &World) -> bool {
    agent_within(influence, world, 1).is_some()
        && world.may_stand(LayerKind::Pheromone, influence.target)
}

/// Legal iff a pheromone lies within reach.
pub fn remove_pheromone(influence: &Influence, world: &World) -> bool {
    agent_within(influence, world, 1).is_some() && world.pheromones().contains(influence.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laws::fixture::*;
    use influx_core::{Color, Coordinate};
    use influx_world::{Crumb, Flag, Pheromone, PlacedItem, Wall};

    #[test]
    fn flag_on_own_cell_and_neighbour() {
        let mut w = world_with_agent();
        let flag = InfluencePayload::PutFlag { color: Color::Black };
        assert!(put_flag(&inf((5, 5), flag.clone()), &w));
        assert!(put_flag(&inf((4, 6), flag.clone()), &w));
        assert!(!put_flag(&inf((3, 5), flag.clone()), &w));
        w.place(Coordinate::new(4, 6), PlacedItem::Flag(Flag { color: Color::Red }))
            .unwrap();
        assert!(!put_flag(&inf((4, 6), flag), &w));
    }

    #[test]
    fn crumbs_need_positive_count() {
        let w = world_with_agent();
        assert!(put_crumb(&inf((5, 6), InfluencePayload::PutCrumb { count: 2 }), &w));
        assert!(!put_crumb(&inf((5, 6), InfluencePayload::PutCrumb { count: 0 }), &w));
    }

    #[test]
    fn pick_crumb_needs_enough() {
        let mut w = world_with_agent();
        w.place(Coordinate::new(5, 6), PlacedItem::Crumb(Crumb { count: 2 }))
            .unwrap();
        assert!(pick_crumb(&inf((5, 6), InfluencePayload::PickCrumb { count: 2 }), &w));
        assert!(!pick_crumb(&inf((5, 6), InfluencePayload::PickCrumb { count: 3 }), &w));
    }

    #[test]
    fn pheromone_reinforce_allowed_wall_not() {
        let mut w = world_with_agent();
        w.place(Coordinate::new(5, 6), PlacedItem::Pheromone(Pheromone::new(5, None)))
            .unwrap();
        w.place(Coordinate::new(6, 6), PlacedItem::Wall(Wall { see_through: false }))
            .unwrap();
        let put = InfluencePayload::PutPheromone { lifetime: 0 };
        assert!(put_pheromone(&inf((5, 6), put.clone()), &w));
        assert!(!put_pheromone(&inf((6, 6), put), &w));
        assert!(remove_pheromone(&inf((5, 6), InfluencePayload::RemovePheromone), &w));
        assert!(!remove_pheromone(&inf((4, 4), InfluencePayload::RemovePheromone), &w));
    }
}
