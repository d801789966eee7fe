//! Packet generation and release.

use influx_core::Influence;
use influx_world::World;

/// Legal iff the proposer is a generator standing on the target with
/// production budget left.
pub fn generate(influence: &Influence, world: &World) -> bool {
    own_cell(influence, world)
        && world
            .generators()
            .get(influence.target)
            .is_some_and(|g| !g.hit_threshold())
}

/// Legal iff the proposer is a generator standing on the target, its buffer
/// is non-empty and no packet lies on its cell.
pub fn pop(influence: &Influence, world: &World) -> bool {
    own_cell(influence, world)
        && !world.packets().contains(influence.target)
        && world
            .generators()
            .get(influence.target)
            .is_some_and(|g| !g.queue.is_empty())
}

fn own_cell(influence: &Influence, world: &World) -> bool {
    world.locate(influence.source) == Some(influence.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::{ActiveItemId, Color, Coordinate, InfluencePayload, PriorityClass};
    use influx_world::{Generator, GeneratorRate, Packet, PlacedItem};

    const GEN: ActiveItemId = ActiveItemId::new(4, PriorityClass::Generator);
    const AT: Coordinate = Coordinate::new(1, 1);

    fn world(threshold: u32) -> World {
        let mut w = World::new(3, 3).unwrap();
        w.place(
            AT,
            PlacedItem::Generator(Generator::new(
                GEN,
                Color::Red,
                GeneratorRate::Fixed { every: 2 },
                threshold,
            )),
        )
        .unwrap();
        w
    }

    #[test]
    fn generate_until_threshold() {
        let w = world(1);
        let i = Influence::new(GEN, AT, AT, InfluencePayload::GeneratePacket);
        assert!(generate(&i, &w));
        let w = world(0);
        assert!(!generate(&i, &w));
    }

    #[test]
    fn pop_needs_buffer_and_free_cell() {
        let mut w = world(3);
        let i = Influence::new(GEN, AT, AT, InfluencePayload::PopGeneratorPacket);
        assert!(!pop(&i, &w));
        w.generators().get(AT).unwrap().queue.push(Color::Red);
        assert!(pop(&i, &w));
        w.packets_mut().insert(AT, Packet { color: Color::Red }).unwrap();
        assert!(!pop(&i, &w));
    }

    #[test]
    fn other_cell_rejected() {
        let w = world(3);
        let i = Influence::new(GEN, AT, Coordinate::new(0, 0), InfluencePayload::GeneratePacket);
        assert!(!generate(&i, &w));
    }
}
