//! Fixed decision policies for the non-agent active items.

use influx_core::{ActiveItemId, Coordinate, Direction, Influence, InfluencePayload, LayerKind};
use influx_obs::Perception;
use influx_world::{EnergyStation, Generator, GeneratorRate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// An energy station charges the cell north of it every cycle.
pub fn station(id: ActiveItemId, at: Coordinate, load: u32) -> Influence {
    Influence::new(
        id,
        at,
        EnergyStation::charge_cell(at),
        InfluencePayload::Energy { load },
    )
}

/// A conveyor moves the packet on it one cell along its direction when
/// the next belt is free, and skips otherwise.
///
/// Judged from the conveyor's own perception.
pub fn conveyor(
    id: ActiveItemId,
    at: Coordinate,
    direction: Direction,
    perception: &Perception,
) -> Influence {
    let next = at.step(direction);
    let holds = |c: Coordinate, layer: LayerKind| {
        perception
            .cell(c)
            .is_some_and(|v| v.get(layer).is_some())
    };
    if holds(at, LayerKind::Packet)
        && holds(next, LayerKind::Conveyor)
        && !holds(next, LayerKind::Packet)
    {
        Influence::new(id, at, next, InfluencePayload::ConveyPacket)
    } else {
        Influence::skip(id, at)
    }
}

/// Production schedule state of one generator.
///
/// Random schedules draw from a ChaCha8 stream seeded from the world seed
/// and the generator's id, so runs with the same seed replay exactly.
#[derive(Clone, Debug)]
pub struct GeneratorPolicy {
    rng: ChaCha8Rng,
    decisions: u64,
}

impl GeneratorPolicy {
    /// A fresh schedule for generator `id`.
    pub fn new(seed: u64, id: ActiveItemId) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(u64::from(id.id))),
            decisions: 0,
        }
    }

    /// Decisions taken so far.
    pub fn decisions(&self) -> u64 {
        self.decisions
    }

    /// Whether the schedule says to produce on this decision.
    fn due(&mut self, rate: GeneratorRate) -> bool {
        let n = self.decisions;
        self.decisions += 1;
        match rate {
            GeneratorRate::Fixed { every } => every > 0 && n % u64::from(every) == 0,
            GeneratorRate::Random { chance } => self.rng.random::<f64>() < chance,
        }
    }

    /// Produce when due and under threshold, else release a buffered
    /// packet, else skip.
    pub fn decide(&mut self, at: Coordinate, generator: &Generator) -> Influence {
        let id = generator.id;
        if self.due(generator.rate) && !generator.hit_threshold() {
            Influence::new(id, at, at, InfluencePayload::GeneratePacket)
        } else if !generator.queue.is_empty() {
            Influence::new(id, at, at, InfluencePayload::PopGeneratorPacket)
        } else {
            Influence::skip(id, at)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::{Color, InfluenceKind, PriorityClass};
    use influx_world::{Conveyor, Packet, PlacedItem, World};

    const GEN: ActiveItemId = ActiveItemId::new(5, PriorityClass::Generator);
    const AT: Coordinate = Coordinate::new(1, 1);

    #[test]
    fn station_targets_north_cell() {
        let id = ActiveItemId::new(1, PriorityClass::EnergyStation);
        let inf = station(id, Coordinate::new(3, 3), 100);
        assert_eq!(inf.target, Coordinate::new(3, 2));
        assert_eq!(inf.payload, InfluencePayload::Energy { load: 100 });
    }

    #[test]
    fn fixed_rate_produces_on_first_and_every_nth() {
        let g = Generator::new(GEN, Color::Red, GeneratorRate::Fixed { every: 3 }, 10);
        let mut p = GeneratorPolicy::new(0, GEN);
        let kinds: Vec<_> = (0..6).map(|_| p.decide(AT, &g).kind()).collect();
        assert_eq!(
            kinds,
            vec![
                InfluenceKind::GeneratePacket,
                InfluenceKind::Skip,
                InfluenceKind::Skip,
                InfluenceKind::GeneratePacket,
                InfluenceKind::Skip,
                InfluenceKind::Skip,
            ]
        );
    }

    #[test]
    fn exhausted_generator_releases_buffer_then_skips() {
        let g = Generator::new(GEN, Color::Red, GeneratorRate::Fixed { every: 1 }, 0);
        g.queue.push(Color::Red);
        let mut p = GeneratorPolicy::new(0, GEN);
        assert_eq!(p.decide(AT, &g).kind(), InfluenceKind::PopGeneratorPacket);
        g.queue.pop();
        assert_eq!(p.decide(AT, &g).kind(), InfluenceKind::Skip);
    }

    #[test]
    fn random_rate_replays_with_same_seed() {
        let g = Generator::new(GEN, Color::Red, GeneratorRate::Random { chance: 0.5 }, 1000);
        let run = |seed| {
            let mut p = GeneratorPolicy::new(seed, GEN);
            (0..64).map(|_| p.decide(AT, &g).kind()).collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
        let produced = run(42)
            .into_iter()
            .filter(|k| *k == InfluenceKind::GeneratePacket)
            .count();
        assert!(produced > 0 && produced < 64);
    }

    #[test]
    fn conveyor_moves_only_onto_free_belt() {
        let mut w = World::new(3, 1).unwrap();
        for x in 0..2 {
            w.place(
                Coordinate::new(x, 0),
                PlacedItem::Conveyor(Conveyor {
                    id: ActiveItemId::new(10 + x as u32, PriorityClass::Conveyor),
                    direction: Direction::East,
                }),
            )
            .unwrap();
        }
        let id = ActiveItemId::new(10, PriorityClass::Conveyor);
        let at = Coordinate::new(0, 0);
        let look = |w: &World| Perception::capture(w, id, at, 1);

        assert_eq!(conveyor(id, at, Direction::East, &look(&w)).kind(), InfluenceKind::Skip);
        w.place(at, PlacedItem::Packet(Packet { color: Color::Red })).unwrap();
        assert_eq!(
            conveyor(id, at, Direction::East, &look(&w)).kind(),
            InfluenceKind::ConveyPacket
        );
        w.place(Coordinate::new(1, 0), PlacedItem::Packet(Packet { color: Color::Red }))
            .unwrap();
        assert_eq!(conveyor(id, at, Direction::East, &look(&w)).kind(), InfluenceKind::Skip);
    }
}
