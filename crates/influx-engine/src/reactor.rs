//! Validation and application of a cycle's influences.
//!
//! The reactor is the single writer of the world. It evaluates every
//! influence against the law registry in the total order of
//! [`Influence::order_key`], applies the legal ones immediately so later
//! influences are judged against the updated state, settles agent energy,
//! and publishes one [`ActionEvent`] per influence.

use influx_core::{
    ActionCode, ActionEvent, ActionPayload, ActiveItemId, Coordinate, CycleId, Event, Influence,
    InfluenceKind, InfluencePayload, LayerKind,
};
use influx_law::LawRegistry;
use influx_world::{AgentBody, Flag, Packet, Pheromone, PlacedItem, World, WorldError};
use tracing::trace;

use crate::bus::EventBus;
use crate::config::EnergyConfig;
use crate::energy;
use crate::error::CycleError;

/// Counts from one [`Reactor::apply`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Influences the laws accepted.
    pub applied: u32,
    /// Influences the laws rejected.
    pub rejected: u32,
    /// Packets delivered to destinations.
    pub delivered: u32,
}

/// Applies law-checked influences to the world.
#[derive(Debug)]
pub struct Reactor {
    laws: LawRegistry,
    energy: EnergyConfig,
}

impl Reactor {
    /// A reactor judging with `laws` and accounting with `energy`.
    pub fn new(laws: LawRegistry, energy: EnergyConfig) -> Self {
        Self { laws, energy }
    }

    /// The law registry.
    pub fn laws(&self) -> &LawRegistry {
        &self.laws
    }

    /// The energy settings.
    pub fn energy(&self) -> &EnergyConfig {
        &self.energy
    }

    /// Sort `influences` into application order and apply them one by one.
    ///
    /// A rejected influence leaves the world untouched and publishes
    /// `succeeded = false`. A legal influence whose effect cannot be carried
    /// out is fatal: the error is returned and the caller must stop
    /// running cycles.
    pub fn apply(
        &self,
        world: &mut World,
        cycle: CycleId,
        mut influences: Vec<Influence>,
        bus: &mut EventBus,
    ) -> Result<ApplyStats, CycleError> {
        influences.sort_by_key(Influence::order_key);
        let mut stats = ApplyStats::default();
        for influence in &influences {
            match self.apply_if_legal(world, cycle, influence, bus)? {
                Some(ActionCode::DeliverPacket) => {
                    stats.applied += 1;
                    stats.delivered += 1;
                }
                Some(_) => stats.applied += 1,
                None => stats.rejected += 1,
            }
        }
        Ok(stats)
    }

    /// Evaluate one influence against current state and apply it if its
    /// law accepts. Publishes the action event either way.
    ///
    /// Returns the published action code when applied, `None` when
    /// rejected.
    pub fn apply_if_legal(
        &self,
        world: &mut World,
        cycle: CycleId,
        influence: &Influence,
        bus: &mut EventBus,
    ) -> Result<Option<ActionCode>, CycleError> {
        let kind = influence.kind();
        let carrying = world.agent(influence.source).map(|a| a.carry.is_some());
        let legal = self.laws.evaluate(influence, world)?;
        let (code, payload) = if legal {
            self.effect(world, influence)
                .map_err(|source| CycleError::Inconsistent {
                    entity: influence.source,
                    kind,
                    source,
                })?
        } else {
            (ActionCode::for_kind(kind), ActionPayload::None)
        };
        if let Some(carrying) = carrying {
            self.settle(world, influence.source, kind, legal, carrying);
        }
        trace!(cycle = cycle.0, entity = %influence.source, kind = %kind, legal, "applied influence");
        bus.publish(Event::Action(ActionEvent {
            cycle,
            entity: influence.source,
            kind,
            code,
            from: influence.origin,
            to: influence.target,
            succeeded: legal,
            payload,
        }));
        Ok(legal.then_some(code))
    }

    /// Charge an agent for its influence. A rejection costs like a skip.
    fn settle(
        &self,
        world: &mut World,
        id: ActiveItemId,
        kind: InfluenceKind,
        legal: bool,
        carrying: bool,
    ) {
        if !self.energy.enabled {
            return;
        }
        let charged_kind = if legal { kind } else { InfluenceKind::Skip };
        let cost = energy::cost(charged_kind, carrying, &self.energy);
        if let Some(agent) = world.agent_mut(id) {
            agent.battery = energy::drain(agent.battery, cost);
        }
    }

    fn effect(
        &self,
        world: &mut World,
        influence: &Influence,
    ) -> Result<(ActionCode, ActionPayload), WorldError> {
        let source = influence.source;
        let target = influence.target;
        let code = ActionCode::for_kind(influence.kind());
        let payload = match &influence.payload {
            InfluencePayload::Step => {
                world.move_agent(source, target)?;
                ActionPayload::None
            }
            InfluencePayload::PickPacket => {
                let packet = world
                    .packets_mut()
                    .remove(target)
                    .ok_or(missing(LayerKind::Packet, target))?;
                hand(world, source)?.carry = Some(packet);
                ActionPayload::Packet {
                    color: packet.color,
                }
            }
            InfluencePayload::PutPacket => {
                let packet = hand(world, source)?
                    .carry
                    .take()
                    .ok_or(missing(LayerKind::Packet, influence.origin))?;
                if let Some(dest) = world.destinations_mut().get_mut(target) {
                    dest.delivered += 1;
                    let delivered = dest.delivered;
                    return Ok((
                        ActionCode::DeliverPacket,
                        ActionPayload::Delivery {
                            color: packet.color,
                            delivered,
                        },
                    ));
                }
                world.place(target, PlacedItem::Packet(packet))?;
                ActionPayload::Packet {
                    color: packet.color,
                }
            }
            InfluencePayload::PickGeneratorPacket => {
                let queue = world
                    .generators()
                    .get(target)
                    .map(|g| g.queue.clone())
                    .ok_or(missing(LayerKind::Generator, target))?;
                let color = queue
                    .pop()
                    .ok_or(missing(LayerKind::Packet, target))?;
                hand(world, source)?.carry = Some(Packet { color });
                ActionPayload::Packet { color }
            }
            InfluencePayload::StealPacket => {
                let victim = world
                    .agents()
                    .get(target)
                    .map(|a| a.id)
                    .ok_or(missing(LayerKind::Agent, target))?;
                let packet = hand(world, victim)?
                    .carry
                    .take()
                    .ok_or(missing(LayerKind::Packet, target))?;
                hand(world, source)?.carry = Some(packet);
                ActionPayload::Packet {
                    color: packet.color,
                }
            }
            InfluencePayload::ConveyPacket => {
                let from = world
                    .locate(source)
                    .ok_or(WorldError::UnknownActiveItem { id: source })?;
                let color = world
                    .packets()
                    .get(from)
                    .map(|p| p.color)
                    .ok_or(missing(LayerKind::Packet, from))?;
                world.packets_mut().relocate(from, target)?;
                ActionPayload::Packet { color }
            }
            InfluencePayload::PutFlag { color } => {
                world
                    .flags_mut()
                    .replace(target, Flag { color: *color });
                ActionPayload::Flag { color: *color }
            }
            InfluencePayload::PutCrumb { count } => {
                world.add_crumbs(target, *count);
                ActionPayload::Crumbs { count: *count }
            }
            InfluencePayload::PickCrumb { count } => {
                world.take_crumbs(target, *count)?;
                ActionPayload::Crumbs { count: *count }
            }
            InfluencePayload::PutPheromone { lifetime } => lay(world, target, *lifetime, None),
            InfluencePayload::PutDirectedPheromone { lifetime, toward } => {
                lay(world, target, *lifetime, Some(*toward))
            }
            InfluencePayload::RemovePheromone => {
                world
                    .pheromones_mut()
                    .remove(target)
                    .ok_or(missing(LayerKind::Pheromone, target))?;
                ActionPayload::None
            }
            InfluencePayload::Energy { load } => {
                let charged = match world.agents().get(target).map(|a| a.id) {
                    Some(id) if self.energy.enabled => {
                        let max = self.energy.battery_max;
                        let agent = hand(world, id)?;
                        agent.battery = energy::charge(agent.battery, *load, max);
                        Some(id)
                    }
                    _ => None,
                };
                ActionPayload::Energy {
                    load: *load,
                    charged,
                }
            }
            InfluencePayload::GeneratePacket => {
                let generator = world
                    .generator_mut(target)
                    .ok_or(missing(LayerKind::Generator, target))?;
                generator.remaining = generator.remaining.saturating_sub(1);
                generator.queue.push(generator.color);
                let (color, queue) = (generator.color, generator.queue.clone());
                if !world.packets().contains(target) {
                    if let Some(next) = queue.pop() {
                        world.place(target, PlacedItem::Packet(Packet { color: next }))?;
                    }
                }
                ActionPayload::Packet { color }
            }
            InfluencePayload::PopGeneratorPacket => {
                let queue = world
                    .generators()
                    .get(target)
                    .map(|g| g.queue.clone())
                    .ok_or(missing(LayerKind::Generator, target))?;
                let color = queue
                    .pop()
                    .ok_or(missing(LayerKind::Packet, target))?;
                world.place(target, PlacedItem::Packet(Packet { color }))?;
                ActionPayload::Packet { color }
            }
            InfluencePayload::Skip | InfluencePayload::Nop => ActionPayload::None,
        };
        Ok((code, payload))
    }
}

fn missing(layer: LayerKind, coord: Coordinate) -> WorldError {
    WorldError::Missing { layer, coord }
}

fn hand(world: &mut World, id: ActiveItemId) -> Result<&mut AgentBody, WorldError> {
    world
        .agent_mut(id)
        .ok_or(WorldError::UnknownActiveItem { id })
}

fn lay(
    world: &mut World,
    at: Coordinate,
    lifetime: u32,
    toward: Option<Coordinate>,
) -> ActionPayload {
    let layer = world.pheromones_mut();
    let lifetime = match layer.get_mut(at) {
        Some(existing) => {
            existing.reinforce(0);
            if toward.is_some() {
                existing.target = toward;
            }
            existing.lifetime
        }
        None => {
            let fresh = Pheromone::new(lifetime, toward);
            layer.replace(at, fresh);
            fresh.lifetime
        }
    };
    ActionPayload::Pheromone { lifetime }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::{Color, PriorityClass};
    use influx_world::item::PHEROMONE_DEFAULT_LIFETIME;
    use influx_world::{Destination, EnergyStation, Generator, GeneratorRate};

    const ME: ActiveItemId = ActiveItemId::agent(1);

    fn reactor() -> Reactor {
        Reactor::new(LawRegistry::standard(), EnergyConfig::default())
    }

    fn world() -> World {
        let mut w = World::new(10, 10).unwrap();
        w.place(Coordinate::new(5, 5), PlacedItem::Agent(AgentBody::new(1, "a", 2, 1000)))
            .unwrap();
        w
    }

    fn act(payload: InfluencePayload, to: (i32, i32)) -> Influence {
        Influence::new(ME, Coordinate::new(5, 5), Coordinate::new(to.0, to.1), payload)
    }

    fn run(w: &mut World, batch: Vec<Influence>) -> (ApplyStats, Vec<ActionEvent>) {
        let mut bus = EventBus::new();
        let stats = reactor().apply(w, CycleId(1), batch, &mut bus).unwrap();
        let events = bus
            .flush()
            .into_iter()
            .filter_map(|e| e.as_action().cloned())
            .collect();
        (stats, events)
    }

    #[test]
    fn delivery_counts_and_reports_deliver_code() {
        let mut w = world();
        w.place(
            Coordinate::new(5, 6),
            PlacedItem::Destination(Destination {
                color: Color::Red,
                delivered: 0,
            }),
        )
        .unwrap();
        w.agent_mut(ME).unwrap().carry = Some(Packet { color: Color::Red });
        let (stats, events) = run(&mut w, vec![act(InfluencePayload::PutPacket, (5, 6))]);
        assert_eq!(stats.delivered, 1);
        assert_eq!(events[0].code, ActionCode::DeliverPacket);
        assert!(events[0].succeeded);
        assert_eq!(w.destinations().get(Coordinate::new(5, 6)).unwrap().delivered, 1);
        assert_eq!(w.agent(ME).unwrap().carry, None);
        assert_eq!(w.packets_remaining(), 0);
    }

    #[test]
    fn rejected_influence_costs_idle_and_changes_nothing() {
        let mut w = world();
        let (stats, events) = run(&mut w, vec![act(InfluencePayload::PickPacket, (5, 6))]);
        assert_eq!(stats.rejected, 1);
        assert!(!events[0].succeeded);
        assert_eq!(events[0].code, ActionCode::PickPacket);
        assert_eq!(w.agent(ME).unwrap().battery, 995);
    }

    #[test]
    fn apply_if_legal_reports_code_or_none() {
        let mut w = world();
        let mut bus = EventBus::new();
        let r = reactor();
        let step = act(InfluencePayload::Step, (5, 4));
        assert_eq!(
            r.apply_if_legal(&mut w, CycleId(0), &step, &mut bus).unwrap(),
            Some(ActionCode::Step)
        );
        // Already standing on the target.
        assert_eq!(r.apply_if_legal(&mut w, CycleId(0), &step, &mut bus).unwrap(), None);
        assert_eq!(w.locate(ME), Some(Coordinate::new(5, 4)));
        assert_eq!(bus.flush().len(), 2);
    }

    #[test]
    fn step_costs_more_when_carrying() {
        let mut w = world();
        run(&mut w, vec![act(InfluencePayload::Step, (6, 5))]);
        assert_eq!(w.locate(ME), Some(Coordinate::new(6, 5)));
        assert_eq!(w.agent(ME).unwrap().battery, 990);
        w.agent_mut(ME).unwrap().carry = Some(Packet { color: Color::Red });
        let step = Influence::step(ME, Coordinate::new(6, 5), Coordinate::new(7, 5));
        run(&mut w, vec![step]);
        assert_eq!(w.agent(ME).unwrap().battery, 970);
    }

    #[test]
    fn stations_resolve_before_agents() {
        let mut w = world();
        let station = ActiveItemId::new(50, PriorityClass::EnergyStation);
        w.place(Coordinate::new(5, 6), PlacedItem::EnergyStation(EnergyStation { id: station }))
            .unwrap();
        w.agent_mut(ME).unwrap().battery = 500;
        let charge = Influence::new(
            station,
            Coordinate::new(5, 6),
            Coordinate::new(5, 5),
            InfluencePayload::Energy { load: 100 },
        );
        let (_, events) = run(&mut w, vec![act(InfluencePayload::Skip, (5, 5)), charge]);
        assert_eq!(events[0].entity, station);
        assert_eq!(
            events[0].payload,
            ActionPayload::Energy {
                load: 100,
                charged: Some(ME)
            }
        );
        assert_eq!(w.agent(ME).unwrap().battery, 595);
    }

    #[test]
    fn later_influence_sees_earlier_effect() {
        let mut w = world();
        w.place(Coordinate::new(7, 5), PlacedItem::Agent(AgentBody::new(2, "b", 2, 1000)))
            .unwrap();
        let first = act(InfluencePayload::Step, (6, 5));
        let second = Influence::step(ActiveItemId::agent(2), Coordinate::new(7, 5), Coordinate::new(6, 5));
        let (stats, events) = run(&mut w, vec![second, first]);
        assert_eq!((stats.applied, stats.rejected), (1, 1));
        assert_eq!(events[0].entity, ME);
        assert!(events[0].succeeded);
        assert!(!events[1].succeeded);
    }

    #[test]
    fn pheromone_is_laid_then_reinforced() {
        let mut w = world();
        let at = Coordinate::new(5, 6);
        run(&mut w, vec![act(InfluencePayload::PutPheromone { lifetime: 0 }, (5, 6))]);
        assert_eq!(w.pheromones().get(at).unwrap().lifetime, PHEROMONE_DEFAULT_LIFETIME);
        run(&mut w, vec![act(InfluencePayload::PutPheromone { lifetime: 0 }, (5, 6))]);
        assert_eq!(w.pheromones().get(at).unwrap().lifetime, PHEROMONE_DEFAULT_LIFETIME + 75);
    }

    #[test]
    fn generate_places_when_cell_free_and_buffers_otherwise() {
        let mut w = World::new(3, 3).unwrap();
        let id = ActiveItemId::new(7, PriorityClass::Generator);
        let at = Coordinate::new(1, 1);
        w.place(
            at,
            PlacedItem::Generator(Generator::new(id, Color::Blue, GeneratorRate::Fixed { every: 1 }, 2)),
        )
        .unwrap();
        let gen = Influence::new(id, at, at, InfluencePayload::GeneratePacket);
        run(&mut w, vec![gen.clone()]);
        assert!(w.packets().contains(at));
        run(&mut w, vec![gen.clone()]);
        let g = w.generators().get(at).unwrap();
        assert_eq!(g.queue.len(), 1);
        assert!(g.hit_threshold());
        let (stats, _) = run(&mut w, vec![gen]);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn steal_moves_carry() {
        let mut w = world();
        let victim = ActiveItemId::agent(2);
        w.place(Coordinate::new(6, 6), PlacedItem::Agent(AgentBody::new(2, "b", 2, 1000)))
            .unwrap();
        w.agent_mut(victim).unwrap().carry = Some(Packet { color: Color::Green });
        run(&mut w, vec![act(InfluencePayload::StealPacket, (6, 6))]);
        assert_eq!(w.agent(victim).unwrap().carry, None);
        assert_eq!(w.agent(ME).unwrap().carry, Some(Packet { color: Color::Green }));
    }

    mod legality {
        use crate::bus::EventBus;
        use crate::config::EnergyConfig;
        use crate::reactor::Reactor;
        use influx_core::{
            ActiveItemId, Color, Coordinate, CycleId, Direction, Influence, InfluenceKind,
            InfluencePayload, PriorityClass, Representation,
        };
        use influx_law::LawRegistry;
        use influx_world::{
            AgentBody, Conveyor, Crumb, Destination, EnergyStation, Generator, GeneratorRate,
            Packet, Pheromone, PlacedItem, Wall, World,
        };
        use proptest::prelude::*;

        const COLORS: [Color; 3] = [Color::Red, Color::Green, Color::Blue];
        const GENERATOR: ActiveItemId = ActiveItemId::new(20, PriorityClass::Generator);
        const STATION: ActiveItemId = ActiveItemId::new(21, PriorityClass::EnergyStation);
        const BELT: ActiveItemId = ActiveItemId::new(22, PriorityClass::Conveyor);
        const BELT_END: ActiveItemId = ActiveItemId::new(23, PriorityClass::Conveyor);
        const SOURCES: [ActiveItemId; 7] = [
            ActiveItemId::agent(1),
            ActiveItemId::agent(2),
            ActiveItemId::agent(3),
            GENERATOR,
            STATION,
            BELT,
            BELT_END,
        ];

        #[derive(Clone, Debug)]
        struct Layout {
            agents: Vec<((i32, i32), Option<usize>)>,
            packets: Vec<((i32, i32), usize)>,
            crumbs: Vec<((i32, i32), u32)>,
            pheromones: Vec<(i32, i32)>,
            budget: u32,
            buffered: usize,
        }

        fn cell() -> impl Strategy<Value = (i32, i32)> {
            (0..6i32, 0..6i32)
        }

        fn layout() -> impl Strategy<Value = Layout> {
            (
                prop::collection::vec((cell(), prop::option::of(0..3usize)), 3),
                prop::collection::vec((cell(), 0..3usize), 0..6),
                prop::collection::vec((cell(), 1..4u32), 0..4),
                prop::collection::vec(cell(), 0..3),
                0..3u32,
                0..3usize,
            )
                .prop_map(|(agents, packets, crumbs, pheromones, budget, buffered)| Layout {
                    agents,
                    packets,
                    crumbs,
                    pheromones,
                    budget,
                    buffered,
                })
        }

        fn payload() -> impl Strategy<Value = InfluencePayload> {
            prop_oneof![
                Just(InfluencePayload::Step),
                Just(InfluencePayload::PickPacket),
                Just(InfluencePayload::PutPacket),
                Just(InfluencePayload::PickGeneratorPacket),
                Just(InfluencePayload::StealPacket),
                Just(InfluencePayload::ConveyPacket),
                (0..3usize).prop_map(|c| InfluencePayload::PutFlag { color: COLORS[c] }),
                (0..4u32).prop_map(|count| InfluencePayload::PutCrumb { count }),
                (0..4u32).prop_map(|count| InfluencePayload::PickCrumb { count }),
                (0..3u32).prop_map(|lifetime| InfluencePayload::PutPheromone { lifetime }),
                cell().prop_map(|(x, y)| InfluencePayload::PutDirectedPheromone {
                    lifetime: 0,
                    toward: Coordinate::new(x, y),
                }),
                Just(InfluencePayload::RemovePheromone),
                (0..150u32).prop_map(|load| InfluencePayload::Energy { load }),
                Just(InfluencePayload::GeneratePacket),
                Just(InfluencePayload::PopGeneratorPacket),
                Just(InfluencePayload::Skip),
                Just(InfluencePayload::Nop),
            ]
        }

        /// Fixed furniture plus the generated items. Items that collide
        /// with earlier ones are left out.
        fn build(layout: &Layout) -> World {
            let mut w = World::new(6, 6).unwrap();
            let generator = Generator::new(
                GENERATOR,
                Color::Red,
                GeneratorRate::Fixed { every: 1 },
                layout.budget,
            );
            for _ in 0..layout.buffered {
                generator.queue.push(Color::Red);
            }
            let furniture = [
                ((0, 0), PlacedItem::Generator(generator)),
                ((5, 5), PlacedItem::EnergyStation(EnergyStation { id: STATION })),
                (
                    (2, 0),
                    PlacedItem::Conveyor(Conveyor {
                        id: BELT,
                        direction: Direction::East,
                    }),
                ),
                (
                    (3, 0),
                    PlacedItem::Conveyor(Conveyor {
                        id: BELT_END,
                        direction: Direction::East,
                    }),
                ),
                (
                    (5, 0),
                    PlacedItem::Destination(Destination {
                        color: Color::Red,
                        delivered: 0,
                    }),
                ),
                ((0, 5), PlacedItem::Wall(Wall { see_through: false })),
            ];
            for ((x, y), item) in furniture {
                w.place(Coordinate::new(x, y), item).unwrap();
            }
            for (i, &((x, y), carry)) in layout.agents.iter().enumerate() {
                let mut body = AgentBody::new(i as u32 + 1, format!("a{i}"), 2, 500);
                body.carry = carry.map(|c| Packet { color: COLORS[c] });
                let _ = w.place(Coordinate::new(x, y), PlacedItem::Agent(body));
            }
            for &((x, y), c) in &layout.packets {
                let packet = Packet { color: COLORS[c] };
                let _ = w.place(Coordinate::new(x, y), PlacedItem::Packet(packet));
            }
            for &((x, y), count) in &layout.crumbs {
                let _ = w.place(Coordinate::new(x, y), PlacedItem::Crumb(Crumb { count }));
            }
            for &(x, y) in &layout.pheromones {
                let pheromone = Pheromone::new(0, None);
                let _ = w.place(Coordinate::new(x, y), PlacedItem::Pheromone(pheromone));
            }
            w
        }

        /// Every item on the grid, with agent batteries masked: a rejected
        /// agent influence still pays the idle cost.
        fn state(w: &World) -> Vec<(Coordinate, Vec<Representation>)> {
            w.bounds()
                .iter()
                .map(|at| {
                    let reps = w
                        .cell(at)
                        .into_iter()
                        .map(|rep| match rep {
                            Representation::Agent {
                                id,
                                name,
                                carry,
                                color_restriction,
                                ..
                            } => Representation::Agent {
                                id,
                                name,
                                carry,
                                battery: 0,
                                color_restriction,
                            },
                            other => other,
                        })
                        .collect();
                    (at, reps)
                })
                .collect()
        }

        /// Kinds whose effect always shows up in [`state`] when applied.
        fn always_visible(kind: InfluenceKind) -> bool {
            !matches!(
                kind,
                InfluenceKind::PutPheromone
                    | InfluenceKind::PutDirectedPheromone
                    | InfluenceKind::Energy
                    | InfluenceKind::Skip
                    | InfluenceKind::Nop
            )
        }

        proptest! {
            #[test]
            fn state_changes_exactly_when_the_law_accepts(
                layout in layout(),
                source in 0..SOURCES.len(),
                (tx, ty) in (-1..7i32, -1..7i32),
                payload in payload(),
            ) {
                let mut w = build(&layout);
                let reactor = Reactor::new(LawRegistry::standard(), EnergyConfig::default());
                let source = SOURCES[source];
                let target = Coordinate::new(tx, ty);
                let origin = w.locate(source).unwrap_or(target);
                let influence = Influence::new(source, origin, target, payload);
                let kind = influence.kind();

                let legal = reactor.laws().evaluate(&influence, &w).unwrap();
                let before = state(&w);
                let mut bus = EventBus::new();
                let applied = reactor
                    .apply_if_legal(&mut w, CycleId(0), &influence, &mut bus)
                    .unwrap();

                prop_assert_eq!(applied.is_some(), legal);
                if !legal {
                    prop_assert_eq!(state(&w), before);
                } else if always_visible(kind) {
                    prop_assert_ne!(state(&w), before);
                }
                prop_assert_eq!(bus.flush().len(), 1);
            }
        }
    }
}
