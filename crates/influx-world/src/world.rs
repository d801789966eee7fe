//! The [`World`] aggregate: every layer plus the active-item index.

use indexmap::IndexMap;
use influx_core::{ActiveItemId, Coordinate, LayerKind, Representable, Representation};
use smallvec::SmallVec;
use tracing::trace;

use crate::bounds::GridBounds;
use crate::collision;
use crate::error::WorldError;
use crate::gradient;
use crate::item::{
    AgentBody, Conveyor, Crumb, Destination, EnergyStation, Flag, Generator, Gradient, Packet,
    Pheromone, PlacedItem, Wall,
};
use crate::layer::Layer;

/// Every layer of the simulated grid.
///
/// Placement enforces three invariants: cells lie inside the bounds, no
/// layer holds two items at one cell, and cross-layer sharing follows
/// [`collision::may_share`]. Active items are indexed by id so the kernel
/// can find them in constant time; only agents ever move.
///
/// # Examples
///
/// ```
/// use influx_core::{Color, Coordinate, LayerKind};
/// use influx_world::{AgentBody, Packet, PlacedItem, Wall, World};
///
/// let mut world = World::new(8, 8).unwrap();
/// world.place(Coordinate::new(2, 2), PlacedItem::Wall(Wall { see_through: false })).unwrap();
/// world.place(Coordinate::new(3, 2), PlacedItem::Packet(Packet { color: Color::Red })).unwrap();
/// world.place(Coordinate::new(3, 3), PlacedItem::Agent(AgentBody::new(1, "a", 2, 1000))).unwrap();
///
/// assert!(!world.may_stand(LayerKind::Agent, Coordinate::new(2, 2)));
/// assert!(world.may_stand(LayerKind::Agent, Coordinate::new(4, 4)));
/// assert_eq!(world.packets_remaining(), 1);
/// ```
#[derive(Debug)]
pub struct World {
    bounds: GridBounds,
    agents: Layer<AgentBody>,
    packets: Layer<Packet>,
    destinations: Layer<Destination>,
    walls: Layer<Wall>,
    stations: Layer<EnergyStation>,
    generators: Layer<Generator>,
    conveyors: Layer<Conveyor>,
    flags: Layer<Flag>,
    crumbs: Layer<Crumb>,
    pheromones: Layer<Pheromone>,
    gradients: Layer<Gradient>,
    index: IndexMap<ActiveItemId, Coordinate>,
}

impl World {
    /// An empty world of `width` by `height` cells.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        Ok(Self {
            bounds: GridBounds::new(width, height)?,
            agents: Layer::new(LayerKind::Agent),
            packets: Layer::new(LayerKind::Packet),
            destinations: Layer::new(LayerKind::Destination),
            walls: Layer::new(LayerKind::Wall),
            stations: Layer::new(LayerKind::EnergyStation),
            generators: Layer::new(LayerKind::Generator),
            conveyors: Layer::new(LayerKind::Conveyor),
            flags: Layer::new(LayerKind::Flag),
            crumbs: Layer::new(LayerKind::Crumb),
            pheromones: Layer::new(LayerKind::Pheromone),
            gradients: Layer::new(LayerKind::Gradient),
            index: IndexMap::new(),
        })
    }

    /// Grid bounds.
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    // ── Placement ──────────────────────────────────────────────────

    /// Place an item, enforcing bounds, id uniqueness and the collision table.
    ///
    /// Crumbs placed on an existing pile merge into it.
    pub fn place(&mut self, at: Coordinate, item: PlacedItem) -> Result<(), WorldError> {
        self.bounds.check(at)?;
        let incoming = item.layer();
        if let Some(id) = item.active_id() {
            if self.index.keys().any(|k| k.id == id.id) {
                return Err(WorldError::DuplicateActiveItem { id });
            }
        }
        for occupant in self.occupants(at) {
            if occupant == incoming && incoming != LayerKind::Crumb {
                return Err(WorldError::Occupied {
                    layer: incoming,
                    coord: at,
                });
            }
            if !collision::may_share(incoming, occupant) {
                return Err(WorldError::Collision {
                    incoming,
                    occupant,
                    coord: at,
                });
            }
        }
        if let Some(id) = item.active_id() {
            self.index.insert(id, at);
        }
        trace!(layer = %incoming, at = %at, "placed item");
        match item {
            PlacedItem::Agent(a) => self.agents.insert(at, a),
            PlacedItem::Packet(p) => self.packets.insert(at, p),
            PlacedItem::Destination(d) => self.destinations.insert(at, d),
            PlacedItem::Wall(w) => self.walls.insert(at, w),
            PlacedItem::EnergyStation(s) => self.stations.insert(at, s),
            PlacedItem::Generator(g) => self.generators.insert(at, g),
            PlacedItem::Conveyor(c) => self.conveyors.insert(at, c),
            PlacedItem::Flag(f) => self.flags.insert(at, f),
            PlacedItem::Crumb(c) => {
                self.add_crumbs(at, c.count);
                Ok(())
            }
            PlacedItem::Pheromone(p) => self.pheromones.insert(at, p),
            PlacedItem::Gradient(g) => self.gradients.insert(at, g),
        }
    }

    /// Layers with an item at `at`, bottom first.
    pub fn occupants(&self, at: Coordinate) -> SmallVec<[LayerKind; 4]> {
        LayerKind::ALL
            .into_iter()
            .filter(|l| self.layer_contains(*l, at))
            .collect()
    }

    fn layer_contains(&self, layer: LayerKind, at: Coordinate) -> bool {
        match layer {
            LayerKind::Agent => self.agents.contains(at),
            LayerKind::Packet => self.packets.contains(at),
            LayerKind::Destination => self.destinations.contains(at),
            LayerKind::Wall => self.walls.contains(at),
            LayerKind::EnergyStation => self.stations.contains(at),
            LayerKind::Generator => self.generators.contains(at),
            LayerKind::Conveyor => self.conveyors.contains(at),
            LayerKind::Flag => self.flags.contains(at),
            LayerKind::Crumb => self.crumbs.contains(at),
            LayerKind::Pheromone => self.pheromones.contains(at),
            LayerKind::Gradient => self.gradients.contains(at),
        }
    }

    /// Whether a new item of `layer` could go to `at` right now.
    pub fn may_stand(&self, layer: LayerKind, at: Coordinate) -> bool {
        self.bounds.contains(at)
            && self
                .occupants(at)
                .into_iter()
                .all(|occ| collision::may_share(layer, occ))
    }

    /// Whether every item at `at` is walkable. Empty in-bounds cells are.
    pub fn walkable(&self, at: Coordinate) -> bool {
        self.bounds.contains(at) && self.occupants(at).into_iter().all(collision::walkable)
    }

    /// Whether `at` holds a wall that blocks sight.
    pub fn blocks_sight(&self, at: Coordinate) -> bool {
        self.walls.get(at).is_some_and(|w| !w.see_through)
    }

    /// Snapshots of every item at `at`, bottom layer first.
    pub fn cell(&self, at: Coordinate) -> SmallVec<[Representation; 4]> {
        let mut reps = SmallVec::new();
        for layer in LayerKind::ALL {
            let rep = match layer {
                LayerKind::Agent => self.agents.get(at).map(Representable::representation),
                LayerKind::Packet => self.packets.get(at).map(Representable::representation),
                LayerKind::Destination => {
                    self.destinations.get(at).map(Representable::representation)
                }
                LayerKind::Wall => self.walls.get(at).map(Representable::representation),
                LayerKind::EnergyStation => {
                    self.stations.get(at).map(Representable::representation)
                }
                LayerKind::Generator => self.generators.get(at).map(Representable::representation),
                LayerKind::Conveyor => self.conveyors.get(at).map(Representable::representation),
                LayerKind::Flag => self.flags.get(at).map(Representable::representation),
                LayerKind::Crumb => self.crumbs.get(at).map(Representable::representation),
                LayerKind::Pheromone => self.pheromones.get(at).map(Representable::representation),
                LayerKind::Gradient => self.gradients.get(at).map(Representable::representation),
            };
            if let Some(rep) = rep {
                reps.push(rep);
            }
        }
        reps
    }

    // ── Active items ───────────────────────────────────────────────

    /// Where an active item is.
    pub fn locate(&self, id: ActiveItemId) -> Option<Coordinate> {
        self.index.get(&id).copied()
    }

    /// Every active item id in `(class, id)` order.
    pub fn active_ids(&self) -> Vec<ActiveItemId> {
        let mut ids: Vec<ActiveItemId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered active items.
    pub fn active_count(&self) -> usize {
        self.index.len()
    }

    /// The agent with this id.
    pub fn agent(&self, id: ActiveItemId) -> Option<&AgentBody> {
        self.locate(id).and_then(|at| self.agents.get(at))
    }

    /// Mutable access to the agent with this id.
    ///
    /// Position changes must go through [`move_agent`](Self::move_agent).
    pub fn agent_mut(&mut self, id: ActiveItemId) -> Option<&mut AgentBody> {
        let at = self.locate(id)?;
        self.agents.get_mut(at)
    }

    /// Move an agent to `to`, keeping the index in sync.
    pub fn move_agent(&mut self, id: ActiveItemId, to: Coordinate) -> Result<(), WorldError> {
        self.bounds.check(to)?;
        let from = self
            .locate(id)
            .ok_or(WorldError::UnknownActiveItem { id })?;
        self.agents.relocate(from, to)?;
        self.index.insert(id, to);
        Ok(())
    }

    /// Mutable access to the generator at `at`.
    pub fn generator_mut(&mut self, at: Coordinate) -> Option<&mut Generator> {
        self.generators.get_mut(at)
    }

    // ── Read access to layers ──────────────────────────────────────

    /// The agent layer.
    pub fn agents(&self) -> &Layer<AgentBody> {
        &self.agents
    }
    /// The loose-packet layer.
    pub fn packets(&self) -> &Layer<Packet> {
        &self.packets
    }
    /// The destination layer.
    pub fn destinations(&self) -> &Layer<Destination> {
        &self.destinations
    }
    /// The wall layer.
    pub fn walls(&self) -> &Layer<Wall> {
        &self.walls
    }
    /// The energy-station layer.
    pub fn stations(&self) -> &Layer<EnergyStation> {
        &self.stations
    }
    /// The generator layer.
    pub fn generators(&self) -> &Layer<Generator> {
        &self.generators
    }
    /// The conveyor layer.
    pub fn conveyors(&self) -> &Layer<Conveyor> {
        &self.conveyors
    }
    /// The flag layer.
    pub fn flags(&self) -> &Layer<Flag> {
        &self.flags
    }
    /// The crumb layer.
    pub fn crumbs(&self) -> &Layer<Crumb> {
        &self.crumbs
    }
    /// The pheromone layer.
    pub fn pheromones(&self) -> &Layer<Pheromone> {
        &self.pheromones
    }
    /// The gradient layer.
    pub fn gradients(&self) -> &Layer<Gradient> {
        &self.gradients
    }

    // ── Passive-layer mutation ─────────────────────────────────────

    /// Mutable loose-packet layer.
    pub fn packets_mut(&mut self) -> &mut Layer<Packet> {
        &mut self.packets
    }
    /// Mutable destination layer.
    pub fn destinations_mut(&mut self) -> &mut Layer<Destination> {
        &mut self.destinations
    }
    /// Mutable flag layer.
    pub fn flags_mut(&mut self) -> &mut Layer<Flag> {
        &mut self.flags
    }
    /// Mutable pheromone layer.
    pub fn pheromones_mut(&mut self) -> &mut Layer<Pheromone> {
        &mut self.pheromones
    }
    /// Mutable gradient layer.
    pub fn gradients_mut(&mut self) -> &mut Layer<Gradient> {
        &mut self.gradients
    }

    /// Add `count` crumbs at `at`, merging into an existing pile.
    pub fn add_crumbs(&mut self, at: Coordinate, count: u32) {
        match self.crumbs.get_mut(at) {
            Some(pile) => pile.count = pile.count.saturating_add(count),
            None => {
                self.crumbs.replace(at, Crumb { count });
            }
        }
    }

    /// Remove `count` crumbs at `at`. The pile disappears when empty.
    pub fn take_crumbs(&mut self, at: Coordinate, count: u32) -> Result<(), WorldError> {
        let pile = self.crumbs.get_mut(at).ok_or(WorldError::Missing {
            layer: LayerKind::Crumb,
            coord: at,
        })?;
        pile.count = pile.count.saturating_sub(count);
        if pile.count == 0 {
            self.crumbs.remove(at);
        }
        Ok(())
    }

    // ── Per-cycle derived state ────────────────────────────────────

    /// Age every pheromone by one cycle. Returns how many expired.
    pub fn decay_pheromones(&mut self) -> usize {
        let before = self.pheromones.len();
        self.pheromones.retain(|_, p| !p.decay());
        before - self.pheromones.len()
    }

    /// Flood the gradient layer from every energy station.
    pub fn refresh_gradients(&mut self) {
        let sources: Vec<Coordinate> = self.stations.iter().map(|(c, _)| c).collect();
        for source in sources {
            gradient::flood(self, source);
        }
    }

    /// Loose packets plus packets held by agents.
    pub fn packets_remaining(&self) -> usize {
        self.packets.len() + self.agents.iter().filter(|(_, a)| a.carry.is_some()).count()
    }

    /// No packet remains and no generator will release another.
    pub fn is_drained(&self) -> bool {
        self.packets_remaining() == 0 && self.generators.iter().all(|(_, g)| g.exhausted())
    }

    /// Total packets delivered across all destinations.
    pub fn delivered_total(&self) -> u32 {
        self.destinations.iter().map(|(_, d)| d.delivered).sum()
    }

    /// One character per cell, rows separated by newlines.
    ///
    /// Each cell shows the glyph of its top-most layer.
    pub fn render(&self) -> String {
        let w = self.bounds.width() as usize;
        let mut out = String::with_capacity((w + 1) * self.bounds.height() as usize);
        for at in self.bounds.iter() {
            let top = self.occupants(at).last().copied();
            out.push(top.map_or(' ', collision::glyph));
            if at.x as usize == w - 1 {
                out.push('\n');
            }
        }
        out
    }
}

// Compile-time assertion: World can move to a worker thread and be shared
// read-only during the perception and action phases.
const _: () = {
    #[allow(dead_code)]
    fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send_sync::<World>();
    }
};
