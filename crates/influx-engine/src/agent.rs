//! The agent-facing contract: what a behavior can see and do.

use indexmap::IndexMap;
use influx_core::{
    ActiveItemId, Color, Coordinate, CycleId, Influence, InfluencePayload,
};
use influx_obs::Perception;
use influx_world::AgentBody;

use crate::outcome::Mail;

/// Most fragments an agent may remember at once.
pub const MEMORY_CAPACITY: usize = 10;

/// The phase an active item is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Taking in the perception.
    Perceive,
    /// Exchanging mail.
    Talk,
    /// Proposing an influence.
    Act,
}

/// An agent's private key/value memory, bounded to [`MEMORY_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory {
    fragments: IndexMap<String, String>,
}

impl Memory {
    /// An empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`. Overwriting always succeeds; a new key is
    /// refused when memory is full.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if !self.fragments.contains_key(&key) && self.fragments.len() >= MEMORY_CAPACITY {
            return false;
        }
        self.fragments.insert(key, value.into());
        true
    }

    /// The value under `key`.
    pub fn recall(&self, key: &str) -> Option<&str> {
        self.fragments.get(key).map(String::as_str)
    }

    /// Remove `key`, returning its value.
    pub fn forget(&mut self, key: &str) -> Option<String> {
        self.fragments.shift_remove(key)
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Whether a new key would be refused.
    pub fn is_full(&self) -> bool {
        self.fragments.len() >= MEMORY_CAPACITY
    }
}

/// Everything a behavior may read and the only way it may propose an
/// influence.
///
/// Built by the runtime for one phase of one agent. Mail can only be sent
/// in the talk phase.
pub struct AgentContext<'a> {
    body: &'a AgentBody,
    at: Coordinate,
    cycle: CycleId,
    phase: Phase,
    perception: &'a Perception,
    memory: &'a mut Memory,
    mailbox: &'a [Mail],
    outbox: Vec<Mail>,
}

impl<'a> AgentContext<'a> {
    /// A context for `body` standing at `at`.
    pub fn new(
        body: &'a AgentBody,
        at: Coordinate,
        cycle: CycleId,
        phase: Phase,
        perception: &'a Perception,
        memory: &'a mut Memory,
        mailbox: &'a [Mail],
    ) -> Self {
        Self {
            body,
            at,
            cycle,
            phase,
            perception,
            memory,
            mailbox,
            outbox: Vec::new(),
        }
    }

    // ── Reading ────────────────────────────────────────────────────

    /// This agent's id.
    pub fn id(&self) -> ActiveItemId {
        self.body.id
    }

    /// This agent's name.
    pub fn name(&self) -> &str {
        &self.body.name
    }

    /// The current cycle.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Where this agent stands.
    pub fn coordinate(&self) -> Coordinate {
        self.at
    }

    /// Remaining battery.
    pub fn battery(&self) -> u32 {
        self.body.battery
    }

    /// Color of the carried packet.
    pub fn carry(&self) -> Option<Color> {
        self.body.carry.map(|p| p.color)
    }

    /// Perception radius.
    pub fn view(&self) -> u32 {
        self.body.view
    }

    /// Whether this agent may handle packets of `color`.
    pub fn handles(&self, color: Color) -> bool {
        self.body.handles(color)
    }

    /// This cycle's perception.
    pub fn perception(&self) -> &Perception {
        self.perception
    }

    /// Whether the perception shows `(x, y)` as a cell this agent could
    /// step onto.
    pub fn can_walk(&self, x: i32, y: i32) -> bool {
        self.perception.can_walk(Coordinate::new(x, y))
    }

    /// Mail received in the last delivery.
    pub fn mailbox(&self) -> &[Mail] {
        self.mailbox
    }

    // ── Memory ─────────────────────────────────────────────────────

    /// Read-only memory.
    pub fn memory(&self) -> &Memory {
        self.memory
    }

    /// Store a fragment. See [`Memory::remember`].
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        self.memory.remember(key, value)
    }

    /// Read a fragment.
    pub fn recall(&self, key: &str) -> Option<&str> {
        self.memory.recall(key)
    }

    /// Drop a fragment.
    pub fn forget(&mut self, key: &str) -> Option<String> {
        self.memory.forget(key)
    }

    // ── Mail ───────────────────────────────────────────────────────

    /// Send `text` to `to`. Ignored outside the talk phase.
    pub fn send_message(&mut self, to: ActiveItemId, text: impl Into<String>) -> bool {
        self.post(Some(to), text.into())
    }

    /// Send `text` to every other agent. Ignored outside the talk phase.
    pub fn broadcast(&mut self, text: impl Into<String>) -> bool {
        self.post(None, text.into())
    }

    fn post(&mut self, to: Option<ActiveItemId>, text: String) -> bool {
        if self.phase != Phase::Talk {
            return false;
        }
        self.outbox.push(Mail {
            from: self.body.id,
            to,
            text,
        });
        true
    }

    /// Take the mail sent through this context.
    pub fn take_outbox(&mut self) -> Vec<Mail> {
        std::mem::take(&mut self.outbox)
    }

    // ── Actions ────────────────────────────────────────────────────

    fn propose(&self, target: Coordinate, payload: InfluencePayload) -> Influence {
        Influence::new(self.body.id, self.at, target, payload)
    }

    /// Step onto `to`.
    pub fn step(&self, to: Coordinate) -> Influence {
        self.propose(to, InfluencePayload::Step)
    }

    /// Pick up the packet at `at`.
    pub fn pick_packet(&self, at: Coordinate) -> Influence {
        self.propose(at, InfluencePayload::PickPacket)
    }

    /// Put the carried packet on `at`, delivering it if `at` is a
    /// destination.
    pub fn put_packet(&self, at: Coordinate) -> Influence {
        self.propose(at, InfluencePayload::PutPacket)
    }

    /// Take a buffered packet from the generator at `at`.
    pub fn pick_generator_packet(&self, at: Coordinate) -> Influence {
        self.propose(at, InfluencePayload::PickGeneratorPacket)
    }

    /// Take the packet carried by the agent at `at`.
    pub fn steal_packet(&self, at: Coordinate) -> Influence {
        self.propose(at, InfluencePayload::StealPacket)
    }

    /// Plant a flag on `at`.
    pub fn put_flag(&self, at: Coordinate, color: Color) -> Influence {
        self.propose(at, InfluencePayload::PutFlag { color })
    }

    /// Drop `count` crumbs on `at`.
    pub fn put_crumb(&self, at: Coordinate, count: u32) -> Influence {
        self.propose(at, InfluencePayload::PutCrumb { count })
    }

    /// Pick `count` crumbs from `at`.
    pub fn pick_crumb(&self, at: Coordinate, count: u32) -> Influence {
        self.propose(at, InfluencePayload::PickCrumb { count })
    }

    /// Lay or reinforce a pheromone on `at`. A zero lifetime uses the default.
    pub fn put_pheromone(&self, at: Coordinate, lifetime: u32) -> Influence {
        self.propose(at, InfluencePayload::PutPheromone { lifetime })
    }

    /// Lay or reinforce a pheromone on `at` pointing at `toward`.
    pub fn put_directed_pheromone(
        &self,
        at: Coordinate,
        lifetime: u32,
        toward: Coordinate,
    ) -> Influence {
        self.propose(at, InfluencePayload::PutDirectedPheromone { lifetime, toward })
    }

    /// Remove the pheromone on `at`.
    pub fn remove_pheromone(&self, at: Coordinate) -> Influence {
        self.propose(at, InfluencePayload::RemovePheromone)
    }

    /// Do nothing this cycle.
    pub fn skip(&self) -> Influence {
        Influence::skip(self.body.id, self.at)
    }
}

impl std::fmt::Debug for AgentContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("id", &self.body.id)
            .field("at", &self.at)
            .field("cycle", &self.cycle)
            .field("phase", &self.phase)
            .finish()
    }
}
