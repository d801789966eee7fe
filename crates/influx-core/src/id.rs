//! Strongly-typed identifiers for active items and cycles.

use serde::Serialize;
use std::fmt;

/// Resolution class of an active item.
///
/// Lower values resolve first. Within one cycle the kernel applies
/// influences in `(class, id)` order, so every energy station acts on the
/// state left by the previous cycle before any agent moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum PriorityClass {
    /// Energy stations charge first.
    EnergyStation = 0,
    /// Autonomous agents.
    Agent = 1,
    /// Packet generators.
    Generator = 2,
    /// Conveyor belts.
    Conveyor = 3,
    /// Anything else.
    Other = 4,
}

impl PriorityClass {
    /// Numeric rank used in ordering keys.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Identity of an active item: numeric id plus priority class.
///
/// The derived ordering compares `class` first, then `id`, which is
/// exactly the kernel's application order.
///
/// # Examples
///
/// ```
/// use influx_core::{ActiveItemId, PriorityClass};
///
/// let station = ActiveItemId::new(9, PriorityClass::EnergyStation);
/// let agent = ActiveItemId::new(1, PriorityClass::Agent);
/// assert!(station < agent);
/// assert_eq!(agent.to_string(), "agent#1");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ActiveItemId {
    /// Priority class. Declared first so the derived `Ord` sorts by it.
    pub class: PriorityClass,
    /// Numeric id, unique across all active items of a world.
    pub id: u32,
}

impl ActiveItemId {
    /// Construct an id.
    pub const fn new(id: u32, class: PriorityClass) -> Self {
        Self { class, id }
    }

    /// Shorthand for an agent id.
    pub const fn agent(id: u32) -> Self {
        Self::new(id, PriorityClass::Agent)
    }
}

impl fmt::Display for ActiveItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.class {
            PriorityClass::EnergyStation => "station",
            PriorityClass::Agent => "agent",
            PriorityClass::Generator => "generator",
            PriorityClass::Conveyor => "conveyor",
            PriorityClass::Other => "item",
        };
        write!(f, "{tag}#{}", self.id)
    }
}

/// Monotonically increasing simulation cycle counter.
///
/// Incremented once per completed apply phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CycleId(pub u64);

impl CycleId {
    /// The following cycle.
    pub fn next(self) -> CycleId {
        CycleId(self.0 + 1)
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CycleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
