//! Ordered composition of perception laws.

use influx_core::{ActiveItemId, Coordinate};
use influx_world::World;
use serde::Serialize;
use tracing::trace;

use crate::perception::Perception;
use crate::see_nothing::SeeNothing;
use crate::wall_obstacle::WallObstacle;

/// A pure transform from a perception to a (possibly) degraded one.
///
/// Laws are applied in the order configured; each sees the output of the
/// previous one.
pub trait PerceptionLaw: Send + Sync + 'static {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Degrade `perception`.
    fn enforce(&self, perception: Perception) -> Perception;
}

/// Built-in perception laws, selectable by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PerceptionLawKind {
    /// See [`SeeNothing`].
    SeeNothing,
    /// See [`WallObstacle`].
    WallObstacle,
}

impl PerceptionLawKind {
    /// Instantiate the law.
    pub fn build(self) -> Box<dyn PerceptionLaw> {
        match self {
            PerceptionLawKind::SeeNothing => Box::new(SeeNothing),
            PerceptionLawKind::WallObstacle => Box::new(WallObstacle),
        }
    }
}

/// An ordered list of perception laws.
///
/// # Examples
///
/// ```
/// use influx_core::{ActiveItemId, Coordinate};
/// use influx_obs::{CellView, PerceptionChain, PerceptionLawKind};
/// use influx_world::World;
///
/// let world = World::new(8, 8).unwrap();
/// let chain = PerceptionChain::from_kinds(&[PerceptionLawKind::SeeNothing]);
/// let p = chain.perceive(&world, ActiveItemId::agent(1), Coordinate::new(4, 4), 2);
/// assert_eq!(p.cell(Coordinate::new(3, 3)), Some(&CellView::Unknown));
/// ```
#[derive(Default)]
pub struct PerceptionChain {
    laws: Vec<Box<dyn PerceptionLaw>>,
}

impl PerceptionChain {
    /// A chain that passes the raw window through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain of built-in laws in the given order.
    pub fn from_kinds(kinds: &[PerceptionLawKind]) -> Self {
        Self {
            laws: kinds.iter().map(|k| k.build()).collect(),
        }
    }

    /// Append a law.
    pub fn push(&mut self, law: Box<dyn PerceptionLaw>) {
        self.laws.push(law);
    }

    /// Number of laws.
    pub fn len(&self) -> usize {
        self.laws.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }

    /// Run every law over `perception`, in order.
    pub fn enforce(&self, perception: Perception) -> Perception {
        self.laws.iter().fold(perception, |p, law| {
            trace!(law = law.name(), observer = %p.observer(), "perception law");
            law.enforce(p)
        })
    }

    /// Capture the window around `center` and run the chain over it.
    pub fn perceive(
        &self,
        world: &World,
        observer: ActiveItemId,
        center: Coordinate,
        view: u32,
    ) -> Perception {
        self.enforce(Perception::capture(world, observer, center, view))
    }
}

impl std::fmt::Debug for PerceptionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.laws.iter().map(|l| l.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::CellView;
    use influx_world::{PlacedItem, Wall};

    #[test]
    fn empty_chain_is_identity() {
        let world = World::new(5, 5).unwrap();
        let raw = Perception::capture(&world, ActiveItemId::agent(1), Coordinate::new(2, 2), 1);
        assert_eq!(PerceptionChain::new().enforce(raw.clone()), raw);
    }

    #[test]
    fn see_nothing_dominates_in_either_order() {
        let mut world = World::new(7, 1).unwrap();
        world
            .place(Coordinate::new(4, 0), PlacedItem::Wall(Wall { see_through: false }))
            .unwrap();
        let me = ActiveItemId::agent(1);
        let at = Coordinate::new(3, 0);

        let occlude_first = PerceptionChain::from_kinds(&[
            PerceptionLawKind::WallObstacle,
            PerceptionLawKind::SeeNothing,
        ]);
        let blind_first = PerceptionChain::from_kinds(&[
            PerceptionLawKind::SeeNothing,
            PerceptionLawKind::WallObstacle,
        ]);
        let a = occlude_first.perceive(&world, me, at, 3);
        let b = blind_first.perceive(&world, me, at, 3);
        assert_eq!(a.cell(Coordinate::new(6, 0)), Some(&CellView::Unknown));
        assert_eq!(b.cell(Coordinate::new(6, 0)), Some(&CellView::Unknown));
        assert_eq!(occlude_first.len(), 2);
    }
}
