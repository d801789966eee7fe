//! Grouping outcomes into spheres that are dispatched together.

use indexmap::IndexMap;
use influx_core::ActiveItemId;
use tracing::trace;

use crate::outcome::Outcome;

/// A set of active items whose outcomes for one phase are dispatched as a
/// unit.
///
/// Members named in a sync set but not yet heard from are placeholders.
#[derive(Clone, Debug, Default)]
pub struct Sphere {
    members: IndexMap<ActiveItemId, Option<Outcome>>,
}

impl Sphere {
    /// Whether every member has delivered a real outcome.
    pub fn is_complete(&self) -> bool {
        self.members.values().all(Option::is_some)
    }

    /// Number of members, placeholders included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the sphere has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member.
    pub fn contains(&self, id: ActiveItemId) -> bool {
        self.members.contains_key(&id)
    }

    /// Members still missing an outcome.
    pub fn placeholders(&self) -> impl Iterator<Item = ActiveItemId> + '_ {
        self.members
            .iter()
            .filter(|(_, o)| o.is_none())
            .map(|(id, _)| *id)
    }

    /// The delivered outcomes, in member order.
    pub fn into_outcomes(self) -> Vec<Outcome> {
        self.members.into_values().flatten().collect()
    }

    fn absorb(&mut self, other: Sphere) {
        for (id, outcome) in other.members {
            let slot = self.members.entry(id).or_insert(None);
            if outcome.is_some() {
                *slot = outcome;
            }
        }
    }
}

/// Builds spheres from outcomes as they arrive.
///
/// An outcome joins, and merges, every open sphere that contains itself or
/// a member of its sync set. A sphere is handed back as soon as it is
/// complete.
#[derive(Debug, Default)]
pub struct Collector {
    open: Vec<Sphere>,
}

impl Collector {
    /// An empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spheres still waiting for members.
    pub fn open(&self) -> usize {
        self.open.len()
    }

    /// Add an outcome. Returns the sphere it completed, if any.
    pub fn submit(&mut self, outcome: Outcome) -> Option<Sphere> {
        let entity = outcome.entity;
        let touches = |s: &Sphere| {
            s.contains(entity) || outcome.sync_set.iter().any(|id| s.contains(*id))
        };
        let mut merged = Sphere::default();
        let mut i = 0;
        while i < self.open.len() {
            if touches(&self.open[i]) {
                merged.absorb(self.open.swap_remove(i));
            } else {
                i += 1;
            }
        }
        for id in &outcome.sync_set {
            if *id != entity {
                merged.members.entry(*id).or_insert(None);
            }
        }
        merged.members.insert(entity, Some(outcome));
        merged.members.sort_keys();

        if merged.is_complete() {
            trace!(members = merged.len(), "sphere complete");
            Some(merged)
        } else {
            self.open.push(merged);
            None
        }
    }

    /// Take every sphere that is still open, for end-of-phase dispatch.
    pub fn drain_open(&mut self) -> Vec<Sphere> {
        std::mem::take(&mut self.open)
    }
}
