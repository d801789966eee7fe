//! Global barrier synchronization.

use influx_core::ActiveItemId;

use crate::strategy::{Candidates, SyncReport, Synchronization};

/// Every entity syncs with every other registered entity.
///
/// The id list is snapshotted at construction; candidates passed to
/// [`synchronize`](Synchronization::synchronize) are ignored.
#[derive(Clone, Debug)]
pub struct CentralSynchronization {
    ids: Vec<ActiveItemId>,
}

impl CentralSynchronization {
    /// Snapshot the active items. Duplicates are collapsed.
    pub fn new(ids: impl IntoIterator<Item = ActiveItemId>) -> Self {
        let mut ids: Vec<_> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// The snapshotted ids, ascending.
    pub fn ids(&self) -> &[ActiveItemId] {
        &self.ids
    }

    /// Sync set of `id`: everyone else.
    pub fn sync_set(&self, id: ActiveItemId) -> Vec<ActiveItemId> {
        self.ids.iter().copied().filter(|other| *other != id).collect()
    }
}

impl Synchronization for CentralSynchronization {
    fn name(&self) -> &str {
        "central"
    }

    fn synchronize(&mut self, _time: u64, _candidates: &Candidates) -> SyncReport {
        let sets = self.ids.iter().map(|&id| (id, self.sync_set(id))).collect();
        SyncReport {
            sets,
            ..SyncReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::PriorityClass;

    #[test]
    fn sets_exclude_self() {
        let ids = [
            ActiveItemId::agent(2),
            ActiveItemId::new(9, PriorityClass::EnergyStation),
            ActiveItemId::agent(1),
        ];
        let mut c = CentralSynchronization::new(ids);
        let r = c.synchronize(0, &Candidates::new());
        assert_eq!(r.sets.len(), 3);
        assert_eq!(
            r.sync_set(ActiveItemId::agent(1)),
            &[
                ActiveItemId::new(9, PriorityClass::EnergyStation),
                ActiveItemId::agent(2)
            ]
        );
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn lone_entity_syncs_with_nobody() {
        let mut c = CentralSynchronization::new([ActiveItemId::agent(1)]);
        let r = c.synchronize(0, &Candidates::new());
        assert!(r.sync_set(ActiveItemId::agent(1)).is_empty());
    }
}
