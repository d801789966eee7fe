//! The blind perception law.

use smallvec::SmallVec;

use crate::chain::PerceptionLaw;
use crate::perception::{CellView, Perception};

/// Replaces every cell with [`CellView::Unknown`] except the observer's own,
/// which keeps only the observer itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeeNothing;

impl PerceptionLaw for SeeNothing {
    fn name(&self) -> &str {
        "see_nothing"
    }

    fn enforce(&self, perception: Perception) -> Perception {
        let me = perception.observer();
        let own: SmallVec<[_; 4]> = perception
            .self_cell()
            .and_then(CellView::reps)
            .map(|reps| {
                reps.iter()
                    .filter(|r| r.active_id() == Some(me))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        let mut blind = Perception::unknown(
            me,
            perception.width(),
            perception.height(),
            perception.offset(),
            perception.self_pos(),
        );
        blind.set_rel(perception.self_pos(), CellView::Visible(own));
        blind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::{ActiveItemId, Color, Coordinate, LayerKind};
    use influx_world::{AgentBody, Crumb, Packet, PlacedItem, World};

    #[test]
    fn only_self_survives() {
        let mut w = World::new(5, 5).unwrap();
        let me = ActiveItemId::agent(1);
        w.place(Coordinate::new(2, 2), PlacedItem::Agent(AgentBody::new(1, "me", 2, 1000)))
            .unwrap();
        w.place(Coordinate::new(2, 2), PlacedItem::Crumb(Crumb { count: 3 }))
            .unwrap();
        w.place(Coordinate::new(3, 3), PlacedItem::Packet(Packet { color: Color::Red }))
            .unwrap();
        let p = SeeNothing.enforce(Perception::capture(&w, me, Coordinate::new(2, 2), 2));

        let own = p.self_cell().unwrap();
        assert_eq!(own.reps().map(|r| r.len()), Some(1));
        assert!(own.get(LayerKind::Agent).is_some());
        assert!(own.get(LayerKind::Crumb).is_none());
        assert_eq!(p.cell(Coordinate::new(3, 3)), Some(&CellView::Unknown));
        let unknown = p.iter().filter(|(_, c)| **c == CellView::Unknown).count();
        assert_eq!(unknown, 24);
    }
}
