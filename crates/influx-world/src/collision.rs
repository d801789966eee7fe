//! Cross-layer occupancy rules keyed by layer tag.
//!
//! Every function here is pure. [`may_share`] answers whether an item of
//! the `incoming` layer may be placed on a cell already holding an item
//! of the `occupant` layer; the same-layer case is handled by
//! [`Layer`](crate::Layer) itself except for crumbs, which merge.

use influx_core::{LayerKind, Representation};

/// Whether an `incoming` item may be placed where an `occupant` item is.
///
/// # Examples
///
/// ```
/// use influx_core::LayerKind;
/// use influx_world::collision::may_share;
///
/// assert!(may_share(LayerKind::Agent, LayerKind::Crumb));
/// assert!(!may_share(LayerKind::Agent, LayerKind::Wall));
/// assert!(may_share(LayerKind::Packet, LayerKind::Destination));
/// ```
pub fn may_share(incoming: LayerKind, occupant: LayerKind) -> bool {
    use LayerKind::*;
    match incoming {
        Agent => matches!(occupant, Crumb | Flag | Pheromone | Gradient),
        Flag => matches!(occupant, Agent | Crumb | Pheromone | Gradient),
        Crumb => matches!(occupant, Agent | Flag | Pheromone | Gradient | Crumb),
        Pheromone => matches!(occupant, Agent | Crumb | Flag | Packet | Pheromone | Gradient),
        Packet => matches!(
            occupant,
            Crumb | Destination | Generator | Conveyor | Pheromone | Gradient
        ),
        Gradient => matches!(
            occupant,
            Agent | Crumb | Flag | Packet | Generator | Conveyor | Pheromone | EnergyStation
        ),
        Destination | EnergyStation => matches!(occupant, Gradient),
        Wall => false,
        Generator | Conveyor => matches!(occupant, Packet | Gradient),
    }
}

/// Whether an agent may stand on a cell holding an item of this layer.
pub fn walkable(layer: LayerKind) -> bool {
    matches!(
        layer,
        LayerKind::Crumb | LayerKind::Flag | LayerKind::Pheromone | LayerKind::Gradient
    )
}

/// Whether this item lets sight through.
///
/// Only solid walls block sight.
pub fn see_through(rep: &Representation) -> bool {
    match rep {
        Representation::Wall { see_through } => *see_through,
        _ => true,
    }
}

/// Single-character drawing hint for a layer.
pub fn glyph(layer: LayerKind) -> char {
    match layer {
        LayerKind::Agent => 'A',
        LayerKind::Packet => 'p',
        LayerKind::Destination => 'D',
        LayerKind::Wall => '#',
        LayerKind::EnergyStation => 'E',
        LayerKind::Generator => 'G',
        LayerKind::Conveyor => '=',
        LayerKind::Flag => 'f',
        LayerKind::Crumb => '.',
        LayerKind::Pheromone => '~',
        LayerKind::Gradient => ' ',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_share_with_nothing() {
        for layer in LayerKind::ALL {
            assert!(!may_share(LayerKind::Wall, layer), "{layer}");
        }
    }

    #[test]
    fn walkable_layers_admit_agents() {
        for layer in LayerKind::ALL {
            if walkable(layer) {
                assert!(may_share(LayerKind::Agent, layer), "{layer}");
            }
        }
    }

    #[test]
    fn crumbs_merge_but_agents_do_not_stack() {
        assert!(may_share(LayerKind::Crumb, LayerKind::Crumb));
        assert!(!may_share(LayerKind::Agent, LayerKind::Agent));
        assert!(!may_share(LayerKind::Packet, LayerKind::Packet));
    }

    #[test]
    fn glass_walls_are_see_through() {
        assert!(see_through(&Representation::Wall { see_through: true }));
        assert!(!see_through(&Representation::Wall { see_through: false }));
        assert!(see_through(&Representation::Crumb { count: 1 }));
    }

    #[test]
    fn glyphs_are_distinct_for_solid_layers() {
        let mut gs: Vec<char> = LayerKind::ALL
            .iter()
            .copied()
            .filter(|l| *l != LayerKind::Gradient)
            .map(glyph)
            .collect();
        gs.sort();
        gs.dedup();
        assert_eq!(gs.len(), LayerKind::ALL.len() - 1);
    }
}
