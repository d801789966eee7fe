//! Energy station charging.

use influx_core::Influence;
use influx_world::{EnergyStation, World};

/// Legal iff the proposer is an energy station and the target is the cell
/// it charges. An empty target is fine: the charge is simply lost.
pub fn charge(influence: &Influence, world: &World) -> bool {
    world.locate(influence.source).is_some_and(|at| {
        world.stations().contains(at)
            && EnergyStation::charge_cell(at) == influence.target
            && world.bounds().contains(influence.target)
    })
}
