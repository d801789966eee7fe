//! Agent movement.

use influx_core::{Influence, LayerKind};
use influx_world::World;

use super::acting_agent;

/// Legal iff the target is exactly one cell away (Chebyshev) and an agent
/// may stand there.
pub fn step(influence: &Influence, world: &World) -> bool {
    acting_agent(influence, world).is_some_and(|(at, _)| {
        at.chebyshev(influence.target) == 1 && world.may_stand(LayerKind::Agent, influence.target)
    })
}
