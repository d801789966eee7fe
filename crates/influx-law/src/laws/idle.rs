//! Skip and no-op.

use influx_core::Influence;
use influx_world::World;

/// Always legal.
pub fn always(_influence: &Influence, _world: &World) -> bool {
    true
}
