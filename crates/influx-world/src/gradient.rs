//! Distance-to-station flood fill over the gradient layer.
//!
//! Values only ever decrease: a cell is written when it has no gradient
//! yet or when the new distance is strictly smaller. Overlapping floods
//! from several stations therefore leave the pointwise minimum. Walls and
//! destinations stop the flood; cells off the grid are skipped.

use std::collections::VecDeque;

use influx_core::Coordinate;

use crate::item::Gradient;
use crate::world::World;

/// Flood gradient values outward from `source`, which gets value `0`.
///
/// Spreads through all 8 neighbours. Iterative, so arbitrarily large grids
/// cannot overflow the stack.
///
/// # Examples
///
/// ```
/// use influx_core::Coordinate;
/// use influx_world::{gradient, World};
///
/// let mut world = World::new(5, 1).unwrap();
/// gradient::flood(&mut world, Coordinate::new(0, 0));
/// let v: Vec<u32> = (0..5)
///     .map(|x| world.gradients().get(Coordinate::new(x, 0)).unwrap().value)
///     .collect();
/// assert_eq!(v, vec![0, 1, 2, 3, 4]);
/// ```
pub fn flood(world: &mut World, source: Coordinate) {
    if !world.bounds().contains(source) {
        return;
    }
    let mut work: VecDeque<(Coordinate, u32)> = VecDeque::new();
    work.push_back((source, 0));
    while let Some((at, value)) = work.pop_front() {
        if world
            .gradients()
            .get(at)
            .is_some_and(|g| g.value <= value)
        {
            continue;
        }
        world.gradients_mut().replace(at, Gradient { value });
        for next in at.neighbours8() {
            if passable(world, next) {
                work.push_back((next, value + 1));
            }
        }
    }
}

fn passable(world: &World, at: Coordinate) -> bool {
    world.bounds().contains(at)
        && !world.walls().contains(at)
        && !world.destinations().contains(at)
}
