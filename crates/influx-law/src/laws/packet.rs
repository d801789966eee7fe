//! Packet handling: pick, put, deliver, take from generators, steal, convey.

use influx_core::{Influence, LayerKind};
use influx_world::World;

use super::agent_within;

/// Legal iff a packet lies on the adjacent target, the agent's hands are
/// empty and the agent handles the packet's color.
pub fn pick(influence: &Influence, world: &World) -> bool {
    let Some((at, agent)) = agent_within(influence, world, 1) else {
        return false;
    };
    at != influence.target
        && agent.carry.is_none()
        && world
            .packets()
            .get(influence.target)
            .is_some_and(|p| agent.handles(p.color))
}

/// Legal iff the agent carries a packet and the adjacent target is either
/// an empty destination of the packet's color or a cell a packet may
/// occupy that holds no destination.
pub fn put(influence: &Influence, world: &World) -> bool {
    let Some((at, agent)) = agent_within(influence, world, 1) else {
        return false;
    };
    let Some(packet) = agent.carry else {
        return false;
    };
    if at == influence.target || world.packets().contains(influence.target) {
        return false;
    }
    match world.destinations().get(influence.target) {
        Some(dest) => dest.color == packet.color,
        None => world.may_stand(LayerKind::Packet, influence.target),
    }
}

/// Legal iff an adjacent generator of a handled color has a buffered
/// packet and the agent's hands are empty.
pub fn pick_from_generator(influence: &Influence, world: &World) -> bool {
    let Some((at, agent)) = agent_within(influence, world, 1) else {
        return false;
    };
    at != influence.target
        && agent.carry.is_none()
        && world
            .generators()
            .get(influence.target)
            .is_some_and(|g| agent.handles(g.color) && !g.queue.is_empty())
}

/// Legal iff another agent stands adjacent carrying a packet of a handled
/// color and the thief's hands are empty.
pub fn steal(influence: &Influence, world: &World) -> bool {
    let Some((at, agent)) = agent_within(influence, world, 1) else {
        return false;
    };
    if at == influence.target || agent.carry.is_some() {
        return false;
    }
    world
        .agents()
        .get(influence.target)
        .and_then(|victim| victim.carry)
        .is_some_and(|p| agent.handles(p.color))
}

/// Legal iff the proposing conveyor holds a packet, the target is the next
/// cell in its direction, and that cell holds a conveyor but no packet.
pub fn convey(influence: &Influence, world: &World) -> bool {
    let Some(at) = world.locate(influence.source) else {
        return false;
    };
    let Some(belt) = world.conveyors().get(at) else {
        return false;
    };
    at.step(belt.direction) == influence.target
        && world.packets().contains(at)
        && world.conveyors().contains(influence.target)
        && !world.packets().contains(influence.target)
}
