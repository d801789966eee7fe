//! Benchmark profiles for the Influx simulation kernel.
//!
//! Provides pre-built [`WorldConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 64x64 warehouse with 32 couriers
//! - [`stress_profile`]: 200x200 warehouse with 256 couriers
//! - [`init_agent_positions`]: deterministic agent placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashSet;

use influx_core::{ActiveItemId, Color, Coordinate};
use influx_engine::{Behavior, Behaviors, ItemSpec, WorldConfig};
use influx_test_utils::CourierBehavior;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const COLORS: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

/// Build the reference profile: 64x64 grid, 32 agents, 128 packets.
///
/// Stations, generators and destinations sit on the border; packets and
/// agents are scattered by `seed`.
pub fn reference_profile(seed: u64) -> WorldConfig {
    warehouse(64, 32, 128, seed)
}

/// Build the stress profile: 200x200 grid, 256 agents, 1024 packets.
pub fn stress_profile(seed: u64) -> WorldConfig {
    warehouse(200, 256, 1024, seed)
}

/// A courier for each of the first `agents` agent ids.
pub fn couriers(agents: u32) -> Behaviors {
    (1..=agents)
        .map(|id| {
            let b: Box<dyn Behavior> = Box::new(CourierBehavior);
            (ActiveItemId::agent(id), b)
        })
        .collect()
}

/// Generate `count` distinct cells inside the `width` by `height` interior
/// (border excluded), deterministically from `seed`.
///
/// Returns fewer cells if the interior is smaller than `count`.
pub fn init_agent_positions(width: u32, height: u32, count: usize, seed: u64) -> Vec<Coordinate> {
    let interior = (width.saturating_sub(2) as usize) * (height.saturating_sub(2) as usize);
    let count = count.min(interior);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(count);
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let at = Coordinate::new(
            rng.random_range(1..width as i32 - 1),
            rng.random_range(1..height as i32 - 1),
        );
        if seen.insert(at) {
            out.push(at);
        }
    }
    out
}

fn warehouse(size: u32, agents: u32, packets: u32, seed: u64) -> WorldConfig {
    let edge = size as i32 - 1;
    let mut config = WorldConfig::new(size, size);
    config.seed = seed;
    let mut next_id = agents + 1;
    let mut fresh = || {
        next_id += 1;
        next_id
    };

    // Border: destinations along the top, stations along the bottom
    // charging the row above them, generators down the right side.
    for (i, x) in (2..edge - 1).step_by(8).enumerate() {
        let color = COLORS[i % COLORS.len()];
        config = config
            .with_item(ItemSpec::destination(x, 0, color))
            .with_item(ItemSpec::station(x, edge, fresh()));
    }
    for (i, y) in (4..edge - 1).step_by(16).enumerate() {
        let color = COLORS[i % COLORS.len()];
        config = config.with_item(ItemSpec::random_generator(edge, y, fresh(), color, 0.05, 8));
    }

    let cells = init_agent_positions(size, size, (agents + packets) as usize, seed);
    let (agent_cells, packet_cells) = cells.split_at((agents as usize).min(cells.len()));
    for (i, at) in agent_cells.iter().enumerate() {
        let id = i as u32 + 1;
        config = config.with_item(ItemSpec::agent(at.x, at.y, 6, id, &format!("courier-{id}")));
    }
    for (i, at) in packet_cells.iter().enumerate() {
        config = config.with_item(ItemSpec::packet(at.x, at.y, COLORS[i % COLORS.len()]));
    }
    config.max_cycles = Some(1_000);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_distinct_and_inside() {
        let cells = init_agent_positions(10, 10, 20, 7);
        assert_eq!(cells.len(), 20);
        let unique: HashSet<_> = cells.iter().collect();
        assert_eq!(unique.len(), 20);
        assert!(cells.iter().all(|c| (1..9).contains(&c.x) && (1..9).contains(&c.y)));
        assert_eq!(cells, init_agent_positions(10, 10, 20, 7));
    }

    #[test]
    fn positions_are_capped_by_interior() {
        assert_eq!(init_agent_positions(4, 4, 50, 1).len(), 4);
    }

    #[test]
    fn reference_profile_builds() {
        let config = reference_profile(42);
        config.validate().unwrap();
        let kernel = influx_engine::Kernel::new(config, couriers(32)).unwrap();
        assert_eq!(kernel.seed(), 42);
    }
}
