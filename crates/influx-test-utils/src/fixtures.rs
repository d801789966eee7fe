//! Ready-made worlds.
//!
//! - [`delivery`]: one agent between a packet and its destination.
//! - [`warehouse`]: a packet field with destinations, couriers and a
//!   fixed-rate generator. Drains when the couriers finish.
//! - [`crowd`]: `n` agents on a square grid, for sync and scaling tests.

use influx_core::Color;
use influx_engine::{ItemSpec, WorldConfig};

/// A 10x10 world: agent 1 at (5, 5), a red packet at (5, 4) and a red
/// destination at (5, 6).
pub fn delivery() -> WorldConfig {
    WorldConfig::new(10, 10)
        .with_item(ItemSpec::agent(5, 5, 3, 1, "courier"))
        .with_item(ItemSpec::packet(5, 4, Color::Red))
        .with_item(ItemSpec::destination(5, 6, Color::Red))
}

/// A `size` by `size` warehouse.
///
/// A red and a blue destination sit in the bottom row, `packets` packets
/// alternate colors across row 2, four agents start in the top-left
/// corner, and a red generator with a small threshold sits on the right
/// edge.
pub fn warehouse(size: u32, packets: u32) -> WorldConfig {
    let edge = size as i32 - 1;
    let mut config = WorldConfig::new(size, size)
        .with_item(ItemSpec::destination(1, edge, Color::Red))
        .with_item(ItemSpec::destination(edge - 1, edge, Color::Blue))
        .with_item(ItemSpec::fixed_generator(edge, 1, 100, Color::Red, 4, 2));
    for i in 0..packets.min(size.saturating_sub(2)) {
        let color = if i % 2 == 0 { Color::Red } else { Color::Blue };
        config = config.with_item(ItemSpec::packet(1 + i as i32, 2, color));
    }
    for id in 1..=4u32 {
        let (x, y) = ((id as i32 - 1) % 2, (id as i32 - 1) / 2);
        config = config.with_item(ItemSpec::agent(x, y, size, id, &format!("courier-{id}")));
    }
    config.max_cycles = Some(u64::from(size) * 20);
    config
}

/// `n` agents spaced two cells apart on the smallest square grid that
/// holds them. Every agent sees its direct neighbours with view 2.
pub fn crowd(n: u32) -> WorldConfig {
    let side = (f64::from(n).sqrt().ceil() as u32).max(1);
    let mut config = WorldConfig::new(side * 2, side * 2);
    for i in 0..n {
        let (x, y) = ((i % side) as i32 * 2, (i / side) as i32 * 2);
        config = config.with_item(ItemSpec::agent(x, y, 2, i + 1, &format!("a{}", i + 1)));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_validate() {
        delivery().validate().unwrap();
        warehouse(12, 6).validate().unwrap();
        crowd(9).validate().unwrap();
    }

    #[test]
    fn crowd_places_every_agent() {
        assert_eq!(crowd(10).items.len(), 10);
        assert_eq!(crowd(10).width, 8);
    }
}
