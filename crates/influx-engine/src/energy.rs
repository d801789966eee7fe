//! Battery accounting for agents.

use influx_core::{Influence, InfluenceKind};

use crate::config::EnergyConfig;

/// Battery cost of an influence of `kind`.
pub fn cost(kind: InfluenceKind, carrying: bool, config: &EnergyConfig) -> u32 {
    match kind {
        InfluenceKind::Step if carrying => config.step_with_carry,
        InfluenceKind::Step => config.step,
        InfluenceKind::Nop => 0,
        _ => config.idle,
    }
}

/// Degrade an agent's proposal it cannot afford.
///
/// An empty battery yields `Nop`; a battery too low for the proposal
/// yields `Skip`.
pub fn gate(influence: Influence, battery: u32, carrying: bool, config: &EnergyConfig) -> Influence {
    if !config.enabled {
        return influence;
    }
    if battery == 0 {
        return Influence::nop(influence.source, influence.origin);
    }
    if cost(influence.kind(), carrying, config) > battery {
        return Influence::skip(influence.source, influence.origin);
    }
    influence
}

/// Battery after paying `cost`, floored at zero.
pub fn drain(battery: u32, cost: u32) -> u32 {
    battery.saturating_sub(cost)
}

/// Battery after receiving `load`, capped at `max`.
pub fn charge(battery: u32, load: u32, max: u32) -> u32 {
    battery.saturating_add(load).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use influx_core::{ActiveItemId, Coordinate};

    const ME: ActiveItemId = ActiveItemId::agent(1);
    const AT: Coordinate = Coordinate::new(2, 2);

    fn step() -> Influence {
        Influence::step(ME, AT, Coordinate::new(2, 3))
    }

    #[test]
    fn step_costs_more_when_carrying() {
        let c = EnergyConfig::default();
        assert_eq!(cost(InfluenceKind::Step, false, &c), 10);
        assert_eq!(cost(InfluenceKind::Step, true, &c), 20);
        assert_eq!(cost(InfluenceKind::PickPacket, true, &c), 5);
        assert_eq!(cost(InfluenceKind::Skip, false, &c), 5);
        assert_eq!(cost(InfluenceKind::Nop, false, &c), 0);
    }

    #[test]
    fn unaffordable_step_becomes_skip() {
        let c = EnergyConfig::default();
        assert_eq!(gate(step(), 15, true, &c).kind(), InfluenceKind::Skip);
        assert_eq!(gate(step(), 15, false, &c).kind(), InfluenceKind::Step);
    }

    #[test]
    fn empty_battery_becomes_nop() {
        let c = EnergyConfig::default();
        assert_eq!(gate(step(), 0, false, &c).kind(), InfluenceKind::Nop);
    }

    #[test]
    fn disabled_energy_never_degrades() {
        let c = EnergyConfig {
            enabled: false,
            ..EnergyConfig::default()
        };
        assert_eq!(gate(step(), 0, true, &c).kind(), InfluenceKind::Step);
    }

    #[test]
    fn battery_clamps() {
        assert_eq!(drain(3, 5), 0);
        assert_eq!(charge(950, 100, 1000), 1000);
        assert_eq!(charge(100, 100, 1000), 200);
    }
}
