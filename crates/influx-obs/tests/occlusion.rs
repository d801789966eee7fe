//! Occlusion properties over randomly walled worlds.

use influx_core::{ActiveItemId, Coordinate};
use influx_obs::line::between;
use influx_obs::{CellView, PerceptionChain, PerceptionLawKind};
use influx_world::{AgentBody, PlacedItem, Wall, World};
use proptest::prelude::*;

const ME: ActiveItemId = ActiveItemId::agent(1);
const AT: Coordinate = Coordinate::new(6, 6);

fn build(walls: &[(i32, i32)], see_through: bool) -> World {
    let mut w = World::new(13, 13).unwrap();
    w.place(AT, PlacedItem::Agent(AgentBody::new(1, "me", 4, 1000)))
        .unwrap();
    for &(x, y) in walls {
        let c = Coordinate::new(x, y);
        if c != AT {
            let _ = w.place(c, PlacedItem::Wall(Wall { see_through }));
        }
    }
    w
}

proptest! {
    #[test]
    fn blocked_iff_solid_wall_on_line(
        walls in proptest::collection::vec((2i32..11, 2i32..11), 0..12),
    ) {
        let world = build(&walls, false);
        let chain = PerceptionChain::from_kinds(&[PerceptionLawKind::WallObstacle]);
        let p = chain.perceive(&world, ME, AT, 4);
        for (at, cell) in p.iter() {
            let expect_blocked = between(AT, at).into_iter().any(|c| world.blocks_sight(c));
            prop_assert_eq!(*cell == CellView::Blocked, expect_blocked, "cell {}", at);
        }
    }

    #[test]
    fn glass_never_hides(
        walls in proptest::collection::vec((2i32..11, 2i32..11), 0..12),
    ) {
        let world = build(&walls, true);
        let chain = PerceptionChain::from_kinds(&[PerceptionLawKind::WallObstacle]);
        let p = chain.perceive(&world, ME, AT, 4);
        prop_assert!(p.iter().all(|(_, c)| matches!(c, CellView::Visible(_))));
    }

    #[test]
    fn own_cell_always_visible(
        walls in proptest::collection::vec((2i32..11, 2i32..11), 0..12),
        blind in any::<bool>(),
    ) {
        let world = build(&walls, false);
        let mut kinds = vec![PerceptionLawKind::WallObstacle];
        if blind {
            kinds.push(PerceptionLawKind::SeeNothing);
        }
        let p = PerceptionChain::from_kinds(&kinds).perceive(&world, ME, AT, 4);
        let own = p.self_cell().and_then(|c| c.reps()).map(|r| r.len());
        prop_assert_eq!(own, Some(1));
    }
}
