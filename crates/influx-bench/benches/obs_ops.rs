//! Criterion benchmarks for perception capture and the perception chain.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use influx_core::{ActiveItemId, Coordinate};
use influx_obs::{PerceptionChain, PerceptionLawKind};
use influx_world::{AgentBody, PlacedItem, Wall, World};

/// A 64x64 world with a wall every fifth cell of every third row and one
/// agent in the middle.
fn walled_world() -> World {
    let mut w = World::new(64, 64).unwrap();
    for y in (0..64).step_by(3) {
        for x in (0..64).step_by(5) {
            let _ = w.place(
                Coordinate::new(x, y),
                PlacedItem::Wall(Wall { see_through: false }),
            );
        }
    }
    w.place(
        Coordinate::new(32, 32),
        PlacedItem::Agent(AgentBody::new(1, "eye", 16, 1000)),
    )
    .unwrap();
    w
}

fn bench_perceive(c: &mut Criterion) {
    let world = walled_world();
    let me = ActiveItemId::agent(1);
    let at = Coordinate::new(32, 32);
    let raw = PerceptionChain::new();
    let occluded = PerceptionChain::from_kinds(&[PerceptionLawKind::WallObstacle]);

    let mut group = c.benchmark_group("perceive");
    for view in [2u32, 8, 16] {
        group.bench_with_input(BenchmarkId::new("capture", view), &view, |b, &view| {
            b.iter(|| black_box(raw.perceive(&world, me, at, view)));
        });
        group.bench_with_input(BenchmarkId::new("wall_obstacle", view), &view, |b, &view| {
            b.iter(|| black_box(occluded.perceive(&world, me, at, view)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_perceive);
criterion_main!(benches);
