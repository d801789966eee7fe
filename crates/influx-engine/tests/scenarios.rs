//! End-to-end cycles through the public kernel API.

use influx_core::{
    ActionCode, ActionPayload, ActiveItemId, Color, Coordinate, Event, InfluenceKind,
};
use influx_engine::{
    Behavior, BehaviorGraph, Behaviors, ExitReason, IdleBehavior, ItemSpec, Kernel,
    LockstepSimulation, RunEnd, SimulationThread, WorldConfig,
};
use influx_sync::SyncMode;
use influx_test_utils::{
    fixtures, with_behavior, CourierBehavior, ListenerBehavior, ScriptedBehavior, WanderBehavior,
};
use proptest::prelude::*;

const A1: ActiveItemId = ActiveItemId::agent(1);
const A2: ActiveItemId = ActiveItemId::agent(2);

/// Route kernel logs to the test harness; `RUST_LOG=influx_engine=debug`
/// shows every cycle.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn actions(events: &[Event]) -> Vec<&influx_core::ActionEvent> {
    events.iter().filter_map(Event::as_action).collect()
}

#[test]
fn pick_then_deliver_ends_the_game() {
    let script = ScriptedBehavior::new("courier")
        .then(|ctx| ctx.pick_packet(Coordinate::new(5, 4)))
        .then(|ctx| ctx.put_packet(Coordinate::new(5, 6)));
    let behaviors = with_behavior(Behaviors::new(), 1, script);
    let mut sim = LockstepSimulation::new(fixtures::delivery(), behaviors).unwrap();

    let first = sim.step().unwrap();
    let pick = actions(&first.events)[0].clone();
    assert_eq!(pick.code, ActionCode::PickPacket);
    assert!(pick.succeeded);
    assert!(!first.game_over);
    assert_eq!(sim.world().agent(A1).unwrap().carry.map(|p| p.color), Some(Color::Red));

    let second = sim.step().unwrap();
    let put = actions(&second.events)[0].clone();
    assert_eq!(put.kind, InfluenceKind::PutPacket);
    assert_eq!(put.code, ActionCode::DeliverPacket);
    assert!(put.succeeded);
    assert_eq!(put.from, Coordinate::new(5, 5));
    assert_eq!(put.to, Coordinate::new(5, 6));
    assert_eq!(
        put.payload,
        ActionPayload::Delivery {
            color: Color::Red,
            delivered: 1
        }
    );
    assert!(second.game_over);
    assert_eq!(sim.world().delivered_total(), 1);
    assert!(sim.world().agent(A1).unwrap().carry.is_none());
}

#[test]
fn picking_from_an_empty_generator_changes_nothing() {
    let config = WorldConfig::new(6, 6)
        .with_item(ItemSpec::agent(2, 2, 2, 1, "a"))
        .with_item(ItemSpec::fixed_generator(3, 2, 7, Color::Blue, 1, 0));
    let script = ScriptedBehavior::new("greedy").then(|ctx| ctx.pick_generator_packet(Coordinate::new(3, 2)));
    let mut k = Kernel::new(config, with_behavior(Behaviors::new(), 1, script)).unwrap();
    let before = k.world().render();

    let report = k.step().unwrap();
    let pick = actions(&report.events)
        .into_iter()
        .find(|a| a.entity == A1)
        .cloned()
        .unwrap();
    assert_eq!(pick.code, ActionCode::PickGenerator);
    assert!(!pick.succeeded);
    assert_eq!(report.metrics.rejected, 1);
    assert_eq!(k.world().render(), before);
    assert!(k.world().agent(A1).unwrap().carry.is_none());
}

#[test]
fn central_sets_cover_every_other_active_item() {
    let config = WorldConfig::new(10, 10)
        .with_item(ItemSpec::agent(0, 0, 1, 1, "a"))
        .with_item(ItemSpec::agent(9, 9, 1, 2, "b"))
        .with_item(ItemSpec::agent(0, 9, 1, 3, "c"))
        .with_item(ItemSpec::station(5, 5, 4));
    let mut k = Kernel::new(config, Behaviors::new()).unwrap();
    let report = k.step().unwrap();
    assert_eq!(report.sync_sets.len(), 4);
    for (id, set) in &report.sync_sets {
        assert_eq!(set.len(), 3);
        assert!(!set.contains(id));
    }
}

#[test]
fn missing_synchronizer_warns_until_granted() {
    let mut config = WorldConfig::new(8, 8)
        .with_item(ItemSpec::agent(1, 1, 3, 1, "a"))
        .with_item(ItemSpec::agent(2, 2, 3, 2, "b"))
        .with_item(ItemSpec::packet(7, 7, Color::Green));
    config.sync = SyncMode::Distributed { synchronizers: 1 };
    let mut k = Kernel::new(config, Behaviors::new()).unwrap();

    let stalled = k.step().unwrap();
    assert_eq!(stalled.warnings.len(), 1);
    assert_eq!(stalled.metrics.stalled, 1);

    assert!(k.grant_synchronizers(1));
    let healed = k.step().unwrap();
    assert!(healed.warnings.is_empty());
    assert_eq!(healed.sync_sets.get(&A1).cloned().unwrap_or_default(), vec![A2]);
    assert_eq!(healed.sync_sets.get(&A2).cloned().unwrap_or_default(), vec![A1]);
}

#[test]
fn mail_is_read_in_the_same_cycle_only() {
    let listener = ListenerBehavior::new();
    let log = listener.log();
    let talker = ScriptedBehavior::new("talker").say("packet at 7,7");
    let behaviors = with_behavior(with_behavior(Behaviors::new(), 1, talker), 2, listener);
    let config = WorldConfig::new(8, 8)
        .with_item(ItemSpec::agent(1, 1, 3, 1, "a"))
        .with_item(ItemSpec::agent(2, 2, 3, 2, "b"))
        .with_item(ItemSpec::packet(7, 7, Color::Green));
    let mut k = Kernel::new(config, behaviors).unwrap();
    k.step().unwrap();
    k.step().unwrap();
    let heard = log.lock().unwrap().clone();
    assert_eq!(heard, vec![(0, "packet at 7,7".to_string())]);
}

#[test]
fn graph_transition_is_published_once() {
    let graph = BehaviorGraph::builder("rest")
        .node("rest", IdleBehavior)
        .node("roam", WanderBehavior::new(3))
        .transition("rest", "roam", 0, |ctx| ctx.cycle().0 >= 2)
        .build()
        .unwrap();
    assert_eq!(graph.name(), "rest");
    let config = WorldConfig::new(6, 6)
        .with_item(ItemSpec::agent(2, 2, 2, 1, "a"))
        .with_item(ItemSpec::packet(5, 5, Color::Red));
    let mut k = Kernel::new(config, with_behavior(Behaviors::new(), 1, graph)).unwrap();
    let rx = k.subscribe();
    for _ in 0..5 {
        k.step().unwrap();
    }
    let changes: Vec<_> = rx
        .try_iter()
        .filter_map(|e| match e {
            Event::Behavior(b) => Some(b),
            _ => None,
        })
        .collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].cycle.0, 2);
    assert_eq!(changes[0].behavior_name, "roam");
    assert_eq!(k.runtime(A1).unwrap().behavior_name(), Some("roam"));
}

#[test]
fn couriers_make_progress_on_the_warehouse() {
    init_tracing();
    let mut behaviors = Behaviors::new();
    for id in 1..=4 {
        behaviors = with_behavior(behaviors, id, CourierBehavior);
    }
    let mut sim = LockstepSimulation::new(fixtures::warehouse(12, 6), behaviors).unwrap();
    let summary = sim.run().unwrap();
    assert!(matches!(summary.end, RunEnd::GameOver | RunEnd::MaxCycles));
    assert!(summary.delivered > 0);
    assert!(!sim.is_disabled());
}

#[test]
fn threaded_runner_hands_the_kernel_back() {
    init_tracing();
    let mut behaviors = Behaviors::new();
    for id in 1..=4 {
        behaviors = with_behavior(behaviors, id, WanderBehavior::new(u64::from(id)));
    }
    let config = fixtures::warehouse(10, 4);
    let limit = config.max_cycles.unwrap();
    let sim = SimulationThread::start(config, behaviors).unwrap();
    let (kernel, reason) = sim.wait().unwrap();
    assert!(matches!(reason, ExitReason::GameOver | ExitReason::MaxCycles));
    assert!(kernel.current_cycle().0 <= limit);

    // The recovered kernel keeps going on the calling thread.
    let mut sim = LockstepSimulation::from_kernel(kernel);
    if reason == ExitReason::MaxCycles {
        assert_eq!(sim.run().unwrap().cycles, 0);
    }
}

fn replay(seed: u64, cycles: usize, workers: usize) -> (Vec<Event>, String) {
    let mut config = fixtures::crowd(6)
        .with_item(ItemSpec::random_generator(0, 5, 50, Color::Red, 0.4, 5));
    config.seed = seed;
    let mut behaviors = Behaviors::new();
    for id in 1..=6u32 {
        let b: Box<dyn Behavior> = Box::new(WanderBehavior::new(seed ^ u64::from(id)));
        behaviors.insert(ActiveItemId::agent(id), b);
    }
    let mut k = Kernel::new(config, behaviors).unwrap();
    let mut events = Vec::new();
    for _ in 0..cycles {
        let report = if workers > 1 {
            k.step_parallel(workers).unwrap()
        } else {
            k.step().unwrap()
        };
        events.extend(report.events);
    }
    (events, k.world().render())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn same_seed_replays_exactly(seed in any::<u64>(), cycles in 1usize..12) {
        let (a_events, a_world) = replay(seed, cycles, 1);
        let (b_events, b_world) = replay(seed, cycles, 1);
        prop_assert_eq!(a_events, b_events);
        prop_assert_eq!(a_world, b_world);
    }

    #[test]
    fn worker_count_does_not_change_the_run(seed in any::<u64>(), workers in 2usize..5) {
        let (a_events, a_world) = replay(seed, 6, 1);
        let (b_events, b_world) = replay(seed, 6, workers);
        prop_assert_eq!(a_events, b_events);
        prop_assert_eq!(a_world, b_world);
    }
}
