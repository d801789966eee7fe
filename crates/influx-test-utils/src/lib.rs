//! Test behaviors and world fixtures for Influx development.
//!
//! Provides deterministic [`Behavior`] implementations for driving agents
//! in tests and benchmarks ([`ScriptedBehavior`], [`WanderBehavior`],
//! [`CourierBehavior`]) and ready-made [`WorldConfig`](influx_engine::WorldConfig)s in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use influx_core::{Coordinate, Influence, Representation};
use influx_engine::{AgentContext, Behavior, Behaviors};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use influx_engine::IdleBehavior;

type Move = Box<dyn FnMut(&mut AgentContext<'_>) -> Influence + Send>;

/// Plays a fixed list of moves, one per cycle, then skips forever.
///
/// ```ignore
/// let script = ScriptedBehavior::new("courier")
///     .then(|ctx| ctx.pick_packet(Coordinate::new(5, 6)))
///     .then(|ctx| ctx.step(Coordinate::new(6, 6)));
/// ```
pub struct ScriptedBehavior {
    name: String,
    moves: VecDeque<Move>,
    said: VecDeque<Option<String>>,
}

impl ScriptedBehavior {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            moves: VecDeque::new(),
            said: VecDeque::new(),
        }
    }

    /// Append a move.
    pub fn then(
        mut self,
        f: impl FnMut(&mut AgentContext<'_>) -> Influence + Send + 'static,
    ) -> Self {
        self.moves.push_back(Box::new(f));
        self
    }

    /// Broadcast `text` in the talk phase of the next unspoken cycle.
    pub fn say(mut self, text: impl Into<String>) -> Self {
        self.said.push_back(Some(text.into()));
        self
    }

    /// Stay silent for one talk phase.
    pub fn quiet(mut self) -> Self {
        self.said.push_back(None);
        self
    }

    /// Moves not yet played.
    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl Behavior for ScriptedBehavior {
    fn name(&self) -> &str {
        &self.name
    }

    fn communicate(&mut self, ctx: &mut AgentContext<'_>) {
        if let Some(Some(text)) = self.said.pop_front() {
            ctx.broadcast(text);
        }
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        match self.moves.pop_front() {
            Some(mut f) => f(ctx),
            None => ctx.skip(),
        }
    }
}

/// Steps onto a random walkable neighbour each cycle.
///
/// Seeded, so two agents built with the same seed walk the same way.
#[derive(Clone, Debug)]
pub struct WanderBehavior {
    rng: ChaCha8Rng,
}

impl WanderBehavior {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Behavior for WanderBehavior {
    fn name(&self) -> &str {
        "wander"
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        let me = ctx.coordinate();
        let open: Vec<Coordinate> = me
            .neighbours8()
            .filter(|c| ctx.can_walk(c.x, c.y))
            .collect();
        if open.is_empty() {
            return ctx.skip();
        }
        let pick = self.rng.random_range(0..open.len());
        ctx.step(open[pick])
    }
}

/// Fetches the nearest visible packet it may handle and carries it to the
/// nearest visible destination of that color. Also empties adjacent
/// generator buffers. Skips when nothing useful is in view.
#[derive(Clone, Copy, Debug, Default)]
pub struct CourierBehavior;

impl CourierBehavior {
    fn toward(ctx: &AgentContext<'_>, goal: Coordinate) -> Influence {
        let me = ctx.coordinate();
        me.neighbours8()
            .filter(|c| ctx.can_walk(c.x, c.y))
            .min_by_key(|c| (c.chebyshev(goal), c.manhattan(goal)))
            .filter(|c| c.chebyshev(goal) < me.chebyshev(goal))
            .map_or_else(|| ctx.skip(), |c| ctx.step(c))
    }
}

impl Behavior for CourierBehavior {
    fn name(&self) -> &str {
        "courier"
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        let me = ctx.coordinate();
        if let Some(carry) = ctx.carry() {
            let goal = ctx.perception().nearest(
                |r| matches!(r, Representation::Destination { color, .. } if *color == carry),
            );
            return match goal {
                Some(goal) if goal.chebyshev(me) == 1 => ctx.put_packet(goal),
                Some(goal) => Self::toward(ctx, goal),
                None => ctx.skip(),
            };
        }
        let packet = ctx
            .perception()
            .nearest(|r| matches!(r, Representation::Packet { color } if ctx.handles(*color)));
        let buffered = ctx.perception().nearest(|r| {
            matches!(r, Representation::Generator { color, buffered, .. }
                if *buffered > 0 && ctx.handles(*color))
        });
        match (packet, buffered) {
            (Some(p), _) if p.chebyshev(me) == 1 => ctx.pick_packet(p),
            (_, Some(g)) if g.chebyshev(me) == 1 => ctx.pick_generator_packet(g),
            (Some(p), _) => Self::toward(ctx, p),
            (None, Some(g)) => Self::toward(ctx, g),
            (None, None) => ctx.skip(),
        }
    }
}

/// Records every mailbox it sees, by cycle, into a shared log.
#[derive(Clone, Debug, Default)]
pub struct ListenerBehavior {
    heard: Arc<Mutex<Vec<(u64, String)>>>,
}

impl ListenerBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the log, readable after the behavior moves into
    /// a kernel.
    pub fn log(&self) -> Arc<Mutex<Vec<(u64, String)>>> {
        Arc::clone(&self.heard)
    }
}

impl Behavior for ListenerBehavior {
    fn name(&self) -> &str {
        "listener"
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        if let Ok(mut heard) = self.heard.lock() {
            for mail in ctx.mailbox() {
                heard.push((ctx.cycle().0, mail.text.clone()));
            }
        }
        ctx.skip()
    }
}

/// Insert `behavior` for agent `id` into a behavior map.
pub fn with_behavior(mut behaviors: Behaviors, id: u32, behavior: impl Behavior) -> Behaviors {
    behaviors.insert(influx_core::ActiveItemId::agent(id), Box::new(behavior));
    behaviors
}
