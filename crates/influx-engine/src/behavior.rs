//! Agent decision making.
//!
//! A [`Behavior`] decides an agent's mail and influence from an
//! [`AgentContext`]. [`BehaviorGraph`] composes named behaviors with
//! guarded, prioritized transitions; the runtime publishes a behavior
//! change whenever the reported [`name`](Behavior::name) changes.

use indexmap::IndexMap;
use influx_core::Influence;

use crate::agent::AgentContext;
use crate::config::ConfigError;

/// An agent's decision procedure.
///
/// `Send + 'static` so agents can be driven from worker threads.
pub trait Behavior: Send + 'static {
    /// Human-readable name, reported in behavior-change events.
    fn name(&self) -> &str;

    /// Talk phase. Send mail through `ctx`. Default: stay silent.
    fn communicate(&mut self, ctx: &mut AgentContext<'_>) {
        let _ = ctx;
    }

    /// Act phase. Return this cycle's influence, built through `ctx`.
    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence;
}

/// Always skips. Agents without a configured behavior get this one.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdleBehavior;

impl Behavior for IdleBehavior {
    fn name(&self) -> &str {
        "idle"
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        ctx.skip()
    }
}

// ── BehaviorGraph ──────────────────────────────────────────────────

/// Transition guard, evaluated against the act-phase context.
pub type Guard = Box<dyn Fn(&AgentContext<'_>) -> bool + Send>;

struct Transition {
    from: String,
    to: String,
    priority: u32,
    guard: Guard,
}

/// A state machine over named behaviors.
///
/// At the start of each act phase the transitions leaving the current node
/// are tried in ascending `priority` (declaration order breaks ties); the
/// first guard that holds moves the graph, then the new node acts. At most
/// one transition fires per cycle.
///
/// # Examples
///
/// ```
/// use influx_engine::{BehaviorGraph, IdleBehavior};
///
/// let graph = BehaviorGraph::builder("rest")
///     .node("rest", IdleBehavior)
///     .node("work", IdleBehavior)
///     .transition("rest", "work", 0, |ctx| ctx.battery() > 500)
///     .transition("work", "rest", 0, |ctx| ctx.battery() < 100)
///     .build()
///     .unwrap();
/// assert_eq!(influx_engine::Behavior::name(&graph), "rest");
/// ```
pub struct BehaviorGraph {
    nodes: IndexMap<String, Box<dyn Behavior>>,
    transitions: Vec<Transition>,
    current: usize,
}

impl BehaviorGraph {
    /// Start building a graph that begins in `start`.
    pub fn builder(start: impl Into<String>) -> BehaviorGraphBuilder {
        BehaviorGraphBuilder {
            start: start.into(),
            nodes: IndexMap::new(),
            transitions: Vec::new(),
        }
    }

    /// Name of the current node.
    pub fn current(&self) -> &str {
        self.nodes
            .get_index(self.current)
            .map_or("", |(name, _)| name.as_str())
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn advance(&mut self, ctx: &AgentContext<'_>) {
        let from = self.current();
        let next = self
            .transitions
            .iter()
            .filter(|t| t.from == from)
            .find(|t| (t.guard)(ctx))
            .and_then(|t| self.nodes.get_index_of(&t.to));
        if let Some(next) = next {
            self.current = next;
        }
    }
}

impl Behavior for BehaviorGraph {
    fn name(&self) -> &str {
        self.current()
    }

    fn communicate(&mut self, ctx: &mut AgentContext<'_>) {
        if let Some((_, node)) = self.nodes.get_index_mut(self.current) {
            node.communicate(ctx);
        }
    }

    fn act(&mut self, ctx: &mut AgentContext<'_>) -> Influence {
        self.advance(ctx);
        match self.nodes.get_index_mut(self.current) {
            Some((_, node)) => node.act(ctx),
            None => ctx.skip(),
        }
    }
}

impl std::fmt::Debug for BehaviorGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("transitions", &self.transitions.len())
            .field("current", &self.current())
            .finish()
    }
}

/// Builder for [`BehaviorGraph`].
pub struct BehaviorGraphBuilder {
    start: String,
    nodes: IndexMap<String, Box<dyn Behavior>>,
    transitions: Vec<Transition>,
}

impl BehaviorGraphBuilder {
    /// Add a node. A later node with the same name replaces the earlier one.
    pub fn node(mut self, name: impl Into<String>, behavior: impl Behavior) -> Self {
        self.nodes.insert(name.into(), Box::new(behavior));
        self
    }

    /// Add a transition from `from` to `to`. Lower `priority` is tried first.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        priority: u32,
        guard: impl Fn(&AgentContext<'_>) -> bool + Send + 'static,
    ) -> Self {
        self.transitions.push(Transition {
            from: from.into(),
            to: to.into(),
            priority,
            guard: Box::new(guard),
        });
        self
    }

    /// Check every referenced node exists and build the graph.
    pub fn build(mut self) -> Result<BehaviorGraph, ConfigError> {
        let current = self
            .nodes
            .get_index_of(&self.start)
            .ok_or_else(|| ConfigError::UnknownBehavior {
                name: self.start.clone(),
            })?;
        for t in &self.transitions {
            for name in [&t.from, &t.to] {
                if !self.nodes.contains_key(name) {
                    return Err(ConfigError::UnknownBehavior { name: name.clone() });
                }
            }
        }
        // Stable: equal priorities keep declaration order.
        self.transitions.sort_by_key(|t| t.priority);
        Ok(BehaviorGraph {
            nodes: self.nodes,
            transitions: self.transitions,
            current,
        })
    }
}

impl std::fmt::Debug for BehaviorGraphBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviorGraphBuilder")
            .field("start", &self.start)
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .finish()
    }
}
