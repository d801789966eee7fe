//! Per-item execution: perceive, talk and act for one active item.

use influx_core::{
    ActiveItemId, BehaviorChange, Coordinate, CycleId, Direction, Influence, PriorityClass,
};
use influx_obs::{Perception, PerceptionChain};
use influx_world::World;
use tracing::debug;

use crate::agent::{AgentContext, Memory, Phase};
use crate::behavior::Behavior;
use crate::config::EnergyConfig;
use crate::energy;
use crate::error::CycleError;
use crate::outcome::{Mail, Outcome, OutcomeKind};
use crate::policy::{self, GeneratorPolicy};

/// Perception radius of stations, generators and conveyors.
pub const FIXED_VIEW: u32 = 1;

/// How an active item decides.
pub enum Controller {
    /// A behavior-driven agent.
    Agent {
        /// The decision procedure.
        behavior: Box<dyn Behavior>,
        /// Private memory.
        memory: Memory,
        /// Behavior name reported after the last act phase.
        last_name: String,
    },
    /// An energy station.
    Station {
        /// Units delivered per cycle.
        load: u32,
    },
    /// A packet generator.
    Generator(GeneratorPolicy),
    /// A conveyor belt.
    Conveyor {
        /// Transport direction.
        direction: Direction,
    },
}

impl Controller {
    /// Wrap an agent behavior.
    pub fn agent(behavior: Box<dyn Behavior>) -> Self {
        let last_name = behavior.name().to_string();
        Controller::Agent {
            behavior,
            memory: Memory::new(),
            last_name,
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Controller::Agent {
                behavior, memory, ..
            } => f
                .debug_struct("Agent")
                .field("behavior", &behavior.name())
                .field("memory", &memory.len())
                .finish(),
            Controller::Station { load } => f.debug_struct("Station").field("load", load).finish(),
            Controller::Generator(p) => f.debug_tuple("Generator").field(p).finish(),
            Controller::Conveyor { direction } => f
                .debug_struct("Conveyor")
                .field("direction", direction)
                .finish(),
        }
    }
}

/// The execution unit of one active item.
///
/// Holds the item's controller and the perception of the current cycle.
/// Reads the world only; proposals leave as [`Outcome`]s.
#[derive(Debug)]
pub struct ActiveItemRuntime {
    id: ActiveItemId,
    controller: Controller,
    perception: Option<Perception>,
}

impl ActiveItemRuntime {
    /// A runtime for `id` driven by `controller`.
    pub fn new(id: ActiveItemId, controller: Controller) -> Self {
        Self {
            id,
            controller,
            perception: None,
        }
    }

    /// The item's id.
    pub fn id(&self) -> ActiveItemId {
        self.id
    }

    /// The item's priority class.
    pub fn class(&self) -> PriorityClass {
        self.id.class
    }

    /// The perception taken this cycle.
    pub fn perception(&self) -> Option<&Perception> {
        self.perception.as_ref()
    }

    /// Current behavior name, for agents.
    pub fn behavior_name(&self) -> Option<&str> {
        match &self.controller {
            Controller::Agent { behavior, .. } => Some(behavior.name()),
            _ => None,
        }
    }

    /// Agent memory, for agents.
    pub fn memory(&self) -> Option<&Memory> {
        match &self.controller {
            Controller::Agent { memory, .. } => Some(memory),
            _ => None,
        }
    }

    fn locate(&self, world: &World) -> Result<Coordinate, CycleError> {
        world
            .locate(self.id)
            .ok_or(CycleError::UnknownActiveItem { id: self.id })
    }

    fn view(&self, world: &World) -> Result<u32, CycleError> {
        match self.controller {
            Controller::Agent { .. } => world
                .agent(self.id)
                .map(|a| a.view)
                .ok_or(CycleError::UnknownActiveItem { id: self.id }),
            _ => Ok(FIXED_VIEW),
        }
    }

    // ── Phases ─────────────────────────────────────────────────────

    /// Take this cycle's perception. Returns the active items it shows,
    /// which become the item's synchronization candidates.
    pub fn perceive(
        &mut self,
        world: &World,
        chain: &PerceptionChain,
    ) -> Result<Vec<ActiveItemId>, CycleError> {
        let at = self.locate(world)?;
        let view = self.view(world)?;
        let perception = chain.perceive(world, self.id, at, view);
        let candidates = perception.visible_active();
        self.perception = Some(perception);
        Ok(candidates)
    }

    /// Acknowledge the perception.
    pub fn perception_outcome(&self, sync_set: Vec<ActiveItemId>) -> Outcome {
        Outcome::new(self.id, sync_set, OutcomeKind::Perception)
    }

    /// Talk phase. Only agents send mail.
    pub fn talk(
        &mut self,
        world: &World,
        cycle: CycleId,
        mailbox: &[Mail],
        sync_set: Vec<ActiveItemId>,
    ) -> Result<Outcome, CycleError> {
        let mut mails = Vec::new();
        if let Controller::Agent {
            behavior, memory, ..
        } = &mut self.controller
        {
            let at = world
                .locate(self.id)
                .ok_or(CycleError::UnknownActiveItem { id: self.id })?;
            let body = world
                .agent(self.id)
                .ok_or(CycleError::UnknownActiveItem { id: self.id })?;
            let fallback;
            let perception = match &self.perception {
                Some(p) => p,
                None => {
                    fallback = Perception::capture(world, self.id, at, body.view);
                    &fallback
                }
            };
            let mut ctx =
                AgentContext::new(body, at, cycle, Phase::Talk, perception, memory, mailbox);
            behavior.communicate(&mut ctx);
            mails = ctx.take_outbox();
        }
        Ok(Outcome::new(
            self.id,
            sync_set,
            OutcomeKind::Communication { mails },
        ))
    }

    /// Act phase: the item's single influence for this cycle.
    ///
    /// Agent proposals pass through the energy gate. A change of behavior
    /// name is returned alongside the outcome.
    pub fn act(
        &mut self,
        world: &World,
        cycle: CycleId,
        mailbox: &[Mail],
        energy: &EnergyConfig,
        sync_set: Vec<ActiveItemId>,
    ) -> Result<(Outcome, Option<BehaviorChange>), CycleError> {
        let at = self.locate(world)?;
        let id = self.id;
        let mut change = None;
        let influence = match &mut self.controller {
            Controller::Agent {
                behavior,
                memory,
                last_name,
            } => {
                let body = world
                    .agent(id)
                    .ok_or(CycleError::UnknownActiveItem { id })?;
                let fallback;
                let perception = match &self.perception {
                    Some(p) => p,
                    None => {
                        fallback = Perception::capture(world, id, at, body.view);
                        &fallback
                    }
                };
                let mut ctx =
                    AgentContext::new(body, at, cycle, Phase::Act, perception, memory, mailbox);
                let mut proposed = behavior.act(&mut ctx);
                if proposed.source != id {
                    debug!(entity = %id, claimed = %proposed.source, "proposal under foreign id replaced by skip");
                    proposed = Influence::skip(id, at);
                }
                if behavior.name() != last_name.as_str() {
                    *last_name = behavior.name().to_string();
                    change = Some(BehaviorChange {
                        cycle,
                        entity: id,
                        behavior_name: last_name.clone(),
                    });
                }
                energy::gate(proposed, body.battery, body.carry.is_some(), energy)
            }
            Controller::Station { load } => policy::station(id, at, *load),
            Controller::Generator(schedule) => match world.generators().get(at) {
                Some(generator) => schedule.decide(at, generator),
                None => return Err(CycleError::UnknownActiveItem { id }),
            },
            Controller::Conveyor { direction } => {
                let fallback;
                let perception = match &self.perception {
                    Some(p) => p,
                    None => {
                        fallback = Perception::capture(world, id, at, FIXED_VIEW);
                        &fallback
                    }
                };
                policy::conveyor(id, at, *direction, perception)
            }
        };
        Ok((
            Outcome::new(id, sync_set, OutcomeKind::Action { influence }),
            change,
        ))
    }
}

// Compile-time assertion: runtimes move onto worker threads during the
// parallel act phase.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<ActiveItemRuntime>();
    }
};
