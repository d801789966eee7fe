//! World configuration, item descriptions, validation, and error types.
//!
//! [`WorldConfig`] is the builder-input for constructing a [`Kernel`](crate::Kernel).
//! Items are described by [`ItemSpec`]s in the shape of the textual world
//! format (constructor name, declared argument count, typed arguments);
//! turning text into specs is left to callers.
//! [`validate()`](WorldConfig::validate) checks structural invariants
//! before the kernel is built.

use influx_core::{ActiveItemId, Color, Coordinate, Direction, ParseError, PriorityClass};
use influx_law::{LawError, LawRegistry};
use influx_obs::PerceptionLawKind;
use influx_sync::{SyncError, SyncMode};
use influx_world::{
    AgentBody, Conveyor, Crumb, Destination, EnergyStation, Flag, Generator, GeneratorRate,
    GridBounds, Packet, Pheromone, PlacedItem, Wall, WorldError,
};

// ── EnergyConfig ───────────────────────────────────────────────────

/// Battery costs and capacity for agents.
///
/// Costs are charged after each applied agent influence. A rejected
/// influence costs `idle`, like a skip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnergyConfig {
    /// When false, batteries never change and no action is degraded.
    /// The kernel clears it for worlds without energy stations.
    pub enabled: bool,
    /// Battery capacity; agents start full. Default: 1000.
    pub battery_max: u32,
    /// Cost of a step with empty hands. Default: 10.
    pub step: u32,
    /// Cost of a step while carrying. Default: 20.
    pub step_with_carry: u32,
    /// Cost of every other influence, including skip. Default: 5.
    pub idle: u32,
    /// Units a station adds per cycle. Default: 100.
    pub station_load: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            battery_max: 1000,
            step: 10,
            step_with_carry: 20,
            idle: 5,
            station_load: 100,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Fatal errors detected while validating a [`WorldConfig`] or building a
/// kernel from it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Grid construction failed.
    #[error("world: {0}")]
    World(#[from] WorldError),
    /// An item could not be placed.
    #[error("item {index} ({class}): {source}")]
    Placement {
        /// Position of the item in the item list.
        index: usize,
        /// Constructor name of the item.
        class: String,
        /// The placement failure.
        #[source]
        source: WorldError,
    },
    /// The law set is incomplete or inconsistent.
    #[error("laws: {0}")]
    Law(#[from] LawError),
    /// The synchronization mode is unusable.
    #[error("synchronization: {0}")]
    Sync(#[from] SyncError),
    /// A color or other named value did not parse.
    #[error("item {index}: {source}")]
    Parse {
        /// Position of the item in the item list.
        index: usize,
        /// The parse failure.
        #[source]
        source: ParseError,
    },
    /// No constructor with this name exists.
    #[error("item {index}: unknown constructor '{class}'")]
    UnknownConstructor {
        /// Position of the item in the item list.
        index: usize,
        /// The unknown name.
        class: String,
    },
    /// The declared argument count differs from the arguments given.
    #[error("item {index} ({class}): declared {declared} arguments, got {given}")]
    ArityMismatch {
        /// Position of the item in the item list.
        index: usize,
        /// Constructor name.
        class: String,
        /// Declared count.
        declared: usize,
        /// Actual count.
        given: usize,
    },
    /// No overload of the constructor accepts these argument types.
    #[error("item {index}: no constructor {class}({signature})")]
    NoMatchingConstructor {
        /// Position of the item in the item list.
        index: usize,
        /// Constructor name.
        class: String,
        /// The argument types given, comma separated.
        signature: String,
    },
    /// An integer argument is out of range for its role.
    #[error("item {index} ({class}): argument {value} out of range")]
    ArgumentOutOfRange {
        /// Position of the item in the item list.
        index: usize,
        /// Constructor name.
        class: String,
        /// The offending value.
        value: i64,
    },
    /// An agent was configured with a zero view range.
    #[error("agent {id} has zero view range")]
    ZeroView {
        /// The agent.
        id: ActiveItemId,
    },
    /// A generator rate is unusable.
    #[error("generator {id}: {reason}")]
    InvalidGeneratorRate {
        /// The generator.
        id: ActiveItemId,
        /// Which invariant was violated.
        reason: String,
    },
    /// EnergyConfig invariant violated.
    #[error("invalid energy config: {reason}")]
    InvalidEnergy {
        /// Which invariant was violated.
        reason: String,
    },
    /// A behavior graph names a node it does not contain.
    #[error("behavior graph has no node named {name:?}")]
    UnknownBehavior {
        /// The missing node name.
        name: String,
    },
    /// A behavior was supplied for an id that is not an agent of the world.
    #[error("behavior supplied for {id}, which is not an agent of this world")]
    BehaviorWithoutAgent {
        /// The id the behavior was keyed by.
        id: ActiveItemId,
    },
    /// The simulation could not be recovered from its thread.
    #[error("kernel could not be recovered from simulation thread")]
    KernelRecoveryFailed,
    /// A background thread could not be spawned.
    #[error("thread spawn failed: {reason}")]
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
}

// ── ItemSpec ───────────────────────────────────────────────────────

/// One typed constructor argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Arg {
    /// A whole number.
    Integer(i64),
    /// A single-precision number.
    Float(f32),
    /// A double-precision number.
    Double(f64),
    /// Text.
    Str(String),
}

impl Arg {
    fn type_name(&self) -> &'static str {
        match self {
            Arg::Integer(_) => "Integer",
            Arg::Float(_) => "Float",
            Arg::Double(_) => "Double",
            Arg::Str(_) => "String",
        }
    }
}

/// An item description: constructor name, declared argument count and
/// typed arguments.
///
/// Constructor names may be qualified (`environment.world.wall.SolidWall`);
/// only the last segment is matched. Supported constructors, with `x, y`
/// always first:
///
/// | Name | Arguments after `x, y` |
/// |------|------------------------|
/// | `Agent` | `view, id, name` or `view, id, name, color` |
/// | `Packet`, `Destination`, `Flag` | `color` |
/// | `Wall`, `SolidWall`, `GlassWall` | none |
/// | `EnergyStation` | `id` |
/// | `PacketGenerator` | `id, color, every: Integer, threshold` or `id, color, chance: Double/Float, threshold` |
/// | `Conveyor` | `id, direction` |
/// | `Crumb` | `count` |
/// | `Pheromone` | `lifetime` |
/// | `DirectedPheromone` | `lifetime, target_x, target_y` |
#[derive(Clone, Debug, PartialEq)]
pub struct ItemSpec {
    /// Constructor name.
    pub class: String,
    /// Argument count as declared in the description.
    pub arg_count: usize,
    /// The arguments.
    pub args: Vec<Arg>,
}

impl ItemSpec {
    /// A spec whose declared count matches `args`.
    pub fn new(class: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            class: class.into(),
            arg_count: args.len(),
            args,
        }
    }

    /// `Agent(x, y, view, id, name)`.
    pub fn agent(x: i32, y: i32, view: u32, id: u32, name: &str) -> Self {
        Self::new(
            "Agent",
            vec![
                int(x),
                int(y),
                Arg::Integer(view.into()),
                Arg::Integer(id.into()),
                Arg::Str(name.to_string()),
            ],
        )
    }

    /// `Agent(x, y, view, id, name, color)`.
    pub fn color_agent(x: i32, y: i32, view: u32, id: u32, name: &str, color: Color) -> Self {
        let mut spec = Self::agent(x, y, view, id, name);
        spec.args.push(Arg::Str(color.name().to_string()));
        spec.arg_count += 1;
        spec
    }

    /// `Packet(x, y, color)`.
    pub fn packet(x: i32, y: i32, color: Color) -> Self {
        Self::new("Packet", vec![int(x), int(y), Arg::Str(color.name().to_string())])
    }

    /// `Destination(x, y, color)`.
    pub fn destination(x: i32, y: i32, color: Color) -> Self {
        Self::new(
            "Destination",
            vec![int(x), int(y), Arg::Str(color.name().to_string())],
        )
    }

    /// `SolidWall(x, y)` or `GlassWall(x, y)`.
    pub fn wall(x: i32, y: i32, see_through: bool) -> Self {
        let class = if see_through { "GlassWall" } else { "SolidWall" };
        Self::new(class, vec![int(x), int(y)])
    }

    /// `EnergyStation(x, y, id)`.
    pub fn station(x: i32, y: i32, id: u32) -> Self {
        Self::new("EnergyStation", vec![int(x), int(y), Arg::Integer(id.into())])
    }

    /// `PacketGenerator(x, y, id, color, every, threshold)`.
    pub fn fixed_generator(x: i32, y: i32, id: u32, color: Color, every: u32, threshold: u32) -> Self {
        Self::new(
            "PacketGenerator",
            vec![
                int(x),
                int(y),
                Arg::Integer(id.into()),
                Arg::Str(color.name().to_string()),
                Arg::Integer(every.into()),
                Arg::Integer(threshold.into()),
            ],
        )
    }

    /// `PacketGenerator(x, y, id, color, chance, threshold)`.
    pub fn random_generator(x: i32, y: i32, id: u32, color: Color, chance: f64, threshold: u32) -> Self {
        Self::new(
            "PacketGenerator",
            vec![
                int(x),
                int(y),
                Arg::Integer(id.into()),
                Arg::Str(color.name().to_string()),
                Arg::Double(chance),
                Arg::Integer(threshold.into()),
            ],
        )
    }

    /// `Conveyor(x, y, id, direction)`.
    pub fn conveyor(x: i32, y: i32, id: u32, direction: Direction) -> Self {
        Self::new(
            "Conveyor",
            vec![
                int(x),
                int(y),
                Arg::Integer(id.into()),
                Arg::Integer(direction.code().into()),
            ],
        )
    }

    /// `Flag(x, y, color)`.
    pub fn flag(x: i32, y: i32, color: Color) -> Self {
        Self::new("Flag", vec![int(x), int(y), Arg::Str(color.name().to_string())])
    }

    /// `Crumb(x, y, count)`.
    pub fn crumb(x: i32, y: i32, count: u32) -> Self {
        Self::new("Crumb", vec![int(x), int(y), Arg::Integer(count.into())])
    }

    /// The constructor name without any package qualification.
    pub fn short_class(&self) -> &str {
        self.class.rsplit('.').next().unwrap_or(&self.class)
    }

    /// Check arity and argument types and build the item.
    ///
    /// `index` is the spec's position in the item list, used in errors.
    /// Agents start with `battery` units.
    pub fn instantiate(
        &self,
        index: usize,
        battery: u32,
    ) -> Result<(Coordinate, PlacedItem), ConfigError> {
        if self.arg_count != self.args.len() {
            return Err(ConfigError::ArityMismatch {
                index,
                class: self.class.clone(),
                declared: self.arg_count,
                given: self.args.len(),
            });
        }
        let b = ArgBinder { spec: self, index };
        let class = self.short_class();
        let known = matches!(
            class,
            "Agent"
                | "Packet"
                | "Destination"
                | "Flag"
                | "Wall"
                | "SolidWall"
                | "GlassWall"
                | "EnergyStation"
                | "PacketGenerator"
                | "Conveyor"
                | "Crumb"
                | "Pheromone"
                | "DirectedPheromone"
        );
        if !known {
            return Err(ConfigError::UnknownConstructor {
                index,
                class: self.class.clone(),
            });
        }

        use Arg::{Double, Float, Integer, Str};
        let at = match self.args.as_slice() {
            [Integer(x), Integer(y), ..] => Coordinate::new(b.i32(*x)?, b.i32(*y)?),
            _ => return Err(b.no_match()),
        };
        let item = match (class, self.args.as_slice()) {
            ("Agent", [Integer(_), Integer(_), Integer(view), Integer(id), Str(name)]) => {
                PlacedItem::Agent(AgentBody::new(b.u32(*id)?, name.as_str(), b.u32(*view)?, battery))
            }
            ("Agent", [Integer(_), Integer(_), Integer(view), Integer(id), Str(name), Str(color)]) => {
                let mut body = AgentBody::new(b.u32(*id)?, name.as_str(), b.u32(*view)?, battery);
                body.color_restriction = Some(b.color(color)?);
                PlacedItem::Agent(body)
            }
            ("Packet", [Integer(_), Integer(_), Str(color)]) => PlacedItem::Packet(Packet {
                color: b.color(color)?,
            }),
            ("Destination", [Integer(_), Integer(_), Str(color)]) => {
                PlacedItem::Destination(Destination {
                    color: b.color(color)?,
                    delivered: 0,
                })
            }
            ("Flag", [Integer(_), Integer(_), Str(color)]) => PlacedItem::Flag(Flag {
                color: b.color(color)?,
            }),
            ("Wall" | "SolidWall", [Integer(_), Integer(_)]) => {
                PlacedItem::Wall(Wall { see_through: false })
            }
            ("GlassWall", [Integer(_), Integer(_)]) => PlacedItem::Wall(Wall { see_through: true }),
            ("EnergyStation", [Integer(_), Integer(_), Integer(id)]) => {
                PlacedItem::EnergyStation(EnergyStation {
                    id: ActiveItemId::new(b.u32(*id)?, PriorityClass::EnergyStation),
                })
            }
            (
                "PacketGenerator",
                [Integer(_), Integer(_), Integer(id), Str(color), Integer(every), Integer(threshold)],
            ) => PlacedItem::Generator(Generator::new(
                ActiveItemId::new(b.u32(*id)?, PriorityClass::Generator),
                b.color(color)?,
                GeneratorRate::Fixed { every: b.u32(*every)? },
                b.u32(*threshold)?,
            )),
            (
                "PacketGenerator",
                [Integer(_), Integer(_), Integer(id), Str(color), Double(chance), Integer(threshold)],
            ) => b.random_generator(*id, color, *chance, *threshold)?,
            (
                "PacketGenerator",
                [Integer(_), Integer(_), Integer(id), Str(color), Float(chance), Integer(threshold)],
            ) => b.random_generator(*id, color, f64::from(*chance), *threshold)?,
            ("Conveyor", [Integer(_), Integer(_), Integer(id), Integer(dir)]) => {
                let direction = Direction::from_code(*dir).ok_or(ConfigError::ArgumentOutOfRange {
                    index,
                    class: self.class.clone(),
                    value: *dir,
                })?;
                PlacedItem::Conveyor(Conveyor {
                    id: ActiveItemId::new(b.u32(*id)?, PriorityClass::Conveyor),
                    direction,
                })
            }
            ("Crumb", [Integer(_), Integer(_), Integer(count)]) => PlacedItem::Crumb(Crumb {
                count: b.u32(*count)?,
            }),
            ("Pheromone", [Integer(_), Integer(_), Integer(lifetime)]) => {
                PlacedItem::Pheromone(Pheromone::new(b.u32(*lifetime)?, None))
            }
            (
                "DirectedPheromone",
                [Integer(_), Integer(_), Integer(lifetime), Integer(tx), Integer(ty)],
            ) => PlacedItem::Pheromone(Pheromone::new(
                b.u32(*lifetime)?,
                Some(Coordinate::new(b.i32(*tx)?, b.i32(*ty)?)),
            )),
            _ => return Err(b.no_match()),
        };
        Ok((at, item))
    }
}

fn int(v: i32) -> Arg {
    Arg::Integer(v.into())
}

struct ArgBinder<'a> {
    spec: &'a ItemSpec,
    index: usize,
}

impl ArgBinder<'_> {
    fn out_of_range(&self, value: i64) -> ConfigError {
        ConfigError::ArgumentOutOfRange {
            index: self.index,
            class: self.spec.class.clone(),
            value,
        }
    }

    fn no_match(&self) -> ConfigError {
        ConfigError::NoMatchingConstructor {
            index: self.index,
            class: self.spec.class.clone(),
            signature: self
                .spec
                .args
                .iter()
                .map(Arg::type_name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn random_generator(
        &self,
        id: i64,
        color: &str,
        chance: f64,
        threshold: i64,
    ) -> Result<PlacedItem, ConfigError> {
        Ok(PlacedItem::Generator(Generator::new(
            ActiveItemId::new(self.u32(id)?, PriorityClass::Generator),
            self.color(color)?,
            GeneratorRate::Random { chance },
            self.u32(threshold)?,
        )))
    }

    fn u32(&self, v: i64) -> Result<u32, ConfigError> {
        u32::try_from(v).map_err(|_| self.out_of_range(v))
    }

    fn i32(&self, v: i64) -> Result<i32, ConfigError> {
        i32::try_from(v).map_err(|_| self.out_of_range(v))
    }

    fn color(&self, name: &str) -> Result<Color, ConfigError> {
        name.parse().map_err(|source| ConfigError::Parse {
            index: self.index,
            source,
        })
    }
}

// ── WorldConfig ────────────────────────────────────────────────────

/// Everything needed to build a [`Kernel`](crate::Kernel).
///
/// Consumed by [`Kernel::new`](crate::Kernel::new). Not `Clone`, since
/// the law registry holds boxed laws; build a fresh config per kernel.
#[derive(Debug)]
pub struct WorldConfig {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Items to place, in order.
    pub items: Vec<ItemSpec>,
    /// Synchronization strategy. Default: central.
    pub sync: SyncMode,
    /// Perception laws, applied in order. Default: none.
    pub perception: Vec<PerceptionLawKind>,
    /// Battery accounting.
    pub energy: EnergyConfig,
    /// Law set. Default: the standard library.
    pub laws: LawRegistry,
    /// Seed for generator randomness and seeded behaviors. Default: 0.
    pub seed: u64,
    /// Message rounds per distributed handshake. Default: 8.
    pub max_handshake_rounds: u32,
    /// Consecutive stalled cycles before a liveness warning escalates. Default: 3.
    pub stall_grace_cycles: u32,
    /// Stop runners after this many cycles. Default: unbounded.
    pub max_cycles: Option<u64>,
}

impl WorldConfig {
    /// An empty `width` by `height` world with default settings.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
            sync: SyncMode::Central,
            perception: Vec::new(),
            energy: EnergyConfig::default(),
            laws: LawRegistry::standard(),
            seed: 0,
            max_handshake_rounds: 8,
            stall_grace_cycles: 3,
            max_cycles: None,
        }
    }

    /// Append an item.
    pub fn with_item(mut self, item: ItemSpec) -> Self {
        self.items.push(item);
        self
    }

    /// Validate every structural invariant.
    ///
    /// Checks:
    /// - the grid is non-empty,
    /// - the law set covers every influence kind,
    /// - the synchronization mode is buildable,
    /// - energy settings are coherent,
    /// - every item instantiates and its active parts are well formed.
    ///
    /// Placement conflicts are detected when the kernel places items.
    pub fn validate(&self) -> Result<(), ConfigError> {
        GridBounds::new(self.width, self.height)?;
        self.laws.validate_complete()?;
        if self.max_handshake_rounds == 0 {
            return Err(SyncError::NoHandshakeRounds.into());
        }
        if let SyncMode::Distributed { synchronizers: 0 } = self.sync {
            return Err(SyncError::NoSynchronizers.into());
        }
        if self.energy.enabled && self.energy.battery_max == 0 {
            return Err(ConfigError::InvalidEnergy {
                reason: "battery_max must be at least 1".to_string(),
            });
        }
        if self.energy.step_with_carry < self.energy.step {
            return Err(ConfigError::InvalidEnergy {
                reason: "step_with_carry must not be below step".to_string(),
            });
        }
        for (index, spec) in self.items.iter().enumerate() {
            let (_, item) = spec.instantiate(index, self.energy.battery_max)?;
            check_item(&item)?;
        }
        Ok(())
    }
}

fn check_item(item: &PlacedItem) -> Result<(), ConfigError> {
    match item {
        PlacedItem::Agent(a) if a.view == 0 => Err(ConfigError::ZeroView { id: a.id }),
        PlacedItem::Generator(g) => match g.rate {
            GeneratorRate::Fixed { every: 0 } => Err(ConfigError::InvalidGeneratorRate {
                id: g.id,
                reason: "fixed rate period must be at least 1".to_string(),
            }),
            GeneratorRate::Random { chance } if !(0.0..=1.0).contains(&chance) => {
                Err(ConfigError::InvalidGeneratorRate {
                    id: g.id,
                    reason: format!("chance {chance} outside [0, 1]"),
                })
            }
            _ => Ok(()),
        },
        _ => Ok(()),
    }
}
