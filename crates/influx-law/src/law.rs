//! The [`Law`] trait and the function-backed [`FnLaw`].

use influx_core::{Influence, InfluenceKind};
use influx_world::World;

/// A pure legality predicate for one influence kind.
///
/// # Contract
///
/// - `apply()` MUST NOT mutate anything; it takes `&World`.
/// - `apply()` MUST be deterministic for a given influence and world.
/// - `kind()` is read once at registration.
///
/// # Examples
///
/// A law that only allows skipping on even columns:
///
/// ```
/// use influx_core::{ActiveItemId, Coordinate, Influence, InfluenceKind};
/// use influx_law::Law;
/// use influx_world::World;
///
/// struct EvenSkip;
///
/// impl Law for EvenSkip {
///     fn name(&self) -> &str { "even_skip" }
///     fn kind(&self) -> InfluenceKind { InfluenceKind::Skip }
///     fn apply(&self, influence: &Influence, _world: &World) -> bool {
///         influence.origin.x % 2 == 0
///     }
/// }
///
/// let world = World::new(4, 4).unwrap();
/// let skip = Influence::skip(ActiveItemId::agent(1), Coordinate::new(2, 0));
/// assert!(EvenSkip.applicable(&skip));
/// assert!(EvenSkip.apply(&skip, &world));
/// ```
pub trait Law: Send + Sync + 'static {
    /// Human-readable name for logs and error reports.
    fn name(&self) -> &str;

    /// The influence kind this law judges.
    fn kind(&self) -> InfluenceKind;

    /// Whether this law judges `influence`.
    fn applicable(&self, influence: &Influence) -> bool {
        influence.kind() == self.kind()
    }

    /// Whether `influence` is legal against `world` right now.
    fn apply(&self, influence: &Influence, world: &World) -> bool;
}

/// Signature of a law predicate.
pub type LawFn = fn(&Influence, &World) -> bool;

/// A law backed by a plain function.
#[derive(Clone, Copy, Debug)]
pub struct FnLaw {
    name: &'static str,
    kind: InfluenceKind,
    check: LawFn,
}

impl FnLaw {
    /// Wrap `check` as the law for `kind`.
    pub const fn new(name: &'static str, kind: InfluenceKind, check: LawFn) -> Self {
        Self { name, kind, check }
    }
}

impl Law for FnLaw {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> InfluenceKind {
        self.kind
    }

    fn apply(&self, influence: &Influence, world: &World) -> bool {
        (self.check)(influence, world)
    }
}
