//! The law registry: exactly one law per influence kind.

use indexmap::IndexMap;
use influx_core::{Influence, InfluenceKind};
use influx_world::World;
use tracing::debug;

use crate::error::LawError;
use crate::law::Law;
use crate::laws;

/// Maps each influence kind to the law that judges it.
///
/// Lookups are keyed by tag; no dynamic type inspection is involved.
///
/// # Examples
///
/// ```
/// use influx_core::{ActiveItemId, Coordinate, Influence, InfluenceKind};
/// use influx_law::LawRegistry;
/// use influx_world::World;
///
/// let registry = LawRegistry::standard();
/// assert!(registry.validate_complete().is_ok());
///
/// let world = World::new(4, 4).unwrap();
/// let skip = Influence::skip(ActiveItemId::agent(1), Coordinate::new(0, 0));
/// assert_eq!(registry.evaluate(&skip, &world), Ok(true));
/// ```
#[derive(Default)]
pub struct LawRegistry {
    laws: IndexMap<InfluenceKind, Box<dyn Law>>,
}

impl LawRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in law for every influence kind.
    pub fn standard() -> Self {
        let mut reg = Self::new();
        for law in laws::standard() {
            reg.laws.insert(law.kind(), Box::new(law));
        }
        reg
    }

    /// Register a law. Fails if its kind already has one.
    pub fn register(&mut self, law: Box<dyn Law>) -> Result<(), LawError> {
        let kind = law.kind();
        if let Some(first) = self.laws.get(&kind) {
            return Err(LawError::Duplicate {
                kind,
                first: first.name().to_string(),
                second: law.name().to_string(),
            });
        }
        self.laws.insert(kind, law);
        Ok(())
    }

    /// Register a law, displacing any previous law for its kind.
    pub fn replace(&mut self, law: Box<dyn Law>) -> Option<Box<dyn Law>> {
        self.laws.insert(law.kind(), law)
    }

    /// The law for `kind`.
    pub fn get(&self, kind: InfluenceKind) -> Option<&dyn Law> {
        self.laws.get(&kind).map(|b| b.as_ref())
    }

    /// Number of registered laws.
    pub fn len(&self) -> usize {
        self.laws.len()
    }

    /// Whether no laws are registered.
    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }

    /// `Ok(())` if every influence kind has a law.
    pub fn validate_complete(&self) -> Result<(), LawError> {
        match InfluenceKind::ALL
            .into_iter()
            .find(|k| !self.laws.contains_key(k))
        {
            Some(kind) => Err(LawError::Missing { kind }),
            None => Ok(()),
        }
    }

    /// Judge `influence` with the law registered for its kind.
    pub fn evaluate(&self, influence: &Influence, world: &World) -> Result<bool, LawError> {
        let kind = influence.kind();
        let law = self.get(kind).ok_or(LawError::Missing { kind })?;
        let legal = law.applicable(influence) && law.apply(influence, world);
        if !legal {
            debug!(law = law.name(), entity = %influence.source, target = %influence.target, "influence rejected");
        }
        Ok(legal)
    }
}

impl std::fmt::Debug for LawRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.laws.values().map(|l| l.name()))
            .finish()
    }
}
