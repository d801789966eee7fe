//! Registry configuration errors.

use influx_core::InfluenceKind;
use thiserror::Error;

/// Errors from building or querying a [`LawRegistry`](crate::LawRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LawError {
    /// No law is registered for this kind.
    #[error("no law registered for influence kind {kind}")]
    Missing {
        /// The unregistered kind.
        kind: InfluenceKind,
    },
    /// A second law was registered for a kind.
    #[error("law '{second}' conflicts with '{first}' for influence kind {kind}")]
    Duplicate {
        /// The contested kind.
        kind: InfluenceKind,
        /// Name of the law already registered.
        first: String,
        /// Name of the rejected law.
        second: String,
    },
}
