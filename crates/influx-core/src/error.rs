//! Error types shared across the Influx workspace.
//!
//! Only value-level parse failures live here; subsystem errors
//! (configuration, world placement, cycle execution) are defined by the
//! crates that own those subsystems.

use thiserror::Error;

/// Failure to interpret a textual name as a core value type.
///
/// Produced when item descriptions name a color, direction or priority
/// class that does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The name does not match any known variant.
    #[error("unknown {kind} '{name}'")]
    UnknownName {
        /// Which value type was being parsed.
        kind: &'static str,
        /// The offending input.
        name: String,
    },
}
