//! Synchronization construction errors.

/// Errors raised while building a synchronization strategy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Distributed mode was configured with no personal synchronizers.
    #[error("distributed synchronization needs at least one personal synchronizer")]
    NoSynchronizers,
    /// The handshake was given no rounds to run in.
    #[error("max_handshake_rounds must be at least 1")]
    NoHandshakeRounds,
}
