//! Handshake messages exchanged between personal synchronizers.

use influx_core::ActiveItemId;
use serde::Serialize;

/// The four handshake phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MessageKind {
    /// Ask a partner to synchronize.
    Request,
    /// Accept a request.
    Ack,
    /// Commit to the cycle.
    Commit,
    /// Confirm a commit.
    Confirm,
}

/// One handshake message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Phase.
    pub kind: MessageKind,
    /// Sender.
    pub from: ActiveItemId,
    /// Recipient.
    pub to: ActiveItemId,
    /// Sender's logical time.
    pub time: u64,
}
