//! Per-cycle synchronization for the Influx simulation kernel.
//!
//! Before an active item's cycle can conclude it must agree with its
//! *sync set*: the other items whose influences it may conflict with.
//! Two strategies implement [`Synchronization`]:
//!
//! - [`CentralSynchronization`]: every item syncs with every other item,
//!   a global barrier.
//! - [`DistributedSynchronization`]: each item owns a
//!   [`PersonalSynchronizer`] that runs a request/ack/commit/confirm
//!   handshake with nearby items only, tracked per partner as a
//!   [`SyncElement`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod central;
pub mod distributed;
pub mod element;
pub mod error;
pub mod message;
pub mod personal;
pub mod strategy;

pub use central::CentralSynchronization;
pub use distributed::DistributedSynchronization;
pub use element::{SyncElement, SyncState};
pub use error::SyncError;
pub use message::{Message, MessageKind};
pub use personal::PersonalSynchronizer;
pub use strategy::{Candidates, LivenessWarning, SyncMode, SyncReport, Synchronization};
