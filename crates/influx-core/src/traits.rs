//! Traits shared by item types across crates.

use crate::repr::{LayerKind, Representation};

/// An item that can be snapshotted for perception and rendering.
///
/// Every concrete item type implements this so that the perception
/// pipeline can copy cells without knowing the item's internals.
pub trait Representable {
    /// The layer this item lives in.
    fn layer(&self) -> LayerKind;

    /// A read-only snapshot of the item.
    fn representation(&self) -> Representation;
}
