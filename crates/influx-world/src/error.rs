//! Error types for world construction and mutation.

use influx_core::{ActiveItemId, Coordinate, LayerKind};
use thiserror::Error;

/// Errors arising from placing or moving items.
///
/// During configuration these are fatal; during the apply phase they
/// indicate the kernel tried to apply an influence a law had not checked,
/// which disables the kernel.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// Attempted to build a grid with zero cells.
    #[error("grid must have at least one cell, got {width}x{height}")]
    EmptyGrid {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// A coordinate lies outside the grid.
    #[error("coordinate {coord} out of bounds for {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coordinate,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The layer already holds an item at this cell.
    #[error("{layer} layer already occupied at {coord}")]
    Occupied {
        /// The layer.
        layer: LayerKind,
        /// The cell.
        coord: Coordinate,
    },
    /// An item of another layer forbids sharing the cell.
    #[error("{incoming} cannot share {coord} with {occupant}")]
    Collision {
        /// Layer of the item being placed.
        incoming: LayerKind,
        /// Layer of the item already there.
        occupant: LayerKind,
        /// The cell.
        coord: Coordinate,
    },
    /// The numeric id is already used by another active item.
    #[error("duplicate active item id {id}")]
    DuplicateActiveItem {
        /// The duplicated id.
        id: ActiveItemId,
    },
    /// No active item with this id is registered.
    #[error("unknown active item {id}")]
    UnknownActiveItem {
        /// The missing id.
        id: ActiveItemId,
    },
    /// Expected an item in a layer but found none.
    #[error("no {layer} at {coord}")]
    Missing {
        /// The layer.
        layer: LayerKind,
        /// The cell.
        coord: Coordinate,
    },
}
