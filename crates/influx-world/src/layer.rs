//! A sparse map from coordinate to at most one item.

use indexmap::IndexMap;
use influx_core::{Coordinate, LayerKind};

use crate::error::WorldError;

/// One world layer: at most one `T` per cell.
///
/// Iteration order is insertion order with swap-removal, so identical
/// operation sequences always iterate identically.
#[derive(Clone, Debug)]
pub struct Layer<T> {
    kind: LayerKind,
    cells: IndexMap<Coordinate, T>,
}

impl<T> Layer<T> {
    /// An empty layer of the given kind.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            cells: IndexMap::new(),
        }
    }

    /// The layer tag.
    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    /// The item at `c`.
    pub fn get(&self, c: Coordinate) -> Option<&T> {
        self.cells.get(&c)
    }

    /// Mutable access to the item at `c`.
    pub fn get_mut(&mut self, c: Coordinate) -> Option<&mut T> {
        self.cells.get_mut(&c)
    }

    /// Whether `c` holds an item.
    pub fn contains(&self, c: Coordinate) -> bool {
        self.cells.contains_key(&c)
    }

    /// Put `item` at an empty cell.
    pub fn insert(&mut self, c: Coordinate, item: T) -> Result<(), WorldError> {
        if self.cells.contains_key(&c) {
            return Err(WorldError::Occupied {
                layer: self.kind,
                coord: c,
            });
        }
        self.cells.insert(c, item);
        Ok(())
    }

    /// Put `item` at `c`, returning what was there.
    pub fn replace(&mut self, c: Coordinate, item: T) -> Option<T> {
        self.cells.insert(c, item)
    }

    /// Take the item at `c`.
    pub fn remove(&mut self, c: Coordinate) -> Option<T> {
        self.cells.swap_remove(&c)
    }

    /// Move the item at `from` to the empty cell `to`.
    pub fn relocate(&mut self, from: Coordinate, to: Coordinate) -> Result<(), WorldError> {
        if from == to {
            return if self.contains(from) {
                Ok(())
            } else {
                Err(WorldError::Missing {
                    layer: self.kind,
                    coord: from,
                })
            };
        }
        if self.contains(to) {
            return Err(WorldError::Occupied {
                layer: self.kind,
                coord: to,
            });
        }
        let item = self.remove(from).ok_or(WorldError::Missing {
            layer: self.kind,
            coord: from,
        })?;
        self.cells.insert(to, item);
        Ok(())
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the layer is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every `(cell, item)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &T)> {
        self.cells.iter().map(|(c, t)| (*c, t))
    }

    /// Every `(cell, item)` pair, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Coordinate, &mut T)> {
        self.cells.iter_mut().map(|(c, t)| (*c, t))
    }

    /// Keep only the items for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(Coordinate, &mut T) -> bool) {
        self.cells.retain(|c, t| keep(*c, t));
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_item_per_cell() {
        let mut l: Layer<u8> = Layer::new(LayerKind::Packet);
        let c = Coordinate::new(1, 2);
        l.insert(c, 1).unwrap();
        assert!(matches!(
            l.insert(c, 2),
            Err(WorldError::Occupied {
                layer: LayerKind::Packet,
                ..
            })
        ));
        assert_eq!(l.get(c), Some(&1));
    }

    #[test]
    fn relocate_moves_item() {
        let mut l: Layer<&str> = Layer::new(LayerKind::Agent);
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(1, 0);
        l.insert(a, "x").unwrap();
        l.relocate(a, b).unwrap();
        assert!(!l.contains(a));
        assert_eq!(l.get(b), Some(&"x"));
    }

    #[test]
    fn relocate_onto_occupied_fails_without_change() {
        let mut l: Layer<u8> = Layer::new(LayerKind::Agent);
        let a = Coordinate::new(0, 0);
        let b = Coordinate::new(1, 0);
        l.insert(a, 1).unwrap();
        l.insert(b, 2).unwrap();
        assert!(l.relocate(a, b).is_err());
        assert_eq!(l.get(a), Some(&1));
        assert_eq!(l.get(b), Some(&2));
    }

    #[test]
    fn relocate_missing_reports_layer() {
        let mut l: Layer<u8> = Layer::new(LayerKind::Conveyor);
        let err = l
            .relocate(Coordinate::new(0, 0), Coordinate::new(0, 1))
            .unwrap_err();
        assert_eq!(
            err,
            WorldError::Missing {
                layer: LayerKind::Conveyor,
                coord: Coordinate::new(0, 0)
            }
        );
    }
}
