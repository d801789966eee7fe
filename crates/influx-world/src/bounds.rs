//! Rectangular grid bounds and window clipping.

use influx_core::Coordinate;
use serde::Serialize;

use crate::error::WorldError;

/// Width and height of the grid. Valid cells are `0..width` by `0..height`.
///
/// # Examples
///
/// ```
/// use influx_core::Coordinate;
/// use influx_world::GridBounds;
///
/// let b = GridBounds::new(10, 8).unwrap();
/// assert!(b.contains(Coordinate::new(9, 7)));
/// assert!(!b.contains(Coordinate::new(10, 0)));
/// assert_eq!(b.cell_count(), 80);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct GridBounds {
    width: u32,
    height: u32,
}

impl GridBounds {
    /// Construct bounds; both dimensions must be non-zero and fit in `i32`.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(WorldError::EmptyGrid { width, height });
        }
        Ok(Self { width, height })
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `c` lies on the grid.
    pub fn contains(&self, c: Coordinate) -> bool {
        resolve_axis(c.x, self.width).is_some() && resolve_axis(c.y, self.height).is_some()
    }

    /// `Ok(())` if `c` lies on the grid.
    pub fn check(&self, c: Coordinate) -> Result<(), WorldError> {
        if self.contains(c) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds {
                coord: c,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The window of radius `view` around `center`, clipped to the grid.
    ///
    /// Returns `(min, max)` corners, both inclusive.
    pub fn window(&self, center: Coordinate, view: u32) -> (Coordinate, Coordinate) {
        let r = view.min(i32::MAX as u32) as i32;
        let w = self.width as i32;
        let h = self.height as i32;
        let min = Coordinate::new(
            center.x.saturating_sub(r).max(0),
            center.y.saturating_sub(r).max(0),
        );
        let max = Coordinate::new(
            center.x.saturating_add(r).min(w - 1),
            center.y.saturating_add(r).min(h - 1),
        );
        (min, max)
    }

    /// Every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        let w = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..w).map(move |x| Coordinate::new(x, y)))
    }
}

/// Resolve an axis value, `None` when it falls off the grid.
fn resolve_axis(val: i32, len: u32) -> Option<i32> {
    if val >= 0 && (val as u32) < len {
        Some(val)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            GridBounds::new(0, 5),
            Err(WorldError::EmptyGrid { width: 0, height: 5 })
        ));
        assert!(GridBounds::new(5, 0).is_err());
    }

    #[test]
    fn window_clips_at_corners() {
        let b = GridBounds::new(10, 10).unwrap();
        let (min, max) = b.window(Coordinate::new(1, 8), 3);
        assert_eq!(min, Coordinate::new(0, 5));
        assert_eq!(max, Coordinate::new(4, 9));
    }

    #[test]
    fn window_inside_grid_is_full_size() {
        let b = GridBounds::new(20, 20).unwrap();
        let (min, max) = b.window(Coordinate::new(10, 10), 2);
        assert_eq!(max.x - min.x + 1, 5);
        assert_eq!(max.y - min.y + 1, 5);
    }

    #[test]
    fn iter_visits_every_cell_once() {
        let b = GridBounds::new(3, 2).unwrap();
        let cells: Vec<_> = b.iter().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Coordinate::new(0, 0));
        assert_eq!(cells[5], Coordinate::new(2, 1));
    }

    #[test]
    fn check_reports_bounds() {
        let b = GridBounds::new(4, 4).unwrap();
        assert!(b.check(Coordinate::new(3, 3)).is_ok());
        assert!(matches!(
            b.check(Coordinate::new(-1, 0)),
            Err(WorldError::OutOfBounds { .. })
        ));
    }
}
