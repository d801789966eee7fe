//! Integer line stepping between two cells.

use influx_core::Coordinate;

/// The cells strictly between `from` and `to` on the integer line joining
/// them, in order from `from`.
///
/// Uses the all-octant error-accumulating variant of Bresenham's
/// algorithm, so diagonal runs advance both axes in one step.
///
/// # Examples
///
/// ```
/// use influx_core::Coordinate;
/// use influx_obs::line::between;
///
/// let cells = between(Coordinate::new(0, 0), Coordinate::new(3, 0));
/// assert_eq!(cells, vec![Coordinate::new(1, 0), Coordinate::new(2, 0)]);
/// assert!(between(Coordinate::new(0, 0), Coordinate::new(1, 1)).is_empty());
/// ```
pub fn between(from: Coordinate, to: Coordinate) -> Vec<Coordinate> {
    let dx = (to.x - from.x).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let dy = -(to.y - from.y).abs();
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut out = Vec::new();
    loop {
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            if x == to.x {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == to.y {
                break;
            }
            err += dx;
            y += sy;
        }
        if x == to.x && y == to.y {
            break;
        }
        out.push(Coordinate::new(x, y));
    }
    out
}
