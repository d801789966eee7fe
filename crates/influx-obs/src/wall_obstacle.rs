//! Line-of-sight occlusion by solid walls.

use influx_core::Coordinate;
use influx_world::collision;

use crate::chain::PerceptionLaw;
use crate::line;
use crate::perception::{CellView, Perception};

/// Hides every visible cell whose line from the observer passes through a
/// solid wall.
///
/// Hidden cells become [`CellView::Blocked`]. Only cells strictly between
/// the observer and the target, and inside the window, can obstruct; the
/// wall itself stays visible. Glass walls never obstruct.
#[derive(Clone, Copy, Debug, Default)]
pub struct WallObstacle;

impl WallObstacle {
    /// Whether the line from the observer to `target` (window-relative)
    /// crosses a solid wall.
    pub fn obstructed(perception: &Perception, target: Coordinate) -> bool {
        line::between(perception.self_pos(), target)
            .into_iter()
            .any(|c| {
                perception
                    .cell_rel(c)
                    .and_then(CellView::reps)
                    .is_some_and(|reps| reps.iter().any(|r| !collision::see_through(r)))
            })
    }
}

impl PerceptionLaw for WallObstacle {
    fn name(&self) -> &str {
        "wall_obstacle"
    }

    fn enforce(&self, perception: Perception) -> Perception {
        let mut out = perception.clone();
        for y in 0..perception.height() as i32 {
            for x in 0..perception.width() as i32 {
                let rel = Coordinate::new(x, y);
                let visible = matches!(perception.cell_rel(rel), Some(CellView::Visible(_)));
                if visible && Self::obstructed(&perception, rel) {
                    out.set_rel(rel, CellView::Blocked);
                }
            }
        }
        out
    }
}
