//! The perception window and its cells.

use influx_core::{ActiveItemId, Coordinate, LayerKind, Representation};
use influx_world::{collision, World};
use serde::Serialize;
use smallvec::SmallVec;

/// What an item knows about one cell of its window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CellView {
    /// Full contents, bottom layer first. Empty means the cell is free.
    Visible(SmallVec<[Representation; 4]>),
    /// Presence unspecified: the cell may or may not hold anything.
    Unknown,
    /// Something lies here, but its nature is hidden.
    Blocked,
}

impl CellView {
    /// The visible contents, if any.
    pub fn reps(&self) -> Option<&[Representation]> {
        match self {
            CellView::Visible(reps) => Some(reps),
            _ => None,
        }
    }

    /// Whether the cell is visible and holds nothing.
    pub fn is_free(&self) -> bool {
        matches!(self, CellView::Visible(reps) if reps.is_empty())
    }

    /// The visible item of `layer`, if any.
    pub fn get(&self, layer: LayerKind) -> Option<&Representation> {
        self.reps()?.iter().find(|r| r.layer() == layer)
    }

    /// Whether the cell is visible and an agent could stand on it.
    pub fn is_walkable(&self) -> bool {
        self.reps()
            .is_some_and(|reps| reps.iter().all(|r| collision::walkable(r.layer())))
    }
}

/// A rectangular, clipped window of the grid around one active item.
///
/// `offset` is the absolute coordinate of the window's top-left cell;
/// `self_pos` is the observer's position relative to that corner.
///
/// # Examples
///
/// ```
/// use influx_core::{ActiveItemId, Coordinate};
/// use influx_obs::Perception;
/// use influx_world::World;
///
/// let world = World::new(10, 10).unwrap();
/// let p = Perception::capture(&world, ActiveItemId::agent(1), Coordinate::new(1, 8), 3);
/// assert_eq!((p.width(), p.height()), (5, 5));
/// assert_eq!(p.offset(), Coordinate::new(0, 5));
/// assert_eq!(p.self_pos(), Coordinate::new(1, 3));
/// assert!(p.cell(Coordinate::new(4, 9)).is_some());
/// assert!(p.cell(Coordinate::new(5, 9)).is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Perception {
    observer: ActiveItemId,
    width: u32,
    height: u32,
    offset: Coordinate,
    self_pos: Coordinate,
    cells: Vec<CellView>,
}

impl Perception {
    /// Copy the window of radius `view` around `center` out of `world`.
    ///
    /// Bounds are `[max(0, x - view), min(w - 1, x + view)]` on each axis.
    pub fn capture(world: &World, observer: ActiveItemId, center: Coordinate, view: u32) -> Self {
        let (min, max) = world.bounds().window(center, view);
        let width = (max.x - min.x + 1) as u32;
        let height = (max.y - min.y + 1) as u32;
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in min.y..=max.y {
            for x in min.x..=max.x {
                cells.push(CellView::Visible(world.cell(Coordinate::new(x, y))));
            }
        }
        Self {
            observer,
            width,
            height,
            offset: min,
            self_pos: center.diff(min),
            cells,
        }
    }

    /// A window of the given shape with every cell [`CellView::Unknown`].
    pub fn unknown(
        observer: ActiveItemId,
        width: u32,
        height: u32,
        offset: Coordinate,
        self_pos: Coordinate,
    ) -> Self {
        Self {
            observer,
            width,
            height,
            offset,
            self_pos,
            cells: vec![CellView::Unknown; width as usize * height as usize],
        }
    }

    /// Who this perception belongs to.
    pub fn observer(&self) -> ActiveItemId {
        self.observer
    }

    /// Window width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Window height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Absolute coordinate of the top-left cell.
    pub fn offset(&self) -> Coordinate {
        self.offset
    }

    /// Observer position relative to [`offset`](Self::offset).
    pub fn self_pos(&self) -> Coordinate {
        self.self_pos
    }

    /// Observer position in absolute coordinates.
    pub fn self_abs(&self) -> Coordinate {
        self.offset.add(self.self_pos)
    }

    fn slot(&self, rel: Coordinate) -> Option<usize> {
        if rel.x < 0 || rel.y < 0 || rel.x as u32 >= self.width || rel.y as u32 >= self.height {
            return None;
        }
        Some(rel.y as usize * self.width as usize + rel.x as usize)
    }

    /// The cell at a window-relative position.
    pub fn cell_rel(&self, rel: Coordinate) -> Option<&CellView> {
        self.slot(rel).map(|i| &self.cells[i])
    }

    /// The cell at an absolute position, if it lies in the window.
    pub fn cell(&self, abs: Coordinate) -> Option<&CellView> {
        self.cell_rel(abs.diff(self.offset))
    }

    /// Replace the cell at a window-relative position.
    pub fn set_rel(&mut self, rel: Coordinate, view: CellView) {
        if let Some(i) = self.slot(rel) {
            self.cells[i] = view;
        }
    }

    /// The observer's own cell.
    pub fn self_cell(&self) -> Option<&CellView> {
        self.cell_rel(self.self_pos)
    }

    /// Whether an absolute position lies in the window.
    pub fn contains(&self, abs: Coordinate) -> bool {
        self.slot(abs.diff(self.offset)).is_some()
    }

    /// Whether the observer can see that an agent could stand at `abs`.
    pub fn can_walk(&self, abs: Coordinate) -> bool {
        self.cell(abs).is_some_and(CellView::is_walkable)
    }

    /// Every `(absolute coordinate, cell)` pair in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &CellView)> {
        let w = self.width as i32;
        let off = self.offset;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (Coordinate::new(off.x + i as i32 % w, off.y + i as i32 / w), c))
    }

    /// Every visible representation with its absolute coordinate.
    pub fn visible(&self) -> impl Iterator<Item = (Coordinate, &Representation)> {
        self.iter()
            .filter_map(|(at, c)| c.reps().map(|reps| (at, reps)))
            .flat_map(|(at, reps)| reps.iter().map(move |r| (at, r)))
    }

    /// Active items visible in the window, excluding the observer.
    pub fn visible_active(&self) -> Vec<ActiveItemId> {
        let mut ids: Vec<ActiveItemId> = self
            .visible()
            .filter_map(|(_, r)| r.active_id())
            .filter(|id| *id != self.observer)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// The closest visible cell (Chebyshev from the observer) matching `pred`.
    ///
    /// Ties resolve in row-major order.
    pub fn nearest(&self, mut pred: impl FnMut(&Representation) -> bool) -> Option<Coordinate> {
        let me = self.self_abs();
        self.visible()
            .filter(|(_, r)| pred(r))
            .map(|(at, _)| at)
            .min_by_key(|at| at.chebyshev(me))
    }
}
