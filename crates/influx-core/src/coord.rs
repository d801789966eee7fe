//! Grid coordinates and cardinal directions.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// All 8 offsets around a cell: N, S, W, E, NW, NE, SW, SE.
pub const OFFSETS_8: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// An integer cell position on the grid.
///
/// `x` grows to the east and `y` grows to the south, so `(0, 0)` is the
/// north-west corner. Coordinates are plain values: every operation
/// returns a new coordinate.
///
/// # Examples
///
/// ```
/// use influx_core::Coordinate;
///
/// let a = Coordinate::new(5, 5);
/// let b = Coordinate::new(7, 4);
/// assert_eq!(a.chebyshev(b), 2);
/// assert_eq!(a.manhattan(b), 3);
/// assert_eq!(b.diff(a), Coordinate::new(2, -1));
/// assert_eq!(b.diff(a).sign(), Coordinate::new(1, -1));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Coordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coordinate {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    pub fn diff(self, other: Coordinate) -> Coordinate {
        Coordinate::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise `self + other`.
    pub fn add(self, other: Coordinate) -> Coordinate {
        Coordinate::new(self.x + other.x, self.y + other.y)
    }

    /// Component-wise signum, each axis in `{-1, 0, 1}`.
    pub fn sign(self) -> Coordinate {
        Coordinate::new(self.x.signum(), self.y.signum())
    }

    /// Chebyshev (L-inf) distance: diagonal moves cost 1.
    pub fn chebyshev(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Manhattan (L1) distance.
    pub fn manhattan(self, other: Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The coordinate one step away in `direction`.
    pub fn step(self, direction: Direction) -> Coordinate {
        self.add(direction.offset())
    }

    /// The 8 surrounding coordinates, unclipped.
    pub fn neighbours8(self) -> impl Iterator<Item = Coordinate> {
        OFFSETS_8
            .into_iter()
            .map(move |(dx, dy)| Coordinate::new(self.x + dx, self.y + dy))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One of the four cardinal directions.
///
/// The discriminant is the stable wire code used in item descriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Direction {
    /// Towards `y - 1`.
    North = 0,
    /// Towards `x + 1`.
    East = 1,
    /// Towards `y + 1`.
    South = 2,
    /// Towards `x - 1`.
    West = 3,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The unit offset for this direction.
    pub fn offset(self) -> Coordinate {
        match self {
            Direction::North => Coordinate::new(0, -1),
            Direction::East => Coordinate::new(1, 0),
            Direction::South => Coordinate::new(0, 1),
            Direction::West => Coordinate::new(-1, 0),
        }
    }

    /// Look up a direction by its wire code.
    pub fn from_code(code: i64) -> Option<Direction> {
        match code {
            0 => Some(Direction::North),
            1 => Some(Direction::East),
            2 => Some(Direction::South),
            3 => Some(Direction::West),
            _ => None,
        }
    }

    /// The wire code for this direction.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "e" | "east" => Ok(Direction::East),
            "s" | "south" => Ok(Direction::South),
            "w" | "west" => Ok(Direction::West),
            _ => Err(ParseError::UnknownName {
                kind: "direction",
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn distances_agree_on_axis_moves() {
        let a = Coordinate::new(2, 2);
        let b = Coordinate::new(2, 6);
        assert_eq!(a.chebyshev(b), 4);
        assert_eq!(a.manhattan(b), 4);
    }

    #[test]
    fn diagonal_neighbour_is_chebyshev_one() {
        let a = Coordinate::new(0, 0);
        assert_eq!(a.chebyshev(Coordinate::new(1, 1)), 1);
        assert_eq!(a.manhattan(Coordinate::new(1, 1)), 2);
    }

    #[test]
    fn neighbours8_are_distinct_and_adjacent() {
        let c = Coordinate::new(3, 3);
        let ns: Vec<_> = c.neighbours8().collect();
        assert_eq!(ns.len(), 8);
        for n in &ns {
            assert_eq!(c.chebyshev(*n), 1);
        }
        let mut dedup = ns.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), 8);
    }

    #[test]
    fn direction_codes_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_code(d.code() as i64), Some(d));
        }
        assert_eq!(Direction::from_code(4), None);
    }

    #[test]
    fn direction_offsets_match_screen_axes() {
        let origin = Coordinate::new(5, 5);
        assert_eq!(origin.step(Direction::North), Coordinate::new(5, 4));
        assert_eq!(origin.step(Direction::East), Coordinate::new(6, 5));
        assert_eq!(origin.step(Direction::South), Coordinate::new(5, 6));
        assert_eq!(origin.step(Direction::West), Coordinate::new(4, 5));
    }

    #[test]
    fn direction_parses_names() {
        assert_eq!("north".parse::<Direction>().ok(), Some(Direction::North));
        assert_eq!("W".parse::<Direction>().ok(), Some(Direction::West));
        assert!("up".parse::<Direction>().is_err());
    }

    proptest! {
        #[test]
        fn chebyshev_never_exceeds_manhattan(
            ax in -50i32..50, ay in -50i32..50, bx in -50i32..50, by in -50i32..50,
        ) {
            let a = Coordinate::new(ax, ay);
            let b = Coordinate::new(bx, by);
            prop_assert!(a.chebyshev(b) <= a.manhattan(b));
            prop_assert_eq!(a.chebyshev(b), b.chebyshev(a));
        }

        #[test]
        fn diff_then_add_restores(
            ax in -50i32..50, ay in -50i32..50, bx in -50i32..50, by in -50i32..50,
        ) {
            let a = Coordinate::new(ax, ay);
            let b = Coordinate::new(bx, by);
            prop_assert_eq!(b.add(a.diff(b)), a);
        }
    }
}
