//! The grid queries the solvers rely on.
//!
//! Solvers never own the maze. They borrow it exclusively for one solve,
//! ask it for neighbours and walls, and leave visited flags behind so the
//! caller can render what was explored.

use std::fmt::Debug;

use derive_more::Display;
use smallvec::SmallVec;

use crate::cost::FloatCost;

pub type Coord = usize;

/// A cell coordinate as `(row, col)`.
///
/// Ordering is row-major, which is also the tie-break used by priority
/// frontiers.
#[derive(Copy, Clone, Debug, Display, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("({row},{col})")]
pub struct Position {
    pub row: Coord,
    pub col: Coord,
}

impl Position {
    #[inline(always)]
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    /// Whether `other` shares an edge with this cell.
    #[inline(always)]
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<(Coord, Coord)> for Position {
    fn from((row, col): (Coord, Coord)) -> Self {
        Self { row, col }
    }
}

/// Neighbour lists never exceed the four orthogonal directions.
pub type Neighbours = SmallVec<[Position; 4]>;

/// The four orthogonal moves.
///
/// The discriminant doubles as the action index of a Q-table row.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Move {
    #[display("↑")]
    Up = 0, // row--
    #[display("↓")]
    Down = 1, // row++
    #[display("←")]
    Left = 2, // col--
    #[display("→")]
    Right = 3, // col++
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline(always)]
    pub fn from_index(i: usize) -> Option<Move> {
        Self::ALL.get(i).copied()
    }

    /// Applies the move, clamping to a `rows`x`cols` grid.
    ///
    /// Moving into an edge leaves the position unchanged.
    pub fn apply_clamped(self, p: Position, rows: Coord, cols: Coord) -> Position {
        debug_assert!(p.row < rows && p.col < cols);

        #[rustfmt::skip]
        let (row, col) = match self {
            Move::Up    => (p.row.saturating_sub(1), p.col),
            Move::Down  => (p.row + 1,               p.col),
            Move::Left  => (p.row,                   p.col.saturating_sub(1)),
            Move::Right => (p.row,                   p.col + 1),
        };

        Position {
            row: row.min(rows.saturating_sub(1)),
            col: col.min(cols.saturating_sub(1)),
        }
    }
}

/// Which candidates a grid offers while solving.
///
/// The policy is owned by the grid; solvers only forward it.
#[derive(Copy, Clone, Debug, Display, Default, PartialEq, Eq, Hash)]
pub enum NeighbourMode {
    /// Only the open, unvisited candidate closest to the goal.
    #[default]
    #[display("fancy")]
    Fancy,
    /// Every open, unvisited candidate.
    #[display("brute-force")]
    BruteForce,
}

/// The maze as seen by a solver.
///
/// Implementations own the cells. The visited flag and the cost accumulator
/// are the only state a solver writes.
pub trait MazeGrid: Debug {
    fn rows(&self) -> Coord;
    fn cols(&self) -> Coord;
    fn entry(&self) -> Position;
    fn exit(&self) -> Position;

    /// In-bounds orthogonal cells around `p`, walls ignored.
    fn neighbours(&self, p: Position) -> Neighbours;

    /// Filters `candidates` down to what a solver standing on `current` may
    /// step into next, according to `mode`.
    ///
    /// An empty result means no candidate qualifies.
    fn validate_neighbours_for_solve(
        &self,
        candidates: &[Position],
        current: Position,
        goal: Position,
        mode: NeighbourMode,
    ) -> Neighbours;

    fn is_wall_between(&self, a: Position, b: Position) -> bool;

    fn is_visited(&self, p: Position) -> bool;
    fn set_visited(&mut self, p: Position);

    fn cost(&self, p: Position) -> FloatCost;
    fn set_cost(&mut self, p: Position, c: FloatCost);

    /// Neighbours of `p` reachable without crossing a wall.
    fn real_neighbours(&self, p: Position) -> Neighbours {
        self.neighbours(p)
            .into_iter()
            .filter(|n| !self.is_wall_between(p, *n))
            .collect()
    }

    /// Every cell, in row-major order.
    fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols();
        (0..self.rows()).flat_map(move |row| (0..cols).map(move |col| Position { row, col }))
    }

    fn num_cells(&self) -> usize {
        self.rows() * self.cols()
    }

    fn contains(&self, p: Position) -> bool {
        p.row < self.rows() && p.col < self.cols()
    }
}
