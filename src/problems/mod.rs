//! Mazes the solvers can run on.
//!
//! Solvers only see the [`MazeGrid`](crate::grid::MazeGrid) trait. The grids
//! here are the in-crate implementations of it, used by tests and benches.

pub mod walled_maze;
