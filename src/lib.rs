// Grid
// ----
pub mod grid;
pub mod problems;

// Costs and paths
// ---------------
pub mod cost;
pub mod path;

// Solvers
// -------
pub mod algorithms;
pub mod solver;

pub use grid::MazeGrid;
pub use grid::NeighbourMode;
pub use grid::Position;
pub use path::Path;
pub use path::Step;
pub use problems::walled_maze::WalledMaze;
pub use solver::Solve;
pub use solver::SolveError;
pub use solver::Solver;
pub use solver::SolverConfig;
pub use solver::SolverKind;
