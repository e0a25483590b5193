//! What every solver shares.
//!
//! A solver borrows one grid exclusively, resets its cost bookkeeping when
//! constructed and produces a [`Path`] from a single call to
//! [`Solve::solve`]. Solving twice on the same grid sees the visited flags
//! left behind by the first run.

use std::str::FromStr;

use derive_more::Display;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand::Rng;
use thiserror::Error;

use crate::algorithms::astar::AStarSearch;
use crate::algorithms::bidirectional::BiDirectional;
use crate::algorithms::breadth_first::BreadthFirst;
use crate::algorithms::depth_first::DepthFirstBacktracker;
use crate::algorithms::q_learning::QLearning;
use crate::algorithms::uniform_cost::UniformCostSearch;
use crate::cost::FloatCost;
use crate::grid::MazeGrid;
use crate::grid::NeighbourMode;
use crate::grid::Position;
use crate::path::Path;

/// Knobs shared by every solver.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Suppresses progress and timing logs.
    pub quiet: bool,
    /// Forwarded to [`MazeGrid::validate_neighbours_for_solve`].
    pub neighbour_mode: NeighbourMode,
    /// Step cap for searches that may not terminate on their own.
    ///
    /// `None` derives a cap from the grid size.
    pub max_steps: Option<usize>,
}

impl SolverConfig {
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    pub fn with_neighbour_mode(mut self, neighbour_mode: NeighbourMode) -> Self {
        self.neighbour_mode = neighbour_mode;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolveError {
    #[error("Explored {explored} cells without reaching the exit")]
    Unreachable { explored: usize },
    #[error("Search did not converge after {steps} steps")]
    DidNotConverge { steps: usize },
    #[error("Episode {episode} did not reach the exit within {steps} steps")]
    EpisodeStepLimit { episode: usize, steps: usize },
    #[error("Every action from {position} is blocked by a wall")]
    Trapped { position: Position },
}

/// A maze solving algorithm bound to one grid.
pub trait Solve {
    fn name(&self) -> &'static str;

    /// Runs the algorithm to completion.
    ///
    /// On success the path starts at the entry and ends at the exit.
    fn solve(&mut self) -> Result<Path, SolveError>;
}

/// Sets every cell's cost accumulator to infinity.
///
/// Every solver calls this when constructed, before anything runs.
pub(crate) fn reset_costs<G: MazeGrid>(grid: &mut G) {
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            grid.set_cost(Position { row, col }, FloatCost::infinity());
        }
    }
}

/// Logs the start and outcome of a solve unless running quietly.
pub(crate) struct Progress {
    name: &'static str,
    quiet: bool,
    stopwatch: Stopwatch,
}

impl Progress {
    pub(crate) fn start(name: &'static str, quiet: bool) -> Self {
        log::debug!("{name}: solve called");
        if !quiet {
            log::info!("Solving the maze with {name}...");
        }
        Self {
            name,
            quiet,
            stopwatch: Stopwatch::new_started(),
        }
    }

    pub(crate) fn finish(mut self, result: &Result<Path, SolveError>) {
        self.stopwatch.stop();
        let elapsed = self.stopwatch.elapsed();
        log::debug!("{}: leaving solve", self.name);
        if self.quiet {
            return;
        }

        match result {
            Ok(path) => {
                log::info!("Number of moves performed: {}", path.len());
                log::info!("Execution time for algorithm: {}", human_duration(&elapsed));
            }
            Err(e) => {
                log::warn!(
                    "{} failed after {}: {e}",
                    self.name,
                    human_duration(&elapsed)
                );
            }
        }
    }
}

#[inline(always)]
#[cfg(not(feature = "verify"))]
pub(crate) fn verify_walk<G: MazeGrid>(_grid: &G, _path: &Path) {
    // All good... (hopefully)
}
#[inline(always)]
#[cfg(feature = "verify")]
pub(crate) fn verify_walk<G: MazeGrid>(grid: &G, path: &Path) {
    debug_assert!(
        path.connects(grid.entry(), grid.exit()),
        "{path} does not go from {} to {}",
        grid.entry(),
        grid.exit()
    );
    debug_assert!(
        path.is_connected_walk(grid),
        "{path} crosses a wall or jumps between cells"
    );
}

/// The available algorithms.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum SolverKind {
    #[display("breadth-first")]
    BreadthFirst,
    #[display("bidirectional")]
    BiDirectional,
    #[display("depth-first")]
    DepthFirst,
    #[display("uniform-cost")]
    UniformCost,
    #[display("a-star")]
    AStar,
    #[display("q-learning")]
    QLearning,
}

impl SolverKind {
    pub const ALL: [SolverKind; 6] = [
        SolverKind::BreadthFirst,
        SolverKind::BiDirectional,
        SolverKind::DepthFirst,
        SolverKind::UniformCost,
        SolverKind::AStar,
        SolverKind::QLearning,
    ];

    /// Whether the algorithm draws from its random source.
    pub fn is_randomized(&self) -> bool {
        matches!(
            self,
            SolverKind::BiDirectional | SolverKind::DepthFirst | SolverKind::QLearning
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown solver '{0}'")]
pub struct SolverKindParseError(pub String);

impl FromStr for SolverKind {
    type Err = SolverKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| SolverKindParseError(s.to_string()))
    }
}

/// Any of the available solvers, picked at runtime.
#[derive(Debug)]
pub enum Solver<'g, G, R>
where
    G: MazeGrid,
    R: Rng,
{
    BreadthFirst(BreadthFirst<'g, G>),
    BiDirectional(BiDirectional<'g, G, R>),
    DepthFirst(DepthFirstBacktracker<'g, G, R>),
    UniformCost(UniformCostSearch<'g, G>),
    AStar(AStarSearch<'g, G>),
    QLearning(QLearning<'g, G, R>),
}

impl<'g, G, R> Solver<'g, G, R>
where
    G: MazeGrid,
    R: Rng,
{
    /// Builds the `kind` solver. Deterministic solvers drop `rng`.
    pub fn new(kind: SolverKind, grid: &'g mut G, config: SolverConfig, rng: R) -> Self {
        match kind {
            SolverKind::BreadthFirst => Solver::BreadthFirst(BreadthFirst::new(grid, config)),
            SolverKind::BiDirectional => {
                Solver::BiDirectional(BiDirectional::new(grid, config, rng))
            }
            SolverKind::DepthFirst => {
                Solver::DepthFirst(DepthFirstBacktracker::new(grid, config, rng))
            }
            SolverKind::UniformCost => Solver::UniformCost(UniformCostSearch::new(grid, config)),
            SolverKind::AStar => Solver::AStar(AStarSearch::new(grid, config)),
            SolverKind::QLearning => Solver::QLearning(QLearning::new(grid, config, rng)),
        }
    }

    pub fn kind(&self) -> SolverKind {
        match self {
            Solver::BreadthFirst(_) => SolverKind::BreadthFirst,
            Solver::BiDirectional(_) => SolverKind::BiDirectional,
            Solver::DepthFirst(_) => SolverKind::DepthFirst,
            Solver::UniformCost(_) => SolverKind::UniformCost,
            Solver::AStar(_) => SolverKind::AStar,
            Solver::QLearning(_) => SolverKind::QLearning,
        }
    }
}

impl<G, R> Solve for Solver<'_, G, R>
where
    G: MazeGrid,
    R: Rng,
{
    fn name(&self) -> &'static str {
        match self {
            Solver::BreadthFirst(s) => s.name(),
            Solver::BiDirectional(s) => s.name(),
            Solver::DepthFirst(s) => s.name(),
            Solver::UniformCost(s) => s.name(),
            Solver::AStar(s) => s.name(),
            Solver::QLearning(s) => s.name(),
        }
    }

    fn solve(&mut self) -> Result<Path, SolveError> {
        match self {
            Solver::BreadthFirst(s) => s.solve(),
            Solver::BiDirectional(s) => s.solve(),
            Solver::DepthFirst(s) => s.solve(),
            Solver::UniformCost(s) => s.solve(),
            Solver::AStar(s) => s.solve(),
            Solver::QLearning(s) => s.solve(),
        }
    }
}
