use rand::Rng;
use rand::seq::IndexedRandom;
use rustc_hash::FxHashSet;

use crate::grid::MazeGrid;
use crate::grid::Neighbours;
use crate::grid::Position;
use crate::path::Path;
use crate::solver::Progress;
use crate::solver::Solve;
use crate::solver::SolveError;
use crate::solver::SolverConfig;
use crate::solver::reset_costs;

/// One of the two random walks.
#[derive(Debug)]
struct Arm {
    current: Position,
    backtrack: Vec<Position>,
    path: Path,
    /// Cells this arm has left with a forward step.
    forward: FxHashSet<Position>,
}

impl Arm {
    fn new(start: Position) -> Self {
        Self {
            current: start,
            backtrack: vec![],
            path: Path::new(),
            forward: FxHashSet::default(),
        }
    }

    fn push_forward(&mut self) {
        self.path.push_forward(self.current);
        self.forward.insert(self.current);
    }

    /// Steps into a random cell of `open`, or retreats one cell.
    ///
    /// Returns whether the arm moved at all.
    fn advance<G: MazeGrid, R: Rng>(&mut self, grid: &mut G, open: &[Position], rng: &mut R) -> bool {
        if let Some(&next) = open.choose(rng) {
            self.backtrack.push(self.current);
            self.push_forward();
            grid.set_visited(next);
            self.current = next;
            true
        } else if let Some(previous) = self.backtrack.pop() {
            self.path.push_backtrack(self.current);
            self.current = previous;
            true
        } else {
            false
        }
    }

    /// Whether any of `cells` was left forward by this arm.
    fn crossed_any(&self, cells: &[Position]) -> bool {
        cells.iter().any(|c| self.forward.contains(c))
    }
}

/// Two depth-first random walks, from the entry and from the exit, advanced
/// in lockstep until one stands next to a cell the other walked out of.
///
/// The result alternates one step from each walk, cut at the shorter one, so
/// it is a replay of both walks rather than a single route.
///
/// The walks may never meet. The search gives up with
/// [`SolveError::DidNotConverge`] when neither walk can move, or after
/// `max_steps` lockstep steps (`4 * rows * cols + 4` when unset).
#[derive(Debug)]
pub struct BiDirectional<'g, G: MazeGrid, R: Rng> {
    grid: &'g mut G,
    config: SolverConfig,
    rng: R,
}

impl<'g, G: MazeGrid, R: Rng> BiDirectional<'g, G, R> {
    pub fn new(grid: &'g mut G, config: SolverConfig, rng: R) -> Self {
        log::debug!("BiDirectional: constructed on {grid:?}");
        reset_costs(grid);
        Self { grid, config, rng }
    }

    fn max_steps(&self) -> usize {
        self.config
            .max_steps
            .unwrap_or(4 * self.grid.rows() * self.grid.cols() + 4)
    }

    /// Wall-free neighbours of `p`, and those among them not yet visited.
    fn options(&self, p: Position) -> (Neighbours, Neighbours) {
        let real = self.grid.real_neighbours(p);
        let open = real
            .iter()
            .copied()
            .filter(|n| !self.grid.is_visited(*n))
            .collect();
        (real, open)
    }

    fn search(&mut self) -> Result<Path, SolveError> {
        let mut from_entry = Arm::new(self.grid.entry());
        let mut from_exit = Arm::new(self.grid.exit());
        self.grid.set_visited(from_entry.current);
        self.grid.set_visited(from_exit.current);

        let max_steps = self.max_steps();
        let mut steps = 0usize;

        while steps < max_steps {
            steps += 1;

            // Both arms look before either moves.
            let (real_entry, open_entry) = self.options(from_entry.current);
            let (real_exit, open_exit) = self.options(from_exit.current);

            let moved_entry = from_entry.advance(&mut *self.grid, &open_entry, &mut self.rng);
            let moved_exit = from_exit.advance(&mut *self.grid, &open_exit, &mut self.rng);

            if from_exit.crossed_any(&real_entry) {
                from_entry.push_forward();
                log::trace!("BiDirectional: met after {steps} steps near {}", from_entry.current);
                return Ok(Path::interleave(&from_entry.path, &from_exit.path));
            }
            if from_entry.crossed_any(&real_exit) {
                from_exit.push_forward();
                log::trace!("BiDirectional: met after {steps} steps near {}", from_exit.current);
                return Ok(Path::interleave(&from_entry.path, &from_exit.path));
            }

            if !moved_entry && !moved_exit {
                log::debug!("BiDirectional: both walks are stuck");
                return Err(SolveError::DidNotConverge { steps });
            }
        }

        Err(SolveError::DidNotConverge { steps })
    }
}

impl<G: MazeGrid, R: Rng> Solve for BiDirectional<'_, G, R> {
    fn name(&self) -> &'static str {
        "Bi Directional"
    }

    fn solve(&mut self) -> Result<Path, SolveError> {
        let progress = Progress::start(self.name(), self.config.quiet);
        let result = self.search();
        progress.finish(&result);
        result
    }
}
