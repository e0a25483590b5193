use crate::cost::FloatCost;
use crate::cost::step_cost;
use crate::grid::MazeGrid;
use crate::grid::Position;
use crate::path::Path;
use crate::solver::Progress;
use crate::solver::Solve;
use crate::solver::SolveError;
use crate::solver::SolverConfig;
use crate::solver::reset_costs;
use crate::solver::verify_walk;

/// Step-greedy cost search.
///
/// Only the validated neighbours of the current cell are compared: the
/// cheapest single step wins, the first one on ties. There is no look-ahead
/// and no global frontier, so the result is not a cheapest route. Dead ends
/// backtrack exactly like [`DepthFirstBacktracker`].
///
/// [`DepthFirstBacktracker`]: crate::algorithms::depth_first::DepthFirstBacktracker
#[derive(Debug)]
pub struct UniformCostSearch<'g, G: MazeGrid> {
    grid: &'g mut G,
    config: SolverConfig,
}

impl<'g, G: MazeGrid> UniformCostSearch<'g, G> {
    pub fn new(grid: &'g mut G, config: SolverConfig) -> Self {
        log::debug!("UniformCostSearch: constructed on {grid:?}");
        reset_costs(grid);
        Self { grid, config }
    }

    /// The cheapest step out of `from`, first one on ties.
    fn cheapest(from: Position, candidates: &[Position]) -> Option<Position> {
        let mut best: Option<(FloatCost, Position)> = None;
        for &next in candidates {
            let cost = step_cost(from, next);
            if best.is_none_or(|(min, _)| cost < min) {
                best = Some((cost, next));
            }
        }
        best.map(|(_, next)| next)
    }

    fn search(&mut self) -> Result<Path, SolveError> {
        let goal = self.grid.exit();
        let mut current = self.grid.entry();
        self.grid.set_visited(current);
        let mut explored = 1usize;

        let mut backtrack = Vec::<Position>::new();
        let mut path = Path::new();

        while current != goal {
            let candidates = self.grid.neighbours(current);
            let valid = self.grid.validate_neighbours_for_solve(
                &candidates,
                current,
                goal,
                self.config.neighbour_mode,
            );

            if let Some(next) = Self::cheapest(current, &valid) {
                backtrack.push(current);
                path.push_forward(current);
                self.grid.set_visited(next);
                explored += 1;
                current = next;
            } else if let Some(previous) = backtrack.pop() {
                path.push_backtrack(current);
                current = previous;
            } else {
                return Err(SolveError::Unreachable { explored });
            }
        }
        path.push_forward(current);

        verify_walk(&*self.grid, &path);
        Ok(path)
    }
}

impl<G: MazeGrid> Solve for UniformCostSearch<'_, G> {
    fn name(&self) -> &'static str {
        "Uniform Cost Search"
    }

    fn solve(&mut self) -> Result<Path, SolveError> {
        let progress = Progress::start(self.name(), self.config.quiet);
        let result = self.search();
        progress.finish(&result);
        result
    }
}
