use std::collections::VecDeque;

use crate::grid::MazeGrid;
use crate::path::Path;
use crate::solver::Progress;
use crate::solver::Solve;
use crate::solver::SolveError;
use crate::solver::SolverConfig;
use crate::solver::reset_costs;

/// Level-by-level search.
///
/// The path is the order in which cells were visited, not a route. Cells are
/// offered by the grid's neighbour validation, so the `neighbour_mode` decides
/// how wide each level gets. A cell offered by two parents of the same level is
/// queued twice and appears twice in the path.
///
/// [`SolveError::Unreachable`] means the validated frontier ran dry. With
/// [`NeighbourMode::Fancy`](crate::grid::NeighbourMode::Fancy) each cell offers
/// a single neighbour, so one dead end ends the search even when the exit is
/// connected.
#[derive(Debug)]
pub struct BreadthFirst<'g, G: MazeGrid> {
    grid: &'g mut G,
    config: SolverConfig,
}

impl<'g, G: MazeGrid> BreadthFirst<'g, G> {
    pub fn new(grid: &'g mut G, config: SolverConfig) -> Self {
        log::debug!("BreadthFirst: constructed on {grid:?}");
        reset_costs(grid);
        Self { grid, config }
    }

    fn search(&mut self) -> Result<Path, SolveError> {
        let goal = self.grid.exit();
        let mut current_level = VecDeque::from([self.grid.entry()]);
        let mut path = Path::new();

        while !current_level.is_empty() {
            let mut next_level = Vec::new();

            while let Some(cell) = current_level.pop_front() {
                self.grid.set_visited(cell);
                path.push_forward(cell);

                if cell == goal {
                    return Ok(path);
                }

                let candidates = self.grid.neighbours(cell);
                let valid = self.grid.validate_neighbours_for_solve(
                    &candidates,
                    cell,
                    goal,
                    self.config.neighbour_mode,
                );
                next_level.extend(valid);
            }

            current_level.extend(next_level);
        }

        Err(SolveError::Unreachable {
            explored: path.len(),
        })
    }
}

impl<G: MazeGrid> Solve for BreadthFirst<'_, G> {
    fn name(&self) -> &'static str {
        "Breadth First"
    }

    fn solve(&mut self) -> Result<Path, SolveError> {
        let progress = Progress::start(self.name(), self.config.quiet);
        let result = self.search();
        progress.finish(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::algorithms::test_mazes::{CORRIDOR, LOOPED, SEALED, maze};
    use crate::grid::NeighbourMode;
    use crate::grid::Position;
    use crate::problems::walled_maze::WalledMaze;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn brute_force() -> SolverConfig {
        SolverConfig::quiet().with_neighbour_mode(NeighbourMode::BruteForce)
    }

    #[test]
    fn corridor() {
        let mut maze = maze(CORRIDOR);
        let path = BreadthFirst::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();

        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            (0..5).map(|col| p(0, col)).collect::<Vec<_>>()
        );
        assert_eq!(path.backtracks(), 0);
    }

    #[test]
    fn visits_level_by_level() {
        let mut maze = WalledMaze::open(2, 2, p(0, 0), p(1, 1));
        let path = BreadthFirst::new(&mut maze, brute_force()).solve().unwrap();

        // The exit is popped before its second copy.
        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![p(0, 0), p(0, 1), p(1, 0), p(1, 1)]
        );
        assert_eq!(maze.visited_count(), 4);
    }

    #[test]
    fn keeps_cells_queued_twice() {
        let mut maze = WalledMaze::open(3, 3, p(0, 0), p(2, 2));
        let path = BreadthFirst::new(&mut maze, brute_force()).solve().unwrap();

        #[rustfmt::skip]
        let expected = vec![
            p(0, 0),
            p(0, 1), p(1, 0),
            p(0, 2), p(1, 1), p(1, 1), p(2, 0),
            p(1, 2), p(1, 2), p(2, 1), p(1, 2), p(2, 1), p(2, 1),
            p(2, 2),
        ];
        assert_eq!(path.positions().collect::<Vec<_>>(), expected);
        assert_eq!(maze.visited_count(), 9);
    }

    #[test]
    fn stops_at_exit() {
        let mut maze = WalledMaze::open(3, 3, p(0, 0), p(0, 1));
        let path = BreadthFirst::new(&mut maze, brute_force()).solve().unwrap();

        assert_eq!(path.positions().collect::<Vec<_>>(), vec![p(0, 0), p(0, 1)]);
        assert!(!maze.is_visited(p(1, 0)));
        assert!(!maze.is_visited(p(2, 2)));
    }

    #[test]
    fn looped() {
        let mut maze = maze(LOOPED);
        let path = BreadthFirst::new(&mut maze, brute_force()).solve().unwrap();

        assert!(path.connects(maze.entry(), maze.exit()));
        assert_eq!(path.backtracks(), 0);
        // (1,3) is offered by both (0,3) and (1,2).
        assert_eq!(path.len(), 13);
        assert_eq!(path.positions().filter(|c| *c == p(1, 3)).count(), 2);
        for c in path.positions() {
            assert!(maze.is_visited(c));
        }
    }

    #[test]
    fn fancy_mode_follows_a_single_chain() {
        let mut maze = maze(LOOPED);
        let path = BreadthFirst::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();

        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![p(0, 0), p(1, 0), p(1, 1), p(2, 1), p(2, 2), p(3, 2), p(3, 3)]
        );
        assert!(path.is_connected_walk(&maze));
    }

    #[test]
    fn fancy_frontier_can_run_dry() {
        // (1,2) and (2,1) are equally close to the exit. The first is a dead end.
        let dead_end = indoc! {"
            +-+-+-+
            | | | |
            +-+ +-+
            |  S  |
            +-+ +-+
            | |  G|
            +-+-+-+
        "};

        let mut maze = maze(dead_end);
        let result = BreadthFirst::new(&mut maze, SolverConfig::quiet()).solve();
        assert_eq!(result, Err(SolveError::Unreachable { explored: 2 }));

        let mut maze = crate::algorithms::test_mazes::maze(dead_end);
        let path = BreadthFirst::new(&mut maze, brute_force()).solve().unwrap();
        assert!(path.connects(maze.entry(), maze.exit()));
    }

    #[test]
    fn sealed_exit_is_unreachable() {
        let mut maze = maze(SEALED);
        let result = BreadthFirst::new(&mut maze, brute_force()).solve();
        assert_eq!(result, Err(SolveError::Unreachable { explored: 1 }));
    }
}
