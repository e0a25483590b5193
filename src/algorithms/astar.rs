use std::cmp::Reverse;
use std::collections::BinaryHeap;

use num_traits::Zero;
use rustc_hash::FxHashMap;

use crate::cost::FloatCost;
use crate::cost::heuristic;
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

/// The ranking of an open node.
///
/// Lower `f = g + h` first, ties broken by the row-major position. The `g` of
/// a newly discovered cell is the popped rank of its parent plus the step, so
/// heuristic terms accumulate along a route.
type AStarRank = Reverse<(FloatCost, Position)>;

/// What is known about a discovered cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Discovered {
    /// The cell that discovered this one. `None` only for the entry.
    parent: Option<Position>,
    /// Parent's popped rank plus the step cost.
    g: FloatCost,
}

/// A* without re-opening.
///
/// A cell's parent and `g` are fixed the first time it is pushed. A cheaper
/// route found later is ignored. The base of `g` is the parent's popped `f`
/// rather than the parent's own `g`, so ranks grow with every heuristic term
/// on the way and the route may be longer than optimal.
///
/// Unlike the other searches the result is the reconstructed route, which
/// never contains backtracks. Discovered cells are marked visited and their
/// `g` is written into the grid's cost accumulator.
#[derive(Debug)]
pub struct AStarSearch<'g, G: MazeGrid> {
    grid: &'g mut G,
    config: SolverConfig,
}

impl<'g, G: MazeGrid> AStarSearch<'g, G> {
    pub fn new(grid: &'g mut G, config: SolverConfig) -> Self {
        log::debug!("AStarSearch: constructed on {grid:?}");
        reset_costs(grid);
        Self { grid, config }
    }

    fn discover(
        &mut self,
        discovered: &mut FxHashMap<Position, Discovered>,
        cell: Position,
        node: Discovered,
    ) {
        discovered.insert(cell, node);
        self.grid.set_visited(cell);
        self.grid.set_cost(cell, node.g);
    }

    fn search(&mut self) -> Result<Path, SolveError> {
        let entry = self.grid.entry();
        let goal = self.grid.exit();

        let mut discovered = FxHashMap::<Position, Discovered>::default();
        let mut open = BinaryHeap::<AStarRank>::new();

        self.discover(
            &mut discovered,
            entry,
            Discovered {
                parent: None,
                g: FloatCost::zero(),
            },
        );
        open.push(Reverse((FloatCost::zero(), entry)));

        while let Some(Reverse((f, current))) = open.pop() {
            if current == goal {
                let path = Self::reconstruct(&discovered, goal);
                verify_walk(&*self.grid, &path);
                return Ok(path);
            }

            for next in self.grid.real_neighbours(current) {
                if discovered.contains_key(&next) {
                    continue;
                }
                let next_g = f + step_cost(current, next);
                self.discover(
                    &mut discovered,
                    next,
                    Discovered {
                        parent: Some(current),
                        g: next_g,
                    },
                );
                open.push(Reverse((next_g + heuristic(next, goal), next)));
            }
        }

        Err(SolveError::Unreachable {
            explored: discovered.len(),
        })
    }

    /// Walks parents back from `goal` to the entry.
    fn reconstruct(discovered: &FxHashMap<Position, Discovered>, goal: Position) -> Path {
        let mut path = Path::new();
        let mut cell = Some(goal);
        while let Some(p) = cell {
            path.push_forward(p);
            cell = discovered.get(&p).and_then(|node| node.parent);
        }
        path.reverse();
        path
    }
}

impl<G: MazeGrid> Solve for AStarSearch<'_, G> {
    fn name(&self) -> &'static str {
        "A* Search"
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
    use crate::problems::walled_maze::WalledMaze;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn assert_close(actual: FloatCost, expected: f64) {
        assert!(
            (actual.value() - expected).abs() < 1e-6,
            "{actual} is not ${expected}"
        );
    }

    #[test]
    fn rank_prefers_lower_f_then_position() {
        let mut open = BinaryHeap::<AStarRank>::new();
        open.push(Reverse((FloatCost::new(2.0), p(0, 0))));
        open.push(Reverse((FloatCost::new(1.0), p(3, 3))));
        open.push(Reverse((FloatCost::new(1.0), p(1, 2))));

        let order: Vec<_> = std::iter::from_fn(|| open.pop().map(|Reverse((_, p))| p)).collect();
        assert_eq!(order, vec![p(1, 2), p(3, 3), p(0, 0)]);
    }

    #[test]
    fn corridor() {
        let mut maze = maze(CORRIDOR);
        let path = AStarSearch::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();
        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            (0..5).map(|col| p(0, col)).collect::<Vec<_>>()
        );
        // 0.9, then 0.9 + 3.3 + 0.9, then 5.1 + 2.2 + 0.9, then 8.2 + 1.1 + 0.9.
        assert_close(maze.cost(p(0, 1)), 0.9);
        assert_close(maze.cost(p(0, 2)), 5.1);
        assert_close(maze.cost(p(0, 3)), 8.2);
        assert_close(maze.cost(p(0, 4)), 10.2);
    }

    #[test]
    fn prefers_the_straight_step() {
        let mut maze = WalledMaze::open(3, 3, p(1, 0), p(1, 2));
        let path = AStarSearch::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();
        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![p(1, 0), p(1, 1), p(1, 2)]
        );
    }

    #[test]
    fn reconstructs_route_through_loop() {
        let mut maze = maze(LOOPED);
        let path = AStarSearch::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();

        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![p(0, 0), p(1, 0), p(1, 1), p(2, 1), p(2, 2), p(3, 2), p(3, 3)]
        );
        assert_eq!(path.backtracks(), 0);
        assert!(path.is_connected_walk(&maze));
    }

    #[test]
    fn records_g_and_visited_on_discovery() {
        let mut maze = maze(LOOPED);
        AStarSearch::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();

        assert_close(maze.cost(p(0, 0)), 0.0);
        assert_close(maze.cost(p(1, 0)), 1.1);
        assert_close(maze.cost(p(1, 1)), 7.1);
        assert_close(maze.cost(p(2, 1)), 12.2);
        assert_close(maze.cost(p(2, 2)), 16.2);
        assert_close(maze.cost(p(3, 2)), 19.3);
        assert_close(maze.cost(p(3, 3)), 21.3);
        // Off the route, discovered but never expanded.
        assert_close(maze.cost(p(0, 1)), 12.2);
        assert_close(maze.cost(p(1, 2)), 19.3);
        assert_close(maze.cost(p(3, 1)), 21.3);
        // (0,1) is expanded at 17.1 and reaches (0,2) before the exit pops.
        assert!(maze.is_visited(p(0, 2)));
        assert_close(maze.cost(p(0, 2)), 18.0);

        // Never discovered.
        for cell in [p(0, 3), p(1, 3), p(2, 0), p(2, 3), p(3, 0)] {
            assert!(!maze.is_visited(cell), "{cell}");
            assert_eq!(maze.cost(cell), FloatCost::infinity(), "{cell}");
        }
        assert_eq!(maze.visited_count(), 11);
    }

    #[test]
    fn rank_accumulates_along_the_route() {
        let mut maze = maze(indoc! {"
            +-+-+-+
            |G  | |
            +-+ + +
            |     |
            + +-+ +
            |    S|
            +-+-+-+
        "});
        let path = AStarSearch::new(&mut maze, SolverConfig::quiet())
            .solve()
            .unwrap();

        // (1,2) pops at 4.2 and claims (1,1) long before (2,0) pops at 6.5.
        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![p(2, 2), p(1, 2), p(1, 1), p(0, 1), p(0, 0)]
        );
        assert_close(maze.cost(p(1, 1)), 5.1);
        assert_close(maze.cost(p(0, 1)), 8.2);
        assert_close(maze.cost(p(0, 0)), 10.2);
        assert_close(maze.cost(p(2, 0)), 4.7);
    }

    #[test]
    fn sealed_exit_is_unreachable() {
        let mut maze = maze(SEALED);
        let result = AStarSearch::new(&mut maze, SolverConfig::quiet()).solve();
        assert_eq!(result, Err(SolveError::Unreachable { explored: 1 }));
    }
}
