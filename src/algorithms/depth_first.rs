use rand::Rng;
use rand::seq::IndexedRandom;

use crate::grid::MazeGrid;
use crate::grid::Position;
use crate::path::Path;
use crate::solver::Progress;
use crate::solver::Solve;
use crate::solver::SolveError;
use crate::solver::SolverConfig;
use crate::solver::reset_costs;
use crate::solver::verify_walk;

/// Randomised depth-first search with an explicit backtrack stack.
///
/// Walks into a random validated neighbour while there is one, and retreats
/// along the stack otherwise. The path records every move, retreats marked as
/// backtracks, and ends on the exit.
#[derive(Debug)]
pub struct DepthFirstBacktracker<'g, G: MazeGrid, R: Rng> {
    grid: &'g mut G,
    config: SolverConfig,
    rng: R,
}

impl<'g, G: MazeGrid, R: Rng> DepthFirstBacktracker<'g, G, R> {
    pub fn new(grid: &'g mut G, config: SolverConfig, rng: R) -> Self {
        log::debug!("DepthFirstBacktracker: constructed on {grid:?}");
        reset_costs(grid);
        Self { grid, config, rng }
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

            if let Some(&next) = valid.choose(&mut self.rng) {
                backtrack.push(current);
                path.push_forward(current);
                self.grid.set_visited(next);
                explored += 1;
                current = next;
            } else if let Some(previous) = backtrack.pop() {
                path.push_backtrack(current);
                current = previous;
            } else {
                // Back at the entry with nothing left to try.
                return Err(SolveError::Unreachable { explored });
            }
        }
        path.push_forward(current);

        verify_walk(&*self.grid, &path);
        Ok(path)
    }
}

impl<G: MazeGrid, R: Rng> Solve for DepthFirstBacktracker<'_, G, R> {
    fn name(&self) -> &'static str {
        "Depth First Backtracker"
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
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::algorithms::test_mazes::{CORRIDOR, LOOPED, SEALED, maze};
    use crate::grid::NeighbourMode;
    use crate::problems::walled_maze::WalledMaze;

    fn brute_force() -> SolverConfig {
        SolverConfig::quiet().with_neighbour_mode(NeighbourMode::BruteForce)
    }

    #[test]
    fn corridor() {
        let mut maze = maze(CORRIDOR);
        let path =
            DepthFirstBacktracker::new(&mut maze, SolverConfig::quiet(), ChaCha8Rng::seed_from_u64(0))
                .solve()
                .unwrap();

        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            (0..5).map(|col| Position::new(0, col)).collect::<Vec<_>>()
        );
        assert_eq!(path.backtracks(), 0);
    }

    #[test]
    fn looped_walks_from_entry_to_exit() {
        for seed in 0..20 {
            let mut maze = maze(LOOPED);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let path = DepthFirstBacktracker::new(&mut maze, brute_force(), &mut rng)
                .solve()
                .unwrap();

            assert!(path.connects(maze.entry(), maze.exit()), "seed {seed}: {path}");
            assert!(path.is_connected_walk(&maze), "seed {seed}: {path}");
            assert!(!path.last().unwrap().is_backtrack);
            for step in &path {
                assert!(maze.is_visited(step.position));
            }
        }
    }

    #[test]
    fn backtracks_out_of_dead_ends() {
        // Every dead end sits next to the entry, so any wrong turn backtracks.
        let centre = Position::new(1, 1);
        let mut maze = WalledMaze::new(3, 3, centre, Position::new(2, 2));
        for side in [Position::new(0, 1), Position::new(1, 0), Position::new(1, 2)] {
            maze.remove_wall_between(centre, side).unwrap();
        }
        maze.carve(centre, Position::new(2, 1)).unwrap();
        maze.carve(Position::new(2, 1), Position::new(2, 2)).unwrap();

        let mut saw_backtrack = false;
        for seed in 0..20 {
            let mut maze = maze.clone();
            let path = DepthFirstBacktracker::new(
                &mut maze,
                brute_force(),
                ChaCha8Rng::seed_from_u64(seed),
            )
            .solve()
            .unwrap();

            assert!(path.is_connected_walk(&maze));
            assert!(path.connects(Position::new(1, 1), Position::new(2, 2)));
            // Each detour is one forward step in and one backtrack out.
            assert_eq!(path.forward_moves(), path.backtracks() + 3);
            saw_backtrack |= path.backtracks() > 0;
        }
        assert!(saw_backtrack);
    }

    #[test]
    fn sealed_exit_is_unreachable() {
        let mut maze = maze(SEALED);
        let result =
            DepthFirstBacktracker::new(&mut maze, brute_force(), ChaCha8Rng::seed_from_u64(0))
                .solve();
        assert_eq!(result, Err(SolveError::Unreachable { explored: 1 }));
    }
}
