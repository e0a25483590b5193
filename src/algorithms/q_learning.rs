use rand::Rng;

use crate::grid::Coord;
use crate::grid::MazeGrid;
use crate::grid::Move;
use crate::grid::Position;
use crate::path::Path;
use crate::solver::Progress;
use crate::solver::Solve;
use crate::solver::SolveError;
use crate::solver::SolverConfig;
use crate::solver::reset_costs;
use crate::solver::verify_walk;

/// Reward for stepping onto the exit.
pub const EXIT_REWARD: f64 = 100.0;
/// Reward for a move into a wall.
pub const WALL_REWARD: f64 = -1.0;
/// Reward for any other move.
pub const STEP_REWARD: f64 = -0.1;

/// Training knobs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct QLearningParams {
    pub episodes: usize,
    /// α
    pub learning_rate: f64,
    /// γ
    pub discount_factor: f64,
    /// ε, the chance of a random action.
    pub exploration_rate: f64,
    /// Attempts per episode, wall-blocked ones included.
    pub max_episode_steps: usize,
}

impl Default for QLearningParams {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            learning_rate: 0.4,
            discount_factor: 0.4,
            exploration_rate: 0.1,
            max_episode_steps: 1_000_000,
        }
    }
}

/// Action values for every cell, indexed by [`Move::index`].
#[derive(Clone, Debug, PartialEq)]
pub struct QTable {
    rows: Coord,
    cols: Coord,
    values: Vec<[f64; 4]>,
}

impl QTable {
    /// A table of zeros.
    pub fn new(rows: Coord, cols: Coord) -> Self {
        Self {
            rows,
            cols,
            values: vec![[0.0; 4]; rows * cols],
        }
    }

    pub fn dimensions(&self) -> (Coord, Coord) {
        (self.rows, self.cols)
    }

    #[inline(always)]
    fn index(&self, p: Position) -> usize {
        debug_assert!(p.row < self.rows && p.col < self.cols, "{p} is outside the table");
        p.row * self.cols + p.col
    }

    #[inline(always)]
    pub fn actions(&self, p: Position) -> &[f64; 4] {
        &self.values[self.index(p)]
    }

    #[inline(always)]
    pub fn get(&self, p: Position, m: Move) -> f64 {
        self.actions(p)[m.index()]
    }

    #[inline(always)]
    pub fn set(&mut self, p: Position, m: Move, value: f64) {
        let i = self.index(p);
        self.values[i][m.index()] = value;
    }

    /// The highest valued move, the first one on ties.
    pub fn best_action(&self, p: Position) -> Move {
        let mut best = Move::Up;
        for m in Move::ALL {
            if self.get(p, m) > self.get(p, best) {
                best = m;
            }
        }
        best
    }

    pub fn max_value(&self, p: Position) -> f64 {
        self.get(p, self.best_action(p))
    }
}

/// Tabular Q-learning over cells and the four moves.
///
/// Each training episode starts at the entry and ends on the exit. A move into
/// a wall is retried without learning anything from it. The solve result is
/// the trajectory of the last episode, so earlier episodes only shape the
/// table.
///
/// Training accumulates into the same table across calls.
#[derive(Debug)]
pub struct QLearning<'g, G: MazeGrid, R: Rng> {
    grid: &'g mut G,
    config: SolverConfig,
    rng: R,
    params: QLearningParams,
    q_table: QTable,
}

impl<'g, G: MazeGrid, R: Rng> QLearning<'g, G, R> {
    pub fn new(grid: &'g mut G, config: SolverConfig, rng: R) -> Self {
        log::debug!("QLearning: constructed on {grid:?}");
        reset_costs(grid);
        let q_table = QTable::new(grid.rows(), grid.cols());
        Self {
            grid,
            config,
            rng,
            params: QLearningParams::default(),
            q_table,
        }
    }

    /// Sets what [`Solve::solve`] trains with.
    pub fn with_params(mut self, params: QLearningParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &QLearningParams {
        &self.params
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn greedy_action(&self, p: Position) -> Move {
        self.q_table.best_action(p)
    }

    /// Follows the greedy action from the entry without exploring or learning.
    ///
    /// `None` when the exit is not reached within `limit` moves or a greedy
    /// move runs into a wall.
    pub fn greedy_path(&self, limit: usize) -> Option<Path> {
        let goal = self.grid.exit();
        let mut current = self.grid.entry();
        let mut path = Path::new();
        path.push_forward(current);

        for _ in 0..limit {
            if current == goal {
                return Some(path);
            }
            let next = self.next_state(current, self.greedy_action(current));
            if self.grid.is_wall_between(current, next) {
                return None;
            }
            current = next;
            path.push_forward(current);
        }
        (current == goal).then_some(path)
    }

    #[inline(always)]
    fn next_state(&self, p: Position, m: Move) -> Position {
        m.apply_clamped(p, self.grid.rows(), self.grid.cols())
    }

    fn reward(&self, from: Position, to: Position) -> f64 {
        if to == self.grid.exit() {
            EXIT_REWARD
        } else if self.grid.is_wall_between(from, to) {
            WALL_REWARD
        } else {
            STEP_REWARD
        }
    }

    fn is_trapped(&self, p: Position) -> bool {
        Move::ALL
            .into_iter()
            .all(|m| self.grid.is_wall_between(p, self.next_state(p, m)))
    }

    fn choose_action(&mut self, p: Position, exploration_rate: f64) -> Move {
        if self.rng.random::<f64>() < exploration_rate {
            Move::ALL[self.rng.random_range(0..Move::ALL.len())]
        } else {
            self.greedy_action(p)
        }
    }

    /// Runs one episode, returning its trajectory and total reward.
    fn episode(
        &mut self,
        episode: usize,
        params: &QLearningParams,
    ) -> Result<(Path, f64), SolveError> {
        let goal = self.grid.exit();
        let mut current = self.grid.entry();
        self.grid.set_visited(current);

        let mut path = Path::new();
        path.push_forward(current);
        let mut total_reward = 0.0;
        let mut steps = 0usize;

        while current != goal {
            if steps == params.max_episode_steps {
                return Err(SolveError::EpisodeStepLimit { episode, steps });
            }
            steps += 1;

            let action = self.choose_action(current, params.exploration_rate);
            let next = self.next_state(current, action);
            if self.grid.is_wall_between(current, next) {
                if self.is_trapped(current) {
                    return Err(SolveError::Trapped { position: current });
                }
                continue;
            }

            let reward = self.reward(current, next);
            let q = self.q_table.get(current, action);
            let target = reward + params.discount_factor * self.q_table.max_value(next);
            self.q_table
                .set(current, action, q + params.learning_rate * (target - q));

            current = next;
            self.grid.set_visited(current);
            total_reward += reward;
            path.push_forward(current);
        }

        Ok((path, total_reward))
    }

    /// Trains for `params.episodes` episodes and returns the last trajectory.
    pub fn train(&mut self, params: QLearningParams) -> Result<Path, SolveError> {
        let mut last = None;
        for episode in 0..params.episodes {
            let (path, total_reward) = self.episode(episode, &params)?;
            log::trace!("QLearning: episode {episode} total reward {total_reward:.1}");
            last = Some((path, total_reward));
        }

        match last {
            Some((path, total_reward)) => {
                if !self.config.quiet {
                    log::info!("Total reward of the last episode: {total_reward:.1}");
                }
                verify_walk(&*self.grid, &path);
                Ok(path)
            }
            None => Err(SolveError::DidNotConverge { steps: 0 }),
        }
    }
}

impl<G: MazeGrid, R: Rng> Solve for QLearning<'_, G, R> {
    fn name(&self) -> &'static str {
        "Q-Learning"
    }

    fn solve(&mut self) -> Result<Path, SolveError> {
        let progress = Progress::start(self.name(), self.config.quiet);
        let result = self.train(self.params);
        progress.finish(&result);
        result
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::algorithms::test_mazes::{CORRIDOR, maze};
    use crate::problems::walled_maze::WalledMaze;

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    fn params(episodes: usize) -> QLearningParams {
        QLearningParams {
            episodes,
            ..QLearningParams::default()
        }
    }

    #[test]
    fn default_params() {
        let params = QLearningParams::default();
        assert_eq!(params.episodes, 10_000);
        assert_eq!(params.learning_rate, 0.4);
        assert_eq!(params.discount_factor, 0.4);
        assert_eq!(params.exploration_rate, 0.1);
    }

    #[test]
    fn table_picks_first_best() {
        let mut table = QTable::new(2, 3);
        assert_eq!(table.dimensions(), (2, 3));
        assert_eq!(table.best_action(p(1, 2)), Move::Up);

        table.set(p(1, 2), Move::Left, 2.0);
        table.set(p(1, 2), Move::Right, 2.0);
        assert_eq!(table.best_action(p(1, 2)), Move::Left);
        assert_eq!(table.max_value(p(1, 2)), 2.0);
        assert_eq!(table.actions(p(0, 0)), &[0.0; 4]);
    }

    #[test]
    fn learns_the_open_square() {
        let mut maze = WalledMaze::open(2, 2, p(0, 0), p(1, 1));
        let mut solver = QLearning::new(&mut maze, SolverConfig::quiet(), rng(7));
        let path = solver.train(params(5_000)).unwrap();

        assert!(path.connects(p(0, 0), p(1, 1)));
        assert!(path.len() >= 3);
        assert_eq!(path.backtracks(), 0);

        let first = solver.greedy_action(p(0, 0));
        assert!(matches!(first, Move::Down | Move::Right), "{first}");
        assert!(solver.q_table().max_value(p(0, 0)) > 0.0);
        let greedy = solver.greedy_path(10).unwrap();
        assert_eq!(greedy.len(), 3, "{greedy}");
    }

    #[test]
    fn last_episode_is_short_for_most_seeds() {
        let short = (0..20)
            .filter(|&seed| {
                let mut maze = WalledMaze::open(2, 2, p(0, 0), p(1, 1));
                let path = QLearning::new(&mut maze, SolverConfig::quiet(), rng(seed))
                    .train(params(5_000))
                    .unwrap();
                path.len() <= 4
            })
            .count();
        assert!(short >= 14, "only {short} of 20 runs were short");
    }

    #[test]
    fn exit_value_approaches_reward() {
        let mut maze = maze(CORRIDOR);
        let mut solver = QLearning::new(&mut maze, SolverConfig::quiet(), rng(1));
        solver.train(params(2_000)).unwrap();

        assert!(solver.q_table().get(p(0, 3), Move::Right) > 99.0);
        assert_eq!(solver.greedy_path(10).map(|path| path.len()), Some(5));
        // The exit is terminal, nothing is learned there.
        assert_eq!(solver.q_table().actions(p(0, 4)), &[0.0; 4]);
    }

    #[test]
    fn solve_marks_the_trajectory_visited() {
        let mut maze = maze(CORRIDOR);
        let path = QLearning::new(&mut maze, SolverConfig::quiet(), rng(3))
            .with_params(params(50))
            .solve()
            .unwrap();
        for cell in path.positions() {
            assert!(maze.is_visited(cell));
        }
        assert!(path.connects(maze.entry(), maze.exit()));
        assert!(path.is_connected_walk(&maze));
    }

    #[test]
    fn walled_in_entry_is_trapped() {
        let mut maze = WalledMaze::new(3, 3, p(1, 1), p(0, 0));
        let result = QLearning::new(&mut maze, SolverConfig::quiet(), rng(0)).train(params(1));
        assert_eq!(result, Err(SolveError::Trapped { position: p(1, 1) }));
    }

    #[test]
    fn unreachable_exit_hits_the_step_limit() {
        let mut maze = maze(indoc! {"
            +-+-+-+
            |S  |G|
            +-+-+-+
        "});
        let params = QLearningParams {
            episodes: 3,
            max_episode_steps: 1_000,
            ..QLearningParams::default()
        };
        let result = QLearning::new(&mut maze, SolverConfig::quiet(), rng(0)).train(params);
        assert_eq!(
            result,
            Err(SolveError::EpisodeStepLimit {
                episode: 0,
                steps: 1_000
            })
        );
    }

    #[test]
    fn no_episodes_no_path() {
        let mut maze = maze(CORRIDOR);
        let result = QLearning::new(&mut maze, SolverConfig::quiet(), rng(0)).train(params(0));
        assert_eq!(result, Err(SolveError::DidNotConverge { steps: 0 }));
    }
}
