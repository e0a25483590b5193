//! Implementation of maze solving algorithms.
//!
//! Every algorithm works through the [`MazeGrid`](crate::grid::MazeGrid)
//! queries and yields a [`Path`](crate::path::Path).
//!
//! | Algorithm | Frontier | Path |
//! |---|---|---|
//! | [`breadth_first`] | level lists | visit order |
//! | [`bidirectional`] | two stacks | interleaved walks |
//! | [`depth_first`] | stack | walk with backtracks |
//! | [`uniform_cost`] | stack, greedy on step cost | walk with backtracks |
//! | [`astar`] | priority queue on `g + h` | reconstructed route |
//! | [`q_learning`] | learned Q-table | last training episode |

pub mod astar;
pub mod bidirectional;
pub mod breadth_first;
pub mod depth_first;
pub mod q_learning;
pub mod uniform_cost;
