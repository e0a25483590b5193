//! Costs for the cost-aware solvers.
//!
//! Moves that stay on the same row are cheaper than moves that change row.
//! The asymmetry makes both Uniform-Cost and A* prefer running along
//! corridors.

use derive_more::Display;
use num_traits::Zero;
use ordered_float::OrderedFloat;

use crate::grid::Position;

/// Cost of a move that keeps the row.
pub const STRAIGHT_COST: f64 = 0.9;
/// Cost of a move that changes row.
pub const TURN_COST: f64 = 1.1;

/// A totally ordered `f64` cost.
#[derive(Copy, Clone, Default, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
#[display("${_0}")]
pub struct FloatCost(pub OrderedFloat<f64>);

impl FloatCost {
    #[inline(always)]
    pub fn new(f: f64) -> Self {
        Self(OrderedFloat(f))
    }

    #[inline(always)]
    pub fn infinity() -> Self {
        Self(OrderedFloat(f64::INFINITY))
    }

    #[inline(always)]
    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }

    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.value().is_finite()
    }
}

impl From<f64> for FloatCost {
    fn from(f: f64) -> Self {
        Self::new(f)
    }
}

impl std::ops::Add for FloatCost {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for FloatCost {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Zero for FloatCost {
    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.0 == OrderedFloat(0.0)
    }
    #[inline(always)]
    fn zero() -> Self {
        Self(OrderedFloat(0.0))
    }
}

/// Cost of stepping from `from` into the adjacent `to`.
#[inline(always)]
pub fn step_cost(from: Position, to: Position) -> FloatCost {
    if from.row != to.row {
        FloatCost::new(TURN_COST)
    } else {
        FloatCost::new(STRAIGHT_COST)
    }
}

/// The A* estimate from `cell` to `goal`.
///
/// Row distance is weighted with the straight cost and column distance with
/// the turn cost, the other way round from [`step_cost`]. Not admissible in
/// general.
#[inline(always)]
pub fn heuristic(cell: Position, goal: Position) -> FloatCost {
    let d_row = cell.row.abs_diff(goal.row) as f64;
    let d_col = cell.col.abs_diff(goal.col) as f64;
    FloatCost::new(d_row * STRAIGHT_COST + d_col * TURN_COST)
}
