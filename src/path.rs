use crate::grid::MazeGrid;
use crate::grid::Position;

const MAX_ELEMENTS_DISPLAYED: usize = 20;

/// One move of a solver.
///
/// `is_backtrack` marks a retreat to an already visited cell, so an animation
/// can tell exploration and backtracking apart.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub position: Position,
    pub is_backtrack: bool,
}

impl Step {
    #[inline(always)]
    pub fn forward(position: Position) -> Self {
        Self {
            position,
            is_backtrack: false,
        }
    }

    #[inline(always)]
    pub fn backtrack(position: Position) -> Self {
        Self {
            position,
            is_backtrack: true,
        }
    }
}

/// The ordered trace of moves a solver performed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    pub steps: Vec<Step>,
}

impl Path {
    #[inline(always)]
    pub fn new() -> Self {
        Self { steps: vec![] }
    }

    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            steps: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    #[inline(always)]
    pub fn push_forward(&mut self, p: Position) {
        self.steps.push(Step::forward(p));
    }

    #[inline(always)]
    pub fn push_backtrack(&mut self, p: Position) {
        self.steps.push(Step::backtrack(p));
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.steps.iter().map(|s| s.position)
    }

    /// Number of non-backtrack steps.
    pub fn forward_moves(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_backtrack).count()
    }

    /// Number of backtrack steps.
    pub fn backtracks(&self) -> usize {
        self.steps.iter().filter(|s| s.is_backtrack).count()
    }

    /// Whether a forward step onto `p` is in this path.
    pub fn contains_forward(&self, p: Position) -> bool {
        self.steps.iter().any(|s| !s.is_backtrack && s.position == p)
    }

    /// Reverses the Path.
    ///
    /// Useful when naturally reconstructing paths in reverse.
    pub fn reverse(&mut self) {
        self.steps.reverse();
    }

    /// Alternates steps of `a` and `b`, stopping at the shorter one.
    pub fn interleave(a: &Path, b: &Path) -> Path {
        Path {
            steps: a
                .steps
                .iter()
                .zip(b.steps.iter())
                .flat_map(|(x, y)| [*x, *y])
                .collect(),
        }
    }

    /// Whether `grid` allows walking the path one step at a time.
    ///
    /// Consecutive positions must either repeat or be wall-free neighbours.
    pub fn is_connected_walk<G: MazeGrid>(&self, grid: &G) -> bool {
        self.steps.windows(2).all(|w| {
            let (a, b) = (w[0].position, w[1].position);
            a == b || (a.is_adjacent(&b) && !grid.is_wall_between(a, b))
        })
    }

    /// Whether the path runs from `from` to `to`.
    pub fn connects(&self, from: Position, to: Position) -> bool {
        matches!(
            (self.first(), self.last()),
            (Some(first), Some(last)) if first.position == from && last.position == to
        )
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_backtrack {
            write!(f, "{}⤺", self.position)
        } else {
            write!(f, "{}", self.position)
        }
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => {
                write!(f, "Path({} steps, {}:[", self.len(), first)?;
                for (i, step) in self.steps.iter().take(MAX_ELEMENTS_DISPLAYED).enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{step}")?;
                }
                if self.len() > MAX_ELEMENTS_DISPLAYED {
                    write!(f, " ...")?;
                }
                write!(f, "]:{})", last)
            }
            _ => write!(f, "Path()"),
        }
    }
}
