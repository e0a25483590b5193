use smallvec::SmallVec;
use thiserror::Error;

use crate::cost::FloatCost;
use crate::grid::Coord;
use crate::grid::MazeGrid;
use crate::grid::NeighbourMode;
use crate::grid::Neighbours;
use crate::grid::Position;

const MAX_ELEMENTS_DISPLAYED: usize = 40;

/// The four walls around a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub const ALL: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };
}

impl Default for Walls {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WalledCell {
    pub walls: Walls,
    pub visited: bool,
    pub cost: FloatCost,
}

impl Default for WalledCell {
    fn default() -> Self {
        Self {
            walls: Walls::ALL,
            visited: false,
            cost: FloatCost::infinity(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WallError {
    #[error("Cell {0} is outside the maze")]
    OutOfBounds(Position),
    #[error("Cells {0} and {1} are not adjacent")]
    NotAdjacent(Position, Position),
}

/// A rectangular maze where every cell keeps its own four walls.
///
/// Walls are kept symmetric: removing the wall between two cells clears it on
/// both sides.
#[derive(Clone, PartialEq)]
pub struct WalledMaze {
    pub(crate) cells: Vec<Vec<WalledCell>>,
    entry: Position,
    exit: Position,
}

impl WalledMaze {
    /// A maze with every wall up.
    pub fn new(rows: Coord, cols: Coord, entry: Position, exit: Position) -> Self {
        debug_assert!(rows > 0 && cols > 0);
        debug_assert!(entry.row < rows && entry.col < cols);
        debug_assert!(exit.row < rows && exit.col < cols);

        Self {
            cells: vec![vec![WalledCell::default(); cols]; rows],
            entry,
            exit,
        }
    }

    /// A maze with only the outer border walls up.
    pub fn open(rows: Coord, cols: Coord, entry: Position, exit: Position) -> Self {
        let mut maze = Self::new(rows, cols, entry, exit);
        for row in 0..rows {
            for col in 0..cols {
                let walls = &mut maze.cells[row][col].walls;
                walls.top = row == 0;
                walls.bottom = row + 1 == rows;
                walls.left = col == 0;
                walls.right = col + 1 == cols;
            }
        }
        maze
    }

    pub fn dimensions(&self) -> (Coord, Coord) {
        if self.cells.is_empty() {
            return (0, 0);
        }
        (self.cells.len(), self.cells[0].len())
    }

    #[inline(always)]
    pub fn at(&self, p: Position) -> &WalledCell {
        debug_assert!(self.contains(p));
        &self.cells[p.row][p.col]
    }

    #[inline(always)]
    fn at_mut(&mut self, p: Position) -> &mut WalledCell {
        debug_assert!(self.contains(p));
        &mut self.cells[p.row][p.col]
    }

    pub fn remove_wall_between(&mut self, a: Position, b: Position) -> Result<(), WallError> {
        self.set_wall_between(a, b, false)
    }

    pub fn add_wall_between(&mut self, a: Position, b: Position) -> Result<(), WallError> {
        self.set_wall_between(a, b, true)
    }

    fn set_wall_between(&mut self, a: Position, b: Position, wall: bool) -> Result<(), WallError> {
        for p in [a, b] {
            if !self.contains(p) {
                return Err(WallError::OutOfBounds(p));
            }
        }
        if !a.is_adjacent(&b) {
            return Err(WallError::NotAdjacent(a, b));
        }

        // Orient so that `a` is above or left of `b`.
        let (a, b) = if (a.row, a.col) < (b.row, b.col) { (a, b) } else { (b, a) };
        if a.row == b.row {
            self.at_mut(a).walls.right = wall;
            self.at_mut(b).walls.left = wall;
        } else {
            self.at_mut(a).walls.bottom = wall;
            self.at_mut(b).walls.top = wall;
        }
        Ok(())
    }

    /// Opens every wall along a row-then-column walk from `from` to `to`.
    pub fn carve(&mut self, from: Position, to: Position) -> Result<(), WallError> {
        let mut p = from;
        while p.col != to.col {
            let next = if p.col < to.col {
                Position::new(p.row, p.col + 1)
            } else {
                Position::new(p.row, p.col - 1)
            };
            self.remove_wall_between(p, next)?;
            p = next;
        }
        while p.row != to.row {
            let next = if p.row < to.row {
                Position::new(p.row + 1, p.col)
            } else {
                Position::new(p.row - 1, p.col)
            };
            self.remove_wall_between(p, next)?;
            p = next;
        }
        Ok(())
    }

    /// Forgets which cells were visited so the maze can be solved again.
    pub fn clear_visited(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.visited = false;
        }
    }

    pub fn visited_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.visited).count()
    }
}

impl MazeGrid for WalledMaze {
    fn rows(&self) -> Coord {
        self.dimensions().0
    }
    fn cols(&self) -> Coord {
        self.dimensions().1
    }
    fn entry(&self) -> Position {
        self.entry
    }
    fn exit(&self) -> Position {
        self.exit
    }

    /// Top, right, bottom, then left.
    fn neighbours(&self, p: Position) -> Neighbours {
        let (rows, cols) = self.dimensions();
        let mut v = SmallVec::new();

        #[rustfmt::skip]
        let candidates = [
            (p.row.wrapping_sub(1), p.col               ), // Top
            (p.row,                 p.col + 1           ), // Right
            (p.row + 1,             p.col               ), // Bottom
            (p.row,                 p.col.wrapping_sub(1)), // Left
        ];
        for (row, col) in candidates {
            if row < rows && col < cols {
                v.push(Position { row, col });
            }
        }
        v
    }

    fn validate_neighbours_for_solve(
        &self,
        candidates: &[Position],
        current: Position,
        goal: Position,
        mode: NeighbourMode,
    ) -> Neighbours {
        let open = candidates
            .iter()
            .copied()
            .filter(|n| !self.at(*n).visited && !self.is_wall_between(current, *n));

        match mode {
            NeighbourMode::BruteForce => open.collect(),
            NeighbourMode::Fancy => {
                let mut best: Option<(f64, Position)> = None;
                for n in open {
                    let d_row = n.row as f64 - goal.row as f64;
                    let d_col = n.col as f64 - goal.col as f64;
                    let distance = (d_row * d_row + d_col * d_col).sqrt();
                    if best.is_none_or(|(min, _)| distance < min) {
                        best = Some((distance, n));
                    }
                }
                best.map(|(_, n)| n).into_iter().collect()
            }
        }
    }

    fn is_wall_between(&self, a: Position, b: Position) -> bool {
        if a == b {
            return false;
        }
        if !a.is_adjacent(&b) {
            return true;
        }

        let walls = &self.at(a).walls;
        if b.row < a.row {
            walls.top
        } else if b.row > a.row {
            walls.bottom
        } else if b.col > a.col {
            walls.right
        } else {
            walls.left
        }
    }

    fn is_visited(&self, p: Position) -> bool {
        self.at(p).visited
    }
    fn set_visited(&mut self, p: Position) {
        self.at_mut(p).visited = true;
    }

    fn cost(&self, p: Position) -> FloatCost {
        self.at(p).cost
    }
    fn set_cost(&mut self, p: Position, c: FloatCost) {
        self.at_mut(p).cost = c;
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalledMazeParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Expected an odd number of lines and columns, got {lines}x{width}")]
    EvenDimensions { lines: usize, width: usize },
    #[error("Line {line} has {found} characters, expected {expected}")]
    RaggedLine {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error("Invalid character '{ch}' found at line {line}, column {column}")]
    InvalidCharacter { ch: char, line: usize, column: usize },
    #[error("No entry cell ('S') found")]
    MissingEntry,
    #[error("No exit cell ('G') found")]
    MissingExit,
    #[error("Second entry cell found at {0}")]
    DuplicateEntry(Position),
    #[error("Second exit cell found at {0}")]
    DuplicateExit(Position),
}

impl std::convert::TryFrom<&str> for WalledMaze {
    type Error = WalledMazeParseError;

    /// Parses the boxed text form.
    ///
    /// ```text
    /// +-+-+
    /// |S  |
    /// +-+ +
    /// |G  |
    /// +-+-+
    /// ```
    ///
    /// Cells sit on odd lines and odd columns. The characters between them
    /// are walls (`|`, `-`) or passages (` `). Corners are ignored.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut lines: Vec<Vec<char>> = s.lines().map(|l| l.chars().collect()).collect();
        while lines.last().is_some_and(|l| l.iter().all(|c| c.is_whitespace())) {
            lines.pop();
        }

        if lines.is_empty() || lines[0].is_empty() {
            return Err(WalledMazeParseError::EmptyInput);
        }

        let width = lines[0].len();
        for (line, chars) in lines.iter().enumerate() {
            if chars.len() != width {
                return Err(WalledMazeParseError::RaggedLine {
                    line,
                    found: chars.len(),
                    expected: width,
                });
            }
        }
        if lines.len() % 2 == 0 || width % 2 == 0 || lines.len() < 3 || width < 3 {
            return Err(WalledMazeParseError::EvenDimensions {
                lines: lines.len(),
                width,
            });
        }

        let rows = lines.len() / 2;
        let cols = width / 2;
        let mut entry = None;
        let mut exit = None;
        let mut maze = WalledMaze::new(rows, cols, Position::default(), Position::default());

        let invalid = |ch: char, line: usize, column: usize| {
            WalledMazeParseError::InvalidCharacter { ch, line, column }
        };

        for (line, chars) in lines.iter().enumerate() {
            for (column, &ch) in chars.iter().enumerate() {
                match (line % 2 == 1, column % 2 == 1) {
                    // Corner
                    (false, false) => {
                        if !matches!(ch, '+' | '-' | '|' | ' ') {
                            return Err(invalid(ch, line, column));
                        }
                    }
                    // Cell
                    (true, true) => {
                        let p = Position::new(line / 2, column / 2);
                        match ch {
                            ' ' => {}
                            'S' if entry.is_none() => entry = Some(p),
                            'S' => return Err(WalledMazeParseError::DuplicateEntry(p)),
                            'G' if exit.is_none() => exit = Some(p),
                            'G' => return Err(WalledMazeParseError::DuplicateExit(p)),
                            ch => return Err(invalid(ch, line, column)),
                        }
                    }
                    // Horizontal wall, below cell (line/2 - 1, column/2)
                    (false, true) => {
                        let wall = match ch {
                            '-' => true,
                            ' ' => false,
                            ch => return Err(invalid(ch, line, column)),
                        };
                        let col = column / 2;
                        let row_below = line / 2;
                        if row_below > 0 {
                            maze.cells[row_below - 1][col].walls.bottom = wall;
                        }
                        if row_below < rows {
                            maze.cells[row_below][col].walls.top = wall;
                        }
                    }
                    // Vertical wall, right of cell (line/2, column/2 - 1)
                    (true, false) => {
                        let wall = match ch {
                            '|' => true,
                            ' ' => false,
                            ch => return Err(invalid(ch, line, column)),
                        };
                        let row = line / 2;
                        let col_right = column / 2;
                        if col_right > 0 {
                            maze.cells[row][col_right - 1].walls.right = wall;
                        }
                        if col_right < cols {
                            maze.cells[row][col_right].walls.left = wall;
                        }
                    }
                }
            }
        }

        maze.entry = entry.ok_or(WalledMazeParseError::MissingEntry)?;
        maze.exit = exit.ok_or(WalledMazeParseError::MissingExit)?;
        Ok(maze)
    }
}

impl WalledMaze {
    /// Writes the `+-+ +` line above `row`, or below it when `below` is set.
    fn write_border(
        &self,
        f: &mut std::fmt::Formatter,
        row: usize,
        below: bool,
        cols: usize,
    ) -> std::fmt::Result {
        write!(f, "+")?;
        for cell in self.cells[row].iter().take(cols) {
            let wall = if below { cell.walls.bottom } else { cell.walls.top };
            write!(f, "{}+", if wall { '-' } else { ' ' })?;
        }
        writeln!(f)
    }
}

impl std::fmt::Display for WalledMaze {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (rows, cols) = self.dimensions();
        let rows = rows.min(MAX_ELEMENTS_DISPLAYED);
        let cols = cols.min(MAX_ELEMENTS_DISPLAYED);

        for row in 0..rows {
            self.write_border(f, row, false, cols)?;
            let first = &self.cells[row][0];
            write!(f, "{}", if first.walls.left { '|' } else { ' ' })?;
            for col in 0..cols {
                let p = Position::new(row, col);
                let ch = if p == self.entry {
                    'S'
                } else if p == self.exit {
                    'G'
                } else {
                    ' '
                };
                let wall = self.cells[row][col].walls.right;
                write!(f, "{ch}{}", if wall { '|' } else { ' ' })?;
            }
            writeln!(f)?;
        }
        if rows > 0 {
            self.write_border(f, rows - 1, true, cols)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for WalledMaze {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "WalledMaze{:?}({} -> {})",
            self.dimensions(),
            self.entry,
            self.exit
        )
    }
}
