//! Settled grid: placed values, dead/live state, merge and game-over logic.

use crate::blocks::Block;

/// One settled cell. A cell starts empty, takes a value when a block lands
/// on it, accumulates further values by merging, and dies for good once its
/// value passes the death threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Live(i32),
    Dead(i32),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead(_))
    }

    /// Stored value; 0 for an empty cell.
    pub fn value(&self) -> i32 {
        match self {
            Self::Empty => 0,
            Self::Live(v) | Self::Dead(v) => *v,
        }
    }
}

/// Outcome of resolving a landed block into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Written into a previously empty cell.
    Placed,
    /// Summed into an occupied live cell.
    Merged,
    /// Merge pushed the cell past the death threshold.
    Died,
    /// Dropped without touching the grid (overflow above row 0, or a dead
    /// target cell).
    Discarded,
}

/// The authoritative board of settled cells. Row 0 is the top; rows grow
/// downward. Created with every cell empty; mutated only by landing
/// resolution; never resizes.
///
/// Coordinates originate from the simulation itself, so out-of-range access
/// is a programmer error and panics.
#[derive(Debug, Clone)]
pub struct SettledGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Cell>>,
    death_threshold: i32,
}

impl SettledGrid {
    pub fn new(rows: usize, cols: usize, death_threshold: i32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![Cell::Empty; cols]; rows],
            death_threshold,
        }
    }

    pub fn row_count(&self) -> i32 {
        self.rows as i32
    }

    pub fn col_count(&self) -> i32 {
        self.cols as i32
    }

    #[inline]
    pub fn cell(&self, row: i32, col: i32) -> Cell {
        self.cells[row as usize][col as usize]
    }

    pub fn is_empty(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).is_empty()
    }

    pub fn is_dead(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).is_dead()
    }

    pub fn value_at(&self, row: i32, col: i32) -> i32 {
        self.cell(row, col).value()
    }

    /// True iff any cell in the top row is dead.
    pub fn is_over(&self) -> bool {
        self.cells[0].iter().any(Cell::is_dead)
    }

    /// Resolves a landed block into the grid.
    ///
    /// The block's coordinates are the landing target from
    /// [`FallingBlocks::describe_landing`](crate::blocks::FallingBlocks::describe_landing).
    /// A negative row means the block landed on a dead cell in row 0 with no
    /// room above; it is discarded and `is_over()` is left to report the end
    /// of the game.
    pub fn add_block(&mut self, block: Block) -> Placement {
        if block.row < 0 {
            return Placement::Discarded;
        }
        let (row, col) = (block.row as usize, block.col as usize);
        match self.cells[row][col] {
            Cell::Empty => {
                self.cells[row][col] = Cell::Live(block.value);
                Placement::Placed
            }
            Cell::Live(existing) => {
                let sum = existing + block.value;
                if sum > self.death_threshold {
                    self.cells[row][col] = Cell::Dead(sum);
                    Placement::Died
                } else {
                    self.cells[row][col] = Cell::Live(sum);
                    Placement::Merged
                }
            }
            // Dead cells are never overwritten; classification redirects
            // landings above them before we get here.
            Cell::Dead(_) => Placement::Discarded,
        }
    }

    /// All cells with their coordinates, row-major. The renderer's view of
    /// the board.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, r)| r.iter().enumerate().map(move |(col, &c)| (row, col, c)))
    }
}
