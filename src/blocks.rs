//! Falling blocks: descent, cascading lateral shift, slam, landing
//! classification.

use crate::counter::StepCounter;
use crate::grid::SettledGrid;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::collections::HashSet;

/// Substitute value when a wave draw comes up zero.
const FALLBACK_VALUE: i32 = 5;
/// Wave values are drawn from -WAVE_VALUE_SPAN..=WAVE_VALUE_SPAN.
const WAVE_VALUE_SPAN: i32 = 9;

/// A numbered block on the board. Row 0 is the top; rows grow downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub row: i32,
    pub col: i32,
    pub value: i32,
}

/// How a single active block relates to the settled grid, and where it
/// resolves if it has landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// Still falling; no target.
    Unlanded,
    /// Ran past the bottom edge; resolves one row back up.
    OnSpace { row: i32, col: i32 },
    /// Overlaps a dead cell; resolves one row above it (row may be -1,
    /// which the grid discards).
    OnDead { row: i32, col: i32 },
    /// Overlaps an occupied live cell; merges into that very cell.
    OnLive { row: i32, col: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// The set of blocks currently under player control, together with the
/// descent timer and the wave generator's RNG.
///
/// Blocks never share a cell: regeneration spawns at most one block per
/// column, lockstep descent preserves spacing, and shift and slam treat
/// other active blocks as obstructions.
#[derive(Debug, Clone)]
pub struct FallingBlocks {
    blocks: Vec<Block>,
    counter: StepCounter,
    rng: Pcg32,
}

impl FallingBlocks {
    pub fn new(ticks_per_step: f64, seed: u64) -> Self {
        Self {
            blocks: Vec::new(),
            counter: StepCounter::new(ticks_per_step),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn add(&mut self, row: i32, col: i32, value: i32) {
        self.blocks.push(Block { row, col, value });
    }

    /// Removes the first block at the given cell; no-op when none matches.
    pub fn remove(&mut self, row: i32, col: i32) {
        if let Some(i) = self
            .blocks
            .iter()
            .position(|b| b.row == row && b.col == col)
        {
            self.blocks.remove(i);
        }
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Generates a new wave in row 0: each column gets a block with 1-in-5
    /// odds, carrying a small non-zero signed value.
    pub fn regenerate(&mut self, cols: i32) {
        for col in 0..cols {
            if self.rng.random_range(0..5) > 3 {
                let value = self.rng.random_range(-WAVE_VALUE_SPAN..=WAVE_VALUE_SPAN);
                let value = if value == 0 { FALLBACK_VALUE } else { value };
                self.add(0, col, value);
            }
        }
    }

    /// Advances the descent timer; on a step every block drops one row in
    /// lockstep. Returns whether a step fired.
    pub fn advance(&mut self, ticks: f64) -> bool {
        if !self.counter.update(ticks) {
            return false;
        }
        for block in &mut self.blocks {
            block.row += 1;
        }
        true
    }

    /// Shrinks the descent interval. Factor is expected < 1.
    pub fn speed_up(&mut self, factor: f64) {
        self.counter.speed_up(factor);
    }

    pub fn ticks_per_step(&self) -> f64 {
        self.counter.ticks_per_step()
    }

    /// Classifies one block against the settled grid without mutating
    /// either side. Pure: calling it twice gives the same answer.
    pub fn describe_landing(&self, block: Block, grid: &SettledGrid) -> Landing {
        if block.row >= grid.row_count() {
            return Landing::OnSpace {
                row: (block.row - 1).min(grid.row_count() - 1),
                col: block.col,
            };
        }
        if grid.is_dead(block.row, block.col) {
            return Landing::OnDead {
                row: block.row - 1,
                col: block.col,
            };
        }
        if !grid.is_empty(block.row, block.col) {
            return Landing::OnLive {
                row: block.row,
                col: block.col,
            };
        }
        Landing::Unlanded
    }

    /// Drops every block as far as it can go in one call. Blocks resolve
    /// bottom-most first; the row advances while the next cell down is
    /// inside the grid, empty in the settled grid and free of other active
    /// blocks, so a slammed block stacks on one that stopped higher up its
    /// column. Identical end positions to repeating single descent steps
    /// until blocked.
    pub fn slam(&mut self, grid: &SettledGrid) {
        let mut order: Vec<usize> = (0..self.blocks.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.blocks[i].row));
        for i in order {
            let col = self.blocks[i].col;
            while self.blocks[i].row + 1 < grid.row_count()
                && grid.is_empty(self.blocks[i].row + 1, col)
                && !self.occupied(self.blocks[i].row + 1, col, i)
            {
                self.blocks[i].row += 1;
            }
        }
    }

    /// Whether any active block other than `skip` sits at the given cell.
    fn occupied(&self, row: i32, col: i32, skip: usize) -> bool {
        self.blocks
            .iter()
            .enumerate()
            .any(|(j, b)| j != skip && b.row == row && b.col == col)
    }

    /// Shifts every block one column left where possible. Returns whether
    /// any block moved. See [`Self::shift`].
    pub fn shift_left(&mut self, grid: &SettledGrid) -> bool {
        let mut visited = HashSet::new();
        let mut moved = false;
        for i in 0..self.blocks.len() {
            moved |= self.shift(i, Direction::Left, grid, &mut visited);
        }
        moved
    }

    /// Shifts every block one column right where possible. Visits blocks in
    /// reverse insertion order so chains resolve from the far side first.
    /// Returns whether any block moved.
    pub fn shift_right(&mut self, grid: &SettledGrid) -> bool {
        let mut visited = HashSet::new();
        let mut moved = false;
        for i in (0..self.blocks.len()).rev() {
            moved |= self.shift(i, Direction::Right, grid, &mut visited);
        }
        moved
    }

    /// Cascading shift resolution for one block.
    ///
    /// If another active block occupies the target cell, that neighbour is
    /// asked to move first; when it vacates, this block follows it. The
    /// block stays put when the neighbour could not move, when the target is
    /// past the grid edge, or when the target holds a dead settled cell.
    /// Moving onto an empty or live settled cell is fine; merging is decided
    /// at landing time, not here.
    ///
    /// The visited set caps each block at one visit per shift call, which
    /// also guards against re-entry on adjacency cycles.
    ///
    /// Returns whether this block or anything downstream of it moved.
    fn shift(
        &mut self,
        i: usize,
        dir: Direction,
        grid: &SettledGrid,
        visited: &mut HashSet<usize>,
    ) -> bool {
        if !visited.insert(i) {
            return false;
        }
        let mut moved = false;
        if let Some(neighbour) = self.neighbour(i, dir) {
            moved = self.shift(neighbour, dir, grid, visited);
        }
        if self.neighbour(i, dir).is_some() {
            return moved;
        }
        let block = self.blocks[i];
        let target = block.col + dir.delta();
        if target < 0 || target >= grid.col_count() {
            return moved;
        }
        if grid.is_dead(block.row, target) {
            return moved;
        }
        self.blocks[i].col = target;
        true
    }

    /// Index of the active block adjacent to block `i` in the given
    /// direction, if any.
    fn neighbour(&self, i: usize, dir: Direction) -> Option<usize> {
        let block = self.blocks[i];
        self.blocks.iter().enumerate().find_map(|(j, other)| {
            (j != i && other.row == block.row && other.col == block.col + dir.delta())
                .then_some(j)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Placement;

    fn grid(rows: usize, cols: usize) -> SettledGrid {
        SettledGrid::new(rows, cols, 10)
    }

    fn cols_of(blocks: &FallingBlocks) -> Vec<i32> {
        blocks.blocks().iter().map(|b| b.col).collect()
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut fb = FallingBlocks::new(10.0, 1);
        fb.add(0, 2, 5);
        fb.add(0, 3, -1);
        fb.remove(0, 2);
        assert_eq!(fb.blocks(), &[Block { row: 0, col: 3, value: -1 }]);
        // Removing a missing cell is a no-op, not an error.
        fb.remove(7, 7);
        assert_eq!(fb.len(), 1);
    }

    #[test]
    fn test_advance_steps_all_blocks_together() {
        let mut fb = FallingBlocks::new(10.0, 1);
        fb.add(0, 0, 1);
        fb.add(0, 4, 2);
        assert!(!fb.advance(5.0));
        assert_eq!(fb.blocks()[0].row, 0);
        assert!(fb.advance(11.0));
        assert!(fb.blocks().iter().all(|b| b.row == 1));
    }

    #[test]
    fn test_regenerate_row_zero_unique_columns_nonzero_values() {
        let mut fb = FallingBlocks::new(10.0, 42);
        // Across many waves: blocks only in row 0, one per column, values in
        // the signed span and never zero.
        for _ in 0..50 {
            fb.clear();
            fb.regenerate(8);
            let mut seen = HashSet::new();
            for b in fb.blocks() {
                assert_eq!(b.row, 0);
                assert!((0..8).contains(&b.col));
                assert!(seen.insert(b.col));
                assert!(b.value != 0);
                assert!((-WAVE_VALUE_SPAN..=WAVE_VALUE_SPAN).contains(&b.value));
            }
        }
    }

    #[test]
    fn test_regenerate_is_deterministic_per_seed() {
        let mut a = FallingBlocks::new(10.0, 7);
        let mut b = FallingBlocks::new(10.0, 7);
        a.regenerate(8);
        b.regenerate(8);
        assert_eq!(a.blocks(), b.blocks());
    }

    #[test]
    fn test_describe_landing_past_bottom_edge() {
        let fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 4);
        let landing = fb.describe_landing(Block { row: 4, col: 2, value: 1 }, &g);
        assert_eq!(landing, Landing::OnSpace { row: 3, col: 2 });
    }

    #[test]
    fn test_describe_landing_on_dead_redirects_above() {
        let fb = FallingBlocks::new(10.0, 1);
        let mut g = grid(4, 4);
        g.add_block(Block { row: 2, col: 1, value: 9 });
        g.add_block(Block { row: 2, col: 1, value: 9 });
        assert!(g.is_dead(2, 1));
        let landing = fb.describe_landing(Block { row: 2, col: 1, value: 1 }, &g);
        assert_eq!(landing, Landing::OnDead { row: 1, col: 1 });
    }

    #[test]
    fn test_describe_landing_on_dead_in_top_row_targets_minus_one() {
        let fb = FallingBlocks::new(10.0, 1);
        let mut g = grid(4, 4);
        g.add_block(Block { row: 0, col: 0, value: 9 });
        g.add_block(Block { row: 0, col: 0, value: 9 });
        let landing = fb.describe_landing(Block { row: 0, col: 0, value: 1 }, &g);
        assert_eq!(landing, Landing::OnDead { row: -1, col: 0 });
        // The grid drops the overflow; the game-over poll picks it up.
        assert_eq!(
            g.add_block(Block { row: -1, col: 0, value: 1 }),
            Placement::Discarded
        );
    }

    #[test]
    fn test_describe_landing_on_live_targets_the_occupied_cell() {
        let fb = FallingBlocks::new(10.0, 1);
        let mut g = grid(4, 4);
        g.add_block(Block { row: 3, col: 0, value: 3 });
        let landing = fb.describe_landing(Block { row: 3, col: 0, value: 6 }, &g);
        assert_eq!(landing, Landing::OnLive { row: 3, col: 0 });
    }

    #[test]
    fn test_describe_landing_in_open_air() {
        let fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 4);
        let landing = fb.describe_landing(Block { row: 1, col: 1, value: 6 }, &g);
        assert_eq!(landing, Landing::Unlanded);
    }

    #[test]
    fn test_shift_left_cascades_a_chain() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 8);
        fb.add(1, 3, 1);
        fb.add(1, 4, 2);
        fb.add(1, 5, 3);
        assert!(fb.shift_left(&g));
        assert_eq!(cols_of(&fb), vec![2, 3, 4]);
    }

    #[test]
    fn test_shift_left_pinned_chain_moves_nothing() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 8);
        fb.add(1, 0, 1);
        fb.add(1, 1, 2);
        fb.add(1, 2, 3);
        assert!(!fb.shift_left(&g));
        assert_eq!(cols_of(&fb), vec![0, 1, 2]);
    }

    #[test]
    fn test_shift_right_cascades_and_stops_at_edge() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 8);
        fb.add(1, 5, 1);
        fb.add(1, 6, 2);
        fb.add(1, 7, 3);
        fb.shift_right(&g);
        assert_eq!(cols_of(&fb), vec![5, 6, 7]);
        fb.clear();
        fb.add(1, 4, 1);
        fb.add(1, 5, 2);
        fb.shift_right(&g);
        assert_eq!(cols_of(&fb), vec![5, 6]);
    }

    #[test]
    fn test_shift_never_crosses_a_dead_cell() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let mut g = grid(4, 8);
        g.add_block(Block { row: 1, col: 2, value: 9 });
        g.add_block(Block { row: 1, col: 2, value: 9 });
        assert!(g.is_dead(1, 2));
        fb.add(1, 3, 1);
        fb.add(1, 4, 2);
        fb.shift_left(&g);
        assert_eq!(cols_of(&fb), vec![3, 4]);
    }

    #[test]
    fn test_shift_onto_live_settled_cell_is_allowed() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let mut g = grid(4, 8);
        g.add_block(Block { row: 1, col: 2, value: 3 });
        assert!(!g.is_dead(1, 2));
        fb.add(1, 3, 1);
        fb.shift_left(&g);
        // Merge is decided at landing time, not at shift time.
        assert_eq!(cols_of(&fb), vec![2]);
    }

    #[test]
    fn test_shift_only_moves_same_row_neighbours() {
        let mut fb = FallingBlocks::new(10.0, 1);
        let g = grid(4, 8);
        fb.add(1, 3, 1);
        fb.add(2, 2, 2); // different row, not a neighbour
        fb.shift_left(&g);
        assert_eq!(cols_of(&fb), vec![2, 1]);
    }

    #[test]
    fn test_slam_matches_repeated_single_step_descent() {
        let mut g = grid(8, 4);
        g.add_block(Block { row: 6, col: 1, value: 3 });
        g.add_block(Block { row: 4, col: 2, value: 9 });
        g.add_block(Block { row: 4, col: 2, value: 9 }); // dead obstruction

        let mut slammed = FallingBlocks::new(10.0, 1);
        slammed.add(0, 0, 1);
        slammed.add(0, 1, 2);
        slammed.add(1, 2, 3);
        let mut stepped = slammed.clone();

        slammed.slam(&g);

        // Reference: drop each block one row at a time until blocked.
        for block in &mut stepped.blocks {
            while block.row + 1 < g.row_count() && g.is_empty(block.row + 1, block.col) {
                block.row += 1;
            }
        }
        assert_eq!(slammed.blocks(), stepped.blocks());
        // Strictly downward or not at all, and blocked exactly at the
        // first obstruction in each column.
        let rows: Vec<i32> = slammed.blocks().iter().map(|b| b.row).collect();
        assert_eq!(rows, vec![7, 5, 3]);
    }

    /// Two blocks slammed in one column stack instead of overlapping.
    #[test]
    fn test_slam_stacks_blocks_in_one_column() {
        let g = grid(8, 4);
        let mut fb = FallingBlocks::new(10.0, 1);
        fb.add(0, 1, 1);
        fb.add(2, 1, 2);
        fb.slam(&g);
        let mut cells: Vec<(i32, i32)> = fb.blocks().iter().map(|b| (b.row, b.col)).collect();
        cells.sort();
        assert_eq!(cells, vec![(6, 1), (7, 1)]);
    }

    /// A slam after a shift must not drop a block through one that stopped
    /// higher up: here the first slam splits the two blocks across rows, the
    /// shift stacks them into one column (the lower one is pinned by a dead
    /// cell), and the second slam lands the upper one on top of the lower.
    #[test]
    fn test_slam_after_shift_keeps_blocks_in_distinct_cells() {
        let mut g = grid(8, 4);
        g.add_block(Block { row: 5, col: 0, value: 3 });
        g.add_block(Block { row: 7, col: 2, value: 9 });
        g.add_block(Block { row: 7, col: 2, value: 9 });
        assert!(g.is_dead(7, 2));

        let mut fb = FallingBlocks::new(10.0, 1);
        fb.add(0, 0, 1);
        fb.add(0, 1, 2);
        fb.slam(&g);
        fb.shift_right(&g);
        fb.slam(&g);

        let mut cells: Vec<(i32, i32)> = fb.blocks().iter().map(|b| (b.row, b.col)).collect();
        cells.sort();
        assert_eq!(cells, vec![(6, 1), (7, 1)]);
    }

    #[test]
    fn test_slam_on_floor_does_not_move() {
        let g = grid(4, 4);
        let mut fb = FallingBlocks::new(10.0, 1);
        fb.add(3, 0, 1);
        fb.slam(&g);
        assert_eq!(fb.blocks()[0].row, 3);
    }
}
