//! Game session: wires falling blocks to the settled grid, drives the
//! per-frame order of play, and emits sound cues.

use crate::GameConfig;
use crate::blocks::{Block, FallingBlocks, Landing};
use crate::grid::{Placement, SettledGrid};

/// How long a slam trail stays on screen, in frames.
const SLAM_TRAIL_FRAMES: u32 = 30;

/// Named event for the audio sink. The core holds no audio state; whoever
/// drains these maps them to sounds (or, in the TUI, a sidebar flash).
/// Cues report effects, not keypresses: an input that moved nothing stays
/// silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Shifted,
    Slammed,
    Merged,
    Died,
}

impl Cue {
    pub fn label(self) -> &'static str {
        match self {
            Self::Shifted => "shift",
            Self::Slammed => "slam",
            Self::Merged => "merge",
            Self::Died => "died!",
        }
    }
}

/// Column span a slam dragged a block through, for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlamTrail {
    pub col: i32,
    pub from_row: i32,
    pub to_row: i32,
}

/// One game session. Owns both state holders and runs the fixed frame
/// sequence: input has already been applied; `tick` advances descent,
/// resolves landings, regenerates waves and checks for the end.
#[derive(Debug)]
pub struct GameState {
    pub grid: SettledGrid,
    pub falling: FallingBlocks,
    pub score: u32,
    pub game_over: bool,
    ticks: f64,
    next_speedup: f64,
    speedup_factor: f64,
    speedup_interval: f64,
    cues: Vec<Cue>,
    slam_trails: Vec<SlamTrail>,
    slam_trail_frames: u32,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            grid: SettledGrid::new(
                config.rows as usize,
                config.cols as usize,
                config.death_threshold,
            ),
            falling: FallingBlocks::new(config.ticks_per_step, config.seed),
            score: 0,
            game_over: false,
            ticks: 0.0,
            next_speedup: config.speedup_interval,
            speedup_factor: config.speedup_factor,
            speedup_interval: config.speedup_interval,
            cues: Vec::new(),
            slam_trails: Vec::new(),
            slam_trail_frames: 0,
        }
    }

    /// Player input: move the whole active set one column left. Cues only
    /// when at least one block moved.
    pub fn shift_left(&mut self) {
        if self.game_over {
            return;
        }
        if self.falling.shift_left(&self.grid) {
            self.cues.push(Cue::Shifted);
        }
    }

    /// Player input: move the whole active set one column right. Cues only
    /// when at least one block moved.
    pub fn shift_right(&mut self) {
        if self.game_over {
            return;
        }
        if self.falling.shift_right(&self.grid) {
            self.cues.push(Cue::Shifted);
        }
    }

    /// Player input: drop every block to its lowest reachable cell. Records
    /// the travelled spans so the renderer can draw trails for a few frames.
    pub fn slam(&mut self) {
        if self.game_over {
            return;
        }
        let before: Vec<Block> = self.falling.blocks().to_vec();
        self.falling.slam(&self.grid);
        self.slam_trails = before
            .iter()
            .zip(self.falling.blocks())
            .filter(|(start, end)| end.row > start.row)
            .map(|(start, end)| SlamTrail {
                col: start.col,
                from_row: start.row,
                to_row: end.row,
            })
            .collect();
        if !self.slam_trails.is_empty() {
            self.slam_trail_frames = SLAM_TRAIL_FRAMES;
            self.cues.push(Cue::Slammed);
        }
    }

    /// One frame of simulation.
    pub fn tick(&mut self) {
        if self.game_over {
            return;
        }
        self.ticks += 1.0;

        if self.slam_trail_frames > 0 {
            self.slam_trail_frames -= 1;
            if self.slam_trail_frames == 0 {
                self.slam_trails.clear();
            }
        }

        self.falling.advance(self.ticks);
        if self.next_speedup <= self.ticks {
            self.falling.speed_up(self.speedup_factor);
            self.next_speedup = self.ticks + self.speedup_interval;
        }

        self.resolve_landings();

        if self.falling.is_empty() {
            self.falling.regenerate(self.grid.col_count());
        }

        if self.grid.is_over() {
            self.game_over = true;
        }
    }

    /// Translates every landed block into a grid mutation and removes it
    /// from the active set.
    ///
    /// Blocks are processed column-ascending, bottom-most first, so that
    /// when several blocks land in one frame (after a slam, or above a dead
    /// cell) the outcome does not depend on insertion order.
    fn resolve_landings(&mut self) {
        let mut order: Vec<Block> = self.falling.blocks().to_vec();
        order.sort_by_key(|b| (b.col, -b.row));

        for block in order {
            let (row, col) = match self.falling.describe_landing(block, &self.grid) {
                Landing::Unlanded => continue,
                Landing::OnSpace { row, col }
                | Landing::OnDead { row, col }
                | Landing::OnLive { row, col } => (row, col),
            };
            let placement = self.grid.add_block(Block {
                row,
                col,
                value: block.value,
            });
            match placement {
                Placement::Merged => self.cues.push(Cue::Merged),
                Placement::Died => self.cues.push(Cue::Died),
                Placement::Placed | Placement::Discarded => {}
            }
            self.score += 1;
            self.falling.remove(block.row, block.col);
        }
    }

    /// Drains the cue queue accumulated since the last call.
    pub fn take_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn slam_trails(&self) -> &[SlamTrail] {
        &self.slam_trails
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn config(rows: u16, cols: u16, ticks_per_step: f64, death_threshold: i32) -> GameConfig {
        GameConfig {
            rows,
            cols,
            ticks_per_step,
            speedup_factor: 0.9,
            speedup_interval: 100_000.0,
            death_threshold,
            seed: 42,
        }
    }

    /// The end-to-end scenario: a 6-block falls onto a settled live 3,
    /// merges to 9, and a further +2 kills the cell.
    #[test]
    fn test_merge_then_death_end_to_end() {
        let mut game = GameState::new(&config(4, 4, 1.0, 10));
        game.grid.add_block(Block { row: 3, col: 0, value: 3 });
        game.falling.add(0, 0, 6);

        // Descend until the 6-block has resolved into the grid.
        for _ in 0..10 {
            game.tick();
            if game.grid.value_at(3, 0) != 3 {
                break;
            }
        }
        assert_eq!(game.grid.cell(3, 0), Cell::Live(9));
        assert_eq!(game.score, 1);

        let landing = game.falling.describe_landing(Block { row: 3, col: 0, value: 2 }, &game.grid);
        assert_eq!(landing, Landing::OnLive { row: 3, col: 0 });
        game.grid.add_block(Block { row: 3, col: 0, value: 2 });
        assert_eq!(game.grid.cell(3, 0), Cell::Dead(11));
    }

    #[test]
    fn test_landed_wave_triggers_regeneration() {
        let mut game = GameState::new(&config(3, 4, 1.0, 10));
        game.falling.add(2, 1, 5);
        // The next step drops the block past the floor; it resolves, the
        // set empties and a fresh wave appears in row 0 the same frame.
        game.tick();
        game.tick();
        assert_eq!(game.grid.cell(2, 1), Cell::Live(5));
        assert!(game.falling.blocks().iter().all(|b| b.row == 0));
    }

    #[test]
    fn test_game_over_when_dead_reaches_top_row() {
        let mut game = GameState::new(&config(2, 2, 1.0, 10));
        game.grid.add_block(Block { row: 0, col: 1, value: 9 });
        game.grid.add_block(Block { row: 0, col: 1, value: 9 });
        game.tick();
        assert!(game.game_over);
        // Input and time are ignored after the end.
        let before = game.falling.blocks().to_vec();
        game.shift_left();
        game.slam();
        game.tick();
        assert_eq!(game.falling.blocks(), before.as_slice());
    }

    #[test]
    fn test_overflow_block_is_dropped_silently() {
        let mut game = GameState::new(&config(3, 2, 1.0, 10));
        game.grid.add_block(Block { row: 0, col: 0, value: 9 });
        game.grid.add_block(Block { row: 0, col: 0, value: 9 });
        assert!(game.grid.is_dead(0, 0));
        game.falling.add(0, 0, 4);
        game.tick();
        // Landed on a dead top-row cell: discarded, value unchanged, and
        // the session flags the end.
        assert_eq!(game.grid.cell(0, 0), Cell::Dead(18));
        assert!(game.game_over);
    }

    #[test]
    fn test_speedup_schedule_shrinks_interval() {
        let mut cfg = config(20, 4, 10.0, 10);
        cfg.speedup_interval = 5.0;
        let mut game = GameState::new(&cfg);
        let start = game.falling.ticks_per_step();
        for _ in 0..6 {
            game.tick();
        }
        assert!(game.falling.ticks_per_step() < start);
    }

    #[test]
    fn test_slam_records_trails_and_cue() {
        let mut game = GameState::new(&config(6, 4, 100.0, 10));
        game.falling.add(0, 2, 3);
        game.slam();
        assert_eq!(
            game.slam_trails(),
            &[SlamTrail { col: 2, from_row: 0, to_row: 5 }]
        );
        let cues = game.take_cues();
        assert!(cues.contains(&Cue::Slammed));
        assert!(game.take_cues().is_empty());
    }

    #[test]
    fn test_cues_only_fire_when_something_moved() {
        let mut game = GameState::new(&config(4, 3, 100.0, 10));
        game.falling.add(1, 0, 1);
        // Pinned against the left edge: the keypress moves nothing.
        game.shift_left();
        assert!(game.take_cues().is_empty());
        game.shift_right();
        assert_eq!(game.take_cues(), vec![Cue::Shifted]);
        game.slam();
        assert_eq!(game.take_cues(), vec![Cue::Slammed]);
        // Already on the floor.
        game.slam();
        assert!(game.take_cues().is_empty());
    }

    #[test]
    fn test_merge_and_death_cues() {
        let mut game = GameState::new(&config(4, 2, 1.0, 10));
        game.grid.add_block(Block { row: 3, col: 0, value: 4 });
        game.falling.add(3, 0, 5);
        game.tick();
        assert!(game.take_cues().contains(&Cue::Merged));
        game.falling.clear();
        game.falling.add(3, 0, 9);
        game.tick();
        assert!(game.take_cues().contains(&Cue::Died));
    }
}
