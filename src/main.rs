//! Numinotui — Numino-style falling-number merge puzzle in the terminal.

mod app;
mod blocks;
mod counter;
mod game;
mod grid;
mod input;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use clap::{Parser, ValueEnum};

/// Session constants derived from the CLI: board size, timing, merge rules.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: u16,
    pub cols: u16,
    pub ticks_per_step: f64,
    pub speedup_factor: f64,
    pub speedup_interval: f64,
    pub death_threshold: i32,
    pub seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        rows: args.rows,
        cols: args.cols,
        ticks_per_step: args.ticks_per_step,
        speedup_factor: args.speedup_factor,
        speedup_interval: args.speedup_interval,
        death_threshold: args.death_threshold,
        seed: args.seed.unwrap_or_else(rand::random),
    };
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Numino-style falling-number merge puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "numinotui",
    version,
    about = "Numino-style falling-number merge puzzle in the terminal. Shift and slam falling numbers; merged sums past the threshold die for good.",
    long_about = "Numinotui is a terminal puzzle game in the spirit of Numino.\n\n\
        Numbered blocks fall down the board in sparse waves. Shift them sideways or slam them \
        to the bottom. A block landing on a settled number merges into it (values add up); a \
        sum past the death threshold kills the cell permanently. The game is over when a dead \
        cell reaches the top row.\n\n\
        CONTROLS:\n  a / Left    Shift left     d / Right  Shift right\n  s / Down    Slam           p          Pause      q / Esc    Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme), and --seed to replay a run."
)]
pub struct Args {
    /// Board height in rows.
    #[arg(long, default_value = "15", value_name = "ROWS")]
    pub rows: u16,

    /// Board width in columns.
    #[arg(long, default_value = "8", value_name = "COLS")]
    pub cols: u16,

    /// Ticks (frames at ~60 FPS) between descent steps at game start.
    #[arg(long, default_value = "30.0", value_name = "TICKS")]
    pub ticks_per_step: f64,

    /// Multiplier applied to the step interval at each speed-up (< 1).
    #[arg(long, default_value = "0.9", value_name = "FACTOR")]
    pub speedup_factor: f64,

    /// Ticks between speed-ups.
    #[arg(long, default_value = "1800.0", value_name = "TICKS")]
    pub speedup_interval: f64,

    /// A merged sum above this value kills the cell.
    #[arg(long, default_value = "20", value_name = "N")]
    pub death_threshold: i32,

    /// Seed for the wave generator (same seed, same waves). Random if unset.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
