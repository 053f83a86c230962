//! Layout and drawing: menu, board, sidebar, controls, game over.

use crate::app::Screen;
use crate::game::{Cue, GameState};
use crate::grid::Cell;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::collections::{HashMap, HashSet};

/// Each grid cell is one terminal row tall and wide enough for a signed
/// two-digit value.
const CELL_WIDTH: u16 = 4;
const SIDEBAR_WIDTH: u16 = 22;

/// Board size in terminal cells (border included) for given grid dimensions.
fn board_pixel_size(cols: u16, rows: u16) -> (u16, u16) {
    (cols * CELL_WIDTH + 2, rows + 2)
}

/// Draw current screen (menu, controls, game, game over), with optional
/// pause overlay.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    theme: &Theme,
    paused: bool,
    menu_selection: usize,
    last_cue: Option<Cue>,
) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.bg)),
        area,
    );
    match screen {
        Screen::Menu => draw_menu(frame, theme, menu_selection, area),
        Screen::Controls => draw_controls(frame, theme, area),
        Screen::Playing => {
            draw_game(frame, state, theme, last_cue, area);
            if paused {
                draw_center_overlay(frame, theme, area, &["PAUSED", "", "p to resume"]);
            }
        }
        Screen::GameOver => {
            draw_game(frame, state, theme, last_cue, area);
            let score = format!("score: {}", state.score);
            draw_center_overlay(
                frame,
                theme,
                area,
                &["GAME OVER", "", score.as_str(), "", "r restart · q quit"],
            );
        }
    }
}

fn draw_menu(frame: &mut Frame, theme: &Theme, selection: usize, area: Rect) {
    let mut lines = vec![
        Line::styled("N U M I N O", Style::default().fg(theme.title)),
        Line::raw(""),
        Line::styled(
            "merge the falling numbers, keep the sums alive",
            Style::default().fg(theme.main_fg),
        ),
        Line::raw(""),
    ];
    for (i, option) in MENU_OPTIONS.iter().enumerate() {
        let style = if i == selection {
            Style::default().fg(theme.bg).bg(theme.title)
        } else {
            Style::default().fg(theme.main_fg)
        };
        lines.push(Line::styled(format!("  {option}  "), style));
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(
        "up/down select · enter confirm · q quit",
        Style::default().fg(theme.div_line),
    ));
    render_centered_lines(frame, theme, area, lines);
}

/// Menu entries, in display order. Indexed by the app's selection.
pub const MENU_OPTIONS: [&str; 3] = ["New Game", "Controls", "Exit"];

fn draw_controls(frame: &mut Frame, theme: &Theme, area: Rect) {
    let controls: [(&str, &str); 5] = [
        ("a / left", "shift blocks left"),
        ("d / right", "shift blocks right"),
        ("s / down", "slam blocks to the bottom"),
        ("p", "pause"),
        ("q / esc", "back / quit"),
    ];
    let mut lines = vec![
        Line::styled("CONTROLS", Style::default().fg(theme.title)),
        Line::raw(""),
    ];
    for (key, desc) in controls {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:>10}"), Style::default().fg(theme.title)),
            Span::styled(format!("  {desc}"), Style::default().fg(theme.main_fg)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "q to go back",
        Style::default().fg(theme.div_line),
    ));
    render_centered_lines(frame, theme, area, lines);
}

fn render_centered_lines(frame: &mut Frame, theme: &Theme, area: Rect, lines: Vec<Line>) {
    let height = (lines.len() as u16).min(area.height);
    let rect = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: area.width,
        height,
    };
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.bg)),
        rect,
    );
}

fn draw_game(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    last_cue: Option<Cue>,
    area: Rect,
) {
    let cols = state.grid.col_count() as u16;
    let rows = state.grid.row_count() as u16;
    let (bw, bh) = board_pixel_size(cols, rows);
    let total_w = bw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(bh) / 2;
    let board_outer = Rect {
        x,
        y,
        width: bw.min(area.width),
        height: bh.min(area.height),
    };

    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line))
            .title(Span::styled(" numino ", Style::default().fg(theme.title))),
        board_outer,
    );

    let board_inner = Rect {
        x: board_outer.x + 1,
        y: board_outer.y + 1,
        width: (cols * CELL_WIDTH).min(board_outer.width.saturating_sub(2)),
        height: rows.min(board_outer.height.saturating_sub(2)),
    };
    frame.render_widget(board_paragraph(state, theme), board_inner);

    let sidebar = Rect {
        x: (board_outer.x + board_outer.width).min(area.x + area.width),
        y: board_outer.y,
        width: SIDEBAR_WIDTH.min((area.x + area.width).saturating_sub(board_outer.x + board_outer.width)),
        height: board_outer.height,
    };
    if sidebar.width > 2 {
        frame.render_widget(sidebar_paragraph(state, theme, last_cue), sidebar);
    }
}

/// The board as styled text: one line per grid row, one fixed-width span
/// per cell. Falling blocks draw over settled cells; trails fill the cells
/// a slam rushed through.
fn board_paragraph<'a>(state: &GameState, theme: &'a Theme) -> Paragraph<'a> {
    let falling: HashMap<(i32, i32), i32> = state
        .falling
        .blocks()
        .iter()
        .map(|b| ((b.row, b.col), b.value))
        .collect();
    let trails: HashSet<(i32, i32)> = state
        .slam_trails()
        .iter()
        .flat_map(|t| (t.from_row..t.to_row).map(move |row| (row, t.col)))
        .collect();

    let mut lines = Vec::with_capacity(state.grid.row_count() as usize);
    for row in 0..state.grid.row_count() {
        let mut spans = Vec::with_capacity(state.grid.col_count() as usize);
        for col in 0..state.grid.col_count() {
            let span = if let Some(&value) = falling.get(&(row, col)) {
                Span::styled(
                    format!("{value:^width$}", width = CELL_WIDTH as usize),
                    Style::default().fg(theme.bg).bg(theme.falling),
                )
            } else {
                match state.grid.cell(row, col) {
                    Cell::Live(value) => Span::styled(
                        format!("{value:^width$}", width = CELL_WIDTH as usize),
                        Style::default().fg(theme.bg).bg(theme.live),
                    ),
                    Cell::Dead(value) => Span::styled(
                        format!("{value:^width$}", width = CELL_WIDTH as usize),
                        Style::default().fg(theme.bg).bg(theme.dead),
                    ),
                    Cell::Empty if trails.contains(&(row, col)) => Span::styled(
                        " ".repeat(CELL_WIDTH as usize),
                        Style::default().bg(theme.trail),
                    ),
                    Cell::Empty => Span::styled(
                        format!("{:^width$}", "·", width = CELL_WIDTH as usize),
                        Style::default().fg(theme.div_line).bg(theme.bg),
                    ),
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }
    Paragraph::new(lines)
}

fn sidebar_paragraph<'a>(
    state: &GameState,
    theme: &'a Theme,
    last_cue: Option<Cue>,
) -> Paragraph<'a> {
    let label = Style::default().fg(theme.div_line);
    let value = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::styled(" numinotui", Style::default().fg(theme.title)),
        Line::raw(""),
        Line::from(vec![
            Span::styled(" score   ", label),
            Span::styled(state.score.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" falling ", label),
            Span::styled(state.falling.len().to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" step    ", label),
            Span::styled(format!("{:.0} ticks", state.falling.ticks_per_step()), value),
        ]),
        Line::raw(""),
        Line::from(vec![
            Span::styled(" cue     ", label),
            match last_cue {
                Some(cue) => Span::styled(cue.label(), Style::default().fg(theme.title)),
                None => Span::styled("-", label),
            },
        ]),
        Line::raw(""),
    ];
    for hint in [" a/d shift", " s slam", " p pause", " q quit"] {
        lines.push(Line::styled(hint, label));
    }
    Paragraph::new(lines)
}

/// Small bordered box of text over the centre of the board area.
fn draw_center_overlay(frame: &mut Frame, theme: &Theme, area: Rect, text: &[&str]) {
    let width = text
        .iter()
        .map(|t| t.len() as u16)
        .max()
        .unwrap_or(0)
        .max(12)
        + 6;
    let height = text.len() as u16 + 2;
    let rect = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    };
    frame.render_widget(Clear, rect);
    let lines: Vec<Line> = text
        .iter()
        .map(|t| Line::styled(t.to_string(), Style::default().fg(theme.main_fg)))
        .collect();
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(theme.bg))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.title)),
            ),
        rect,
    );
}
