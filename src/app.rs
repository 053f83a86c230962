//! App: terminal init, main loop, screens and key handling.

use crate::game::{Cue, GameState};
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::{Args, GameConfig};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

/// Target frame interval (~60 FPS); one simulation tick per frame.
const FRAME: Duration = Duration::from_millis(16);
/// How long a drained cue stays visible in the sidebar.
const CUE_FLASH_MS: u64 = 700;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Controls,
    Playing,
    GameOver,
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    menu_selection: usize,
    last_cue: Option<(Cue, Instant)>,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let state = GameState::new(&config);
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Self {
            args,
            config,
            theme,
            state,
            screen,
            paused: false,
            menu_selection: 0,
            last_cue: None,
        }
    }

    fn reset_game(&mut self) {
        // A fixed --seed replays the same session; otherwise every game gets
        // a fresh one.
        if self.args.seed.is_none() {
            self.config.seed = rand::random();
        }
        self.state = GameState::new(&self.config);
        self.screen = Screen::Playing;
        self.paused = false;
        self.last_cue = None;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();
            let cue = self
                .last_cue
                .filter(|(_, at)| at.elapsed() < Duration::from_millis(CUE_FLASH_MS))
                .map(|(c, _)| c);
            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.state,
                    &self.theme,
                    self.paused,
                    self.menu_selection,
                    cue,
                );
            })?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Edge-triggered input: one action per key press.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                }
            }

            if self.screen == Screen::Playing && !self.paused {
                self.state.tick();
                let now = Instant::now();
                for cue in self.state.take_cues() {
                    self.last_cue = Some((cue, now));
                }
                if self.state.game_over {
                    self.screen = Screen::GameOver;
                }
            }
        }
    }

    /// Handles one key press; returns true when the app should exit.
    fn handle_key(&mut self, key: event::KeyEvent) -> bool {
        let action = key_to_action(key);
        match self.screen {
            Screen::Menu => match key.code {
                KeyCode::Up | KeyCode::Char('k') => {
                    self.menu_selection = (self.menu_selection + crate::ui::MENU_OPTIONS.len() - 1)
                        % crate::ui::MENU_OPTIONS.len();
                }
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                    self.menu_selection = (self.menu_selection + 1) % crate::ui::MENU_OPTIONS.len();
                }
                KeyCode::Enter | KeyCode::Char(' ') => match self.menu_selection {
                    0 => self.reset_game(),
                    1 => self.screen = Screen::Controls,
                    _ => return true,
                },
                _ if action == Action::Quit => return true,
                _ => {}
            },
            Screen::Controls => {
                if action == Action::Quit {
                    self.screen = Screen::Menu;
                }
            }
            Screen::Playing => {
                if self.paused {
                    match action {
                        Action::Pause => self.paused = false,
                        Action::Quit => return self.leave_to_menu(),
                        _ => {}
                    }
                } else {
                    match action {
                        Action::ShiftLeft => self.state.shift_left(),
                        Action::ShiftRight => self.state.shift_right(),
                        Action::Slam => self.state.slam(),
                        Action::Pause => self.paused = true,
                        Action::Quit => return self.leave_to_menu(),
                        Action::None => {}
                    }
                }
            }
            Screen::GameOver => match key.code {
                KeyCode::Char('r') | KeyCode::Char('R') => self.reset_game(),
                _ if action == Action::Quit => return self.leave_to_menu(),
                _ => {}
            },
        }
        false
    }

    /// Returns true (exit the app) for --no-menu sessions, which have no
    /// menu to fall back to; otherwise switches to the menu screen.
    fn leave_to_menu(&mut self) -> bool {
        if self.args.no_menu {
            return true;
        }
        self.screen = Screen::Menu;
        self.paused = false;
        false
    }
}
