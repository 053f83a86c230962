//! Key bindings: normal and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press. Each press is one discrete invocation; there is
/// no hold-to-repeat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ShiftLeft,
    ShiftRight,
    Slam,
    Pause,
    Quit,
    None,
}

/// Map key event to game action. Supports the classic a/s/d keys plus
/// arrows and vim-style h/j/l.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod && modifiers != KeyModifiers::CONTROL {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc if no_mod => Action::Quit,
        KeyCode::Char('c') if modifiers == KeyModifiers::CONTROL => Action::Quit,
        KeyCode::Char('p') if no_mod => Action::Pause,
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') if no_mod => Action::ShiftLeft,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') if no_mod => Action::ShiftRight,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') | KeyCode::Char(' ') if no_mod => {
            Action::Slam
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn test_classic_keys() {
        assert_eq!(key_to_action(press(KeyCode::Char('a'))), Action::ShiftLeft);
        assert_eq!(key_to_action(press(KeyCode::Char('d'))), Action::ShiftRight);
        assert_eq!(key_to_action(press(KeyCode::Char('s'))), Action::Slam);
        assert_eq!(key_to_action(press(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_unbound_key_is_none() {
        assert_eq!(key_to_action(press(KeyCode::Char('x'))), Action::None);
    }
}
