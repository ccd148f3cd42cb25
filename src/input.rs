//! Key bindings: arrows and vim-style hjkl.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    /// Pick up the tile under the cursor, or drop the selection.
    Select,
    Restart,
    /// Back to the level list.
    Levels,
    Next,
    Quit,
    None,
}

/// Map a key event to an action. Anything held with Alt or Ctrl is ignored, except
/// Ctrl-C which quits.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if !(modifiers.is_empty() || modifiers == KeyModifiers::SHIFT) {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char('r' | 'R') => Action::Restart,
        KeyCode::Char('m') | KeyCode::Tab => Action::Levels,
        KeyCode::Char('n') => Action::Next,
        _ => Action::None,
    }
}
