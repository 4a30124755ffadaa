//! Keystroke-to-command mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use warren_core::Command;

/// What a keystroke asks for. Quit and redraw are frontend concerns and
/// never reach the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Command(Command),
    Quit,
    Redraw,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    use KeyCode::{
        Backspace, Char, Down, End, Enter, Home, Left, PageDown, PageUp, Right, Up, F,
    };

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            Char('l') => Some(Action::Redraw),
            _ => None,
        };
    }

    let command = match key.code {
        Char('k') | Up => Command::CursorUp,
        Char('j') | Down => Command::CursorDown,
        Char('h') | Left | Backspace => Command::Back,
        Char('l') | Right | Enter => Command::Select,
        Char('u') | PageUp => Command::PageUp,
        Char('d') | Char(' ') | PageDown => Command::PageDown,
        Char('n') | Char('J') => Command::NextSelectable,
        Char('p') | Char('K') => Command::PrevSelectable,
        Char('g') | Home => Command::Top,
        Char('G') | End => Command::Bottom,
        Char('r') | F(5) => Command::Reload,
        Char('o') => Command::OpenAddress,
        Char('v') => Command::OpenExternal,
        Char('D') => Command::Download,
        Char('q') => return Some(Action::Quit),
        _ => return None,
    };
    Some(Action::Command(command))
}
