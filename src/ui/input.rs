//! Keyboard input handling.
//!
//! Maps key events to dashboard commands. Navigation keys are fixed; any
//! other printable character is offered to the action table of the
//! selected node.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::application::Command;

/// Convert a keyboard event to a Command
pub fn key_to_command(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Command::Quit),
            KeyCode::Char('r') => Some(Command::Refresh),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Command::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Command::MoveDown),
        KeyCode::PageUp => Some(Command::PageUp),
        KeyCode::PageDown => Some(Command::PageDown),
        KeyCode::Home => Some(Command::First),
        KeyCode::End => Some(Command::Last),
        KeyCode::Char(' ') => Some(Command::ToggleExpand),
        KeyCode::Right | KeyCode::Char('l') => Some(Command::Expand),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => Some(Command::Collapse),
        KeyCode::Enter => Some(Command::Activate),
        KeyCode::F(5) => Some(Command::Refresh),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char(c) if !c.is_control() => Some(Command::InvokeAction(c)),
        _ => None,
    }
}
