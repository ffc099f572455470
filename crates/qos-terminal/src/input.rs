//! Key translation from crossterm events to shell [`Command`]s.
//!
//! The mapping depends on the open overlay: while the assistant chat is
//! open, printable keys are text input rather than shortcuts.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use qos_shell::{Command, Overlay};

/// Decode one key event. Returns `None` for keys without a binding and
/// for release/repeat events.
#[must_use]
pub fn translate(key: KeyEvent, overlay: &Overlay) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c' | 'C')).then_some(Command::Quit);
    }

    match (key.code, overlay) {
        (KeyCode::Esc, overlay) if overlay.is_open() => Some(Command::Dismiss),
        (KeyCode::Esc, _) => Some(Command::Quit),

        (KeyCode::Enter, _) => Some(Command::Submit),
        (KeyCode::Backspace, Overlay::Assistant { .. }) => Some(Command::Backspace),
        (KeyCode::Char(c), Overlay::Assistant { .. }) => Some(Command::Input(c)),

        (KeyCode::Char('q' | 'Q'), _) => Some(Command::Quit),
        (KeyCode::Char(c @ '1'..='9'), _) => Some(Command::OpenApp(dock_index(c))),
        (KeyCode::Char('a' | 'A'), _) => Some(Command::OpenAssistant),
        (KeyCode::Char('r' | 'R'), _) => Some(Command::RefreshNow),
        (KeyCode::Char('p' | 'P'), _) => Some(Command::ToggleAnimation),
        _ => None,
    }
}

fn dock_index(digit: char) -> usize {
    digit.to_digit(10).map_or(0, |d| d as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn chat() -> Overlay {
        Overlay::Assistant { input: String::new() }
    }

    #[test]
    fn test_home_screen_shortcuts() {
        let home = Overlay::None;
        assert_eq!(translate(press(KeyCode::Char('q')), &home), Some(Command::Quit));
        assert_eq!(translate(press(KeyCode::Esc), &home), Some(Command::Quit));
        assert_eq!(translate(press(KeyCode::Char('1')), &home), Some(Command::OpenApp(0)));
        assert_eq!(translate(press(KeyCode::Char('9')), &home), Some(Command::OpenApp(8)));
        assert_eq!(translate(press(KeyCode::Char('a')), &home), Some(Command::OpenAssistant));
        assert_eq!(translate(press(KeyCode::Char('r')), &home), Some(Command::RefreshNow));
        assert_eq!(translate(press(KeyCode::Char('p')), &home), Some(Command::ToggleAnimation));
        assert_eq!(translate(press(KeyCode::Char('0')), &home), None);
        assert_eq!(translate(press(KeyCode::Tab), &home), None);
    }

    #[test]
    fn test_escape_closes_overlay_first() {
        let dialog = Overlay::AppDialog { index: 2 };
        assert_eq!(translate(press(KeyCode::Esc), &dialog), Some(Command::Dismiss));
        assert_eq!(translate(press(KeyCode::Esc), &chat()), Some(Command::Dismiss));
        assert_eq!(translate(press(KeyCode::Enter), &dialog), Some(Command::Submit));
    }

    #[test]
    fn test_chat_keys_are_text() {
        let overlay = chat();
        assert_eq!(translate(press(KeyCode::Char('q')), &overlay), Some(Command::Input('q')));
        assert_eq!(translate(press(KeyCode::Char('1')), &overlay), Some(Command::Input('1')));
        assert_eq!(translate(press(KeyCode::Char(' ')), &overlay), Some(Command::Input(' ')));
        assert_eq!(translate(press(KeyCode::Backspace), &overlay), Some(Command::Backspace));
        assert_eq!(translate(press(KeyCode::Enter), &overlay), Some(Command::Submit));
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate(ctrl_c, &Overlay::None), Some(Command::Quit));
        assert_eq!(translate(ctrl_c, &chat()), Some(Command::Quit));
        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(translate(ctrl_x, &chat()), None);
    }

    #[test]
    fn test_release_events_ignored() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(translate(release, &Overlay::None), None);
    }
}
