use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Key-level intent, before it reaches the pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    /// Left click at a terminal cell.
    Click {
        column: u16,
        row: u16,
    },
    Forward,
    Backward,
    Select,
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    // Only handle key press events, not release
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Tab => Some(Action::Forward),
        KeyCode::BackTab => Some(Action::Backward),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Move(Direction::Up)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('h') => Some(Action::Move(Direction::Left)),
        KeyCode::Right | KeyCode::Char('l') => Some(Action::Move(Direction::Right)),
        _ => None,
    }
}

pub fn map_mouse(mouse: MouseEvent) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::Click {
            column: mouse.column,
            row: mouse.row,
        }),
        MouseEventKind::ScrollDown => Some(Action::Move(Direction::Down)),
        MouseEventKind::ScrollUp => Some(Action::Move(Direction::Up)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_paging_keys() {
        assert_eq!(
            map_key(press(KeyCode::Tab, KeyModifiers::NONE)),
            Some(Action::Forward)
        );
        assert_eq!(
            map_key(press(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Action::Backward)
        );
    }

    #[test]
    fn test_ctrl_c_quits_but_plain_c_does_not() {
        assert_eq!(
            map_key(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(map_key(press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_vi_keys_move_selection() {
        assert_eq!(
            map_key(press(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::Move(Direction::Down))
        );
        assert_eq!(
            map_key(press(KeyCode::Left, KeyModifiers::NONE)),
            Some(Action::Move(Direction::Left))
        );
    }

    #[test]
    fn test_release_events_ignored() {
        let mut key = press(KeyCode::Tab, KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }

    #[test]
    fn test_left_click_and_wheel() {
        let click = mouse(MouseEventKind::Down(MouseButton::Left), 3, 7);
        let expected = Action::Click { column: 3, row: 7 };
        assert_eq!(map_mouse(click), Some(expected));
        let wheel = mouse(MouseEventKind::ScrollDown, 0, 0);
        assert_eq!(map_mouse(wheel), Some(Action::Move(Direction::Down)));
        let right = mouse(MouseEventKind::Down(MouseButton::Right), 1, 1);
        assert_eq!(map_mouse(right), None);
    }
}
