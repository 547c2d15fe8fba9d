use anyhow::Result;
use bqpager_engine::{
    BridgeMessage, NavEvent, NavOutcome, NavigationController, ScreenPos, SelectionResolver,
};
use bqpager_types::Page;
use ratatui::layout::Rect;
use ratatui::widgets::TableState;

use super::input::{Action, Direction};
use crate::clipboard::Clipboard;

pub(crate) const HELP_TEXT: &str =
    "Ctrl-C to Stop, j/k/l/h or Arrows to move selection, Enter to copy, Tab/S-Tab to move pages";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Copied(String),
    ClipboardFailed(String),
}

/// Where the last frame put the table, for mouse hit-testing.
#[derive(Debug, Clone, Default)]
pub(crate) struct TableLayout {
    /// Pinned header rows.
    pub header: Rect,
    /// Scrolling data rows.
    pub body: Rect,
    /// `(x, width, column index)` of each drawn column.
    pub columns: Vec<(u16, u16, usize)>,
    /// Index of the first data row drawn in `body`.
    pub body_offset: usize,
}

impl TableLayout {
    fn hit(&self, page: &Page, x: u16, y: u16) -> Option<ScreenPos> {
        let (_, _, column) = self
            .columns
            .iter()
            .find(|(start, width, _)| x >= *start && x < start + width)
            .copied()?;

        let row = if contains(self.header, x, y) {
            usize::from(y - self.header.y)
        } else if contains(self.body, x, y) {
            page.header_len() + self.body_offset + usize::from(y - self.body.y)
        } else {
            return None;
        };
        (row < page.display_len()).then_some(ScreenPos::new(row, column))
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.right() && y >= area.y && y < area.bottom()
}

/// UI-only state: selection, scroll and status line. Paging state lives in
/// the [`NavigationController`].
pub struct App {
    pub(crate) selection: ScreenPos,
    pub(crate) column_offset: usize,
    pub(crate) table_state: TableState,
    pub(crate) layout: TableLayout,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) tick: usize,
    pub(crate) page_size: usize,
    should_quit: bool,
}

impl App {
    pub fn new(page_size: usize) -> Self {
        Self {
            selection: ScreenPos::default(),
            column_offset: 0,
            table_state: TableState::default(),
            layout: TableLayout::default(),
            status: None,
            tick: 0,
            page_size,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selection(&self) -> ScreenPos {
        self.selection
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn handle_action(
        &mut self,
        action: Action,
        nav: &mut NavigationController,
        clipboard: &mut dyn Clipboard,
    ) -> Result<()> {
        let event = match action {
            Action::Move(direction) => {
                self.move_selection(direction, nav.state().current_page());
                return Ok(());
            }
            Action::Click { column, row } => {
                let page = nav.state().current_page();
                if let Some(pos) = self.layout.hit(page, column, row) {
                    self.selection = pos;
                }
                return Ok(());
            }
            Action::Forward => NavEvent::Forward,
            Action::Backward => NavEvent::Backward,
            Action::Select => NavEvent::SelectCell(self.selection),
            Action::Quit => NavEvent::Quit,
        };
        let outcome = nav.handle(event)?;
        self.on_outcome(outcome, nav, clipboard);
        Ok(())
    }

    /// Applies a background fetch result. Runs on the render thread only.
    pub fn apply(
        &mut self,
        message: BridgeMessage,
        nav: &mut NavigationController,
        clipboard: &mut dyn Clipboard,
    ) -> Result<()> {
        let outcome = nav.apply(message)?;
        self.on_outcome(outcome, nav, clipboard);
        Ok(())
    }

    fn on_outcome(
        &mut self,
        outcome: NavOutcome,
        nav: &NavigationController,
        clipboard: &mut dyn Clipboard,
    ) {
        match outcome {
            NavOutcome::Redraw => {
                let page = nav.state().current_page();
                self.status = None;
                self.selection = SelectionResolver::clamp(page, self.selection);
                self.table_state = TableState::default();
            }
            NavOutcome::Selected(text) => {
                self.status = Some(match clipboard.set_text(&text) {
                    Ok(()) => StatusMessage::Copied(text),
                    Err(err) => StatusMessage::ClipboardFailed(err.to_string()),
                });
            }
            NavOutcome::Quit => self.should_quit = true,
            NavOutcome::FetchStarted | NavOutcome::Ignored => {}
        }
    }

    fn move_selection(&mut self, direction: Direction, page: &Page) {
        let pos = &mut self.selection;
        match direction {
            Direction::Up => pos.row = pos.row.saturating_sub(1),
            Direction::Down => pos.row += 1,
            Direction::Left => pos.column = pos.column.saturating_sub(1),
            Direction::Right => pos.column += 1,
        }
        self.selection = SelectionResolver::clamp(page, self.selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bqpager_engine::{PagerOptions, UiBridge};
    use bqpager_testing::ScriptedSource;
    use bqpager_types::{HeaderStyle, QueryMeta};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingClipboard {
        copied: Vec<String>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                anyhow::bail!("no display");
            }
            self.copied.push(text.to_string());
            Ok(())
        }
    }

    fn pager(rows: usize) -> (NavigationController, UiBridge) {
        let (source, _control) = ScriptedSource::numbered(rows).build();
        let (tx, bridge) = UiBridge::channel();
        let nav = NavigationController::start(
            source,
            QueryMeta::new(rows as u64, false),
            PagerOptions {
                page_size: 30,
                header_style: HeaderStyle::WithRequired,
            },
            tx,
        )
        .unwrap();
        (nav, bridge)
    }

    fn press(app: &mut App, nav: &mut NavigationController, action: Action, times: usize) {
        let mut clipboard = RecordingClipboard::default();
        for _ in 0..times {
            app.handle_action(action, nav, &mut clipboard).unwrap();
        }
    }

    #[test]
    fn test_enter_copies_selected_cell() {
        let (mut nav, _bridge) = pager(65);
        let mut app = App::new(30);
        let mut clipboard = RecordingClipboard::default();

        press(&mut app, &mut nav, Action::Move(Direction::Down), 3);
        press(&mut app, &mut nav, Action::Move(Direction::Right), 1);
        app.handle_action(Action::Select, &mut nav, &mut clipboard)
            .unwrap();

        assert_eq!(clipboard.copied, vec!["0"]);
        assert_eq!(app.status(), Some(&StatusMessage::Copied("0".to_string())));
    }

    #[test]
    fn test_clipboard_failure_is_not_fatal() {
        let (mut nav, _bridge) = pager(65);
        let mut app = App::new(30);
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };

        app.handle_action(Action::Select, &mut nav, &mut clipboard)
            .unwrap();
        assert!(matches!(
            app.status(),
            Some(StatusMessage::ClipboardFailed(_))
        ));
        assert!(!app.should_quit());
    }

    #[test]
    fn test_selection_clamped_after_moving_to_short_page() {
        let (mut nav, bridge) = pager(35);
        let mut app = App::new(30);
        let mut clipboard = RecordingClipboard::default();

        press(&mut app, &mut nav, Action::Move(Direction::Down), 40);
        assert_eq!(app.selection().row, 32);

        app.handle_action(Action::Forward, &mut nav, &mut clipboard)
            .unwrap();
        let message = bridge.recv_timeout(Duration::from_secs(5)).unwrap();
        app.apply(message, &mut nav, &mut clipboard).unwrap();

        assert_eq!(nav.state().current_index(), 1);
        assert_eq!(app.selection().row, 4);
    }

    #[test]
    fn test_click_outside_table_keeps_selection() {
        let (mut nav, _bridge) = pager(5);
        let mut app = App::new(30);
        app.layout = TableLayout {
            header: Rect::new(1, 3, 20, 3),
            body: Rect::new(1, 6, 20, 5),
            columns: vec![(1, 6, 0), (8, 2, 1)],
            body_offset: 0,
        };

        press(&mut app, &mut nav, Action::Click { column: 8, row: 7 }, 1);
        assert_eq!(app.selection(), ScreenPos::new(4, 1));

        press(&mut app, &mut nav, Action::Click { column: 0, row: 7 }, 1);
        press(&mut app, &mut nav, Action::Click { column: 1, row: 0 }, 1);
        assert_eq!(app.selection(), ScreenPos::new(4, 1));
    }

    #[test]
    fn test_quit_sets_flag() {
        let (mut nav, _bridge) = pager(5);
        let mut app = App::new(30);
        press(&mut app, &mut nav, Action::Quit, 1);
        assert!(app.should_quit());
    }
}
