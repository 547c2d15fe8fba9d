//! Interactive pager screen.
//!
//! The render loop owns the [`NavigationController`]; fetch threads only
//! talk to it through the [`UiBridge`].

mod app;
pub mod input;
mod ui;

use anyhow::Result;
use bqpager_engine::{NavigationController, UiBridge};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tracing::trace;

pub use app::{App, StatusMessage};

use crate::clipboard::Clipboard;
use crate::logging;

const TICK_RATE: Duration = Duration::from_millis(100);

pub fn run(
    mut nav: NavigationController,
    bridge: UiBridge,
    page_size: usize,
    clipboard: &mut dyn Clipboard,
) -> Result<()> {
    // Log lines would land on top of the table; they are written out once
    // the terminal is restored.
    let log_hold = logging::hold();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    ctrlc::set_handler(move || {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        logging::release();
        std::process::exit(0);
    })?;

    let result = event_loop(&mut terminal, &mut nav, &bridge, page_size, clipboard);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    drop(log_hold);

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    nav: &mut NavigationController,
    bridge: &UiBridge,
    page_size: usize,
    clipboard: &mut dyn Clipboard,
) -> Result<()> {
    let mut app = App::new(page_size);
    let mut last_tick = Instant::now();

    while !app.should_quit() {
        terminal.draw(|f| ui::draw(f, &mut app, nav))?;

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key) => input::map_key(key),
                Event::Mouse(mouse) => input::map_mouse(mouse),
                _ => None,
            };
            if let Some(action) = action {
                trace!(?action, "input action");
                app.handle_action(action, nav, clipboard)?;
            }
        }

        for message in bridge.drain() {
            app.apply(message, nav, clipboard)?;
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}
