use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];
const INTERVAL: Duration = Duration::from_millis(100);

/// Frame `tick` of the spinner animation.
pub fn frame(tick: usize) -> &'static str {
    FRAMES[tick % FRAMES.len()]
}

/// Animated progress line on stderr for the blocking steps before the TUI
/// starts. Does nothing when stderr is not a terminal.
pub struct Spinner {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: &'static str) -> Self {
        if !io::stderr().is_terminal() {
            return Self {
                stop: None,
                handle: None,
            };
        }

        let (stop, rx) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("spinner".to_string())
            .spawn(move || {
                let mut tick = 0;
                while let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(INTERVAL) {
                    let mut stderr = io::stderr().lock();
                    let _ = write!(stderr, "\r{} {} ", message.cyan(), frame(tick));
                    let _ = stderr.flush();
                    tick += 1;
                }
                let blank = " ".repeat(message.len() + 3);
                let _ = write!(io::stderr(), "\r{}\r", blank);
            })
            .ok();

        Self {
            stop: Some(stop),
            handle,
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_cycle() {
        assert_eq!(frame(0), "|");
        assert_eq!(frame(3), "\\");
        assert_eq!(frame(4), frame(0));
    }
}
