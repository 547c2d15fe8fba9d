// bqpager runs a query once and lets the user walk its result forward and
// back. BigQuery only hands rows out front to back, so every page read is
// kept; Shift-Tab replays those, Tab reads one more page in the background
// while the screen stays live.

mod args;
mod clipboard;
mod commands;
pub mod config;
mod logging;
pub mod presentation;
pub mod types;

pub use args::Cli;
pub use clipboard::{Clipboard, SystemClipboard};
pub use commands::{read_query, run};
