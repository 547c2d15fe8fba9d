//! Everything the user sees: the pre-UI spinner and the pager TUI.

pub mod spinner;
pub mod tui;
