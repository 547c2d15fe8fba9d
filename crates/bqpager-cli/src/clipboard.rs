use anyhow::{Result, anyhow};
use copypasta::{ClipboardContext, ClipboardProvider};

/// Destination for copied cell text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard. A context is opened per copy so a missing display
/// server only fails the copy, not the session.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut ctx = ClipboardContext::new().map_err(|err| anyhow!("{}", err))?;
        ctx.set_contents(text.to_string())
            .map_err(|err| anyhow!("{}", err))
    }
}
