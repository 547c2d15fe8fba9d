//! Hand-off from the background fetch to the rendering thread.
//!
//! The fetch thread never touches [`PaginationState`](crate::PaginationState).
//! It posts exactly one [`BridgeMessage`] when it finishes, and the render
//! loop drains the queue in order between frames.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use bqpager_types::Page;
use tracing::debug;

use crate::error::Error;
use crate::fetch::Feed;

/// Result of one background fetch.
pub enum BridgeMessage {
    /// The source is handed back. `page` is `None` when it had no more rows.
    Fetched { feed: Feed, page: Option<Page> },
    /// The source failed; it is dropped with the thread.
    FetchFailed(Error),
}

impl std::fmt::Debug for BridgeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeMessage::Fetched { page, .. } => f
                .debug_struct("Fetched")
                .field("rows", &page.as_ref().map(Page::row_count))
                .finish(),
            BridgeMessage::FetchFailed(err) => f.debug_tuple("FetchFailed").field(err).finish(),
        }
    }
}

/// Producer half, cloned into each fetch thread.
#[derive(Clone)]
pub struct BridgeSender {
    tx: Sender<BridgeMessage>,
}

impl BridgeSender {
    /// Queues a message for the render loop. A closed queue means the user
    /// already quit, so the message is discarded.
    pub fn post(&self, message: BridgeMessage) {
        if self.tx.send(message).is_err() {
            debug!("render loop gone; dropping fetch result");
        }
    }
}

/// Consumer half, owned by the render loop.
pub struct UiBridge {
    rx: Receiver<BridgeMessage>,
}

impl UiBridge {
    pub fn channel() -> (BridgeSender, UiBridge) {
        let (tx, rx) = mpsc::channel();
        (BridgeSender { tx }, UiBridge { rx })
    }

    /// Next queued message without blocking.
    pub fn try_recv(&self) -> Option<BridgeMessage> {
        match self.rx.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeMessage> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drains everything currently queued, in posting order.
    pub fn drain(&self) -> Vec<BridgeMessage> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
