use std::thread;
use std::time::Instant;

use bqpager_types::{HeaderStyle, Page, Row, Schema};
use tracing::{debug, warn};

use crate::PAGE_SIZE;
use crate::bridge::{BridgeMessage, BridgeSender};
use crate::error::{Error, Result};
use crate::source::RowSource;
use crate::state::PaginationState;

/// Page layout knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerOptions {
    pub page_size: usize,
    pub header_style: HeaderStyle,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            header_style: HeaderStyle::WithRequired,
        }
    }
}

/// Turns batches into pages. Header rows go on the first page only and are
/// derived from the schema exactly once.
#[derive(Debug)]
pub struct PageBuilder {
    style: HeaderStyle,
    headers_emitted: bool,
}

impl PageBuilder {
    pub fn new(style: HeaderStyle) -> Self {
        Self {
            style,
            headers_emitted: false,
        }
    }

    pub fn build(&mut self, rows: Vec<Row>, schema: Option<&Schema>) -> Page {
        if self.headers_emitted {
            return Page::new(rows);
        }
        self.headers_emitted = true;
        match schema {
            Some(schema) => Page::with_headers(schema.header_rows(self.style), rows),
            None => Page::new(rows),
        }
    }
}

/// The source together with what is needed to turn its rows into pages.
/// Whoever holds the `Feed` is the only reader of the source.
pub struct Feed {
    source: Box<dyn RowSource>,
    builder: PageBuilder,
    page_size: usize,
    drained: bool,
}

impl Feed {
    fn new(source: Box<dyn RowSource>, options: PagerOptions) -> Self {
        Self {
            source,
            builder: PageBuilder::new(options.header_style),
            page_size: options.page_size.max(1),
            drained: false,
        }
    }

    /// Reads the next page. `None` means the source had nothing left.
    fn pull(&mut self) -> Result<Option<Page>> {
        let batch = self.source.next(self.page_size)?;
        self.drained = batch.exhausted || batch.is_empty();
        if batch.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.builder.build(batch.rows, self.source.schema())))
    }

    /// Reads page 0, which exists even when the result has no rows.
    fn pull_first(&mut self) -> Result<Page> {
        match self.pull()? {
            Some(page) => Ok(page),
            None => Ok(self.builder.build(Vec::new(), self.source.schema())),
        }
    }
}

/// What [`FetchCoordinator::fetch_page`] did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    /// Already cached; served synchronously.
    Cached(usize),
    /// A background fetch was started.
    Started,
    /// A fetch is already in flight; the request was dropped.
    InFlight,
    /// The source has been drained; nothing to fetch.
    Exhausted,
}

/// Single-flight access to the row source.
///
/// The source lives inside a [`Feed`] that is moved into the fetch thread
/// and comes back through the bridge, so a second concurrent read cannot
/// be expressed.
pub struct FetchCoordinator {
    feed: Option<Feed>,
    drained: bool,
    bridge: BridgeSender,
}

impl FetchCoordinator {
    /// Blocks on the first page, then returns the coordinator and page 0.
    pub fn start(
        source: Box<dyn RowSource>,
        options: PagerOptions,
        bridge: BridgeSender,
    ) -> Result<(Self, Page)> {
        let mut feed = Feed::new(source, options);
        let first = feed.pull_first()?;
        debug!(rows = first.row_count(), "loaded first page");
        let drained = feed.drained;
        Ok((
            Self {
                feed: Some(feed),
                drained,
                bridge,
            },
            first,
        ))
    }

    /// True once the source has reported that no rows remain.
    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Serves `target` from the cache, or starts fetching it when it is the
    /// frontier page.
    pub fn fetch_page(
        &mut self,
        state: &mut PaginationState,
        target: usize,
    ) -> Result<FetchRequest> {
        let frontier = state.cache().frontier();
        if target < frontier {
            return Ok(FetchRequest::Cached(target));
        }
        if target > frontier {
            return Err(Error::InvalidState(format!(
                "page {} requested beyond frontier {}",
                target, frontier
            )));
        }
        if state.is_fetching() {
            debug!(page = target, "fetch already in flight; request dropped");
            return Ok(FetchRequest::InFlight);
        }
        if self.drained {
            return Ok(FetchRequest::Exhausted);
        }

        state.begin_fetch()?;
        let Some(mut feed) = self.feed.take() else {
            state.end_fetch(None);
            return Err(Error::InvalidState(
                "row source is not available".to_string(),
            ));
        };

        let bridge = self.bridge.clone();
        let spawned = thread::Builder::new()
            .name("page-fetch".to_string())
            .spawn(move || {
                let started = Instant::now();
                let message = match feed.pull() {
                    Ok(page) => {
                        debug!(
                            page = target,
                            rows = page.as_ref().map(Page::row_count).unwrap_or(0),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "fetch finished"
                        );
                        BridgeMessage::Fetched { feed, page }
                    }
                    Err(err) => {
                        warn!(page = target, error = %err, "fetch failed");
                        BridgeMessage::FetchFailed(err)
                    }
                };
                bridge.post(message);
            });

        if let Err(err) = spawned {
            state.end_fetch(None);
            return Err(Error::Spawn(err));
        }
        debug!(page = target, "fetch started");
        Ok(FetchRequest::Started)
    }

    /// Applies a finished fetch on the rendering thread. Returns the index of
    /// the appended page, if any. A failed fetch leaves the cache as it was.
    pub fn complete(
        &mut self,
        state: &mut PaginationState,
        message: BridgeMessage,
    ) -> Result<Option<usize>> {
        match message {
            BridgeMessage::Fetched { feed, page } => {
                self.drained = feed.drained;
                self.feed = Some(feed);
                Ok(state.end_fetch(page))
            }
            BridgeMessage::FetchFailed(err) => {
                state.end_fetch(None);
                Err(err)
            }
        }
    }
}
