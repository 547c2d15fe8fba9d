use bqpager_types::QueryMeta;
use tracing::debug;

use crate::bridge::{BridgeMessage, BridgeSender};
use crate::error::{Error, Result};
use crate::fetch::{FetchCoordinator, FetchRequest, PagerOptions};
use crate::selection::{ScreenPos, SelectionResolver};
use crate::source::RowSource;
use crate::state::PaginationState;

/// Navigation input, already decoded from keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Forward,
    Backward,
    SelectCell(ScreenPos),
    Quit,
}

/// What the render loop should do after an event or a fetch completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Visible state changed.
    Redraw,
    /// A background fetch started; show progress.
    FetchStarted,
    /// Nothing changed.
    Ignored,
    /// Cell text to hand to the clipboard.
    Selected(String),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
    Idle,
    /// Waiting on the frontier page requested while on `requested_from`.
    Fetching {
        requested_from: usize,
    },
}

/// Drives paging for one result set.
///
/// `Forward` while a fetch is pending is dropped. `Backward` is allowed at
/// any time since it only reads cached pages; if the user moved away while
/// waiting, the fetched page is appended without moving the cursor.
pub struct NavigationController {
    state: PaginationState,
    fetcher: FetchCoordinator,
    phase: NavPhase,
}

impl NavigationController {
    /// Loads page 0 synchronously and starts in `Idle`.
    pub fn start(
        source: Box<dyn RowSource>,
        meta: QueryMeta,
        options: PagerOptions,
        bridge: BridgeSender,
    ) -> Result<Self> {
        let (fetcher, first) = FetchCoordinator::start(source, options, bridge)?;
        Ok(Self {
            state: PaginationState::new(first, meta),
            fetcher,
            phase: NavPhase::Idle,
        })
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn phase(&self) -> NavPhase {
        self.phase
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.phase, NavPhase::Fetching { .. })
    }

    /// The source has no rows beyond the cached pages.
    pub fn is_exhausted(&self) -> bool {
        self.fetcher.is_drained()
    }

    pub fn handle(&mut self, event: NavEvent) -> Result<NavOutcome> {
        match event {
            NavEvent::Quit => Ok(NavOutcome::Quit),
            NavEvent::Forward => self.forward(),
            NavEvent::Backward => {
                if self.state.step_backward() {
                    Ok(NavOutcome::Redraw)
                } else {
                    Ok(NavOutcome::Ignored)
                }
            }
            NavEvent::SelectCell(pos) => {
                let text = SelectionResolver::resolve(self.state.current_page(), pos);
                Ok(text.map_or(NavOutcome::Ignored, |text| {
                    NavOutcome::Selected(text.to_string())
                }))
            }
        }
    }

    fn forward(&mut self) -> Result<NavOutcome> {
        if self.is_fetching() {
            debug!("forward dropped while fetching");
            return Ok(NavOutcome::Ignored);
        }

        let from = self.state.current_index();
        match self.fetcher.fetch_page(&mut self.state, from + 1)? {
            FetchRequest::Cached(_) => {
                if self.state.step_forward() {
                    Ok(NavOutcome::Redraw)
                } else {
                    Ok(NavOutcome::Ignored)
                }
            }
            FetchRequest::Started => {
                self.phase = NavPhase::Fetching {
                    requested_from: from,
                };
                Ok(NavOutcome::FetchStarted)
            }
            FetchRequest::InFlight | FetchRequest::Exhausted => Ok(NavOutcome::Ignored),
        }
    }

    /// Applies a message drained from the bridge. Errors are fatal.
    pub fn apply(&mut self, message: BridgeMessage) -> Result<NavOutcome> {
        let NavPhase::Fetching { requested_from } = self.phase else {
            return Err(Error::InvalidState(
                "fetch result arrived with no fetch pending".to_string(),
            ));
        };
        self.phase = NavPhase::Idle;

        if let Some(index) = self.fetcher.complete(&mut self.state, message)?
            && self.state.current_index() == requested_from
        {
            self.state.move_to(index)?;
        }
        Ok(NavOutcome::Redraw)
    }
}
