//! Pagination engine for forward-only row sources.
//!
//! A [`RowSource`] can only be read front to back, one caller at a time.
//! The engine turns it into a pager that can move both ways:
//!
//! - [`PageCache`] keeps every page ever materialized, so going back never
//!   touches the source.
//! - [`FetchCoordinator`] owns the source and lends it to exactly one
//!   background thread per fetch.
//! - [`UiBridge`] carries fetch results back to the thread that owns the
//!   screen; that thread is the only one mutating [`PaginationState`].
//! - [`NavigationController`] ties it together and interprets key-level
//!   navigation events.

pub mod bridge;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod navigation;
pub mod selection;
pub mod source;
pub mod state;

pub use bridge::{BridgeMessage, BridgeSender, UiBridge};
pub use cache::PageCache;
pub use error::{Error, Result};
pub use fetch::{Feed, FetchCoordinator, FetchRequest, PageBuilder, PagerOptions};
pub use navigation::{NavEvent, NavOutcome, NavPhase, NavigationController};
pub use selection::{ScreenPos, SelectionResolver};
pub use source::{Batch, RowSource, SourceError};
pub use state::{Cursor, PaginationState};

/// Rows requested from the source per page unless configured otherwise.
pub const PAGE_SIZE: usize = 30;
