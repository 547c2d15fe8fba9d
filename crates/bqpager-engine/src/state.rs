use bqpager_types::{Page, QueryMeta};

use crate::cache::PageCache;
use crate::error::{Error, Result};

/// Position in the page cache plus the single-flight flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    current: usize,
    fetching: bool,
}

impl Cursor {
    pub fn current_page(&self) -> usize {
        self.current
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }
}

/// Everything the pager mutates, behind methods that keep
/// `0 <= current < cache.len()` and at most one outstanding fetch.
///
/// Owned by the rendering thread; background work never touches it directly.
#[derive(Debug)]
pub struct PaginationState {
    cache: PageCache,
    cursor: Cursor,
    meta: QueryMeta,
}

impl PaginationState {
    /// Starts on `first`, which becomes page 0.
    pub fn new(first: Page, meta: QueryMeta) -> Self {
        let mut cache = PageCache::new();
        cache.push(first);
        Self {
            cache,
            cursor: Cursor::default(),
            meta,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn meta(&self) -> QueryMeta {
        self.meta
    }

    pub fn page_count(&self) -> usize {
        self.cache.len()
    }

    pub fn current_index(&self) -> usize {
        self.cursor.current
    }

    pub fn current_page(&self) -> &Page {
        &self.cache[self.cursor.current]
    }

    pub fn is_fetching(&self) -> bool {
        self.cursor.fetching
    }

    /// The cursor sits on the last cached page.
    pub fn at_frontier(&self) -> bool {
        self.cursor.current + 1 == self.cache.len()
    }

    /// Moves onto an already cached page. Returns false at the frontier.
    pub(crate) fn step_forward(&mut self) -> bool {
        if self.cursor.current + 1 < self.cache.len() {
            self.cursor.current += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn step_backward(&mut self) -> bool {
        if self.cursor.current > 0 {
            self.cursor.current -= 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_fetch(&mut self) -> Result<()> {
        if self.cursor.fetching {
            return Err(Error::InvalidState(
                "a fetch is already in flight".to_string(),
            ));
        }
        self.cursor.fetching = true;
        Ok(())
    }

    /// Clears the in-flight flag and appends `page` if there is one.
    /// Returns the index of the appended page.
    pub(crate) fn end_fetch(&mut self, page: Option<Page>) -> Option<usize> {
        self.cursor.fetching = false;
        page.map(|page| self.cache.push(page))
    }

    /// Moves the cursor to a cached page.
    pub(crate) fn move_to(&mut self, index: usize) -> Result<()> {
        if index >= self.cache.len() {
            return Err(Error::InvalidState(format!(
                "page {} is not cached ({} pages)",
                index,
                self.cache.len()
            )));
        }
        self.cursor.current = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(value: &str) -> Page {
        Page::new(vec![vec![value.to_string()]])
    }

    #[test]
    fn test_new_state_starts_on_first_page() {
        let state = PaginationState::new(page("a"), QueryMeta::default());
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.page_count(), 1);
        assert!(state.at_frontier());
        assert!(!state.is_fetching());
    }

    #[test]
    fn test_steps_stay_within_cache() {
        let mut state = PaginationState::new(page("a"), QueryMeta::default());
        assert!(!state.step_forward());
        assert!(!state.step_backward());

        state.begin_fetch().unwrap();
        assert_eq!(state.end_fetch(Some(page("b"))), Some(1));
        assert!(state.step_forward());
        assert_eq!(state.current_page(), &page("b"));
        assert!(state.step_backward());
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_second_begin_fetch_is_rejected() {
        let mut state = PaginationState::new(page("a"), QueryMeta::default());
        state.begin_fetch().unwrap();
        assert!(state.begin_fetch().is_err());
        assert_eq!(state.end_fetch(None), None);
        assert!(!state.is_fetching());
        assert_eq!(state.page_count(), 1);
    }

    #[test]
    fn test_move_to_rejects_uncached_page() {
        let mut state = PaginationState::new(page("a"), QueryMeta::default());
        assert!(state.move_to(1).is_err());
        assert!(state.move_to(0).is_ok());
    }
}
