use bqpager_types::Page;

/// Append-only sequence of every page materialized so far.
///
/// Pages are never mutated or evicted once pushed, which is what makes
/// backward navigation free of source reads.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: Vec<Page>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Index of the next page that would require a fetch.
    pub fn frontier(&self) -> usize {
        self.pages.len()
    }

    /// Appends at the frontier and returns the new page's index.
    pub(crate) fn push(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }
}

impl std::ops::Index<usize> for PageCache {
    type Output = Page;

    fn index(&self, index: usize) -> &Page {
        &self.pages[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(value: &str) -> Page {
        Page::new(vec![vec![value.to_string()]])
    }

    #[test]
    fn test_push_returns_sequential_indices() {
        let mut cache = PageCache::new();
        assert_eq!(cache.push(page("a")), 0);
        assert_eq!(cache.push(page("b")), 1);
        assert_eq!(cache.frontier(), 2);
    }

    #[test]
    fn test_existing_pages_are_untouched_by_push() {
        let mut cache = PageCache::new();
        cache.push(page("a"));
        let before = cache.get(0).cloned();
        cache.push(page("b"));
        assert_eq!(cache.get(0).cloned(), before);
        assert!(cache.get(2).is_none());
    }
}
