use serde::{Deserialize, Serialize};

/// Job-level facts captured once after the query finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMeta {
    pub total_rows: u64,
    /// The remote result was served from BigQuery's own result cache.
    pub cache_hit: bool,
}

impl QueryMeta {
    pub fn new(total_rows: u64, cache_hit: bool) -> Self {
        Self {
            total_rows,
            cache_hit,
        }
    }

    /// Expected page count for the whole result. Never less than one so the
    /// frame can always show "1/1" for an empty result.
    pub fn total_pages(&self, page_size: usize) -> u64 {
        let page_size = page_size.max(1) as u64;
        self.total_rows.div_ceil(page_size).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(QueryMeta::new(65, false).total_pages(30), 3);
        assert_eq!(QueryMeta::new(60, false).total_pages(30), 2);
    }

    #[test]
    fn test_total_pages_empty_result() {
        assert_eq!(QueryMeta::new(0, true).total_pages(30), 1);
    }
}
