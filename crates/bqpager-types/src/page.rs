/// Stringified cell values of one result row.
pub type Row = Vec<String>;

/// A materialized page. Only page 0 carries header rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    header_rows: Vec<Row>,
    rows: Vec<Row>,
}

impl Page {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            header_rows: Vec::new(),
            rows,
        }
    }

    pub fn with_headers(header_rows: Vec<Row>, rows: Vec<Row>) -> Self {
        Self { header_rows, rows }
    }

    pub fn header_rows(&self) -> &[Row] {
        &self.header_rows
    }

    pub fn data_rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header_len(&self) -> usize {
        self.header_rows.len()
    }

    /// Number of data rows, excluding headers.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows as displayed: headers followed by data.
    pub fn display_len(&self) -> usize {
        self.header_rows.len() + self.rows.len()
    }

    /// Rows in display order.
    pub fn display_rows(&self) -> impl Iterator<Item = &Row> {
        self.header_rows.iter().chain(self.rows.iter())
    }

    pub fn column_count(&self) -> usize {
        self.display_rows().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_rows_put_headers_first() {
        let page = Page::with_headers(
            vec![vec!["id".to_string()]],
            vec![vec!["1".to_string()], vec!["2".to_string()]],
        );
        let shown: Vec<&str> = page.display_rows().map(|r| r[0].as_str()).collect();
        assert_eq!(shown, vec!["id", "1", "2"]);
        assert_eq!(page.display_len(), 3);
        assert_eq!(page.row_count(), 2);
    }

    #[test]
    fn test_plain_page_has_no_headers() {
        let page = Page::new(vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(page.header_len(), 0);
        assert_eq!(page.column_count(), 2);
    }
}
