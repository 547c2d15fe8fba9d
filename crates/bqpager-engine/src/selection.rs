use bqpager_types::Page;

/// A cell position in the visible table, header rows included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenPos {
    pub row: usize,
    pub column: usize,
}

impl ScreenPos {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Maps on-screen positions to cached cell text.
pub struct SelectionResolver;

impl SelectionResolver {
    /// Text of the cell shown at `pos` on `page`. Positions below the header
    /// rows address data rows after subtracting the header offset.
    pub fn resolve(page: &Page, pos: ScreenPos) -> Option<&str> {
        let header_len = page.header_len();
        let row = if pos.row < header_len {
            page.header_rows().get(pos.row)?
        } else {
            page.data_rows().get(pos.row - header_len)?
        };
        row.get(pos.column).map(String::as_str)
    }

    /// Index into the page's data rows, if `pos` is on one.
    pub fn data_row_index(page: &Page, pos: ScreenPos) -> Option<usize> {
        pos.row
            .checked_sub(page.header_len())
            .filter(|&index| index < page.row_count())
    }

    /// Pulls `pos` back inside `page`. Used whenever the visible page changes.
    pub fn clamp(page: &Page, pos: ScreenPos) -> ScreenPos {
        let last_row = page.display_len().saturating_sub(1);
        let last_column = page.column_count().saturating_sub(1);
        ScreenPos {
            row: pos.row.min(last_row),
            column: pos.column.min(last_column),
        }
    }
}
