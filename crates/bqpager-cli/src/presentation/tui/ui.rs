use std::ops::Range;

use bqpager_engine::{NavigationController, ScreenPos, SelectionResolver};
use bqpager_types::{Page, Row as PageRow};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::app::{App, HELP_TEXT, StatusMessage, TableLayout};
use crate::presentation::spinner;

const MAX_COLUMN_WIDTH: u16 = 40;
const COLUMN_SPACING: u16 = 1;

pub(crate) fn draw(f: &mut Frame, app: &mut App, nav: &NavigationController) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_title(f, chunks[0], app, nav);
    render_table(f, chunks[1], app, nav.state().current_page());
    render_status(f, chunks[2], app, nav);

    let help = Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);
}

fn render_title(f: &mut Frame, area: Rect, app: &App, nav: &NavigationController) {
    let state = nav.state();
    let meta = state.meta();
    let lines = vec![
        Line::from(format!("{} Query Results", meta.total_rows))
            .style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(format!(
            "{}/{} page [cacheHit={}]",
            state.current_index() + 1,
            meta.total_pages(app.page_size),
            meta.cache_hit
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Header rows are pinned above the scrolling data rows.
fn render_table(f: &mut Frame, area: Rect, app: &mut App, page: &Page) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);

    let selected = app.selection;
    let widths = column_widths(page);
    let (start, end) = visible_columns(&widths, app.column_offset, selected.column, inner.width);
    app.column_offset = start;

    let header_len = page.header_len();
    let rows = page
        .data_rows()
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells = (start..end).map(|col| {
                let is_selected = selected == ScreenPos::new(header_len + idx, col);
                let style = highlight(Style::default(), is_selected);
                Cell::from(cell_text(row, col).to_string()).style(style)
            });
            Row::new(cells)
        });

    let constraints: Vec<Constraint> = widths[start..end]
        .iter()
        .map(|w| Constraint::Length(*w))
        .collect();

    let mut table = Table::new(rows, constraints)
        .block(block)
        .column_spacing(COLUMN_SPACING);
    if header_len > 0 {
        table = table.header(header_row(page, start..end, selected));
    }

    app.table_state
        .select(SelectionResolver::data_row_index(page, selected));
    f.render_stateful_widget(table, area, &mut app.table_state);

    app.layout = table_layout(inner, header_len, &widths, start..end);
    app.layout.body_offset = app.table_state.offset();
}

fn header_row(page: &Page, columns: Range<usize>, selected: ScreenPos) -> Row<'static> {
    let cells = columns.map(|col| {
        let lines: Vec<Line<'static>> = page
            .header_rows()
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                let is_selected = selected == ScreenPos::new(idx, col);
                let style = highlight(header_style(idx), is_selected);
                Line::styled(cell_text(row, col).to_string(), style)
            })
            .collect();
        Cell::from(Text::from(lines))
    });
    let height = u16::try_from(page.header_len()).unwrap_or(u16::MAX);
    Row::new(cells).height(height)
}

fn table_layout(
    inner: Rect,
    header_len: usize,
    widths: &[u16],
    columns: Range<usize>,
) -> TableLayout {
    let header_height = u16::try_from(header_len)
        .unwrap_or(u16::MAX)
        .min(inner.height);
    let header = Rect::new(inner.x, inner.y, inner.width, header_height);
    let body = Rect::new(
        inner.x,
        inner.y + header_height,
        inner.width,
        inner.height - header_height,
    );

    let mut x = inner.x;
    let mut spans = Vec::new();
    for col in columns {
        let width = widths[col].min(inner.right().saturating_sub(x));
        spans.push((x, width, col));
        x = x.saturating_add(width + COLUMN_SPACING);
    }

    TableLayout {
        header,
        body,
        columns: spans,
        body_offset: 0,
    }
}

fn render_status(f: &mut Frame, area: Rect, app: &App, nav: &NavigationController) {
    let line = if nav.is_fetching() {
        Line::from(format!(" fetching... {}", spinner::frame(app.tick)))
            .style(Style::default().fg(Color::Cyan))
    } else {
        match &app.status {
            Some(StatusMessage::Copied(text)) => {
                Line::from(format!("Copied to clipboard!: {}", text))
                    .style(Style::default().fg(Color::Green))
            }
            Some(StatusMessage::ClipboardFailed(reason)) => {
                Line::from(format!("Clipboard unavailable: {}", reason))
                    .style(Style::default().fg(Color::Red))
            }
            None => Line::from(""),
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn cell_text(row: &PageRow, col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Names in teal, types and modes in green.
fn header_style(line: usize) -> Style {
    if line == 0 {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn highlight(style: Style, selected: bool) -> Style {
    if selected {
        style.add_modifier(Modifier::REVERSED)
    } else {
        style
    }
}

/// Content width of every column on the page, capped at [`MAX_COLUMN_WIDTH`].
fn column_widths(page: &Page) -> Vec<u16> {
    let mut widths = vec![1u16; page.column_count()];
    for row in page.display_rows() {
        for (col, text) in row.iter().enumerate() {
            let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
            if let Some(width) = widths.get_mut(col) {
                *width = (*width).max(len.min(MAX_COLUMN_WIDTH));
            }
        }
    }
    widths
}

/// Half-open range of columns to draw so that `selected` is on screen,
/// keeping `offset` when it already is.
fn visible_columns(
    widths: &[u16],
    offset: usize,
    selected: usize,
    available: u16,
) -> (usize, usize) {
    if widths.is_empty() {
        return (0, 0);
    }
    let selected = selected.min(widths.len() - 1);
    let mut start = offset.min(selected);

    loop {
        let end = fit_from(widths, start, available);
        if selected < end || start == selected {
            return (start, end.max(start + 1));
        }
        start += 1;
    }
}

fn fit_from(widths: &[u16], start: usize, available: u16) -> usize {
    let mut used: u32 = 0;
    let mut end = start;
    for width in &widths[start..] {
        let spacing = if end > start { COLUMN_SPACING } else { 0 };
        let needed = u32::from(*width) + u32::from(spacing);
        if used + needed > u32::from(available) {
            break;
        }
        used += needed;
        end += 1;
    }
    end
}
