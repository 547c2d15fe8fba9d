use bqpager_types::{Row, Schema};

/// Failure reported by a [`RowSource`]. Always fatal to the session.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Rows pulled by one [`RowSource::next`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub rows: Vec<Row>,
    /// No further rows will follow. May accompany a final partial batch.
    pub exhausted: bool,
}

impl Batch {
    pub fn new(rows: Vec<Row>, exhausted: bool) -> Self {
        Self { rows, exhausted }
    }

    pub fn exhausted() -> Self {
        Self {
            rows: Vec::new(),
            exhausted: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sequential, forward-only, stateful origin of rows.
///
/// Implementations are not reentrant. The engine guarantees a single caller
/// by moving the source into whichever thread is reading it, so `&mut self`
/// is the only synchronization implementations need.
pub trait RowSource: Send {
    /// Pulls up to `n` rows. An empty batch means the source is drained.
    fn next(&mut self, n: usize) -> Result<Batch, SourceError>;

    /// Column layout, available once the first read has succeeded.
    fn schema(&self) -> Option<&Schema>;
}
