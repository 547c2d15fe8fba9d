use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

use bqpager_engine::{Batch, RowSource, SourceError};
use bqpager_types::{Field, Row, Schema};

/// Error injected by [`ScriptedSource::failing_on_call`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// In-memory forward-only source.
///
/// # Example
/// ```
/// use bqpager_testing::ScriptedSource;
///
/// let (source, control) = ScriptedSource::numbered(65).build();
/// assert_eq!(control.calls(), 0);
/// # drop(source);
/// ```
pub struct ScriptedSource {
    rows: VecDeque<Row>,
    schema: Schema,
    schema_captured: bool,
    calls: Arc<AtomicUsize>,
    fail_on_call: Option<usize>,
    late_exhaustion: bool,
    gate: Option<Receiver<()>>,
    gate_tx: Option<Sender<()>>,
}

impl ScriptedSource {
    /// `count` rows of `["row-<i>", "<i>"]` under an `(label, n)` schema.
    pub fn numbered(count: usize) -> Self {
        let rows = (0..count)
            .map(|i| vec![format!("row-{}", i), i.to_string()])
            .collect();
        Self::from_rows(
            Schema::new(vec![
                Field::new("label", "STRING", true),
                Field::new("n", "INTEGER", false),
            ]),
            rows,
        )
    }

    pub fn from_rows(schema: Schema, rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into(),
            schema,
            schema_captured: false,
            calls: Arc::new(AtomicUsize::new(0)),
            fail_on_call: None,
            late_exhaustion: false,
            gate: None,
            gate_tx: None,
        }
    }

    /// Fails the `call`-th `next` (1-based) with a [`TransportError`].
    pub fn failing_on_call(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Reports exhaustion only through an empty batch, the way a remote
    /// cursor that cannot see its own end does.
    pub fn reports_exhaustion_late(mut self) -> Self {
        self.late_exhaustion = true;
        self
    }

    /// Makes every `next` wait for [`SourceControl::release`].
    pub fn gated(mut self) -> Self {
        let (tx, rx) = mpsc::channel();
        self.gate = Some(rx);
        self.gate_tx = Some(tx);
        self
    }

    pub fn build(mut self) -> (Box<dyn RowSource>, SourceControl) {
        let control = SourceControl {
            calls: Arc::clone(&self.calls),
            gate: self.gate_tx.take(),
        };
        (Box::new(self), control)
    }
}

impl RowSource for ScriptedSource {
    fn next(&mut self, n: usize) -> Result<Batch, SourceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gate) = &self.gate {
            // A dropped control releases every waiter.
            let _ = gate.recv();
        }
        if self.fail_on_call == Some(call) {
            return Err(Box::new(TransportError(format!("call {} failed", call))));
        }

        let take = n.min(self.rows.len());
        let rows: Vec<Row> = self.rows.drain(..take).collect();
        if !rows.is_empty() {
            self.schema_captured = true;
        }
        let exhausted = if self.late_exhaustion {
            rows.is_empty()
        } else {
            self.rows.is_empty()
        };
        Ok(Batch::new(rows, exhausted))
    }

    fn schema(&self) -> Option<&Schema> {
        self.schema_captured.then_some(&self.schema)
    }
}

/// Test-side view of a [`ScriptedSource`] after it moved into the engine.
pub struct SourceControl {
    calls: Arc<AtomicUsize>,
    gate: Option<Sender<()>>,
}

impl SourceControl {
    /// Number of `next` calls started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lets one gated `next` call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            let _ = gate.send(());
        }
    }
}
