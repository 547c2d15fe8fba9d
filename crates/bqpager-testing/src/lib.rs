//! Testing infrastructure for bqpager engine tests.
//!
//! - `ScriptedSource`: an in-memory [`RowSource`] that counts calls, can hold
//!   each call until released, and can fail on a chosen call
//! - `SourceControl`: the test-side handle to a `ScriptedSource`

pub mod source;

pub use source::{ScriptedSource, SourceControl, TransportError};
