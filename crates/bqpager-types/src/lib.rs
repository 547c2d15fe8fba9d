pub mod meta;
pub mod page;
pub mod schema;

pub use meta::QueryMeta;
pub use page::{Page, Row};
pub use schema::{Field, HeaderStyle, Schema};

/// Literal rendered in place of an absent cell value.
pub const NULL_MARKER: &str = "NULL";
