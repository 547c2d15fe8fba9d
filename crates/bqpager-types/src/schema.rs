use serde::{Deserialize, Serialize};

use crate::page::Row;

/// One column of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required,
        }
    }
}

/// Ordered column list. Captured once from the first row read and never
/// changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

/// Which schema-derived rows precede the data on the first page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Names and types.
    Compact,
    /// Names, types and a `REQUIRED: <bool>` row.
    WithRequired,
}

impl HeaderStyle {
    pub fn from_flag(show_required_row: bool) -> Self {
        if show_required_row {
            HeaderStyle::WithRequired
        } else {
            HeaderStyle::Compact
        }
    }

    pub fn row_count(self) -> usize {
        match self {
            HeaderStyle::Compact => 2,
            HeaderStyle::WithRequired => 3,
        }
    }
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Derives the header rows shown ahead of the data on page 0.
    pub fn header_rows(&self, style: HeaderStyle) -> Vec<Row> {
        let names = self.fields.iter().map(|f| f.name.clone()).collect();
        let types = self.fields.iter().map(|f| f.field_type.clone()).collect();

        let mut rows = vec![names, types];
        if style == HeaderStyle::WithRequired {
            rows.push(
                self.fields
                    .iter()
                    .map(|f| format!("REQUIRED: {}", f.required))
                    .collect(),
            );
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new(vec![
            Field::new("id", "INTEGER", true),
            Field::new("name", "STRING", false),
        ])
    }

    #[test]
    fn test_header_rows_with_required() {
        let rows = sample().header_rows(HeaderStyle::WithRequired);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["id", "name"]);
        assert_eq!(rows[1], vec!["INTEGER", "STRING"]);
        assert_eq!(rows[2], vec!["REQUIRED: true", "REQUIRED: false"]);
    }

    #[test]
    fn test_header_rows_compact() {
        let rows = sample().header_rows(HeaderStyle::Compact);
        assert_eq!(rows.len(), HeaderStyle::Compact.row_count());
        assert_eq!(rows[1], vec!["INTEGER", "STRING"]);
    }

    #[test]
    fn test_field_serializes_type_key() {
        let field = Field::new("id", "INTEGER", true);
        let json = serde_json::to_value(field).unwrap();
        assert_eq!(json["type"], "INTEGER");
    }
}
