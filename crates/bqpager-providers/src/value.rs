//! Cell stringification.
//!
//! BigQuery encodes every scalar as a JSON string, repeated fields as arrays
//! of `{"v": ..}` and records as `{"f": [..]}`. Composite values render as
//! space-separated lists in brackets, e.g. `[a b [c d]]`.

use bqpager_types::Row;
use chrono::DateTime;
use serde_json::Value;

use crate::api::{TableFieldSchema, TableRow};

pub fn render_row(row: &TableRow, fields: &[TableFieldSchema], marker: &str) -> Row {
    row.f
        .iter()
        .enumerate()
        .map(|(i, cell)| render_value(&cell.v, fields.get(i), marker))
        .collect()
}

pub fn render_value(value: &Value, field: Option<&TableFieldSchema>, null_marker: &str) -> String {
    match value {
        Value::Null => null_marker.to_string(),
        Value::String(text) => render_scalar(text, field),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| render_value(cell_value(item), field, null_marker))
                .collect();
            format!("[{}]", parts.join(" "))
        }
        Value::Object(record) => {
            let subfields = field.map(|f| f.fields.as_slice()).unwrap_or(&[]);
            let parts: Vec<String> = record
                .get("f")
                .and_then(Value::as_array)
                .map(|cells| {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(i, cell)| {
                            render_value(cell_value(cell), subfields.get(i), null_marker)
                        })
                        .collect()
                })
                .unwrap_or_default();
            format!("[{}]", parts.join(" "))
        }
        other => other.to_string(),
    }
}

fn cell_value(cell: &Value) -> &Value {
    cell.get("v").unwrap_or(&Value::Null)
}

fn render_scalar(text: &str, field: Option<&TableFieldSchema>) -> String {
    match field.map(|f| f.field_type.as_str()) {
        Some("TIMESTAMP") => render_timestamp(text).unwrap_or_else(|| text.to_string()),
        _ => text.to_string(),
    }
}

/// Timestamps arrive as integer microseconds, or as float seconds when the
/// int64 format option is not honored.
fn render_timestamp(text: &str) -> Option<String> {
    let timestamp = match text.parse::<i64>() {
        Ok(micros) => DateTime::from_timestamp_micros(micros)?,
        Err(_) => {
            let seconds = text.parse::<f64>().ok()?;
            DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64)?
        }
    };
    Some(timestamp.format("%Y-%m-%d %H:%M:%S%.f UTC").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(field_type: &str) -> TableFieldSchema {
        TableFieldSchema {
            name: "f".to_string(),
            field_type: field_type.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_null_renders_marker() {
        assert_eq!(render_value(&Value::Null, None, "NULL"), "NULL");
    }

    #[test]
    fn test_repeated_values() {
        let value = json!([{"v": "1"}, {"v": null}, {"v": "3"}]);
        let rendered = render_value(&value, Some(&field("INTEGER")), "NULL");
        assert_eq!(rendered, "[1 NULL 3]");
    }

    #[test]
    fn test_nested_record() {
        let mut record = field("RECORD");
        record.fields = vec![field("STRING"), field("STRING")];
        let value = json!({"f": [{"v": "a"}, {"v": [{"v": "b"}, {"v": "c"}]}]});
        assert_eq!(render_value(&value, Some(&record), "NULL"), "[a [b c]]");
    }

    #[test]
    fn test_timestamp_micros() {
        let value = json!("1700000000000000");
        let rendered = render_value(&value, Some(&field("TIMESTAMP")), "NULL");
        assert_eq!(rendered, "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_timestamp_float_seconds() {
        let rendered = render_value(&json!("1.7E9"), Some(&field("TIMESTAMP")), "NULL");
        assert_eq!(rendered, "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_render_row_keeps_alignment() {
        let json = json!({"f": [{"v": "x"}, {"v": null}, {"v": "y"}]});
        let row: TableRow = serde_json::from_value(json).unwrap();
        let fields = vec![field("STRING"), field("STRING"), field("STRING")];
        assert_eq!(render_row(&row, &fields, "-"), vec!["x", "-", "y"]);
    }
}
