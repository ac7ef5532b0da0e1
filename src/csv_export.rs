//! CSV rendering for flattened report records.

use std::collections::HashSet;

use crate::error::Result;
use crate::types::FlatRecord;

/// Render flattened records as UTF-8 CSV bytes.
///
/// The header row is the union of all record keys in first-seen order: the
/// first record's columns lead, and later records that introduce new keys
/// append them. A record missing a column renders an empty cell. Zero
/// records render as zero bytes.
pub fn render_csv(records: &[FlatRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let columns = column_union(records);

    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(&columns)?;
        for record in records {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| record.get(column).map(value_to_cell).unwrap_or_default())
                .collect();
            writer.write_record(&cells)?;
        }
        writer.flush().map_err(csv::Error::from)?;
    }

    Ok(buffer)
}

/// Union of record keys, ordered by first appearance.
fn column_union(records: &[FlatRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Scalar JSON value as CSV cell text. Null renders empty.
fn value_to_cell(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    }
}
