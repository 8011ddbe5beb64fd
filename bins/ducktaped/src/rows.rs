//! JSON-lines input: one JSON array per line, one cell per element.

use std::borrow::Cow;
use std::io::BufRead;

use ducktaped_api::batch::MemoryBatch;
use ducktaped_api::error::PluginError;
use ducktaped_api::value::Cell;
use serde_json::Value;

/// Convert a JSON value to the narrowest fitting cell.
pub fn json_cell(value: Value) -> Cell<'static> {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Other(Cow::Owned(b.to_string())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(i) => Cell::Integer(i),
                    Err(_) => Cell::BigInt(i),
                }
            } else if let Some(u) = n.as_u64() {
                Cell::UBigInt(u)
            } else {
                Cell::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Cell::Varchar(Cow::Owned(s)),
        Value::Array(items) => Cell::List(items.into_iter().map(json_cell).collect()),
        object @ Value::Object(_) => Cell::Other(Cow::Owned(object.to_string())),
    }
}

/// Read every non-blank line of `reader` as a row.
pub fn read_rows(reader: impl BufRead) -> Result<MemoryBatch, PluginError> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let ctx = format!("line {}", index + 1);
        let value: Value =
            serde_json::from_str(&line).map_err(|e| PluginError::from(e).with_context(&ctx))?;
        match value {
            Value::Array(cells) => rows.push(cells.into_iter().map(json_cell).collect()),
            other => {
                return Err(PluginError::format(format!(
                    "expected a JSON array of arguments, got {other}"
                ))
                .with_context(&ctx));
            }
        }
    }
    MemoryBatch::from_rows(rows)
}
