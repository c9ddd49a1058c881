//! JSON-lines record reading.

use std::{
    io::{BufRead, Lines},
    sync::Arc,
};

use feat2arrow_core::Value;

use crate::error::DatasetError;

/// Iterator over the records of a JSON-lines stream, one object per line.
///
/// Blank lines are skipped. Errors carry the 1-based line number.
pub struct JsonlRecords<R> {
    lines: Lines<R>,
    line: usize,
}

pub fn jsonl_records<R: BufRead>(reader: R) -> JsonlRecords<R> {
    JsonlRecords {
        lines: reader.lines(),
        line: 0,
    }
}

/// Read every record of a JSON-lines stream.
pub fn read_jsonl_records<R: BufRead>(reader: R) -> Result<Vec<Value>, DatasetError> {
    jsonl_records(reader).collect()
}

impl<R: BufRead> Iterator for JsonlRecords<R> {
    type Item = Result<Value, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            return Some(parse_record(&text, self.line));
        }
    }
}

fn parse_record(text: &str, line: usize) -> Result<Value, DatasetError> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|source| DatasetError::Json { line, source })?;
    if !json.is_object() {
        return Err(DatasetError::NotAnObject { line });
    }
    Ok(json_to_value(json))
}

/// Convert parsed JSON into a record value.
///
/// Object keys stay present even when their value is `null`. Integers map to
/// `I64`, or `U64` beyond the signed range; other numbers map to `F64`.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::I64(i)
            } else if let Some(u) = n.as_u64() {
                Value::U64(u)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(Arc::from(s)),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => Value::Struct(
            map.into_iter()
                .map(|(k, v)| (Arc::from(k), json_to_value(v)))
                .collect(),
        ),
    }
}
