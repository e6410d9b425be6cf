use super::IngestError;
use crate::analysis::Document;
use serde_json::{Map, Value};
use std::io::Read;

/// Accepts either an array of objects or a single object.
pub(crate) fn parse_json(bytes: &[u8]) -> Result<Vec<Document>, IngestError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(fields) => Ok(Document::new(fields)),
                _ => Err(IngestError::NotAnObject { index }),
            })
            .collect(),
        Value::Object(fields) => Ok(vec![Document::new(fields)]),
        _ => Err(IngestError::NotAnObject { index: 0 }),
    }
}

/// Header row names the fields; every cell is kept as a string. Reading stops
/// after `limit` records.
pub(crate) fn parse_csv<R: Read>(reader: R, limit: usize) -> Result<Vec<Document>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut documents = Vec::new();

    for record in csv_reader.records().take(limit) {
        let record = record?;
        let fields: Map<String, Value> = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        documents.push(Document::new(fields));
    }

    Ok(documents)
}
