use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding an invoice's line items.
pub const LINES_FIELD: &str = "lines";

/// One invoice record as it arrived from the source system.
///
/// Field order follows the source input, which matters for coverage
/// tie-breaks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Line items as documents; entries that are not objects are skipped.
    pub fn lines(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.0
            .get(LINES_FIELD)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }

    pub fn line_count(&self) -> usize {
        self.0
            .get(LINES_FIELD)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    pub fn number(&self, field: &str) -> f64 {
        coerce_number(self.0.get(field))
    }

    pub fn text(&self, field: &str) -> Option<String> {
        coerce_text(self.0.get(field))
    }
}

/// Ordered invoice documents, capped at the configured row limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(Vec<Document>);

impl Sample {
    /// Keeps at most `max_rows` documents, dropping the tail.
    pub fn bounded(mut documents: Vec<Document>, max_rows: usize) -> Self {
        documents.truncate(max_rows);
        Self(documents)
    }

    pub fn documents(&self) -> &[Document] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lines_total(&self) -> usize {
        self.0.iter().map(Document::line_count).sum()
    }
}

/// Numeric view of a field. Missing, empty, or unparseable values are zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Some(Value::Bool(flag)) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    };

    number.filter(|value| value.is_finite()).unwrap_or(0.0)
}

/// Text view of a field. Values that carry nothing (null, empty string,
/// zero, `false`, containers) read as absent.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(raw) if !raw.is_empty() => Some(raw.clone()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> Document {
        serde_json::from_value(value).expect("document json")
    }

    #[test]
    fn numbers_coerce_strings_and_default_to_zero() {
        let doc = document(json!({
            "a": 12.5,
            "b": " 7 ",
            "c": "n/a",
            "d": "",
            "e": null,
            "f": true,
            "g": [1, 2]
        }));
        assert_eq!(doc.number("a"), 12.5);
        assert_eq!(doc.number("b"), 7.0);
        assert_eq!(doc.number("c"), 0.0);
        assert_eq!(doc.number("d"), 0.0);
        assert_eq!(doc.number("e"), 0.0);
        assert_eq!(doc.number("f"), 1.0);
        assert_eq!(doc.number("g"), 0.0);
        assert_eq!(doc.number("missing"), 0.0);
    }

    #[test]
    fn text_treats_empty_values_as_absent() {
        let doc = document(json!({
            "currency": "usd",
            "blank": "",
            "zero": 0,
            "code": 784,
            "flag": false,
            "nested": { "x": 1 }
        }));
        assert_eq!(doc.text("currency").as_deref(), Some("usd"));
        assert_eq!(doc.text("code").as_deref(), Some("784"));
        assert!(doc.text("blank").is_none());
        assert!(doc.text("zero").is_none());
        assert!(doc.text("flag").is_none());
        assert!(doc.text("nested").is_none());
        assert!(doc.text("missing").is_none());
    }

    #[test]
    fn keys_preserve_source_order() {
        let doc = document(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn lines_skip_non_object_entries() {
        let doc = document(json!({ "lines": [{ "qty": 1 }, "oops", { "qty": 2 }] }));
        assert_eq!(doc.lines().count(), 2);
        assert_eq!(doc.line_count(), 3);

        let flat = document(json!({ "lines": "not-a-list" }));
        assert_eq!(flat.lines().count(), 0);
        assert_eq!(flat.line_count(), 0);
    }

    #[test]
    fn bounded_sample_truncates_tail() {
        let docs = (0..5)
            .map(|index| document(json!({ "id": index })))
            .collect::<Vec<_>>();
        let sample = Sample::bounded(docs, 3);
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.documents()[2].number("id"), 2.0);
    }
}
