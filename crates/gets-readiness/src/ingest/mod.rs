//! Turns uploaded JSON or CSV into a bounded [`Sample`].

mod parser;

use crate::analysis::{Document, Sample, MAX_ROWS};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("the input file or text contained no parsable data")]
    Empty,
    #[error("could not parse the provided text as valid JSON or CSV")]
    Unparseable,
    #[error("unsupported file format; must be JSON or CSV")]
    UnsupportedFormat,
    #[error("record {index} is not a JSON object")]
    NotAnObject { index: usize },
    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read sample: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Either signal is enough: a `.json` extension or a JSON content type
    /// reads as JSON, checked before the CSV signals.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Option<Self> {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);
        let essence = content_type
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .map(|mime| mime.essence_str().to_string());

        let signals = |format: &str, declared: &mime::Mime| {
            extension.as_deref() == Some(format)
                || essence.as_deref() == Some(declared.essence_str())
        };

        if signals("json", &mime::APPLICATION_JSON) {
            Some(Self::Json)
        } else if signals("csv", &mime::TEXT_CSV) {
            Some(Self::Csv)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
        }
    }
}

/// Parsed input ready for analysis.
#[derive(Debug, Clone)]
pub struct ImportedSample {
    pub sample: Sample,
    pub format: SourceFormat,
    pub rows_parsed: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct SampleImporter {
    max_rows: usize,
}

impl Default for SampleImporter {
    fn default() -> Self {
        Self { max_rows: MAX_ROWS }
    }
}

impl SampleImporter {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Free text is tried as JSON first and read as CSV when that fails.
    pub fn from_text(&self, text: &str) -> Result<ImportedSample, IngestError> {
        match parser::parse_json(text.as_bytes()) {
            Ok(documents) => self.finish(documents, SourceFormat::Json),
            Err(IngestError::Json(_)) => {
                let documents = parser::parse_csv(text.as_bytes(), self.max_rows)
                    .map_err(|_| IngestError::Unparseable)?;
                self.finish(documents, SourceFormat::Csv)
            }
            Err(other) => Err(other),
        }
    }

    pub fn from_reader<R: Read>(
        &self,
        mut reader: R,
        format: SourceFormat,
    ) -> Result<ImportedSample, IngestError> {
        let documents = match format {
            SourceFormat::Json => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                parser::parse_json(&bytes)?
            }
            SourceFormat::Csv => parser::parse_csv(reader, self.max_rows)?,
        };
        self.finish(documents, format)
    }

    pub fn from_path<P: AsRef<Path>>(
        &self,
        path: P,
        format: SourceFormat,
    ) -> Result<ImportedSample, IngestError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file, format)
    }

    fn finish(
        &self,
        documents: Vec<Document>,
        format: SourceFormat,
    ) -> Result<ImportedSample, IngestError> {
        let received = documents.len();
        let sample = Sample::bounded(documents, self.max_rows);
        if sample.is_empty() {
            return Err(IngestError::Empty);
        }

        debug!(
            format = format.label(),
            received,
            kept = sample.len(),
            "sample imported"
        );

        Ok(ImportedSample {
            rows_parsed: sample.len(),
            sample,
            format,
        })
    }
}
