use crate::analysis::{AnalysisContext, ReadinessReport, Sample};
use crate::ingest::SourceFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(pub String);

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored sample waiting to be analyzed.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub upload_id: UploadId,
    pub context: AnalysisContext,
    pub source_format: SourceFormat,
    pub sample: Sample,
    pub rows_parsed: usize,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UploadRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn receipt(&self) -> UploadReceipt {
        UploadReceipt {
            upload_id: self.upload_id.clone(),
            rows_parsed: self.rows_parsed,
            source_format: self.source_format,
        }
    }
}

/// A generated report kept for later retrieval by id.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub report_id: ReportId,
    pub upload_id: UploadId,
    pub overall: u8,
    pub report: ReadinessReport,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ReportRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn view(&self) -> ReportView {
        ReportView {
            report_id: self.report_id.clone(),
            report: self.report.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub upload_id: UploadId,
    pub rows_parsed: usize,
    pub source_format: SourceFormat,
}

/// Report payload as returned to API callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportView {
    pub report_id: ReportId,
    #[serde(flatten)]
    pub report: ReadinessReport,
}
