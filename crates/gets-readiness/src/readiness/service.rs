use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    ReportId, ReportRecord, ReportView, UploadId, UploadReceipt, UploadRecord,
};
use super::repository::{ReportRepository, RepositoryError, UploadRepository};
use crate::analysis::{AnalysisContext, Questionnaire, ReadinessAnalyzer};
use crate::config::StorageConfig;
use crate::ingest::{ImportedSample, IngestError, SampleImporter, SourceFormat};

/// Service composing sample import, the analyzer, and upload/report storage.
pub struct ReadinessService<U, R> {
    uploads: Arc<U>,
    reports: Arc<R>,
    analyzer: Arc<ReadinessAnalyzer>,
    importer: SampleImporter,
    storage: StorageConfig,
}

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_upload_id() -> UploadId {
    let id = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UploadId(format!("u_{id:07}"))
}

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("r_{id:07}"))
}

impl<U, R> ReadinessService<U, R>
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    pub fn new(
        uploads: Arc<U>,
        reports: Arc<R>,
        analyzer: ReadinessAnalyzer,
        storage: StorageConfig,
    ) -> Self {
        let importer = SampleImporter::new(analyzer.config().max_rows);
        Self {
            uploads,
            reports,
            analyzer: Arc::new(analyzer),
            importer,
            storage,
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Store pasted text, read as JSON when possible and CSV otherwise.
    pub fn upload_text(
        &self,
        text: &str,
        context: AnalysisContext,
    ) -> Result<UploadReceipt, ReadinessServiceError> {
        let imported = self.importer.from_text(text)?;
        self.store_upload(imported, context)
    }

    /// Store an uploaded file whose format is already known.
    pub fn upload_file(
        &self,
        bytes: &[u8],
        format: SourceFormat,
        context: AnalysisContext,
    ) -> Result<UploadReceipt, ReadinessServiceError> {
        let imported = self.importer.from_reader(bytes, format)?;
        self.store_upload(imported, context)
    }

    fn store_upload(
        &self,
        imported: ImportedSample,
        context: AnalysisContext,
    ) -> Result<UploadReceipt, ReadinessServiceError> {
        let created_at = Utc::now();
        let record = UploadRecord {
            upload_id: next_upload_id(),
            context,
            source_format: imported.format,
            sample: imported.sample,
            rows_parsed: imported.rows_parsed,
            created_at,
            expires_at: created_at + self.storage.upload_ttl,
        };
        let receipt = record.receipt();

        self.uploads.insert(record)?;
        info!(
            upload_id = %receipt.upload_id,
            rows_parsed = receipt.rows_parsed,
            format = receipt.source_format.label(),
            "upload stored"
        );

        Ok(receipt)
    }

    /// Analyze a stored upload and persist the resulting report.
    pub fn analyze(
        &self,
        upload_id: &UploadId,
        questionnaire: Questionnaire,
    ) -> Result<ReportView, ReadinessServiceError> {
        let now = Utc::now();
        let upload = self
            .uploads
            .fetch(upload_id)?
            .filter(|record| !record.is_expired(now))
            .ok_or_else(|| ReadinessServiceError::UploadNotFound(upload_id.clone()))?;

        let report = self.analyzer.analyze(
            &upload.sample,
            upload.rows_parsed,
            &questionnaire,
            &upload.context,
        );

        let record = ReportRecord {
            report_id: next_report_id(),
            upload_id: upload.upload_id,
            overall: report.scores.overall,
            report,
            created_at: now,
            expires_at: now + self.storage.report_ttl,
        };
        let view = record.view();

        self.reports.insert(record)?;
        info!(
            report_id = %view.report_id,
            %upload_id,
            overall = view.report.scores.overall,
            "report generated"
        );

        Ok(view)
    }

    /// Fetch a previously generated report that has not expired.
    pub fn report(&self, report_id: &ReportId) -> Result<ReportView, ReadinessServiceError> {
        let now = Utc::now();
        match self.reports.fetch(report_id)? {
            Some(record) if !record.is_expired(now) => Ok(record.view()),
            Some(_) => {
                debug!(%report_id, "report expired");
                Err(ReadinessServiceError::ReportNotFound(report_id.clone()))
            }
            None => Err(ReadinessServiceError::ReportNotFound(report_id.clone())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReadinessServiceError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("upload ID {0} not found")]
    UploadNotFound(UploadId),
    #[error("report with ID {0} not found")]
    ReportNotFound(ReportId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
