use super::domain::{ReportId, ReportRecord, UploadId, UploadRecord};

/// Storage for uploaded samples so the service can be exercised in isolation.
pub trait UploadRepository: Send + Sync {
    fn insert(&self, record: UploadRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UploadId) -> Result<Option<UploadRecord>, RepositoryError>;
}

/// Storage for generated reports.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, record: ReportRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
