//! Upload, analyze, and report retrieval on top of the analysis core.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{ReportId, ReportRecord, ReportView, UploadId, UploadReceipt, UploadRecord};
pub use repository::{ReportRepository, RepositoryError, UploadRepository};
pub use router::readiness_router;
pub use service::{ReadinessService, ReadinessServiceError};
