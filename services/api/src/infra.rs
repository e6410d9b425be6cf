use chrono::Utc;
use gets_readiness::readiness::{
    ReportId, ReportRecord, ReportRepository, RepositoryError, UploadId, UploadRecord,
    UploadRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Uploads held in process memory; expired entries are evicted when touched.
#[derive(Default, Clone)]
pub(crate) struct InMemoryUploadRepository {
    records: Arc<Mutex<HashMap<UploadId, UploadRecord>>>,
}

impl UploadRepository for InMemoryUploadRepository {
    fn insert(&self, record: UploadRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("upload mutex poisoned");
        let now = Utc::now();
        guard.retain(|_, existing| !existing.is_expired(now));

        if guard.contains_key(&record.upload_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.upload_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &UploadId) -> Result<Option<UploadRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("upload mutex poisoned");
        let now = Utc::now();
        if guard.get(id).is_some_and(|record| record.is_expired(now)) {
            debug!(upload_id = %id, "evicting expired upload");
            guard.remove(id);
            return Ok(None);
        }
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, record: ReportRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("report mutex poisoned");
        let now = Utc::now();
        guard.retain(|_, existing| !existing.is_expired(now));

        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let mut guard = self.records.lock().expect("report mutex poisoned");
        let now = Utc::now();
        if guard.get(id).is_some_and(|record| record.is_expired(now)) {
            debug!(report_id = %id, "evicting expired report");
            guard.remove(id);
            return Ok(None);
        }
        Ok(guard.get(id).cloned())
    }
}

#[cfg(test)]
impl InMemoryUploadRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("upload mutex poisoned").len()
    }
}
