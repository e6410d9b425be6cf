use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::{json, Value};

use crate::analysis::ReadinessAnalyzer;
use crate::config::StorageConfig;
use crate::readiness::domain::{ReportId, ReportRecord, UploadId, UploadRecord};
use crate::readiness::repository::{ReportRepository, RepositoryError, UploadRepository};
use crate::readiness::{readiness_router, ReadinessService};

pub(super) type MemoryService = ReadinessService<MemoryUploads, MemoryReports>;

pub(super) fn build_service() -> (MemoryService, Arc<MemoryUploads>, Arc<MemoryReports>) {
    let uploads = Arc::new(MemoryUploads::default());
    let reports = Arc::new(MemoryReports::default());
    let service = ReadinessService::new(
        uploads.clone(),
        reports.clone(),
        ReadinessAnalyzer::default(),
        StorageConfig::default(),
    );
    (service, uploads, reports)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    readiness_router(Arc::new(service))
}

/// Two invoices: the first clean, the second with a bad line total and a
/// disallowed currency.
pub(super) fn invoice_sample() -> Value {
    json!([
        {
            "invoice_id": "INV-1",
            "date": "2024-01-31",
            "currency": "aed",
            "total_excl_vat": 100,
            "vat_amount": 5,
            "total_incl_vat": 105,
            "buyer_trn": "100200300",
            "seller_trn": "300200100",
            "lines": [
                { "sku": "A-1", "qty": 2, "unit_price": 10.5, "line_total": 21 },
                { "sku": "A-2", "qty": 1, "unit_price": 79, "line_total": 79 }
            ]
        },
        {
            "invoice_id": "INV-2",
            "date": "2024-02-01",
            "currency": "eur",
            "total_excl_vat": 50,
            "vat_amount": 2.5,
            "total_incl_vat": 52.5,
            "buyer_trn": "100200300",
            "seller_trn": "300200100",
            "lines": [
                { "sku": "B-1", "qty": 2, "unit_price": 10.5, "line_total": 25 }
            ]
        }
    ])
}

#[derive(Default, Clone)]
pub(super) struct MemoryUploads {
    pub(super) records: Arc<Mutex<HashMap<UploadId, UploadRecord>>>,
}

impl MemoryUploads {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("upload mutex poisoned").len()
    }
}

impl UploadRepository for MemoryUploads {
    fn insert(&self, record: UploadRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("upload mutex poisoned");
        if guard.contains_key(&record.upload_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.upload_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &UploadId) -> Result<Option<UploadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("upload mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryReports {
    pub(super) records: Arc<Mutex<HashMap<ReportId, ReportRecord>>>,
}

impl MemoryReports {
    pub(super) fn overwrite(&self, record: ReportRecord) {
        self.records
            .lock()
            .expect("report mutex poisoned")
            .insert(record.report_id.clone(), record);
    }
}

impl ReportRepository for MemoryReports {
    fn insert(&self, record: ReportRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("report mutex poisoned");
        if guard.contains_key(&record.report_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.report_id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        let guard = self.records.lock().expect("report mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

pub(super) struct UnavailableReports;

impl ReportRepository for UnavailableReports {
    fn insert(&self, _record: ReportRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ReportId) -> Result<Option<ReportRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
