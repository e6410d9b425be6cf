use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{ReportId, UploadId};
use super::repository::{ReportRepository, RepositoryError, UploadRepository};
use super::service::{ReadinessService, ReadinessServiceError};
use crate::analysis::{AnalysisContext, Questionnaire};
use crate::ingest::{IngestError, SourceFormat};

/// Router builder exposing the upload, analyze, and report endpoints.
pub fn readiness_router<U, R>(service: Arc<ReadinessService<U, R>>) -> Router
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    let body_limit = service.storage().max_upload_bytes;

    Router::new()
        .route("/api/upload", post(upload_handler::<U, R>))
        .route("/api/analyze", post(analyze_handler::<U, R>))
        .route("/api/report/:report_id", get(report_handler::<U, R>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUploadRequest {
    #[serde(default)]
    pub(crate) text: Option<String>,
    #[serde(default)]
    pub(crate) country: Option<String>,
    #[serde(default)]
    pub(crate) erp: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyzeRequest {
    #[serde(default)]
    pub(crate) upload_id: Option<String>,
    #[serde(default)]
    pub(crate) questionnaire: Option<Questionnaire>,
}

struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

pub(crate) async fn upload_handler<U, R>(
    State(service): State<Arc<ReadinessService<U, R>>>,
    request: Request,
) -> Response
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        match Multipart::from_request(request, &()).await {
            Ok(multipart) => multipart_upload(&service, multipart).await,
            Err(rejection) => rejection.into_response(),
        }
    } else {
        match Json::<RawUploadRequest>::from_request(request, &()).await {
            Ok(Json(payload)) => raw_upload(&service, payload),
            Err(rejection) => rejection.into_response(),
        }
    }
}

fn raw_upload<U, R>(service: &ReadinessService<U, R>, payload: RawUploadRequest) -> Response
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    let Some(text) = payload.text.filter(|text| !text.trim().is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing \"text\" field in raw body request",
        );
    };

    let context = AnalysisContext::new(payload.country, payload.erp);
    match service.upload_text(&text, context) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(error) => service_error_response(error),
    }
}

async fn multipart_upload<U, R>(
    service: &ReadinessService<U, R>,
    mut multipart: Multipart,
) -> Response
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    let mut file = None;
    let mut country = None;
    let mut erp = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                warn!(%error, "multipart upload failed");
                return error_response(error.status(), "file upload failed or file too large");
            }
        };

        let name = field.name().map(str::to_string);
        let outcome = match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                field.bytes().await.map(|data| {
                    file = Some(UploadedFile {
                        file_name,
                        content_type,
                        data,
                    });
                })
            }
            Some("country") => field.text().await.map(|value| country = Some(value)),
            Some("erp") => field.text().await.map(|value| erp = Some(value)),
            _ => Ok(()),
        };

        if let Err(error) = outcome {
            warn!(%error, "multipart field could not be read");
            return error_response(error.status(), "file upload failed or file too large");
        }
    }

    let Some(file) = file else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing file field in multipart request",
        );
    };

    let Some(format) =
        SourceFormat::detect(file.file_name.as_deref(), file.content_type.as_deref())
    else {
        return service_error_response(IngestError::UnsupportedFormat.into());
    };

    let context = AnalysisContext::new(country, erp);
    match service.upload_file(&file.data, format, context) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn analyze_handler<U, R>(
    State(service): State<Arc<ReadinessService<U, R>>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Response
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    let (Some(upload_id), Some(questionnaire)) = (payload.upload_id, payload.questionnaire) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "missing uploadId or questionnaire in request body",
        );
    };

    match service.analyze(&UploadId(upload_id), questionnaire) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn report_handler<U, R>(
    State(service): State<Arc<ReadinessService<U, R>>>,
    Path(report_id): Path<String>,
) -> Response
where
    U: UploadRepository + 'static,
    R: ReportRepository + 'static,
{
    match service.report(&ReportId(report_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: ReadinessServiceError) -> Response {
    let status = match &error {
        ReadinessServiceError::Ingest(_) => StatusCode::BAD_REQUEST,
        ReadinessServiceError::UploadNotFound(_) | ReadinessServiceError::ReportNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ReadinessServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ReadinessServiceError::Repository(RepositoryError::Unavailable(_)) => {
            warn!(%error, "repository unavailable");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    error_response(status, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
