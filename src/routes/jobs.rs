use actix_multipart::{Field, Multipart};
use actix_web::{http::StatusCode, web, HttpResponse};
use futures_util::TryStreamExt;
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::import::SheetType;
use crate::error::ApiError;
use crate::models::{ImportResponse, JobDetails, PageQuery, Paginated, UploadQuery};
use crate::routes::{entity_response, page_window, AppState};
use crate::services::workbook::{import_jobs, SheetImport};

/// Upper bound for an uploaded workbook
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/jobs", web::get().to(list_jobs))
        .route("/jobs", web::post().to(create_job))
        .route("/jobs/delete-all", web::delete().to(delete_all_jobs))
        .route("/jobs/{id}", web::get().to(get_job))
        .route("/upload-job-data", web::post().to(upload_job_data));
}

/// GET /api/jobs?page=&per_page=
async fn list_jobs(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (page, per_page, offset) = page_window(&query, &state.pagination);
    let total = state.postgres.count_jobs().await?;
    let items = state.postgres.list_jobs(i64::from(per_page), offset).await?;

    Ok(HttpResponse::Ok().json(Paginated {
        items,
        total,
        page,
        per_page,
    }))
}

/// GET /api/jobs/{id}
async fn get_job(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let job = state
        .postgres
        .get_job(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /api/jobs
async fn create_job(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<JobDetails>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let job = state.postgres.create_job(&body).await?;
    tracing::info!("Created job {} ({})", job.id, job.details.company);
    entity_response(StatusCode::CREATED, "Job created successfully", "job", &job)
}

/// Parts of the upload form this endpoint reads
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    sheet_type: Option<SheetType>,
}

async fn read_field(field: &mut Field) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::BadRequest("Uploaded file is too large".to_string()));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_upload_form(mut payload: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let bytes = read_field(&mut field).await?;

        match name.as_str() {
            "file" => form.file = Some((filename, bytes)),
            "sheetType" | "sheet_type" => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                form.sheet_type = Some(SheetType::from(value));
            }
            _ => {}
        }
    }
    Ok(form)
}

/// POST /api/upload-job-data
///
/// `multipart/form-data` with the workbook in `file` and the layout in
/// `sheetType` (`cnt` or `aim`); `?sheetType=` is used when the form has none.
async fn upload_job_data(
    state: web::Data<AppState>,
    _auth: AuthUser,
    query: web::Query<UploadQuery>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_upload_form(payload).await?;
    let (filename, body) = form
        .file
        .ok_or_else(|| ApiError::BadRequest("No file part".to_string()))?;
    if filename.trim().is_empty() {
        return Err(ApiError::BadRequest("No selected file".to_string()));
    }

    let sheet = form.sheet_type.unwrap_or(query.sheet_type);
    tracing::info!(
        "Importing {} ({} bytes) as {:?}",
        filename,
        body.len(),
        sheet
    );

    let parsed = web::block(move || import_jobs(&body, sheet))
        .await
        .map_err(|e| ApiError::Internal(format!("Workbook parsing was interrupted: {}", e)))??;

    let outcome = match parsed {
        SheetImport::MissingSheet { sheet_name, available } => {
            return Ok(HttpResponse::Ok().json(ImportResponse {
                message: "No jobs imported".to_string(),
                job_count: 0,
                skipped_rows: 0,
                warning: Some(format!(
                    "Sheet '{}' not found. Available sheets: {}",
                    sheet_name,
                    available.join(", ")
                )),
            }));
        }
        SheetImport::Parsed(outcome) => outcome,
    };

    let job_count = state.postgres.create_jobs(&outcome.jobs).await?;
    tracing::info!(
        "Imported {} jobs, skipped {} rows",
        job_count,
        outcome.skipped_rows
    );

    Ok(HttpResponse::Ok().json(ImportResponse {
        message: format!("{} jobs imported successfully", job_count),
        job_count,
        skipped_rows: outcome.skipped_rows,
        warning: None,
    }))
}

/// DELETE /api/jobs/delete-all
async fn delete_all_jobs(
    state: web::Data<AppState>,
    _auth: AuthUser,
) -> Result<HttpResponse, ApiError> {
    let deleted = state.postgres.delete_all_jobs().await?;
    tracing::warn!("Deleted all jobs ({} rows)", deleted);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "All jobs deleted successfully",
        "deleted_count": deleted,
    })))
}
