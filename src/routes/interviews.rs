use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{Map, Value};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::requests::merge_patch;
use crate::models::{Interview, InterviewDetails};
use crate::routes::{entity_response, message_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/interviews", web::get().to(list_interviews))
        .route("/interviews", web::post().to(create_interview))
        .route("/interviews/{id}", web::get().to(get_interview))
        .route("/interviews/{id}", web::put().to(update_interview))
        .route("/interviews/{id}", web::delete().to(delete_interview));
}

async fn load_interview(state: &AppState, id: i64) -> Result<Interview, ApiError> {
    state
        .postgres
        .get_interview(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Interview"))
}

async fn list_interviews(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.postgres.list_interviews().await?))
}

/// POST /api/interviews
///
/// `applicant_id`, `job_id` and `date` are required; a reference to a
/// missing applicant or job is a 400.
async fn create_interview(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<InterviewDetails>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let interview = state.postgres.create_interview(&body).await?;
    tracing::info!(
        "Scheduled interview {} for applicant {} at job {}",
        interview.id,
        interview.details.applicant_id,
        interview.details.job_id
    );
    entity_response(StatusCode::CREATED, "Interview created successfully", "interview", &interview)
}

async fn get_interview(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(load_interview(&state, path.into_inner()).await?))
}

async fn update_interview(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let mut interview = load_interview(&state, path.into_inner()).await?;
    interview.details = merge_patch(&interview.details, &body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid interview data: {}", e)))?;
    interview.details.validate()?;

    let interview = state.postgres.save_interview(&interview).await?;
    tracing::info!(
        "Updated interview {} (status {:?}, result {:?})",
        interview.id,
        interview.details.status,
        interview.details.result
    );
    entity_response(StatusCode::OK, "Interview updated successfully", "interview", &interview)
}

async fn delete_interview(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.postgres.delete_interview(id).await? {
        return Err(ApiError::not_found("Interview"));
    }
    Ok(message_response("Interview deleted successfully"))
}
