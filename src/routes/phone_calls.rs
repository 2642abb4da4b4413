use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{Map, Value};
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::requests::merge_patch;
use crate::models::{PhoneCall, PhoneCallDetails};
use crate::routes::{entity_response, message_response, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/phone-calls", web::get().to(list_phone_calls))
        .route("/phone-calls", web::post().to(create_phone_call))
        .route("/phone-calls/{id}", web::get().to(get_phone_call))
        .route("/phone-calls/{id}", web::put().to(update_phone_call))
        .route("/phone-calls/{id}", web::delete().to(delete_phone_call));
}

async fn load_phone_call(state: &AppState, id: i64) -> Result<PhoneCall, ApiError> {
    state
        .postgres
        .get_phone_call(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Phone call"))
}

async fn list_phone_calls(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.postgres.list_phone_calls().await?))
}

async fn create_phone_call(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<PhoneCallDetails>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let call = state.postgres.create_phone_call(&body).await?;
    tracing::info!(
        "Logged phone call {} for applicant {} ({:?})",
        call.id,
        call.details.applicant_id,
        call.details.status
    );
    entity_response(StatusCode::CREATED, "Phone call created successfully", "phone_call", &call)
}

async fn get_phone_call(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(load_phone_call(&state, path.into_inner()).await?))
}

async fn update_phone_call(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let mut call = load_phone_call(&state, path.into_inner()).await?;
    call.details = merge_patch(&call.details, &body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid phone call data: {}", e)))?;
    call.details.validate()?;

    let call = state.postgres.save_phone_call(&call).await?;
    tracing::info!("Updated phone call {}", call.id);
    entity_response(StatusCode::OK, "Phone call updated successfully", "phone_call", &call)
}

async fn delete_phone_call(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.postgres.delete_phone_call(id).await? {
        return Err(ApiError::not_found("Phone call"));
    }
    Ok(message_response("Phone call deleted successfully"))
}
