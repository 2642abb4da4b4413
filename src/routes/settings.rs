use actix_web::{web, HttpResponse};
use serde_json::Value;
use validator::Validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::SpreadsheetTestRequest;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/settings", web::get().to(get_settings))
        .route("/settings", web::put().to(update_settings))
        .route("/settings/test-spreadsheet", web::post().to(test_spreadsheet));
}

async fn get_settings(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.settings.load().await?))
}

async fn update_settings(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let settings = body.into_inner();
    state.settings.save(&settings).await?;
    tracing::info!("Settings updated");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Settings saved successfully",
        "settings": settings,
    })))
}

/// POST /api/settings/test-spreadsheet
async fn test_spreadsheet(
    state: web::Data<AppState>,
    body: web::Json<SpreadsheetTestRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let result = state.spreadsheet.check(&body.spreadsheet_id).await?;
    tracing::info!(
        "Spreadsheet {} reachable: {} columns, {} rows",
        result.spreadsheet_id,
        result.columns.len(),
        result.row_count
    );
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Spreadsheet connection succeeded",
        "result": result,
    })))
}
