// Route exports
pub mod applicants;
pub mod auth;
pub mod distances;
pub mod employees;
pub mod health;
pub mod interviews;
pub mod jobs;
pub mod kpi;
pub mod matching;
pub mod phone_calls;
pub mod settings;

use actix_web::{http::StatusCode, web, HttpResponse};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::{KpiSettings, PaginationSettings};
use crate::core::Matcher;
use crate::error::ApiError;
use crate::models::PageQuery;
use crate::services::{
    CacheManager, DistanceMatrixClient, PostgresClient, SettingsStore, SpreadsheetChecker,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub cache: Arc<CacheManager>,
    pub distance: Arc<DistanceMatrixClient>,
    pub settings: Arc<SettingsStore>,
    pub spreadsheet: Arc<SpreadsheetChecker>,
    pub matcher: Matcher,
    pub pagination: PaginationSettings,
    pub kpi: KpiSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::configure)
            .configure(auth::configure)
            .configure(applicants::configure)
            .configure(jobs::configure)
            .configure(matching::configure)
            .configure(distances::configure)
            .configure(employees::configure)
            .configure(kpi::configure)
            .configure(interviews::configure)
            .configure(phone_calls::configure)
            .configure(settings::configure),
    );
}

/// Local calendar date used for ages and KPI windows
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `(page, per_page, offset)` with page >= 1 and per_page capped
pub(crate) fn page_window(query: &PageQuery, settings: &PaginationSettings) -> (u32, u32, i64) {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(settings.default_per_page)
        .clamp(1, settings.max_per_page.max(1));
    let offset = i64::from(page - 1) * i64::from(per_page);
    (page, per_page, offset)
}

/// `{"message": ..., "<key>": entity}` with the given status
pub(crate) fn entity_response<T: Serialize>(
    status: StatusCode,
    message: &str,
    key: &str,
    entity: &T,
) -> Result<HttpResponse, ApiError> {
    let mut body = Map::new();
    body.insert("message".to_string(), Value::String(message.to_string()));
    body.insert(
        key.to_string(),
        serde_json::to_value(entity)
            .map_err(|e| ApiError::Internal(format!("Failed to serialize {}: {}", key, e)))?,
    );
    Ok(HttpResponse::build(status).json(Value::Object(body)))
}

pub(crate) fn message_response(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults_and_caps() {
        let settings = PaginationSettings::default();

        assert_eq!(page_window(&PageQuery::default(), &settings), (1, 50, 0));
        assert_eq!(
            page_window(&PageQuery { page: Some(3), per_page: Some(20) }, &settings),
            (3, 20, 40)
        );
        assert_eq!(
            page_window(&PageQuery { page: Some(0), per_page: Some(10_000) }, &settings),
            (1, 500, 0)
        );
    }
}
