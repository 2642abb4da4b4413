use actix_web::{web, HttpResponse};

use crate::core::kpi::{company_kpi, interview_statistics, top_performers};
use crate::error::ApiError;
use crate::models::TimeframeQuery;
use crate::routes::{today, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/company/kpi", web::get().to(get_company_kpi))
        .route("/company/top-performers", web::get().to(get_top_performers))
        .route("/statistics/interview-results", web::get().to(get_interview_statistics));
}

/// GET /api/company/kpi?timeframe=
async fn get_company_kpi(
    state: web::Data<AppState>,
    query: web::Query<TimeframeQuery>,
) -> Result<HttpResponse, ApiError> {
    let applicants = state.postgres.all_applicants().await?;
    let calls = state.postgres.list_phone_calls().await?;
    let employees = state.postgres.list_employees().await?;

    let report = company_kpi(
        &applicants,
        &calls,
        &employees,
        query.timeframe,
        &state.kpi.quarterly_hire_targets,
        today(),
    );
    Ok(HttpResponse::Ok().json(report))
}

/// GET /api/company/top-performers?timeframe=
async fn get_top_performers(
    state: web::Data<AppState>,
    query: web::Query<TimeframeQuery>,
) -> Result<HttpResponse, ApiError> {
    let employees = state.postgres.list_employees().await?;
    let applicants = state.postgres.all_applicants().await?;
    let calls = state.postgres.list_phone_calls().await?;

    let performers = top_performers(
        &employees,
        &applicants,
        &calls,
        query.timeframe,
        today(),
        state.kpi.top_performers_limit,
    );
    Ok(HttpResponse::Ok().json(performers))
}

/// GET /api/statistics/interview-results
async fn get_interview_statistics(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let interviews = state.postgres.list_interviews().await?;
    Ok(HttpResponse::Ok().json(interview_statistics(&interviews)))
}
