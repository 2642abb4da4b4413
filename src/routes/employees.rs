use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{Map, Value};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::kpi::employee_kpi;
use crate::error::ApiError;
use crate::models::requests::merge_patch;
use crate::models::{Employee, EmployeeDetails, TimeframeQuery};
use crate::routes::{entity_response, message_response, today, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/employees", web::get().to(list_employees))
        .route("/employees", web::post().to(create_employee))
        .route("/employees/{id}", web::get().to(get_employee))
        .route("/employees/{id}", web::put().to(update_employee))
        .route("/employees/{id}", web::delete().to(delete_employee))
        .route("/employees/{id}/kpi", web::get().to(get_employee_kpi));
}

async fn load_employee(state: &AppState, id: i64) -> Result<Employee, ApiError> {
    state
        .postgres
        .get_employee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Employee"))
}

async fn list_employees(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(state.postgres.list_employees().await?))
}

async fn create_employee(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<EmployeeDetails>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let employee = state.postgres.create_employee(&body).await?;
    tracing::info!("Created employee {} ({})", employee.id, employee.details.name);
    entity_response(StatusCode::CREATED, "Employee created successfully", "employee", &employee)
}

async fn get_employee(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(load_employee(&state, path.into_inner()).await?))
}

async fn update_employee(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let mut employee = load_employee(&state, path.into_inner()).await?;
    employee.details = merge_patch(&employee.details, &body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid employee data: {}", e)))?;
    employee.details.validate()?;

    let employee = state.postgres.save_employee(&employee).await?;
    tracing::info!("Updated employee {}", employee.id);
    entity_response(StatusCode::OK, "Employee updated successfully", "employee", &employee)
}

/// Assigned applicants and calls keep their rows; the references are cleared
async fn delete_employee(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.postgres.delete_employee(id).await? {
        return Err(ApiError::not_found("Employee"));
    }
    tracing::info!("Deleted employee {}", id);
    Ok(message_response("Employee deleted successfully"))
}

/// GET /api/employees/{id}/kpi?timeframe=week|month|quarter|year
async fn get_employee_kpi(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<TimeframeQuery>,
) -> Result<HttpResponse, ApiError> {
    let employee = load_employee(&state, path.into_inner()).await?;
    let applicants = state.postgres.all_applicants().await?;
    let calls = state.postgres.list_phone_calls().await?;

    let report = employee_kpi(&employee, &applicants, &calls, query.timeframe, today());
    tracing::debug!(
        "KPI for employee {}: {} applicants",
        employee.id,
        report.summary.total_applicants
    );
    Ok(HttpResponse::Ok().json(report))
}
