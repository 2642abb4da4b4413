use actix_web::{http::StatusCode, web, HttpResponse};
use serde_json::{Map, Value};
use validator::Validate;

use crate::auth::AuthUser;
use crate::core::progress::{apply_updates, parse_progress_update};
use crate::error::ApiError;
use crate::models::requests::{merge_patch, parse_employee_ref, parse_referral_fee};
use crate::models::{
    Applicant, ApplicantView, AssignEmployeeRequest, NewApplicant, PageQuery, Paginated,
    ReferralFeeRequest,
};
use crate::routes::{entity_response, message_response, page_window, today, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/applicants", web::get().to(list_applicants))
        .route("/applicants", web::post().to(create_applicant))
        .route("/applicants/{id}", web::get().to(get_applicant))
        .route("/applicants/{id}", web::put().to(update_applicant))
        .route("/applicants/{id}", web::delete().to(delete_applicant))
        .route("/applicants/{id}/progress", web::put().to(update_progress))
        .route("/applicants/{id}/assign-employee", web::put().to(assign_employee))
        .route("/applicants/{id}/referral-fee", web::put().to(update_referral_fee))
        .route("/applicants/{id}/phone-calls", web::get().to(applicant_phone_calls));
}

async fn load_applicant(state: &AppState, id: i64) -> Result<Applicant, ApiError> {
    state
        .postgres
        .get_applicant(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant"))
}

/// `null`/`""` unassign; anything else must name an existing employee
async fn resolve_employee(state: &AppState, value: &Value) -> Result<Option<i64>, ApiError> {
    let employee_id = parse_employee_ref(value).map_err(ApiError::BadRequest)?;
    if let Some(id) = employee_id {
        if state.postgres.get_employee(id).await?.is_none() {
            return Err(ApiError::not_found("Employee"));
        }
    }
    Ok(employee_id)
}

fn optional_fee(value: &Value) -> Result<Option<i64>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        other => parse_referral_fee(other).map(Some).map_err(ApiError::BadRequest),
    }
}

/// GET /api/applicants?page=&per_page=
async fn list_applicants(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let (page, per_page, offset) = page_window(&query, &state.pagination);
    let total = state.postgres.count_applicants().await?;
    let applicants = state
        .postgres
        .list_applicants(i64::from(per_page), offset)
        .await?;

    let today = today();
    Ok(HttpResponse::Ok().json(Paginated {
        items: applicants
            .into_iter()
            .map(|a| ApplicantView::new(a, today))
            .collect::<Vec<_>>(),
        total,
        page,
        per_page,
    }))
}

/// POST /api/applicants
async fn create_applicant(
    state: web::Data<AppState>,
    _auth: AuthUser,
    body: web::Json<NewApplicant>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let referral_fee = match &body.referral_fee {
        Some(value) => optional_fee(value)?,
        None => None,
    };
    let assigned_employee_id = match &body.assigned_employee_id {
        Some(value) => resolve_employee(&state, value).await?,
        None => None,
    };

    let applicant = state
        .postgres
        .create_applicant(&body.profile, &body.progress, referral_fee, assigned_employee_id)
        .await?;

    tracing::info!("Created applicant {} ({})", applicant.id, applicant.profile.name);
    entity_response(
        StatusCode::CREATED,
        "Applicant created successfully",
        "applicant",
        &ApplicantView::new(applicant, today()),
    )
}

/// GET /api/applicants/{id}
async fn get_applicant(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let applicant = load_applicant(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApplicantView::new(applicant, today())))
}

/// PUT /api/applicants/{id}
///
/// Partial update: profile fields, milestone dates, `referral_fee` and
/// `assigned_employee_id` (or `employee_id`) may all appear.
async fn update_applicant(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let updates = parse_progress_update(&body)?;
    let mut applicant = load_applicant(&state, path.into_inner()).await?;
    apply_updates(&mut applicant.progress, &updates);

    applicant.profile = merge_patch(&applicant.profile, &body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid applicant data: {}", e)))?;
    applicant.profile.validate()?;

    if let Some(value) = body.get("referral_fee") {
        applicant.referral_fee = optional_fee(value)?;
    }
    if let Some(value) = body.get("assigned_employee_id").or_else(|| body.get("employee_id")) {
        applicant.assigned_employee_id = resolve_employee(&state, value).await?;
    }

    let applicant = state.postgres.save_applicant(&applicant).await?;
    tracing::info!("Updated applicant {}", applicant.id);

    entity_response(
        StatusCode::OK,
        "Applicant updated successfully",
        "applicant",
        &ApplicantView::new(applicant, today()),
    )
}

/// DELETE /api/applicants/{id}
async fn delete_applicant(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if !state.postgres.delete_applicant(id).await? {
        return Err(ApiError::not_found("Applicant"));
    }
    tracing::info!("Deleted applicant {}", id);
    Ok(message_response("Applicant deleted successfully"))
}

/// PUT /api/applicants/{id}/progress
async fn update_progress(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<Map<String, Value>>,
) -> Result<HttpResponse, ApiError> {
    let updates = parse_progress_update(&body)?;
    let mut applicant = load_applicant(&state, path.into_inner()).await?;

    let changes = apply_updates(&mut applicant.progress, &updates);
    for change in &changes {
        tracing::info!(
            applicant = applicant.id,
            field = change.stage.field(),
            from = ?change.from,
            to = ?change.to,
            "Progress changed"
        );
    }

    let applicant = if changes.is_empty() {
        applicant
    } else {
        state.postgres.save_applicant(&applicant).await?
    };

    entity_response(
        StatusCode::OK,
        "Progress updated successfully",
        "applicant",
        &ApplicantView::new(applicant, today()),
    )
}

/// PUT /api/applicants/{id}/assign-employee
async fn assign_employee(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<AssignEmployeeRequest>,
) -> Result<HttpResponse, ApiError> {
    let value = body
        .employee_id
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("employee_id is required".to_string()))?;

    let mut applicant = load_applicant(&state, path.into_inner()).await?;
    applicant.assigned_employee_id = resolve_employee(&state, value).await?;
    let applicant = state.postgres.save_applicant(&applicant).await?;

    let message = match applicant.assigned_employee_id {
        Some(employee_id) => {
            tracing::info!("Assigned applicant {} to employee {}", applicant.id, employee_id);
            "Employee assigned successfully"
        }
        None => {
            tracing::info!("Unassigned applicant {}", applicant.id);
            "Employee unassigned successfully"
        }
    };

    entity_response(
        StatusCode::OK,
        message,
        "applicant",
        &ApplicantView::new(applicant, today()),
    )
}

/// PUT /api/applicants/{id}/referral-fee
async fn update_referral_fee(
    state: web::Data<AppState>,
    _auth: AuthUser,
    path: web::Path<i64>,
    body: web::Json<ReferralFeeRequest>,
) -> Result<HttpResponse, ApiError> {
    let value = body
        .referral_fee
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("referral_fee is required".to_string()))?;
    let fee = parse_referral_fee(value).map_err(ApiError::BadRequest)?;

    let mut applicant = load_applicant(&state, path.into_inner()).await?;
    applicant.referral_fee = Some(fee);
    let applicant = state.postgres.save_applicant(&applicant).await?;

    tracing::info!("Referral fee of applicant {} set to {}", applicant.id, fee);
    entity_response(
        StatusCode::OK,
        "Referral fee updated successfully",
        "applicant",
        &ApplicantView::new(applicant, today()),
    )
}

/// GET /api/applicants/{id}/phone-calls
async fn applicant_phone_calls(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let applicant = load_applicant(&state, path.into_inner()).await?;
    let calls = state.postgres.phone_calls_for_applicant(applicant.id).await?;
    Ok(HttpResponse::Ok().json(calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_fee() {
        assert_eq!(optional_fee(&Value::Null).unwrap(), None);
        assert_eq!(optional_fee(&json!("")).unwrap(), None);
        assert_eq!(optional_fee(&json!("200,000円")).unwrap(), Some(200_000));
        assert!(matches!(optional_fee(&json!([])), Err(ApiError::BadRequest(_))));
    }
}
