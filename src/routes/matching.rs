use actix_web::{web, HttpResponse};

use crate::core::ranking::{sort_job_matches, JobSort};
use crate::error::ApiError;
use crate::models::{Applicant, ApplicantMatchQuery, JobMatch, JobMatchQuery, TravelMode};
use crate::routes::{today, AppState};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matching/applicant/{id}", web::get().to(match_jobs_for_applicant))
        .route("/matching/job/{id}", web::get().to(match_applicants_for_job));
}

/// GET /api/matching/applicant/{id}?sort_by=age_limit|location|distance|score
async fn match_jobs_for_applicant(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<JobMatchQuery>,
) -> Result<HttpResponse, ApiError> {
    let applicant = state
        .postgres
        .get_applicant(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Applicant"))?;
    let jobs = state.postgres.all_jobs().await?;

    tracing::info!(
        "Matching applicant {} against {} jobs (sort: {:?})",
        applicant.id,
        jobs.len(),
        query.sort_by
    );

    let mut result = state
        .matcher
        .match_jobs(&applicant, jobs, query.sort_by, today());

    if query.sort_by == JobSort::Distance {
        attach_travel(&state, &applicant, &mut result.matches).await;
        sort_job_matches(&mut result.matches, JobSort::Distance);
    }

    tracing::debug!(
        "Returning {} matches for applicant {}",
        result.matches.len(),
        applicant.id
    );
    Ok(HttpResponse::Ok().json(result.matches))
}

/// Look up travel times from the applicant's address to each job
///
/// Any failure leaves durations unknown; the match list is still returned.
async fn attach_travel(state: &AppState, applicant: &Applicant, matches: &mut [JobMatch]) {
    let Some(origin) = applicant
        .profile
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
    else {
        tracing::debug!("Applicant {} has no address, skipping travel lookup", applicant.id);
        return;
    };

    let mode = TravelMode::from_commute_method(applicant.profile.commute_method.as_deref());
    let destinations: Vec<String> = matches.iter().map(|m| m.job.details.work_address()).collect();

    match state.distance.lookup(origin, &destinations, mode).await {
        Ok(estimates) => {
            for (m, estimate) in matches.iter_mut().zip(estimates) {
                m.travel = Some(estimate);
            }
        }
        Err(e) => tracing::warn!("Travel lookup unavailable for applicant {}: {}", applicant.id, e),
    }
}

/// GET /api/matching/job/{id}?sort_by=age|location|score
async fn match_applicants_for_job(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<ApplicantMatchQuery>,
) -> Result<HttpResponse, ApiError> {
    let job = state
        .postgres
        .get_job(path.into_inner())
        .await?
        .ok_or_else(|| ApiError::not_found("Job"))?;
    let applicants = state.postgres.all_applicants().await?;

    tracing::info!(
        "Matching job {} against {} applicants (sort: {:?})",
        job.id,
        applicants.len(),
        query.sort_by
    );

    let result = state
        .matcher
        .match_applicants(&job, applicants, query.sort_by, today());

    Ok(HttpResponse::Ok().json(result.matches))
}
