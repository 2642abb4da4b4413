use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::filters::calculate_age;
use crate::core::progress::furthest_stage;
use crate::models::domain::{Applicant, FunnelStage, Job, MatchEvaluation, TravelEstimate};

/// Applicant as returned by the API, with derived fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantView {
    #[serde(flatten)]
    pub applicant: Applicant,
    pub age: Option<u32>,
    /// Alias of `assigned_employee_id` kept for older clients
    pub employee_id: Option<i64>,
    pub current_stage: Option<FunnelStage>,
}

impl ApplicantView {
    pub fn new(applicant: Applicant, today: NaiveDate) -> Self {
        let age = applicant
            .profile
            .birthdate
            .map(|birthdate| calculate_age(birthdate, today));
        Self {
            age,
            employee_id: applicant.assigned_employee_id,
            current_stage: furthest_stage(&applicant.progress),
            applicant,
        }
    }
}

/// One job ranked for an applicant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub job: Job,
    #[serde(flatten)]
    pub evaluation: MatchEvaluation,
    pub applicant_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel: Option<TravelEstimate>,
}

impl JobMatch {
    pub fn duration_s(&self) -> Option<u64> {
        self.travel.as_ref().and_then(|t| t.duration_s)
    }
}

/// One applicant ranked for a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicantMatch {
    pub applicant: ApplicantView,
    #[serde(flatten)]
    pub evaluation: MatchEvaluation,
    pub age: Option<u32>,
}

/// Page of a list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

/// Column-wise travel-time lookup result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResponse {
    pub distances: Vec<Option<u64>>,
    pub durations: Vec<Option<u64>>,
    pub distance_texts: Vec<String>,
    pub duration_texts: Vec<String>,
}

impl From<Vec<TravelEstimate>> for DistanceResponse {
    fn from(estimates: Vec<TravelEstimate>) -> Self {
        let mut response = DistanceResponse::default();
        for estimate in estimates {
            response.distances.push(estimate.distance_m);
            response.durations.push(estimate.duration_s);
            response.distance_texts.push(estimate.distance_text);
            response.duration_texts.push(estimate.duration_text);
        }
        response
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub job_count: usize,
    pub skipped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub username: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub database: bool,
    pub cache_entries: u64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_response_columns() {
        let response = DistanceResponse::from(vec![
            TravelEstimate {
                distance_m: Some(1200),
                duration_s: Some(300),
                distance_text: "1.2 km".to_string(),
                duration_text: "5分".to_string(),
            },
            TravelEstimate {
                distance_m: None,
                duration_s: None,
                distance_text: "計算不能".to_string(),
                duration_text: "計算不能".to_string(),
            },
        ]);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["distances"][0], 1200);
        assert!(json["durations"][1].is_null());
        assert_eq!(json["durationTexts"][1], "計算不能");
    }
}
