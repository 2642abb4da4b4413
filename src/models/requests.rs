use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::core::import::SheetType;
use crate::core::kpi::Timeframe;
use crate::core::ranking::{ApplicantSort, JobSort};
use crate::models::domain::{ApplicantProfile, ApplicantProgress, TravelMode};

/// Pagination query for list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// `?sort_by=` for applicant → jobs matching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobMatchQuery {
    #[serde(default)]
    pub sort_by: JobSort,
}

/// `?sort_by=` for job → applicants matching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantMatchQuery {
    #[serde(default)]
    pub sort_by: ApplicantSort,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeframeQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    #[serde(default, rename = "sheetType", alias = "sheet_type")]
    pub sheet_type: SheetType,
}

/// Body of `POST /applicants`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewApplicant {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ApplicantProfile,
    #[serde(flatten)]
    pub progress: ApplicantProgress,
    #[serde(default)]
    pub referral_fee: Option<Value>,
    #[serde(default, alias = "employee_id")]
    pub assigned_employee_id: Option<Value>,
}

/// Body of `PUT /applicants/:id/assign-employee`
///
/// `employee_id` must be present; `null` or `""` unassigns.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignEmployeeRequest {
    #[serde(default, deserialize_with = "present_value")]
    pub employee_id: Option<Value>,
}

/// Body of `PUT /applicants/:id/referral-fee`
#[derive(Debug, Clone, Deserialize)]
pub struct ReferralFeeRequest {
    #[serde(default)]
    pub referral_fee: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /calculate-distances`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceRequest {
    pub origin: Option<String>,
    pub destinations: Option<Vec<String>>,
    #[serde(default)]
    pub mode: TravelMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SpreadsheetTestRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Spreadsheet ID is required"))]
    pub spreadsheet_id: String,
}

/// Keeps an explicit `null` distinct from an absent key
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Interpret an employee reference: number, numeric string, or empty
pub fn parse_employee_ref(value: &Value) -> Result<Option<i64>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| format!("Invalid employee ID: {}", n)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("Invalid employee ID: {}", s)),
        other => Err(format!("Invalid employee ID: {}", other)),
    }
}

/// Interpret a referral fee: digits are kept, everything else stripped
///
/// `"¥300,000"` and `300000` both yield `300000`.
pub fn parse_referral_fee(value: &Value) -> Result<i64, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| "Invalid referral fee format".to_string()),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits
                .parse::<i64>()
                .map_err(|_| "Invalid referral fee format".to_string())
        }
        _ => Err("Invalid referral fee format".to_string()),
    }
}

/// Apply a partial JSON update to a record
///
/// Only keys already present on the serialized record are taken from the
/// patch, so ids and unknown keys are ignored.
pub fn merge_patch<T>(current: &T, patch: &Map<String, Value>) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(current)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            if let Some(slot) = fields.get_mut(key) {
                *slot = value.clone();
            }
        }
    }
    serde_json::from_value(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_queries_tolerate_unknown_sort() {
        let query = actix_web::web::Query::<JobMatchQuery>::from_query("sort_by=newest").unwrap();
        assert_eq!(query.sort_by, JobSort::AgeLimit);
        let query = actix_web::web::Query::<JobMatchQuery>::from_query("sort_by=distance").unwrap();
        assert_eq!(query.sort_by, JobSort::Distance);
        let query = actix_web::web::Query::<ApplicantMatchQuery>::from_query("sort_by=oldest").unwrap();
        assert_eq!(query.sort_by, ApplicantSort::Age);
        let query = actix_web::web::Query::<ApplicantMatchQuery>::from_query("").unwrap();
        assert_eq!(query.sort_by, ApplicantSort::Age);
    }

    #[test]
    fn test_parse_referral_fee_strips_formatting() {
        assert_eq!(parse_referral_fee(&json!("¥300,000")), Ok(300_000));
        assert_eq!(parse_referral_fee(&json!(150000)), Ok(150_000));
        assert!(parse_referral_fee(&json!("なし")).is_err());
        assert!(parse_referral_fee(&json!(true)).is_err());
    }

    #[test]
    fn test_parse_employee_ref() {
        assert_eq!(parse_employee_ref(&json!(3)), Ok(Some(3)));
        assert_eq!(parse_employee_ref(&json!("7")), Ok(Some(7)));
        assert_eq!(parse_employee_ref(&json!("")), Ok(None));
        assert_eq!(parse_employee_ref(&Value::Null), Ok(None));
        assert!(parse_employee_ref(&json!("abc")).is_err());
    }

    #[test]
    fn test_assign_request_distinguishes_null_from_missing() {
        let explicit: AssignEmployeeRequest =
            serde_json::from_value(json!({"employee_id": null})).unwrap();
        assert_eq!(explicit.employee_id, Some(Value::Null));

        let missing: AssignEmployeeRequest = serde_json::from_value(json!({})).unwrap();
        assert!(missing.employee_id.is_none());
    }

    #[test]
    fn test_merge_patch_updates_known_fields_only() {
        let current = ApplicantProfile {
            name: "山田太郎".to_string(),
            desired_location: Some("東京都".to_string()),
            ..Default::default()
        };
        let patch = json!({
            "desired_location": "大阪府",
            "birthdate": "1990-04-01",
            "id": 999,
            "unknown": "ignored"
        });

        let merged = merge_patch(&current, patch.as_object().unwrap()).unwrap();

        assert_eq!(merged.name, "山田太郎");
        assert_eq!(merged.desired_location.as_deref(), Some("大阪府"));
        assert_eq!(merged.birthdate.map(|d| d.to_string()).as_deref(), Some("1990-04-01"));
    }

    #[test]
    fn test_merge_patch_clears_with_empty_date() {
        let current = ApplicantProfile {
            name: "a".to_string(),
            birthdate: chrono::NaiveDate::from_ymd_opt(1990, 1, 1),
            ..Default::default()
        };
        let patch = json!({"birthdate": ""});
        let merged = merge_patch(&current, patch.as_object().unwrap()).unwrap();
        assert!(merged.birthdate.is_none());
    }

    #[test]
    fn test_new_applicant_flattens_profile_and_progress() {
        let body: NewApplicant = serde_json::from_value(json!({
            "name": "佐藤花子",
            "desired_location": "愛知県",
            "application_date": "2024-04-01",
            "employee_id": 2
        }))
        .unwrap();

        assert!(body.validate().is_ok());
        assert_eq!(body.profile.desired_location.as_deref(), Some("愛知県"));
        assert!(body.progress.application_date.is_some());
        assert_eq!(body.assigned_employee_id, Some(json!(2)));

        let unnamed: NewApplicant = serde_json::from_value(json!({"address": "x"})).unwrap();
        assert!(unnamed.validate().is_err());
    }
}
