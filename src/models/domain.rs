use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::dates;

/// Personal, preference and background fields of an applicant.
///
/// Everything except `name` is optional free text, as entered by the
/// coordinator on the intake form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct ApplicantProfile {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub address: Option<String>,
    pub desired_occupation: Option<String>,
    pub desired_location: Option<String>,
    #[serde(default, deserialize_with = "dates::lenient_date")]
    pub birthdate: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    pub employment_status: Option<String>,
    pub available_date: Option<String>,
    pub employment_period: Option<String>,
    pub medical_history: Option<String>,
    pub disability_certificate: Option<String>,
    pub tattoo: Option<String>,
    pub tattoo_details: Option<String>,
    pub criminal_record: Option<String>,
    pub clothing_size: Option<String>,
    pub commute_or_dormitory: Option<String>,
    pub commute_method: Option<String>,
    pub commute_area: Option<String>,
    pub factory_experience: Option<String>,
    pub experience_details: Option<String>,
    pub desired_working_hours: Option<String>,
    pub recent_applications: Option<String>,
    pub most_important_point: Option<String>,
    pub important_point_details: Option<String>,
    pub desired_salary: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

/// The ten milestone dates of the recruitment funnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApplicantProgress {
    pub application_date: Option<NaiveDate>,
    pub call_date: Option<NaiveDate>,
    pub connection_date: Option<NaiveDate>,
    pub proposal_date: Option<NaiveDate>,
    pub document_sent_date: Option<NaiveDate>,
    pub document_passed_date: Option<NaiveDate>,
    pub interview_date: Option<NaiveDate>,
    pub offer_date: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
}

impl ApplicantProgress {
    pub fn get(&self, stage: FunnelStage) -> Option<NaiveDate> {
        match stage {
            FunnelStage::Application => self.application_date,
            FunnelStage::Call => self.call_date,
            FunnelStage::Connection => self.connection_date,
            FunnelStage::Proposal => self.proposal_date,
            FunnelStage::DocumentSent => self.document_sent_date,
            FunnelStage::DocumentPassed => self.document_passed_date,
            FunnelStage::Interview => self.interview_date,
            FunnelStage::Offer => self.offer_date,
            FunnelStage::Hire => self.hire_date,
            FunnelStage::Payment => self.payment_date,
        }
    }

    pub fn set(&mut self, stage: FunnelStage, value: Option<NaiveDate>) {
        let slot = match stage {
            FunnelStage::Application => &mut self.application_date,
            FunnelStage::Call => &mut self.call_date,
            FunnelStage::Connection => &mut self.connection_date,
            FunnelStage::Proposal => &mut self.proposal_date,
            FunnelStage::DocumentSent => &mut self.document_sent_date,
            FunnelStage::DocumentPassed => &mut self.document_passed_date,
            FunnelStage::Interview => &mut self.interview_date,
            FunnelStage::Offer => &mut self.offer_date,
            FunnelStage::Hire => &mut self.hire_date,
            FunnelStage::Payment => &mut self.payment_date,
        };
        *slot = value;
    }
}

/// Linear funnel stage, application through payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    Application,
    Call,
    Connection,
    Proposal,
    DocumentSent,
    DocumentPassed,
    Interview,
    Offer,
    Hire,
    Payment,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 10] = [
        FunnelStage::Application,
        FunnelStage::Call,
        FunnelStage::Connection,
        FunnelStage::Proposal,
        FunnelStage::DocumentSent,
        FunnelStage::DocumentPassed,
        FunnelStage::Interview,
        FunnelStage::Offer,
        FunnelStage::Hire,
        FunnelStage::Payment,
    ];

    /// Name of the date column / JSON field carrying this milestone
    pub fn field(self) -> &'static str {
        match self {
            FunnelStage::Application => "application_date",
            FunnelStage::Call => "call_date",
            FunnelStage::Connection => "connection_date",
            FunnelStage::Proposal => "proposal_date",
            FunnelStage::DocumentSent => "document_sent_date",
            FunnelStage::DocumentPassed => "document_passed_date",
            FunnelStage::Interview => "interview_date",
            FunnelStage::Offer => "offer_date",
            FunnelStage::Hire => "hire_date",
            FunnelStage::Payment => "payment_date",
        }
    }
}

/// Stored applicant record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Applicant {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub profile: ApplicantProfile,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub progress: ApplicantProgress,
    pub referral_fee: Option<i64>,
    pub assigned_employee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employer-side fields of a job listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct JobDetails {
    pub job_url: Option<String>,
    pub job_number: Option<String>,
    pub cf_fc: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub salary: Option<String>,
    pub fee: Option<String>,
    pub age_limit: Option<i32>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub working_hours: Option<String>,
    pub employment_type: Option<String>,
    pub holidays: Option<String>,
    #[serde(default)]
    pub dormitory: bool,
    pub housing_cost: Option<String>,
    pub housing_allowance: Option<String>,
    pub work_style: Option<String>,
    pub annual_holidays: Option<String>,
    pub gender: Option<String>,
    pub min_age: Option<i32>,
    pub work_experience: Option<String>,
    pub occupation_experience: Option<String>,
    #[serde(default)]
    pub japanese_required: bool,
    pub commute_method: Option<String>,
    pub nearest_station: Option<String>,
    pub salary_type: Option<String>,
    pub hourly_wage: Option<i32>,
    pub shift: Option<String>,
    pub products: Option<String>,
    pub occupation_major_category: Option<String>,
    pub occupation_minor_category: Option<String>,
    pub advantages: Option<String>,
    pub smoking_measures: Option<String>,
}

impl JobDetails {
    /// Prefecture and city joined, as used for travel-time destinations
    pub fn work_address(&self) -> String {
        format!(
            "{}{}",
            self.prefecture.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or("")
        )
    }
}

/// Stored job listing
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: JobDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct EmployeeDetails {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "dates::lenient_date")]
    pub hire_date: Option<NaiveDate>,
}

/// Agency staff member
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: EmployeeDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl Default for InterviewStatus {
    fn default() -> Self {
        InterviewStatus::Scheduled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "interview_result", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InterviewResult {
    Passed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct InterviewDetails {
    #[validate(range(min = 1, message = "applicant_id is required"))]
    pub applicant_id: i64,
    #[validate(range(min = 1, message = "job_id is required"))]
    pub job_id: i64,
    #[serde(deserialize_with = "dates::lenient_timestamp")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub status: InterviewStatus,
    pub result: Option<InterviewResult>,
    pub notes: Option<String>,
    pub preparation_info: Option<String>,
}

/// Interview between an applicant and a job's employer
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interview {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: InterviewDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "call_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Scheduled,
    Completed,
    NoAnswer,
    Cancelled,
}

impl Default for CallStatus {
    fn default() -> Self {
        CallStatus::Scheduled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, sqlx::FromRow)]
pub struct PhoneCallDetails {
    #[validate(range(min = 1, message = "applicant_id is required"))]
    pub applicant_id: i64,
    pub employee_id: Option<i64>,
    #[serde(default = "Utc::now", deserialize_with = "dates::lenient_timestamp")]
    pub call_date: DateTime<Utc>,
    #[serde(default)]
    pub status: CallStatus,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "dates::lenient_optional_timestamp")]
    pub follow_up_date: Option<DateTime<Utc>>,
}

/// Phone call made (or planned) to an applicant
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PhoneCall {
    pub id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub details: PhoneCallDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhoneCall {
    /// A completed call is a connection with the applicant
    pub fn is_connection(&self) -> bool {
        self.details.status == CallStatus::Completed
    }
}

/// How well the applicant's desired location covers the job location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LocationMatch {
    None,
    Partial,
    Full,
}

impl LocationMatch {
    pub fn value(self) -> u8 {
        match self {
            LocationMatch::None => 0,
            LocationMatch::Partial => 50,
            LocationMatch::Full => 100,
        }
    }
}

impl From<LocationMatch> for u8 {
    fn from(value: LocationMatch) -> Self {
        value.value()
    }
}

impl TryFrom<u8> for LocationMatch {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(LocationMatch::None),
            50 => Ok(LocationMatch::Partial),
            100 => Ok(LocationMatch::Full),
            other => Err(format!("invalid location match level: {}", other)),
        }
    }
}

/// Displayed agreement level of a single match factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    #[serde(rename = "高")]
    High,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "低")]
    Low,
}

impl MatchLevel {
    pub fn from_factor(factor: f64) -> Self {
        if factor >= 0.8 {
            MatchLevel::High
        } else if factor >= 0.5 {
            MatchLevel::Medium
        } else {
            MatchLevel::Low
        }
    }
}

/// One row of the match breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub factor: String,
    pub applicant_value: String,
    pub job_value: String,
    pub level: MatchLevel,
}

/// Score and breakdown for one applicant/job pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    pub score: u8,
    pub age_match: bool,
    pub location_match: LocationMatch,
    pub match_details: Vec<MatchDetail>,
}

/// Scoring weights
///
/// Relative, not required to sum to one; the score is the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub age: f64,
    pub location: f64,
    pub occupation: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            age: 0.40,
            location: 0.40,
            occupation: 0.20,
        }
    }
}

/// Travel mode understood by the distance matrix upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Transit,
    Bicycling,
    Walking,
}

impl Default for TravelMode {
    fn default() -> Self {
        TravelMode::Driving
    }
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Walking => "walking",
        }
    }

    /// Derive a travel mode from the applicant's free-text commute method
    pub fn from_commute_method(method: Option<&str>) -> Self {
        let Some(method) = method else {
            return TravelMode::Driving;
        };
        let lower = method.to_lowercase();
        if ["電車", "バス", "公共", "train", "bus", "public"]
            .iter()
            .any(|k| lower.contains(k))
        {
            TravelMode::Transit
        } else if lower.contains("自転車") || lower.contains("bicycle") {
            TravelMode::Bicycling
        } else if lower.contains("徒歩") || lower.contains("walk") {
            TravelMode::Walking
        } else {
            // 車, 自動車, バイク and anything unrecognised
            TravelMode::Driving
        }
    }
}

/// Travel distance/duration between an origin and one destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub distance_m: Option<u64>,
    pub duration_s: Option<u64>,
    pub distance_text: String,
    pub duration_text: String,
}

impl TravelEstimate {
    pub const UNAVAILABLE_TEXT: &'static str = "計算不能";

    /// Placeholder for a destination the upstream could not route
    pub fn unavailable() -> Self {
        Self {
            distance_m: None,
            duration_s: None,
            distance_text: Self::UNAVAILABLE_TEXT.to_string(),
            duration_text: Self::UNAVAILABLE_TEXT.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.duration_s.is_some()
    }
}
