// Core algorithm exports
pub mod filters;
pub mod import;
pub mod kpi;
pub mod matcher;
pub mod progress;
pub mod ranking;
pub mod scoring;

pub use filters::{age_matches, calculate_age, extract_keywords, location_match, occupation_factor};
pub use kpi::{company_kpi, employee_kpi, interview_statistics, top_performers, Timeframe};
pub use matcher::{MatchResult, Matcher};
pub use ranking::{ApplicantSort, JobSort};
pub use scoring::evaluate_pair;
