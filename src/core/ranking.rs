use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::models::{ApplicantMatch, JobMatch};

/// Sort policy for jobs ranked for one applicant
///
/// Unknown query values fall back to `AgeLimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum JobSort {
    /// Compliant first, then jobs with a limit, lower limits first
    #[default]
    AgeLimit,
    Location,
    /// Travel duration ascending, unknown last
    Distance,
    Score,
}

/// Sort policy for applicants ranked for one job
///
/// Unknown query values fall back to `Age`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ApplicantSort {
    /// Known ages first, youngest first
    #[default]
    Age,
    Location,
    Score,
}

impl From<String> for JobSort {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "location" => JobSort::Location,
            "distance" => JobSort::Distance,
            "score" => JobSort::Score,
            _ => JobSort::AgeLimit,
        }
    }
}

impl From<String> for ApplicantSort {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "location" => ApplicantSort::Location,
            "score" => ApplicantSort::Score,
            _ => ApplicantSort::Age,
        }
    }
}

/// Stable in-place sort of job matches
pub fn sort_job_matches(matches: &mut [JobMatch], sort: JobSort) {
    match sort {
        JobSort::AgeLimit => matches.sort_by_key(|m| {
            (
                !m.evaluation.age_match,
                m.job.details.age_limit.is_none(),
                m.job.details.age_limit.unwrap_or(i32::MAX),
            )
        }),
        JobSort::Location => matches.sort_by_key(|m| Reverse(m.evaluation.location_match)),
        JobSort::Distance => {
            matches.sort_by_key(|m| (m.duration_s().is_none(), m.duration_s().unwrap_or(0)))
        }
        JobSort::Score => matches.sort_by_key(|m| Reverse(m.evaluation.score)),
    }
}

/// Stable in-place sort of applicant matches
pub fn sort_applicant_matches(matches: &mut [ApplicantMatch], sort: ApplicantSort) {
    match sort {
        ApplicantSort::Age => {
            matches.sort_by_key(|m| (m.age.is_none(), m.age.unwrap_or(u32::MAX)))
        }
        ApplicantSort::Location => {
            matches.sort_by_key(|m| Reverse(m.evaluation.location_match))
        }
        ApplicantSort::Score => matches.sort_by_key(|m| Reverse(m.evaluation.score)),
    }
}
