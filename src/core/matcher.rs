use chrono::NaiveDate;

use crate::core::{
    filters::calculate_age,
    ranking::{sort_applicant_matches, sort_job_matches, ApplicantSort, JobSort},
    scoring::evaluate_pair,
};
use crate::models::{Applicant, ApplicantMatch, ApplicantView, Job, JobMatch, ScoringWeights};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult<T> {
    pub matches: Vec<T>,
    pub total_candidates: usize,
}

/// Matching orchestrator
///
/// # Pipeline Stages
/// 1. Derive the applicant's age for `today`
/// 2. Evaluate every pair (age, location, occupation)
/// 3. Rank with the requested sort policy
///
/// Every candidate is returned; ranking never drops entries.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank jobs for one applicant
    ///
    /// `JobSort::Distance` needs travel estimates attached to the matches;
    /// until they are, every duration is unknown and the input order stays.
    pub fn match_jobs(
        &self,
        applicant: &Applicant,
        jobs: Vec<Job>,
        sort: JobSort,
        today: NaiveDate,
    ) -> MatchResult<JobMatch> {
        let total_candidates = jobs.len();
        let age = applicant
            .profile
            .birthdate
            .map(|birthdate| calculate_age(birthdate, today));

        let mut matches: Vec<JobMatch> = jobs
            .into_iter()
            .map(|job| {
                let evaluation = evaluate_pair(
                    age,
                    applicant.profile.desired_location.as_deref(),
                    applicant.profile.desired_occupation.as_deref(),
                    &job.details,
                    &self.weights,
                );
                JobMatch {
                    job,
                    evaluation,
                    applicant_age: age,
                    travel: None,
                }
            })
            .collect();

        sort_job_matches(&mut matches, sort);

        MatchResult {
            matches,
            total_candidates,
        }
    }

    /// Rank applicants for one job
    pub fn match_applicants(
        &self,
        job: &Job,
        applicants: Vec<Applicant>,
        sort: ApplicantSort,
        today: NaiveDate,
    ) -> MatchResult<ApplicantMatch> {
        let total_candidates = applicants.len();

        let mut matches: Vec<ApplicantMatch> = applicants
            .into_iter()
            .map(|applicant| {
                let view = ApplicantView::new(applicant, today);
                let evaluation = evaluate_pair(
                    view.age,
                    view.applicant.profile.desired_location.as_deref(),
                    view.applicant.profile.desired_occupation.as_deref(),
                    &job.details,
                    &self.weights,
                );
                ApplicantMatch {
                    age: view.age,
                    applicant: view,
                    evaluation,
                }
            })
            .collect();

        sort_applicant_matches(&mut matches, sort);

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}
