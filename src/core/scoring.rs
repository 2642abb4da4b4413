use crate::core::filters::{age_matches, location_match, occupation_factor};
use crate::models::{
    JobDetails, LocationMatch, MatchDetail, MatchEvaluation, MatchLevel, ScoringWeights,
};

const UNSET: &str = "未設定";

/// Score one applicant/job pair (0-100) and explain it
///
/// Scoring formula:
/// score = (
///     age_factor * w.age +            # 1 when the age limit is met
///     location_factor * w.location +  # 0, 0.5 or 1
///     occupation_factor * w.occupation
/// ) / (w.age + w.location + w.occupation) * 100
pub fn evaluate_pair(
    age: Option<u32>,
    desired_location: Option<&str>,
    desired_occupation: Option<&str>,
    job: &JobDetails,
    weights: &ScoringWeights,
) -> MatchEvaluation {
    let age_match = age_matches(age, job.age_limit);
    let location = location_match(
        desired_location,
        job.prefecture.as_deref(),
        job.city.as_deref(),
    );

    let age_factor = if age_match { 1.0 } else { 0.0 };
    let location_factor = location_factor(location);
    let occupation = occupation_factor(desired_occupation, job);

    let total_weight = weights.age + weights.location + weights.occupation;
    let score = if total_weight > 0.0 {
        (age_factor * weights.age + location_factor * weights.location + occupation * weights.occupation)
            / total_weight
            * 100.0
    } else {
        0.0
    };

    let match_details = vec![
        MatchDetail {
            factor: "年齢".to_string(),
            applicant_value: age.map(|a| format!("{}歳", a)).unwrap_or_else(|| "不明".to_string()),
            job_value: job
                .age_limit
                .map(|limit| format!("{}歳まで", limit))
                .unwrap_or_else(|| "制限なし".to_string()),
            level: MatchLevel::from_factor(age_factor),
        },
        MatchDetail {
            factor: "勤務地".to_string(),
            applicant_value: display(desired_location),
            job_value: {
                let address = job.work_address();
                if address.is_empty() { UNSET.to_string() } else { address }
            },
            level: MatchLevel::from_factor(location_factor),
        },
        MatchDetail {
            factor: "職種".to_string(),
            applicant_value: display(desired_occupation),
            job_value: job
                .occupation_minor_category
                .as_deref()
                .or(job.occupation_major_category.as_deref())
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(job.title.as_str())
                .to_string(),
            level: MatchLevel::from_factor(occupation),
        },
    ];

    MatchEvaluation {
        score: score.round().clamp(0.0, 100.0) as u8,
        age_match,
        location_match: location,
        match_details,
    }
}

#[inline]
fn location_factor(level: LocationMatch) -> f64 {
    f64::from(level.value()) / 100.0
}

fn display(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNSET)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_job(prefecture: &str, age_limit: Option<i32>) -> JobDetails {
        JobDetails {
            company: "テスト工業".to_string(),
            title: "製造スタッフ".to_string(),
            prefecture: Some(prefecture.to_string()),
            city: Some("豊田市".to_string()),
            age_limit,
            occupation_major_category: Some("製造".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_perfect_match_scores_100() {
        let job = create_test_job("愛知県", Some(45));
        let weights = ScoringWeights::default();

        let result = evaluate_pair(Some(30), Some("愛知県"), Some("製造"), &job, &weights);

        assert_eq!(result.score, 100);
        assert!(result.age_match);
        assert_eq!(result.location_match, LocationMatch::Full);
        assert!(result.match_details.iter().all(|d| d.level == MatchLevel::High));
    }

    #[test]
    fn test_age_mismatch_lowers_score() {
        let job = create_test_job("愛知県", Some(35));
        let weights = ScoringWeights::default();

        let result = evaluate_pair(Some(40), Some("愛知県"), Some("製造"), &job, &weights);

        assert!(!result.age_match);
        assert_eq!(result.score, 60);
        assert_eq!(result.match_details[0].level, MatchLevel::Low);
        assert_eq!(result.match_details[0].applicant_value, "40歳");
        assert_eq!(result.match_details[0].job_value, "35歳まで");
    }

    #[test]
    fn test_score_is_bounded_and_stable() {
        let job = create_test_job("沖縄県", None);
        let weights = ScoringWeights::default();

        let first = evaluate_pair(None, None, None, &job, &weights);
        let second = evaluate_pair(None, None, None, &job, &weights);

        assert!(first.score <= 100);
        assert_eq!(first, second, "same inputs give the same evaluation");
        assert_eq!(first.match_details[1].applicant_value, "未設定");
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let job = create_test_job("愛知県", None);
        let weights = ScoringWeights {
            age: 0.0,
            location: 0.0,
            occupation: 0.0,
        };

        let result = evaluate_pair(Some(30), Some("愛知県"), None, &job, &weights);
        assert_eq!(result.score, 0);
    }
}
