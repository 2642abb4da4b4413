use chrono::{Datelike, NaiveDate};

use crate::models::{JobDetails, LocationMatch};

/// Age in whole years on `today`
///
/// Year difference, minus one if the birthday has not yet occurred this
/// year. A birthdate in the future yields 0.
#[inline]
pub fn calculate_age(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Age predicate: unknown age or no limit always passes
#[inline]
pub fn age_matches(age: Option<u32>, age_limit: Option<i32>) -> bool {
    match (age, age_limit) {
        (Some(age), Some(limit)) => i64::from(age) <= i64::from(limit),
        _ => true,
    }
}

/// Split free text into comparison keywords
///
/// Lowercases, treats `、` `，` `。` as separators, splits on whitespace and
/// drops single-character tokens.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['、', '，', '。'], " ")
        .split_whitespace()
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Compare an applicant's desired location against a job's location
///
/// A job without a prefecture never matches, even when it names a city.
pub fn location_match(
    desired_location: Option<&str>,
    prefecture: Option<&str>,
    city: Option<&str>,
) -> LocationMatch {
    let (Some(desired), Some(prefecture)) = (non_empty(desired_location), non_empty(prefecture))
    else {
        return LocationMatch::None;
    };
    if desired.contains(prefecture) || prefecture.contains(desired) {
        return LocationMatch::Full;
    }

    let desired_lower = desired.to_lowercase();
    let haystacks: Vec<String> = [Some(prefecture), non_empty(city)]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .collect();

    let desired_hits = extract_keywords(desired)
        .iter()
        .any(|keyword| haystacks.iter().any(|h| h.contains(keyword.as_str())));
    let prefecture_hits = extract_keywords(prefecture)
        .iter()
        .any(|keyword| desired_lower.contains(keyword.as_str()));

    if desired_hits || prefecture_hits {
        LocationMatch::Partial
    } else {
        LocationMatch::None
    }
}

/// Occupation factor in `[0, 1]`
///
/// The desired occupation is compared with the job's minor category, major
/// category and title. Containment either way is a full match, a shared
/// keyword a partial one. An applicant without a desired occupation is
/// neutral (0.5).
pub fn occupation_factor(desired_occupation: Option<&str>, job: &JobDetails) -> f64 {
    let Some(desired) = non_empty(desired_occupation) else {
        return 0.5;
    };
    let desired = desired.to_lowercase();

    let candidates: Vec<String> = [
        job.occupation_minor_category.as_deref(),
        job.occupation_major_category.as_deref(),
        Some(job.title.as_str()),
    ]
    .into_iter()
    .filter_map(non_empty)
    .map(str::to_lowercase)
    .collect();

    if candidates.is_empty() {
        return 0.5;
    }

    if candidates
        .iter()
        .any(|c| c.contains(desired.as_str()) || desired.contains(c.as_str()))
    {
        return 1.0;
    }

    let keywords = extract_keywords(&desired);
    if keywords
        .iter()
        .any(|k| candidates.iter().any(|c| c.contains(k.as_str())))
    {
        0.5
    } else {
        0.0
    }
}
