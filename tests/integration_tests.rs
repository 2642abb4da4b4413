// Integration tests for Recruit Desk

use chrono::{NaiveDate, TimeZone, Utc};
use recruit_desk::core::kpi::{
    company_kpi, employee_kpi, interview_statistics, top_performers, Timeframe,
};
use recruit_desk::core::ranking::{ApplicantSort, JobSort};
use recruit_desk::core::Matcher;
use recruit_desk::models::{
    Applicant, ApplicantProfile, ApplicantProgress, CallStatus, Employee, EmployeeDetails,
    Interview, InterviewDetails, InterviewResult, InterviewStatus, Job, JobDetails, LocationMatch,
    PhoneCall, PhoneCallDetails,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2024, 6, 15)
}

fn create_test_job(id: i64, prefecture: &str, age_limit: Option<i32>) -> Job {
    Job {
        id,
        details: JobDetails {
            company: format!("会社{}", id),
            title: "製造スタッフ".to_string(),
            prefecture: Some(prefecture.to_string()),
            city: Some("中央区".to_string()),
            age_limit,
            ..Default::default()
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_test_applicant(id: i64, birthdate: Option<NaiveDate>, location: &str) -> Applicant {
    Applicant {
        id,
        profile: ApplicantProfile {
            name: format!("応募者{}", id),
            birthdate,
            desired_location: Some(location.to_string()),
            desired_occupation: Some("製造".to_string()),
            ..Default::default()
        },
        progress: ApplicantProgress::default(),
        referral_fee: None,
        assigned_employee_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_test_employee(id: i64, name: &str, department: Option<&str>) -> Employee {
    Employee {
        id,
        details: EmployeeDetails {
            name: name.to_string(),
            department: department.map(str::to_string),
            ..Default::default()
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_test_call(id: i64, applicant_id: i64, employee_id: i64, day: u32, status: CallStatus) -> PhoneCall {
    PhoneCall {
        id,
        details: PhoneCallDetails {
            applicant_id,
            employee_id: Some(employee_id),
            call_date: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
            status,
            notes: None,
            follow_up_date: None,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_integration_age_limit_sort_is_stable() {
    let matcher = Matcher::with_default_weights();
    // 34 on 2024-06-15
    let applicant = create_test_applicant(1, Some(date(1990, 1, 1)), "東京都");

    let jobs = vec![
        create_test_job(1, "東京都", None),
        create_test_job(2, "東京都", Some(30)),
        create_test_job(3, "大阪府", Some(40)),
        create_test_job(4, "東京都", Some(35)),
        create_test_job(5, "福岡県", None),
        create_test_job(6, "東京都", Some(35)),
    ];

    let result = matcher.match_jobs(&applicant, jobs, JobSort::AgeLimit, today());
    let order: Vec<i64> = result.matches.iter().map(|m| m.job.id).collect();

    assert_eq!(result.total_candidates, 6);
    assert_eq!(order, vec![4, 6, 3, 1, 5, 2]);
    assert!(result.matches[..5].iter().all(|m| m.evaluation.age_match));
    assert!(!result.matches[5].evaluation.age_match);
    assert!(result.matches.iter().all(|m| m.applicant_age == Some(34)));
}

#[test]
fn test_integration_location_and_score_sorts() {
    let matcher = Matcher::with_default_weights();
    let applicant = create_test_applicant(1, Some(date(1995, 3, 3)), "東京都");
    let jobs = vec![
        create_test_job(1, "大阪府", None),
        create_test_job(2, "東京都", None),
        create_test_job(3, "大阪府", None),
    ];

    let by_location = matcher.match_jobs(&applicant, jobs.clone(), JobSort::Location, today());
    assert_eq!(by_location.matches[0].job.id, 2);
    assert_eq!(by_location.matches[0].evaluation.location_match, LocationMatch::Full);
    assert_eq!(by_location.matches[1].job.id, 1);
    assert_eq!(by_location.matches[2].job.id, 3);

    let by_score = matcher.match_jobs(&applicant, jobs, JobSort::Score, today());
    let scores: Vec<u8> = by_score.matches.iter().map(|m| m.evaluation.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_integration_distance_sort_without_travel_keeps_order() {
    let matcher = Matcher::with_default_weights();
    let applicant = create_test_applicant(1, None, "東京都");
    let jobs = vec![
        create_test_job(7, "大阪府", Some(20)),
        create_test_job(3, "東京都", None),
    ];

    let result = matcher.match_jobs(&applicant, jobs, JobSort::Distance, today());
    let order: Vec<i64> = result.matches.iter().map(|m| m.job.id).collect();
    assert_eq!(order, vec![7, 3]);
    assert!(result.matches.iter().all(|m| m.travel.is_none()));
}

#[test]
fn test_integration_applicants_for_job_by_age() {
    let matcher = Matcher::with_default_weights();
    let job = create_test_job(1, "愛知県", Some(40));
    let applicants = vec![
        create_test_applicant(1, None, "愛知県"),
        create_test_applicant(2, Some(date(1980, 1, 1)), "愛知県"),
        create_test_applicant(3, Some(date(2000, 1, 1)), "岐阜県"),
    ];

    let result = matcher.match_applicants(&job, applicants, ApplicantSort::Age, today());
    let order: Vec<i64> = result.matches.iter().map(|m| m.applicant.applicant.id).collect();

    assert_eq!(order, vec![3, 2, 1]);
    assert_eq!(result.matches[0].age, Some(24));
    assert!(!result.matches[1].evaluation.age_match);
    assert!(result.matches[2].evaluation.age_match);
}

#[test]
fn test_integration_employee_kpi_scope() {
    let employee = create_test_employee(10, "田中", Some("営業一課"));

    let mut assigned = create_test_applicant(1, None, "東京都");
    assigned.assigned_employee_id = Some(10);
    assigned.progress.proposal_date = Some(date(2024, 6, 3));
    assigned.progress.hire_date = Some(date(2024, 6, 10));
    assigned.progress.payment_date = Some(date(2024, 6, 12));
    assigned.referral_fee = Some(250_000);

    let phoned = create_test_applicant(2, None, "東京都");
    let unrelated = create_test_applicant(3, None, "東京都");

    let calls = vec![
        create_test_call(1, 1, 10, 1, CallStatus::Completed),
        create_test_call(2, 2, 10, 2, CallStatus::NoAnswer),
        create_test_call(3, 3, 99, 2, CallStatus::Completed),
    ];
    let applicants = vec![assigned, phoned, unrelated];

    let report = employee_kpi(&employee, &applicants, &calls, Timeframe::Month, today());

    assert_eq!(report.summary.total_applicants, 2);
    assert_eq!(report.summary.total_calls, 2);
    assert_eq!(report.summary.total_connections, 1);
    assert_eq!(report.summary.total_hires, 1);
    assert_eq!(report.summary.total_revenue, 250_000);
    assert_eq!(report.conversion_rates.call_to_connection, 50.0);
    assert_eq!(report.conversion_rates.hire_to_payment, 100.0);

    let labels: Vec<&str> = report.monthly_progress.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(labels, vec!["2024/03", "2024/04", "2024/05", "2024/06"]);
    assert_eq!(report.monthly_progress[3].counts.calls, 2);

    let waiting_connection = report
        .pipeline_distribution
        .iter()
        .find(|b| b.name == "接続待ち")
        .map(|b| b.value);
    assert_eq!(waiting_connection, Some(1));
}

#[test]
fn test_integration_company_kpi_departments_and_quarters() {
    let employees = vec![
        create_test_employee(1, "佐藤", Some("営業部")),
        create_test_employee(2, "鈴木", None),
    ];

    let mut hired = create_test_applicant(1, None, "東京都");
    hired.assigned_employee_id = Some(1);
    hired.progress.application_date = Some(date(2024, 4, 1));
    hired.progress.hire_date = Some(date(2024, 5, 1));
    hired.progress.payment_date = Some(date(2024, 6, 1));
    hired.referral_fee = Some(300_000);

    let mut early = create_test_applicant(2, None, "東京都");
    early.assigned_employee_id = Some(2);
    early.progress.application_date = Some(date(2024, 1, 10));
    early.progress.hire_date = Some(date(2024, 2, 9));

    let applicants = vec![hired, early];
    let report = company_kpi(&applicants, &[], &employees, Timeframe::Year, &[3, 3], today());

    assert_eq!(report.summary.total_hires, 2);
    assert_eq!(report.summary.conversion_rate, Some(100.0));
    assert_eq!(report.summary.average_time_to_hire, Some(30.0));

    let departments: Vec<&str> = report
        .department_performance
        .iter()
        .map(|d| d.department.as_str())
        .collect();
    assert_eq!(departments, vec!["営業部", "未分類"]);
    assert_eq!(report.department_performance[0].revenue, 300_000);
    assert_eq!(report.department_performance[1].hires, 1);

    assert_eq!(report.quarterly_performance.len(), 4);
    assert_eq!(report.quarterly_performance[0].actual, 1);
    assert_eq!(report.quarterly_performance[1].actual, 1);
    assert_eq!(report.quarterly_performance[1].target, 3);
    assert_eq!(report.quarterly_performance[3].target, 0);
}

#[test]
fn test_integration_top_performers_by_revenue() {
    let employees = vec![
        create_test_employee(1, "A", None),
        create_test_employee(2, "B", None),
        create_test_employee(3, "C", None),
    ];
    let mut paid_low = create_test_applicant(1, None, "東京都");
    paid_low.assigned_employee_id = Some(1);
    paid_low.progress.payment_date = Some(date(2024, 6, 5));
    paid_low.referral_fee = Some(100_000);

    let mut paid_high = create_test_applicant(2, None, "東京都");
    paid_high.assigned_employee_id = Some(3);
    paid_high.progress.payment_date = Some(date(2024, 6, 6));
    paid_high.referral_fee = Some(400_000);

    let performers = top_performers(
        &employees,
        &[paid_low, paid_high],
        &[],
        Timeframe::Month,
        today(),
        2,
    );

    let names: Vec<&str> = performers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["C", "A"]);
}

#[test]
fn test_integration_interview_statistics() {
    let interview = |id: i64, result: Option<InterviewResult>| Interview {
        id,
        details: InterviewDetails {
            applicant_id: 1,
            job_id: 1,
            date: Utc::now(),
            status: InterviewStatus::Completed,
            result,
            notes: None,
            preparation_info: None,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let stats = interview_statistics(&[
        interview(1, Some(InterviewResult::Passed)),
        interview(2, Some(InterviewResult::Passed)),
        interview(3, Some(InterviewResult::Failed)),
        interview(4, None),
    ]);

    assert_eq!(stats.total_interviews, 4);
    assert_eq!(stats.passed, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pass_rate, 50.0);

    assert_eq!(interview_statistics(&[]).pass_rate, 0.0);
}
