// Criterion benchmarks for Recruit Desk

use chrono::{NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use recruit_desk::core::kpi::{company_kpi, Timeframe};
use recruit_desk::core::ranking::{ApplicantSort, JobSort};
use recruit_desk::core::{evaluate_pair, location_match, Matcher};
use recruit_desk::models::{
    Applicant, ApplicantProfile, ApplicantProgress, CallStatus, Job, JobDetails, PhoneCall,
    PhoneCallDetails, ScoringWeights,
};

const PREFECTURES: [&str; 5] = ["東京都", "大阪府", "愛知県", "福岡県", "静岡県"];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap_or_default()
}

fn create_job(id: usize) -> Job {
    Job {
        id: id as i64,
        details: JobDetails {
            company: format!("株式会社{}", id),
            title: if id % 2 == 0 { "製造スタッフ" } else { "倉庫内軽作業" }.to_string(),
            prefecture: Some(PREFECTURES[id % PREFECTURES.len()].to_string()),
            city: Some(format!("第{}市", id % 7)),
            age_limit: (id % 3 != 0).then_some(30 + (id % 25) as i32),
            occupation_major_category: Some("製造".to_string()),
            ..Default::default()
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_applicant(id: usize) -> Applicant {
    let day = |offset: i64| today().checked_sub_signed(chrono::Duration::days(offset));
    Applicant {
        id: id as i64,
        profile: ApplicantProfile {
            name: format!("応募者{}", id),
            desired_location: Some(PREFECTURES[id % PREFECTURES.len()].to_string()),
            desired_occupation: Some("製造 組立".to_string()),
            birthdate: NaiveDate::from_ymd_opt(1970 + (id % 35) as i32, 1 + (id % 12) as u32, 1),
            ..Default::default()
        },
        progress: ApplicantProgress {
            application_date: day(90),
            call_date: day(80),
            connection_date: (id % 2 == 0).then(|| day(70)).flatten(),
            interview_date: (id % 4 == 0).then(|| day(40)).flatten(),
            hire_date: (id % 8 == 0).then(|| day(10)).flatten(),
            ..Default::default()
        },
        referral_fee: (id % 8 == 0).then_some(300_000),
        assigned_employee_id: Some((id % 10) as i64 + 1),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_call(id: usize) -> PhoneCall {
    PhoneCall {
        id: id as i64,
        details: PhoneCallDetails {
            applicant_id: id as i64,
            employee_id: Some((id % 10) as i64 + 1),
            call_date: Utc.with_ymd_and_hms(2024, 6, 1 + (id % 14) as u32, 10, 0, 0).unwrap(),
            status: if id % 3 == 0 { CallStatus::NoAnswer } else { CallStatus::Completed },
            notes: None,
            follow_up_date: None,
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bench_location_match(c: &mut Criterion) {
    c.bench_function("location_match", |b| {
        b.iter(|| {
            location_match(
                black_box(Some("愛知県 名古屋市 豊田市")),
                black_box(Some("愛知県")),
                black_box(Some("豊田市")),
            )
        });
    });
}

fn bench_evaluate_pair(c: &mut Criterion) {
    let job = create_job(1);
    let weights = ScoringWeights::default();

    c.bench_function("evaluate_pair", |b| {
        b.iter(|| {
            evaluate_pair(
                black_box(Some(32)),
                black_box(Some("愛知県")),
                black_box(Some("製造")),
                black_box(&job.details),
                &weights,
            )
        });
    });
}

fn bench_matching(c: &mut Criterion) {
    let matcher = Matcher::with_default_weights();
    let applicant = create_applicant(3);

    let mut group = c.benchmark_group("matching");

    for job_count in [10, 100, 1000, 5000].iter() {
        let jobs: Vec<Job> = (0..*job_count).map(create_job).collect();

        group.bench_with_input(BenchmarkId::new("match_jobs", job_count), job_count, |b, _| {
            b.iter(|| {
                matcher.match_jobs(
                    black_box(&applicant),
                    black_box(jobs.clone()),
                    JobSort::AgeLimit,
                    today(),
                )
            });
        });

        let applicants: Vec<Applicant> = (0..*job_count).map(create_applicant).collect();
        let job = create_job(2);
        group.bench_with_input(
            BenchmarkId::new("match_applicants", job_count),
            job_count,
            |b, _| {
                b.iter(|| {
                    matcher.match_applicants(
                        black_box(&job),
                        black_box(applicants.clone()),
                        ApplicantSort::Score,
                        today(),
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_company_kpi(c: &mut Criterion) {
    let applicants: Vec<Applicant> = (0..2000).map(create_applicant).collect();
    let calls: Vec<PhoneCall> = (0..4000).map(create_call).collect();

    c.bench_function("company_kpi_2000_applicants", |b| {
        b.iter(|| {
            company_kpi(
                black_box(&applicants),
                black_box(&calls),
                &[],
                Timeframe::Quarter,
                &[30, 30, 30, 30],
                today(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_location_match,
    bench_evaluate_pair,
    bench_matching,
    bench_company_kpi
);

criterion_main!(benches);
