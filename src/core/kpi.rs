use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Applicant, Employee, Interview, InterviewResult, PhoneCall};

/// Reporting window for KPI endpoints
///
/// Unknown query values fall back to `Month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Timeframe {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl From<String> for Timeframe {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "week" => Timeframe::Week,
            "quarter" => Timeframe::Quarter,
            "year" => Timeframe::Year,
            _ => Timeframe::Month,
        }
    }
}

/// Labelled closed date range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    first_of_month(next_year, next_month) - Duration::days(1)
}

fn quarter_index(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3
}

impl Timeframe {
    /// First day counted by this frame
    pub fn start(self, today: NaiveDate) -> NaiveDate {
        match self {
            Timeframe::Week => today - Duration::days(7),
            Timeframe::Month => first_of_month(today.year(), today.month()),
            Timeframe::Quarter => first_of_month(today.year(), quarter_index(today) * 3 + 1),
            Timeframe::Year => first_of_month(today.year(), 1),
        }
    }

    /// The four most recent periods of this frame's unit, oldest first
    pub fn trailing_periods(self, today: NaiveDate) -> Vec<Period> {
        (0..4i32)
            .rev()
            .map(|i| match self {
                Timeframe::Week => {
                    let start = today - Duration::days(i64::from(i + 1) * 7);
                    let end = today - Duration::days(i64::from(i) * 7);
                    Period {
                        label: format!("{}~{}", start.format("%m/%d"), end.format("%m/%d")),
                        start,
                        end,
                    }
                }
                Timeframe::Month => {
                    let months = today.year() * 12 + today.month0() as i32 - i;
                    let (year, month) = (months.div_euclid(12), months.rem_euclid(12) as u32 + 1);
                    let start = first_of_month(year, month);
                    Period {
                        label: start.format("%Y/%m").to_string(),
                        start,
                        end: last_of_month(year, month),
                    }
                }
                Timeframe::Quarter => {
                    let quarters = today.year() * 4 + quarter_index(today) as i32 - i;
                    let (year, quarter) = (quarters.div_euclid(4), quarters.rem_euclid(4) as u32);
                    Period {
                        label: format!("Q{}/{}", quarter + 1, year),
                        start: first_of_month(year, quarter * 3 + 1),
                        end: last_of_month(year, quarter * 3 + 3),
                    }
                }
                Timeframe::Year => {
                    let year = today.year() - i;
                    Period {
                        label: format!("{}年", year),
                        start: first_of_month(year, 1),
                        end: last_of_month(year, 12),
                    }
                }
            })
            .collect()
    }
}

const PIPELINE_BUCKETS: [&str; 9] = [
    "架電待ち",
    "接続待ち",
    "提案済み",
    "書類送付済み",
    "選考通過",
    "面接調整中",
    "内定待ち",
    "入社待ち",
    "入金待ち",
];

/// Applicants and calls an aggregation runs over
///
/// `calls` are the calls attributed to the scope (counted as activity);
/// `calls_by_applicant` holds every call of every scoped applicant, sorted
/// by date, for pipeline and stage-timing questions.
pub struct Scope<'a> {
    applicants: Vec<&'a Applicant>,
    calls: Vec<&'a PhoneCall>,
    calls_by_applicant: HashMap<i64, Vec<&'a PhoneCall>>,
}

impl<'a> Scope<'a> {
    pub fn company(applicants: &'a [Applicant], calls: &'a [PhoneCall]) -> Self {
        Self::build(applicants.iter().collect(), calls.iter().collect(), calls)
    }

    /// Applicants assigned to or phoned by any of `employee_ids`
    pub fn employees(
        employee_ids: &[i64],
        applicants: &'a [Applicant],
        calls: &'a [PhoneCall],
    ) -> Self {
        let ids: HashSet<i64> = employee_ids.iter().copied().collect();
        let own_calls: Vec<&PhoneCall> = calls
            .iter()
            .filter(|c| c.details.employee_id.is_some_and(|e| ids.contains(&e)))
            .collect();
        let phoned: HashSet<i64> = own_calls.iter().map(|c| c.details.applicant_id).collect();
        let scoped = applicants
            .iter()
            .filter(|a| {
                phoned.contains(&a.id)
                    || a.assigned_employee_id.is_some_and(|e| ids.contains(&e))
            })
            .collect();
        Self::build(scoped, own_calls, calls)
    }

    fn build(
        applicants: Vec<&'a Applicant>,
        calls: Vec<&'a PhoneCall>,
        all_calls: &'a [PhoneCall],
    ) -> Self {
        let ids: HashSet<i64> = applicants.iter().map(|a| a.id).collect();
        let mut calls_by_applicant: HashMap<i64, Vec<&PhoneCall>> = HashMap::new();
        for call in all_calls.iter().filter(|c| ids.contains(&c.details.applicant_id)) {
            calls_by_applicant
                .entry(call.details.applicant_id)
                .or_default()
                .push(call);
        }
        for list in calls_by_applicant.values_mut() {
            list.sort_by_key(|c| c.details.call_date);
        }
        Self {
            applicants,
            calls,
            calls_by_applicant,
        }
    }

    pub fn applicant_count(&self) -> usize {
        self.applicants.len()
    }

    /// Funnel counters for milestones dated within `[start, end]`
    pub fn counts(&self, start: NaiveDate, end: Option<NaiveDate>) -> FunnelCounts {
        let in_range = |date: Option<NaiveDate>| {
            date.is_some_and(|d| d >= start && end.map_or(true, |end| d <= end))
        };
        let stage = |pick: fn(&Applicant) -> Option<NaiveDate>| {
            self.applicants
                .iter()
                .copied()
                .filter(|a| in_range(pick(a)))
                .count() as u64
        };

        let period_calls: Vec<&&PhoneCall> = self
            .calls
            .iter()
            .filter(|c| in_range(Some(c.details.call_date.date_naive())))
            .collect();

        FunnelCounts {
            calls: period_calls.len() as u64,
            connections: period_calls.iter().filter(|c| c.is_connection()).count() as u64,
            proposals: stage(|a| a.progress.proposal_date),
            documents: stage(|a| a.progress.document_sent_date),
            passes: stage(|a| a.progress.document_passed_date),
            interviews: stage(|a| a.progress.interview_date),
            offers: stage(|a| a.progress.offer_date),
            hires: stage(|a| a.progress.hire_date),
            payments: stage(|a| a.progress.payment_date),
            revenue: self
                .applicants
                .iter()
                .filter(|a| in_range(a.progress.payment_date))
                .map(|a| a.referral_fee.unwrap_or(0))
                .sum(),
        }
    }

    /// Where each applicant currently sits in the funnel
    pub fn pipeline(&self, today: NaiveDate) -> Vec<NamedValue> {
        let mut buckets = [0u64; PIPELINE_BUCKETS.len()];
        for applicant in self.applicants.iter().copied() {
            let calls = self
                .calls_by_applicant
                .get(&applicant.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let p = &applicant.progress;
            let unpaid_hire = p.payment_date.is_none();
            let flags = [
                calls.is_empty(),
                calls.iter().any(|c| !c.is_connection()),
                p.proposal_date.is_some() && p.document_sent_date.is_none(),
                p.document_sent_date.is_some() && p.document_passed_date.is_none(),
                p.document_passed_date.is_some() && p.interview_date.is_none(),
                p.interview_date.is_some() && p.offer_date.is_none(),
                p.offer_date.is_some() && p.hire_date.is_none(),
                unpaid_hire && p.hire_date.is_some_and(|hire| hire > today),
                unpaid_hire && p.hire_date.is_some_and(|hire| hire <= today),
            ];
            for (bucket, hit) in buckets.iter_mut().zip(flags) {
                if hit {
                    *bucket += 1;
                }
            }
        }
        PIPELINE_BUCKETS
            .iter()
            .zip(buckets)
            .map(|(name, value)| NamedValue::new(name, value))
            .collect()
    }

    /// Average days between consecutive stages, strictly increasing pairs only
    pub fn time_between_stages(&self) -> Vec<StageInterval> {
        let first_call = |a: &Applicant| {
            self.calls_by_applicant
                .get(&a.id)
                .and_then(|calls| calls.first())
                .map(|c| c.details.call_date)
        };
        let first_connection = |a: &Applicant| {
            self.calls_by_applicant
                .get(&a.id)
                .and_then(|calls| calls.iter().find(|c| c.is_connection()))
                .map(|c| c.details.call_date)
        };

        let call_to_connection: Vec<i64> = self
            .applicants
            .iter()
            .copied()
            .filter_map(|a| match (first_call(a), first_connection(a)) {
                (Some(call), Some(connection)) if call < connection => {
                    Some((connection - call).num_days())
                }
                _ => None,
            })
            .collect();

        let connection_to_proposal: Vec<i64> = self
            .applicants
            .iter()
            .copied()
            .filter_map(|a| {
                let connection = first_connection(a)?.date_naive();
                let proposal = a.progress.proposal_date?;
                (connection < proposal).then(|| (proposal - connection).num_days())
            })
            .collect();

        let mut intervals = vec![
            StageInterval::new("架電→接続", average(&call_to_connection)),
            StageInterval::new("接続→提案", average(&connection_to_proposal)),
        ];

        let pairs: [(&'static str, fn(&Applicant) -> (Option<NaiveDate>, Option<NaiveDate>)); 6] = [
            ("提案→書類送付", |a| (a.progress.proposal_date, a.progress.document_sent_date)),
            ("書類送付→通過", |a| (a.progress.document_sent_date, a.progress.document_passed_date)),
            ("通過→面接", |a| (a.progress.document_passed_date, a.progress.interview_date)),
            ("面接→内定", |a| (a.progress.interview_date, a.progress.offer_date)),
            ("内定→入社", |a| (a.progress.offer_date, a.progress.hire_date)),
            ("入社→入金", |a| (a.progress.hire_date, a.progress.payment_date)),
        ];
        for (name, pick) in pairs {
            let days: Vec<i64> = self
                .applicants
                .iter()
                .copied()
                .filter_map(|a| days_between(pick(a)))
                .collect();
            intervals.push(StageInterval::new(name, average(&days)));
        }
        intervals
    }

    /// Mean application → hire days
    pub fn average_time_to_hire(&self) -> f64 {
        let days: Vec<i64> = self
            .applicants
            .iter()
            .copied()
            .filter_map(|a| days_between((a.progress.application_date, a.progress.hire_date)))
            .collect();
        average(&days)
    }
}

fn days_between(pair: (Option<NaiveDate>, Option<NaiveDate>)) -> Option<i64> {
    match pair {
        (Some(from), Some(to)) if from < to => Some((to - from).num_days()),
        _ => None,
    }
}

fn average(values: &[i64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<i64>() as f64 / values.len() as f64
    }
}

fn rate(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Counters for one window; also the shape of a `monthlyProgress` entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounts {
    pub calls: u64,
    pub connections: u64,
    pub proposals: u64,
    pub documents: u64,
    pub passes: u64,
    pub interviews: u64,
    pub offers: u64,
    pub hires: u64,
    pub payments: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_applicants: u64,
    pub total_calls: u64,
    pub total_connections: u64,
    pub total_proposals: u64,
    pub total_documents_sent: u64,
    pub total_documents_passed: u64,
    pub total_interviews: u64,
    pub total_offers: u64,
    pub total_hires: u64,
    pub total_payments: u64,
    pub total_revenue: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_time_to_hire: Option<f64>,
}

impl KpiSummary {
    fn new(total_applicants: u64, counts: &FunnelCounts) -> Self {
        Self {
            total_applicants,
            total_calls: counts.calls,
            total_connections: counts.connections,
            total_proposals: counts.proposals,
            total_documents_sent: counts.documents,
            total_documents_passed: counts.passes,
            total_interviews: counts.interviews,
            total_offers: counts.offers,
            total_hires: counts.hires,
            total_payments: counts.payments,
            total_revenue: counts.revenue,
            conversion_rate: None,
            average_time_to_hire: None,
        }
    }
}

/// Stage-to-stage conversion percentages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRates {
    pub call_to_connection: f64,
    pub connection_to_proposal: f64,
    pub proposal_to_document: f64,
    pub document_to_pass: f64,
    pub interview_to_offer: f64,
    pub offer_to_hire: f64,
    pub hire_to_payment: f64,
}

impl From<&FunnelCounts> for ConversionRates {
    fn from(c: &FunnelCounts) -> Self {
        Self {
            call_to_connection: rate(c.connections, c.calls),
            connection_to_proposal: rate(c.proposals, c.connections),
            proposal_to_document: rate(c.documents, c.proposals),
            document_to_pass: rate(c.passes, c.documents),
            interview_to_offer: rate(c.offers, c.interviews),
            offer_to_hire: rate(c.hires, c.offers),
            hire_to_payment: rate(c.payments, c.hires),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodProgress {
    pub month: String,
    #[serde(flatten)]
    pub counts: FunnelCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: u64,
}

impl NamedValue {
    fn new(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInterval {
    pub name: String,
    pub days: f64,
}

impl StageInterval {
    fn new(name: &str, days: f64) -> Self {
        Self {
            name: name.to_string(),
            days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentPerformance {
    pub department: String,
    pub hires: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterPerformance {
    pub quarter: String,
    pub target: u32,
    pub actual: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeKpi {
    pub name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub summary: KpiSummary,
    pub conversion_rates: ConversionRates,
    pub monthly_progress: Vec<PeriodProgress>,
    pub pipeline_distribution: Vec<NamedValue>,
    pub time_between_stages: Vec<StageInterval>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyKpi {
    pub summary: KpiSummary,
    pub conversion_rates: ConversionRates,
    pub monthly_progress: Vec<PeriodProgress>,
    pub pipeline_distribution: Vec<NamedValue>,
    pub time_between_stages: Vec<StageInterval>,
    pub department_performance: Vec<DepartmentPerformance>,
    pub quarterly_performance: Vec<QuarterPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformerSummary {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
    pub hires: u64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewStatistics {
    pub total_interviews: u64,
    pub passed: u64,
    pub failed: u64,
    pub pass_rate: f64,
}

fn monthly_progress(scope: &Scope<'_>, timeframe: Timeframe, today: NaiveDate) -> Vec<PeriodProgress> {
    timeframe
        .trailing_periods(today)
        .into_iter()
        .map(|period| PeriodProgress {
            counts: scope.counts(period.start, Some(period.end)),
            month: period.label,
        })
        .collect()
}

/// KPI report for one employee
pub fn employee_kpi(
    employee: &Employee,
    applicants: &[Applicant],
    calls: &[PhoneCall],
    timeframe: Timeframe,
    today: NaiveDate,
) -> EmployeeKpi {
    let scope = Scope::employees(&[employee.id], applicants, calls);
    let counts = scope.counts(timeframe.start(today), None);

    EmployeeKpi {
        name: employee.details.name.clone(),
        department: employee.details.department.clone(),
        position: employee.details.position.clone(),
        summary: KpiSummary::new(scope.applicant_count() as u64, &counts),
        conversion_rates: ConversionRates::from(&counts),
        monthly_progress: monthly_progress(&scope, timeframe, today),
        pipeline_distribution: scope.pipeline(today),
        time_between_stages: scope.time_between_stages(),
    }
}

/// KPI report for the whole agency
///
/// `quarterly_targets` are hire targets for Q1..Q4 of the current year;
/// missing entries count as 0.
pub fn company_kpi(
    applicants: &[Applicant],
    calls: &[PhoneCall],
    employees: &[Employee],
    timeframe: Timeframe,
    quarterly_targets: &[u32],
    today: NaiveDate,
) -> CompanyKpi {
    let scope = Scope::company(applicants, calls);
    let start = timeframe.start(today);
    let counts = scope.counts(start, None);

    let mut summary = KpiSummary::new(scope.applicant_count() as u64, &counts);
    summary.conversion_rate = Some(rate(counts.hires, scope.applicant_count() as u64));
    summary.average_time_to_hire = Some(scope.average_time_to_hire());

    let mut departments: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for employee in employees {
        let name = employee
            .details
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("未分類")
            .to_string();
        departments.entry(name).or_default().push(employee.id);
    }
    let department_performance = departments
        .into_iter()
        .map(|(department, ids)| {
            let counts = Scope::employees(&ids, applicants, calls).counts(start, None);
            DepartmentPerformance {
                department,
                hires: counts.hires,
                revenue: counts.revenue,
            }
        })
        .collect();

    let quarterly_performance = (0..4u32)
        .map(|q| {
            let start = first_of_month(today.year(), q * 3 + 1);
            let end = last_of_month(today.year(), q * 3 + 3);
            QuarterPerformance {
                quarter: format!("Q{}", q + 1),
                target: quarterly_targets.get(q as usize).copied().unwrap_or(0),
                actual: scope.counts(start, Some(end)).hires,
            }
        })
        .collect();

    CompanyKpi {
        summary,
        conversion_rates: ConversionRates::from(&counts),
        monthly_progress: monthly_progress(&scope, timeframe, today),
        pipeline_distribution: scope.pipeline(today),
        time_between_stages: scope.time_between_stages(),
        department_performance,
        quarterly_performance,
    }
}

/// Employees ranked by revenue in the frame, highest first
pub fn top_performers(
    employees: &[Employee],
    applicants: &[Applicant],
    calls: &[PhoneCall],
    timeframe: Timeframe,
    today: NaiveDate,
    limit: usize,
) -> Vec<PerformerSummary> {
    let start = timeframe.start(today);
    let mut performers: Vec<PerformerSummary> = employees
        .iter()
        .map(|employee| {
            let counts = Scope::employees(&[employee.id], applicants, calls).counts(start, None);
            PerformerSummary {
                id: employee.id,
                name: employee.details.name.clone(),
                department: employee.details.department.clone(),
                hires: counts.hires,
                revenue: counts.revenue,
            }
        })
        .collect();

    performers.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    performers.truncate(limit);
    performers
}

pub fn interview_statistics(interviews: &[Interview]) -> InterviewStatistics {
    let total = interviews.len() as u64;
    let with_result = |result: InterviewResult| {
        interviews
            .iter()
            .filter(|i| i.details.result == Some(result))
            .count() as u64
    };
    let passed = with_result(InterviewResult::Passed);

    InterviewStatistics {
        total_interviews: total,
        passed,
        failed: with_result(InterviewResult::Failed),
        pass_rate: rate(passed, total),
    }
}
