use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::JobDetails;

/// 1-based row holding the column headers
pub const HEADER_ROW: usize = 6;
/// 1-based row of the first job
pub const FIRST_DATA_ROW: usize = 7;

/// Workbook cell value, independent of the spreadsheet reader
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Cell {
    /// Trimmed text rendering; `None` for empty cells and blank text
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            Cell::Empty => return None,
            Cell::Text(s) => s.trim().to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    /// Integer reading: numbers are truncated, text keeps its digits only
    pub fn as_digits(&self) -> Option<i32> {
        match self {
            Cell::Int(i) => i32::try_from(*i).ok(),
            Cell::Float(f) => {
                let truncated = f.trunc();
                (truncated >= f64::from(i32::MIN) && truncated <= f64::from(i32::MAX))
                    .then_some(truncated as i32)
            }
            Cell::Text(s) => {
                let digits: String = s.chars().filter_map(decimal_digit).collect();
                digits.parse().ok()
            }
            Cell::Empty | Cell::Bool(_) => None,
        }
    }

    fn is_one_of(&self, words: &[&str]) -> bool {
        match self {
            Cell::Text(s) => words.contains(&s.trim()),
            _ => false,
        }
    }
}

/// ASCII form of a half- or full-width decimal digit
fn decimal_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_digit(c as u32 - '０' as u32, 10),
        _ => None,
    }
}

/// Which agency sheet layout an upload uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SheetType {
    #[default]
    Cnt,
    Aim,
}

impl From<String> for SheetType {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("aim") {
            SheetType::Aim
        } else {
            SheetType::Cnt
        }
    }
}

impl SheetType {
    pub fn sheet_name(self) -> &'static str {
        match self {
            SheetType::Cnt => "新案件共有データ(CNT)最新",
            SheetType::Aim => "新案件共有データ(AIM)最新",
        }
    }

    /// Job field → expected header text
    pub fn field_mapping(self) -> Vec<(&'static str, &'static str)> {
        COMMON_MAPPING
            .iter()
            .copied()
            .map(|(field, header)| match (self, field) {
                (SheetType::Aim, "fee") => (field, "Fee"),
                (SheetType::Aim, "occupation_major_category") => (field, "職種大分類"),
                (SheetType::Aim, "occupation_minor_category") => (field, "職種小分類"),
                _ => (field, header),
            })
            .collect()
    }
}

const COMMON_MAPPING: [(&str, &str); 35] = [
    ("job_url", "ジョブパルＵＲＬ"),
    ("job_number", "お仕事№"),
    ("cf_fc", "cf / fc / 事業所"),
    ("company", "企業名 / 工場名"),
    ("prefecture", "所在地 （都道府県）"),
    ("city", "所在地 （市区町村以降）"),
    ("salary", "総支給額"),
    ("fee", "フィー"),
    ("age_limit", "年齢上限1"),
    ("min_age", "年齢下限1"),
    ("description", "業務内容詳細"),
    ("requirements", "配属可能条件に関する備考1"),
    ("benefits", "特別待遇"),
    ("working_hours", "勤務時間に関する備考"),
    ("employment_type", "雇用形態"),
    ("holidays", "休日"),
    ("dormitory", "入寮可否"),
    ("housing_cost", "社宅費負担"),
    ("housing_allowance", "社宅費補助額"),
    ("work_style", "勤務形態"),
    ("annual_holidays", "年間休日"),
    ("gender", "性別1"),
    ("work_experience", "業務経験1"),
    ("occupation_experience", "職種経験1"),
    ("japanese_required", "外国人受け入れ"),
    ("commute_method", "可能通勤手段"),
    ("nearest_station", "最寄り駅（駅名）"),
    ("salary_type", "給与形態"),
    ("hourly_wage", "時給"),
    ("shift", "シフト"),
    ("products", "生産品目"),
    ("occupation_major_category", "職種①大分類"),
    ("occupation_minor_category", "職種①小分類"),
    ("advantages", "メリット（訴求ポイント）"),
    ("smoking_measures", "受動喫煙防止対策"),
];

const DORMITORY_YES: [&str; 6] = ["可", "有", "◯", "○", "〇", "あり"];
const FOREIGNERS_NO: [&str; 4] = ["不可", "無", "×", "不可能"];

/// Header text with runs of whitespace (including line breaks) collapsed
pub fn normalize_header(cell: &Cell) -> Option<String> {
    let text = cell.as_text()?;
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Locate the column of every mappable field
///
/// An exact header match wins; otherwise the first header that contains the
/// expected text (ASCII spaces ignored) is used. Prefecture and city also
/// accept any header mentioning 都道府県/県 and 市区町村/市.
pub fn resolve_columns(sheet: SheetType, headers: &[Option<String>]) -> HashMap<&'static str, usize> {
    let mut columns = HashMap::new();
    for (field, expected) in sheet.field_mapping() {
        let exact = headers
            .iter()
            .position(|h| h.as_deref() == Some(expected));
        let column = exact.or_else(|| {
            let compact = expected.replace(' ', "");
            headers.iter().position(|header| {
                let Some(header) = header.as_deref() else {
                    return false;
                };
                (field == "prefecture" && (header.contains("都道府県") || header.contains('県')))
                    || (field == "city" && (header.contains("市区町村") || header.contains('市')))
                    || header.replace(' ', "").contains(&compact)
            })
        });
        match column {
            Some(index) => {
                if exact.is_none() {
                    tracing::info!(field, header = ?headers[index], "Remapped job sheet column");
                }
                columns.insert(field, index);
            }
            None => tracing::debug!(field, expected, "Job sheet column not found"),
        }
    }
    columns
}

/// Build a job from one data row, or `None` when the company is blank
pub fn parse_job_row(columns: &HashMap<&'static str, usize>, row: &[Cell]) -> Option<JobDetails> {
    let company = cell_at(columns, row, "company").as_text()?;
    let mut job = JobDetails {
        title: company.clone(),
        company,
        ..Default::default()
    };

    for &field in columns.keys() {
        let value = cell_at(columns, row, field);
        match field {
            "company" => {}
            "dormitory" => job.dormitory = value.is_one_of(&DORMITORY_YES),
            "japanese_required" => job.japanese_required = value.is_one_of(&FOREIGNERS_NO),
            "age_limit" => job.age_limit = value.as_digits(),
            "min_age" => job.min_age = value.as_digits(),
            "hourly_wage" => job.hourly_wage = value.as_digits(),
            _ => {
                if let Some(slot) = text_slot(&mut job, field) {
                    *slot = value.as_text();
                }
            }
        }
    }
    Some(job)
}

fn cell_at<'r>(columns: &HashMap<&'static str, usize>, row: &'r [Cell], field: &str) -> &'r Cell {
    columns
        .get(field)
        .and_then(|&index| row.get(index))
        .unwrap_or(&Cell::Empty)
}

fn text_slot<'a>(job: &'a mut JobDetails, field: &str) -> Option<&'a mut Option<String>> {
    let slot = match field {
        "job_url" => &mut job.job_url,
        "job_number" => &mut job.job_number,
        "cf_fc" => &mut job.cf_fc,
        "prefecture" => &mut job.prefecture,
        "city" => &mut job.city,
        "salary" => &mut job.salary,
        "fee" => &mut job.fee,
        "description" => &mut job.description,
        "requirements" => &mut job.requirements,
        "benefits" => &mut job.benefits,
        "working_hours" => &mut job.working_hours,
        "employment_type" => &mut job.employment_type,
        "holidays" => &mut job.holidays,
        "housing_cost" => &mut job.housing_cost,
        "housing_allowance" => &mut job.housing_allowance,
        "work_style" => &mut job.work_style,
        "annual_holidays" => &mut job.annual_holidays,
        "gender" => &mut job.gender,
        "work_experience" => &mut job.work_experience,
        "occupation_experience" => &mut job.occupation_experience,
        "commute_method" => &mut job.commute_method,
        "nearest_station" => &mut job.nearest_station,
        "salary_type" => &mut job.salary_type,
        "shift" => &mut job.shift,
        "products" => &mut job.products,
        "occupation_major_category" => &mut job.occupation_major_category,
        "occupation_minor_category" => &mut job.occupation_minor_category,
        "advantages" => &mut job.advantages,
        "smoking_measures" => &mut job.smoking_measures,
        _ => return None,
    };
    Some(slot)
}

/// Jobs parsed from a sheet
#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub jobs: Vec<JobDetails>,
    /// Data rows skipped for a blank company
    pub skipped_rows: usize,
}

/// Parse a whole sheet given as rows starting at row 1
pub fn parse_sheet(sheet: SheetType, rows: &[Vec<Cell>]) -> ImportOutcome {
    let Some(header_row) = rows.get(HEADER_ROW - 1) else {
        tracing::warn!(rows = rows.len(), "Job sheet has no header row");
        return ImportOutcome::default();
    };
    let headers: Vec<Option<String>> = header_row.iter().map(normalize_header).collect();
    let columns = resolve_columns(sheet, &headers);
    if !columns.contains_key("company") {
        tracing::warn!(?headers, "Job sheet has no company column");
        return ImportOutcome::default();
    }

    let mut outcome = ImportOutcome::default();
    for (offset, row) in rows.iter().skip(FIRST_DATA_ROW - 1).enumerate() {
        match parse_job_row(&columns, row) {
            Some(job) => {
                tracing::debug!(
                    row = offset + FIRST_DATA_ROW,
                    company = %job.company,
                    "Parsed job row"
                );
                outcome.jobs.push(job);
            }
            None => outcome.skipped_rows += 1,
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sheet_rows(headers: Vec<Cell>, data: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
        let mut rows: Vec<Vec<Cell>> = (1..HEADER_ROW).map(|_| vec![text("タイトル行")]).collect();
        rows.push(headers);
        rows.extend(data);
        rows
    }

    #[test]
    fn test_normalize_header_collapses_whitespace() {
        assert_eq!(
            normalize_header(&text("所在地\n （都道府県）")).as_deref(),
            Some("所在地 （都道府県）")
        );
        assert_eq!(normalize_header(&text("   ")), None);
        assert_eq!(normalize_header(&Cell::Empty), None);
    }

    #[test]
    fn test_aim_mapping_differs_from_cnt() {
        let cnt: HashMap<_, _> = SheetType::Cnt.field_mapping().into_iter().collect();
        let aim: HashMap<_, _> = SheetType::Aim.field_mapping().into_iter().collect();

        assert_eq!(cnt["fee"], "フィー");
        assert_eq!(aim["fee"], "Fee");
        assert_eq!(cnt["occupation_major_category"], "職種①大分類");
        assert_eq!(aim["occupation_minor_category"], "職種小分類");
        assert_eq!(cnt["company"], aim["company"]);
    }

    #[test]
    fn test_resolve_columns_fuzzy_remap() {
        let headers = vec![
            Some("企業名 / 工場名".to_string()),
            Some("勤務地都道府県".to_string()),
            Some("勤務地市町村".to_string()),
            Some("時給（円）".to_string()),
        ];

        let columns = resolve_columns(SheetType::Cnt, &headers);

        assert_eq!(columns["company"], 0);
        assert_eq!(columns["prefecture"], 1);
        assert_eq!(columns["city"], 2);
        assert_eq!(columns["hourly_wage"], 3);
        assert!(!columns.contains_key("fee"));
    }

    #[test]
    fn test_parse_sheet_coercions_and_skips() {
        let rows = sheet_rows(
            vec![
                text("企業名 /\n工場名"),
                text("所在地 （都道府県）"),
                text("入寮可否"),
                text("外国人受け入れ"),
                text("年齢上限1"),
                text("時給"),
                text("お仕事№"),
            ],
            vec![
                vec![
                    text("トヨタ系部品工場"),
                    text(" 愛知県 "),
                    text("○"),
                    text("不可"),
                    text("45歳まで"),
                    Cell::Float(1500.0),
                    Cell::Int(12345),
                ],
                vec![Cell::Empty, text("東京都")],
                vec![
                    text("食品工場"),
                    text("北海道"),
                    text("不可"),
                    text("可"),
                    Cell::Int(50),
                    text("未定"),
                ],
            ],
        );

        let outcome = parse_sheet(SheetType::Cnt, &rows);

        assert_eq!(outcome.jobs.len(), 2);
        assert_eq!(outcome.skipped_rows, 1);

        let first = &outcome.jobs[0];
        assert_eq!(first.title, "トヨタ系部品工場");
        assert_eq!(first.prefecture.as_deref(), Some("愛知県"));
        assert!(first.dormitory);
        assert!(first.japanese_required);
        assert_eq!(first.age_limit, Some(45));
        assert_eq!(first.hourly_wage, Some(1500));
        assert_eq!(first.job_number.as_deref(), Some("12345"));

        let second = &outcome.jobs[1];
        assert!(!second.dormitory);
        assert!(!second.japanese_required);
        assert_eq!(second.age_limit, Some(50));
        assert_eq!(second.hourly_wage, None);
        assert_eq!(second.job_number, None, "short rows leave fields empty");
    }

    #[test]
    fn test_full_width_digits() {
        assert_eq!(text("４５歳").as_digits(), Some(45));
        assert_eq!(text("45歳").as_digits(), Some(45));
        assert_eq!(text("時給１，２００円").as_digits(), Some(1200));
        assert_eq!(text("年齢不問").as_digits(), None);

        let rows = sheet_rows(
            vec![text("企業名 / 工場名"), text("年齢上限1")],
            vec![vec![text("部品工場"), text("４５歳まで")]],
        );
        let outcome = parse_sheet(SheetType::Cnt, &rows);
        assert_eq!(outcome.jobs[0].age_limit, Some(45));
    }

    #[test]
    fn test_parse_sheet_without_header_row() {
        let outcome = parse_sheet(SheetType::Cnt, &[vec![text("only")]]);
        assert!(outcome.jobs.is_empty());
        assert_eq!(outcome.skipped_rows, 0);
    }
}
