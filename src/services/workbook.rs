use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;
use thiserror::Error;

use crate::core::import::{parse_sheet, Cell, ImportOutcome, SheetType};

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("Uploaded file is empty")]
    Empty,
}

/// Result of importing one uploaded workbook
#[derive(Debug)]
pub enum SheetImport {
    Parsed(ImportOutcome),
    MissingSheet { sheet_name: &'static str, available: Vec<String> },
}

/// Parse the job sheet of an `.xlsx` upload
///
/// A workbook without the expected sheet is not an error; the caller
/// reports it as a warning.
pub fn import_jobs(bytes: &[u8], sheet: SheetType) -> Result<SheetImport, WorkbookError> {
    if bytes.is_empty() {
        return Err(WorkbookError::Empty);
    }

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let available = workbook.sheet_names();
    let sheet_name = sheet.sheet_name();

    if !available.iter().any(|name| name == sheet_name) {
        tracing::warn!("Sheet {} not found, available: {:?}", sheet_name, available);
        return Ok(SheetImport::MissingSheet {
            sheet_name,
            available,
        });
    }

    let range = workbook.worksheet_range(sheet_name)?;
    let rows = absolute_rows(&range);
    tracing::info!("Read {} rows from sheet {}", rows.len(), sheet_name);

    Ok(SheetImport::Parsed(parse_sheet(sheet, &rows)))
}

/// Rows indexed from A1, so fixed header positions stay valid when the
/// used range starts further down or right
fn absolute_rows(range: &calamine::Range<Data>) -> Vec<Vec<Cell>> {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; start_col];
        row.extend(data_row.iter().map(to_cell));
        rows.push(row);
    }
    rows
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}
