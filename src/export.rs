use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use time::Date;
use tracing::info;

use crate::model::RankedRow;

const SHEET_NAME: &str = "Sheet1";
const HEADERS: [&str; 7] = ["id", "name", "level", "slot", "rank", "equipped", "wowhead_url"];

#[derive(Debug, thiserror::Error)]
#[error("Failed to write spreadsheet {}: {source}", .path.display())]
pub struct ExportError {
    path: PathBuf,
    #[source]
    source: XlsxError,
}

/// `{character}_{YYYYMMDD}.xlsx`
pub fn output_file_name(character: &str, date: Date) -> PathBuf {
    PathBuf::from(format!(
        "{}_{:04}{:02}{:02}.xlsx",
        character,
        date.year(),
        u8::from(date.month()),
        date.day()
    ))
}

/// Write the ranked rows to a single-sheet workbook, header first, in the order given.
pub fn write_rows(path: &Path, rows: &[RankedRow]) -> Result<(), ExportError> {
    info!("Generating {}...", path.display());
    build_workbook(rows)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|source| ExportError {
            path: path.to_path_buf(),
            source,
        })
}

fn build_workbook(rows: &[RankedRow]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, title) in (0u16..).zip(HEADERS) {
        sheet.write_string_with_format(0, col, title, &bold)?;
    }

    for (r, row) in (1u32..).zip(rows) {
        sheet.write_number(r, 0, row.id as f64)?;
        sheet.write_string(r, 1, &row.name)?;
        sheet.write_number(r, 2, f64::from(row.level))?;
        sheet.write_string(r, 3, &row.slot)?;
        sheet.write_number(r, 4, row.rank)?;
        // Blank cell for items that are not equipped
        if !row.equipped.is_empty() {
            sheet.write_string(r, 5, &row.equipped)?;
        }
        sheet.write_string(r, 6, &row.wowhead_url)?;
    }
    Ok(workbook)
}
