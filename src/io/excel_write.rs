use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::error::Result;
use crate::report::{Cell, MATCH_COLUMN, Report, ReportTable};

/// File name the report is offered under when no output path is given.
pub const DEFAULT_REPORT_NAME: &str = "comparativa_parametros_generales.xlsx";

const MATCH_FILL: u32 = 0xD4EDDA;
const MISMATCH_FILL: u32 = 0xF8D7DA;

struct Formats {
    header: Format,
    matched: Format,
    mismatched: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            matched: Format::new().set_background_color(Color::RGB(MATCH_FILL)),
            mismatched: Format::new().set_background_color(Color::RGB(MISMATCH_FILL)),
        }
    }
}

/// Writes the report to `path` as a multi-sheet workbook.
///
/// The workbook is assembled in memory and moved into place only once fully
/// written, so a failure never leaves a partial file at `path`.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let buffer = report_to_buffer(report)?;
    let staging = staging_path(path);

    let written = fs::write(&staging, &buffer).and_then(|_| fs::rename(&staging, path));
    if let Err(error) = written {
        if fs::remove_file(&staging).is_err() {
            warn!(path = %staging.display(), "could not remove staging file");
        }
        return Err(error.into());
    }

    debug!(bytes = buffer.len(), path = %path.display(), "report written");
    Ok(())
}

/// Serialises the report into the bytes of an `.xlsx` file.
pub fn report_to_buffer(report: &Report) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    for table in &report.tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;
        write_table(worksheet, table, &formats)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_table(worksheet: &mut Worksheet, table: &ReportTable, formats: &Formats) -> Result<()> {
    for (col_idx, header) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, &formats.header)?;
    }

    let match_column = table.column_index(MATCH_COLUMN);

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        let row_format = match match_column.and_then(|idx| row.get(idx)) {
            Some(Cell::Bool(true)) => Some(&formats.matched),
            Some(Cell::Bool(false)) => Some(&formats.mismatched),
            _ => None,
        };

        for (col_idx, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, col_idx as u16, cell, row_format)?;
        }
    }

    // Excel tables need at least one data row.
    if !table.rows.is_empty() && !table.columns.is_empty() {
        let mut excel_table = rust_xlsxwriter::Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        let row_end = table.rows.len() as u32;
        worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;
    }

    worksheet.autofit();
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<()> {
    match (cell, format) {
        (Cell::Empty, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (Cell::Empty, None) => {}
        (Cell::Text(value), Some(format)) => {
            worksheet.write_string_with_format(row, col, value, format)?;
        }
        (Cell::Text(value), None) => {
            worksheet.write_string(row, col, value)?;
        }
        (Cell::Integer(value), Some(format)) => {
            worksheet.write_number_with_format(row, col, *value as f64, format)?;
        }
        (Cell::Integer(value), None) => {
            worksheet.write_number(row, col, *value as f64)?;
        }
        (Cell::Bool(value), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *value, format)?;
        }
        (Cell::Bool(value), None) => {
            worksheet.write_boolean(row, col, *value)?;
        }
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
