//! Excel importer: .xlsx/.xlsm → in-memory `Workbook`
//!
//! Values, formulas and defined names come from calamine; number formats and
//! horizontal alignment of those cells from the package styles.

use super::dates::serial_to_datetime;
use super::updater::read_styles;
use crate::error::{CambioError, CambioResult};
use crate::types::{CellValue, ColumnRef, DefinedName, Sheet, Workbook};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads every worksheet's values, formulas and cell styles, plus workbook
/// defined names
pub struct ExcelImporter {
    path: PathBuf,
}

impl ExcelImporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn import(&self) -> CambioResult<Workbook> {
        let mut workbook: Xlsx<_> =
            open_workbook(&self.path).map_err(|e| CambioError::load(&self.path, e))?;

        let mut result = Workbook::new();
        result.defined_names = workbook
            .defined_names()
            .iter()
            .map(|(name, formula)| DefinedName {
                name: name.clone(),
                formula: formula.clone(),
            })
            .collect();

        let sheet_names = workbook.sheet_names().to_vec();
        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|e| CambioError::load(&self.path, format!("sheet '{}': {}", sheet_name, e)))?;

            let mut sheet = Sheet::new(sheet_name.as_str());
            self.read_values(&range, &mut sheet);

            // Formula cells replace their cached values
            if let Ok(formulas) = workbook.worksheet_formula(&sheet_name) {
                self.read_formulas(&formulas, &mut sheet);
            }

            debug!(sheet = %sheet_name, cells = sheet.cell_count(), "sheet loaded");
            result.add_sheet(sheet);
        }

        read_styles(&self.path, &mut result)?;

        Ok(result)
    }

    fn read_values(&self, range: &Range<Data>, sheet: &mut Sheet) {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row, col, data) in range.cells() {
            let value = convert_data(data);
            if value.is_empty() {
                continue;
            }
            let (row, column) = position(start_row, start_col, row, col);
            sheet.set_value(column, row, value);
        }
    }

    fn read_formulas(&self, range: &Range<String>, sheet: &mut Sheet) {
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row, col, formula) in range.cells() {
            if formula.is_empty() {
                continue;
            }
            let text = if formula.starts_with('=') {
                formula.clone()
            } else {
                format!("={}", formula)
            };
            let (row, column) = position(start_row, start_col, row, col);
            sheet.set_value(column, row, CellValue::Formula(text));
        }
    }
}

/// Absolute 1-based row and column from a range offset
fn position(start_row: u32, start_col: u32, row: usize, col: usize) -> (u32, ColumnRef) {
    let row = start_row + row as u32 + 1;
    let column = ColumnRef::from_index((start_col + col as u32) as u16);
    (row, column)
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::DateTime(dt) => match serial_to_datetime(dt.as_f64()) {
            Some(datetime) => CellValue::Date(datetime),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
