//! Excel exporter: in-memory `Workbook` → .xlsx

use super::dates::datetime_to_serial;
use crate::error::{CambioError, CambioResult};
use crate::types::{Cell, CellValue, HorizontalAlign, Sheet, Workbook};
use rust_xlsxwriter::{Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;
use tracing::{info, warn};

/// Display format for dates that were never given one
const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

/// Writes sheets in order with values, formulas, number formats and
/// alignment, and re-declares the workbook's defined names.
pub struct ExcelExporter<'a> {
    workbook: &'a Workbook,
}

impl<'a> ExcelExporter<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        Self { workbook }
    }

    pub fn export(&self, output_path: &Path) -> CambioResult<()> {
        let mut xlsx = XlsxWorkbook::new();

        for sheet in &self.workbook.sheets {
            let worksheet = xlsx.add_worksheet();
            worksheet
                .set_name(&sheet.name)
                .map_err(|e| CambioError::save(output_path, format!("sheet '{}': {}", sheet.name, e)))?;
            write_sheet(worksheet, sheet)
                .map_err(|e| CambioError::save(output_path, format!("sheet '{}': {}", sheet.name, e)))?;
        }

        for defined in &self.workbook.defined_names {
            let formula = if defined.formula.starts_with('=') {
                defined.formula.clone()
            } else {
                format!("={}", defined.formula)
            };
            if let Err(e) = xlsx.define_name(&defined.name, &formula) {
                warn!(name = %defined.name, error = %e, "defined name not carried over");
            }
        }

        xlsx.save(output_path)
            .map_err(|e| CambioError::save(output_path, e))?;

        info!(path = %output_path.display(), "workbook saved");
        Ok(())
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), rust_xlsxwriter::XlsxError> {
    for (position, cell) in sheet.cells() {
        let row = position.row - 1;
        let col = position.column.index();
        let format = cell_format(cell);

        match &cell.value {
            CellValue::Empty => {
                if cell.has_style() {
                    worksheet.write_blank(row, col, &format)?;
                }
            }
            CellValue::Text(s) => {
                worksheet.write_string_with_format(row, col, s, &format)?;
            }
            CellValue::Error(s) => {
                worksheet.write_string_with_format(row, col, s, &format)?;
            }
            CellValue::Number(n) => {
                worksheet.write_number_with_format(row, col, *n, &format)?;
            }
            CellValue::Bool(b) => {
                worksheet.write_boolean_with_format(row, col, *b, &format)?;
            }
            CellValue::Formula(text) => {
                let formula = text.strip_prefix('=').unwrap_or(text);
                worksheet.write_formula_with_format(row, col, formula, &format)?;
            }
            CellValue::Date(datetime) => {
                let format = if cell.number_format.is_none() {
                    format.set_num_format(DEFAULT_DATE_FORMAT)
                } else {
                    format
                };
                worksheet.write_number_with_format(row, col, datetime_to_serial(datetime), &format)?;
            }
        }
    }

    Ok(())
}

fn cell_format(cell: &Cell) -> Format {
    let mut format = Format::new();

    if let Some(number_format) = &cell.number_format {
        format = format.set_num_format(number_format);
    }

    if let Some(align) = cell.align {
        format = format.set_align(match align {
            HorizontalAlign::Left => FormatAlign::Left,
            HorizontalAlign::Center => FormatAlign::Center,
            HorizontalAlign::Right => FormatAlign::Right,
        });
    }

    format
}
