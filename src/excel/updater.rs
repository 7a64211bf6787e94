//! In-place update: re-open the source package and write only changed cells
//!
//! Everything the in-memory model does not carry (fonts, fills, widths,
//! merged ranges, other sheets, the VBA project) stays as the source had it.

use super::dates::datetime_to_serial;
use crate::error::{CambioError, CambioResult};
use crate::types::{Cell, CellRef, CellValue, HorizontalAlign, Sheet, Workbook};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{reader, writer, HorizontalAlignmentValues, Spreadsheet, Worksheet};

pub struct ExcelUpdater {
    source: PathBuf,
    book: Spreadsheet,
}

impl ExcelUpdater {
    pub fn open<P: AsRef<Path>>(source: P) -> CambioResult<Self> {
        let source = source.as_ref().to_path_buf();
        let book = reader::xlsx::read(&source).map_err(|e| CambioError::load(&source, e))?;
        Ok(Self { source, book })
    }

    /// The source carries a VBA project
    pub fn has_macros(&self) -> bool {
        self.book.get_macros_code().is_some()
    }

    /// Extension matching the package content type written on save
    pub fn extension(&self) -> &'static str {
        if self.has_macros() {
            "xlsm"
        } else {
            "xlsx"
        }
    }

    /// Copy every cell of `after` that differs from `before` into the package.
    /// Returns the number of cells written.
    pub fn apply(&mut self, before: &Workbook, after: &Workbook) -> CambioResult<usize> {
        let mut written = 0;

        for sheet in &after.sheets {
            let Some(original) = before.sheet(&sheet.name) else {
                continue;
            };
            let worksheet = self.book.get_sheet_by_name_mut(&sheet.name).ok_or_else(|| {
                CambioError::MissingSheet {
                    sheet: sheet.name.clone(),
                    available: before.sheet_names(),
                }
            })?;
            written += patch_sheet(worksheet, original, sheet);
        }

        debug!(source = %self.source.display(), cells = written, "changes applied");
        Ok(written)
    }

    pub fn save(&self, output: &Path) -> CambioResult<()> {
        writer::xlsx::write(&self.book, output).map_err(|e| CambioError::save(output, e))?;
        info!(path = %output.display(), "workbook saved");
        Ok(())
    }
}

fn patch_sheet(worksheet: &mut Worksheet, before: &Sheet, after: &Sheet) -> usize {
    let untouched = Cell::default();
    let mut written = 0;

    for (position, cell) in after.cells() {
        let original = before
            .cell(position.column, position.row)
            .unwrap_or(&untouched);
        if cell == original {
            continue;
        }

        let target = worksheet.get_cell_mut(coordinate(position));

        if cell.value != original.value {
            match &cell.value {
                CellValue::Empty => {
                    target.set_value("");
                }
                CellValue::Text(s) | CellValue::Error(s) => {
                    target.set_value_string(s.clone());
                }
                CellValue::Number(n) => {
                    target.set_value_number(*n);
                }
                CellValue::Bool(b) => {
                    target.set_value_bool(*b);
                }
                CellValue::Formula(text) => {
                    let formula = text.strip_prefix('=').unwrap_or(text);
                    target.set_formula(formula);
                }
                CellValue::Date(datetime) => {
                    target.set_value_number(datetime_to_serial(datetime));
                }
            }
        }

        if cell.number_format != original.number_format {
            if let Some(format) = &cell.number_format {
                target
                    .get_style_mut()
                    .get_number_format_mut()
                    .set_format_code(format.clone());
            }
        }

        if cell.align != original.align {
            if let Some(align) = cell.align {
                target
                    .get_style_mut()
                    .get_alignment_mut()
                    .set_horizontal(horizontal(align));
            }
        }

        written += 1;
    }

    written
}

/// umya addresses cells as 1-based (column, row)
fn coordinate(position: CellRef) -> (u32, u32) {
    (position.column.index() as u32 + 1, position.row)
}

fn horizontal(align: HorizontalAlign) -> HorizontalAlignmentValues {
    match align {
        HorizontalAlign::Left => HorizontalAlignmentValues::Left,
        HorizontalAlign::Center => HorizontalAlignmentValues::Center,
        HorizontalAlign::Right => HorizontalAlignmentValues::Right,
    }
}

/// Source number formats and horizontal alignment for the cells already in
/// `workbook`
pub(crate) fn read_styles(path: &Path, workbook: &mut Workbook) -> CambioResult<()> {
    let book = reader::xlsx::read(path).map_err(|e| CambioError::load(path, e))?;

    for sheet in &mut workbook.sheets {
        let Some(worksheet) = book.get_sheet_by_name(&sheet.name) else {
            continue;
        };

        let positions: Vec<CellRef> = sheet.cells().map(|(position, _)| position).collect();
        for position in positions {
            let Some(source) = worksheet.get_cell(coordinate(position)) else {
                continue;
            };
            let style = source.get_style();

            let number_format = style
                .get_number_format()
                .map(|nf| nf.get_format_code().to_string())
                .filter(|code| !code.is_empty() && code != "General");
            let align = style
                .get_alignment()
                .and_then(|alignment| match alignment.get_horizontal() {
                    HorizontalAlignmentValues::Left => Some(HorizontalAlign::Left),
                    HorizontalAlignmentValues::Center => Some(HorizontalAlign::Center),
                    HorizontalAlignmentValues::Right => Some(HorizontalAlign::Right),
                    _ => None,
                });

            let cell = sheet.cell_mut(position.column, position.row);
            cell.number_format = number_format;
            cell.align = align;
        }
    }

    Ok(())
}
