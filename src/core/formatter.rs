//! Column Formatter: date display and centering, independent of row rules

use crate::types::{ColumnRef, HorizontalAlign, Sheet};

/// Give date cells in `date_column` the `date_format` and center them, then
/// center every row of `center_column` whatever it holds.
///
/// Non-date cells in the date column are left alone. Returns the number of
/// date cells formatted.
pub fn format_columns(
    sheet: &mut Sheet,
    date_column: ColumnRef,
    center_column: ColumnRef,
    date_format: &str,
) -> usize {
    let date_rows: Vec<u32> = sheet
        .column_cells(date_column)
        .filter(|(_, cell)| cell.value.is_date())
        .map(|(row, _)| row)
        .collect();

    for row in &date_rows {
        let cell = sheet.cell_mut(date_column, *row);
        cell.number_format = Some(date_format.to_string());
        cell.align = Some(HorizontalAlign::Center);
    }

    for row in 1..=sheet.max_row() {
        sheet.set_align(center_column, row, HorizontalAlign::Center);
    }

    date_rows.len()
}
