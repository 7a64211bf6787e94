//! Sheet Transformer: one full pass of a rule set over a sheet
//!
//! Order of a pass:
//! 1. clear the configured column (if any)
//! 2. classify and rewrite every row from 1 to `max_row`
//! 3. format the date and center columns
//!
//! Each row depends only on its own cells. The source value is read before
//! any write to the row, which matters when the rule set writes back into the
//! value column.

use super::formatter::format_columns;
use crate::rules::{Decision, FormulaGenerator, RowClassifier, RuleSet, SkipReason};
use crate::types::{CellValue, Sheet};
use tracing::{debug, info};

/// Summary of a pass. Rows skipped for a non-numeric value are listed, never
/// raised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformReport {
    pub sheet: String,
    pub rows_scanned: u32,
    pub rows_rewritten: usize,
    pub cells_cleared: usize,
    /// Rows whose value cell holds something that is not a number
    pub unparsable_rows: Vec<u32>,
    /// Rows with a blank value cell
    pub rows_without_value: usize,
    pub skipped: Vec<(u32, SkipReason)>,
    pub dates_formatted: usize,
}

impl TransformReport {
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|(_, r)| *r == reason).count()
    }
}

pub struct SheetTransformer<'a> {
    rules: &'a RuleSet,
}

impl<'a> SheetTransformer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    pub fn apply(&self, sheet: &mut Sheet) -> TransformReport {
        let mut report = TransformReport {
            sheet: sheet.name.clone(),
            ..Default::default()
        };

        if let Some(column) = self.rules.clear_column {
            report.cells_cleared = clear_column(sheet, column);
        }

        let classifier = RowClassifier::new(self.rules);
        let generator = FormulaGenerator::new(self.rules);
        let layout = self.rules.layout;
        let max_row = sheet.max_row();
        report.rows_scanned = max_row;

        for row in 1..=max_row {
            let source = sheet.value(layout.value, row);
            let value = match source.as_number() {
                Some(value) => value,
                None => {
                    if source.is_empty() {
                        report.rows_without_value += 1;
                    } else {
                        debug!(row, value = ?source, "skipping non-numeric value");
                        report.unparsable_rows.push(row);
                    }
                    continue;
                }
            };

            let description = sheet.value(layout.description, row).to_text();
            let currency = sheet.value(layout.currency, row).to_text();
            let class = classifier.classify(&description, &currency);

            match generator.generate(class, value) {
                Decision::Skip(reason) => {
                    debug!(row, %reason, "row left untouched");
                    report.skipped.push((row, reason));
                }
                Decision::Rewrite(rewrite) => {
                    debug!(
                        row,
                        category = %class.category,
                        currency = %class.currency,
                        target = %rewrite.column,
                        output = %rewrite.output,
                        "row rewritten"
                    );
                    let cell = sheet.cell_mut(rewrite.column, row);
                    if let Some(new_value) = rewrite.output.into_value() {
                        cell.value = new_value;
                    }
                    cell.number_format = Some(rewrite.number_format);
                    report.rows_rewritten += 1;
                }
            }
        }

        report.dates_formatted = format_columns(
            sheet,
            layout.date,
            layout.center,
            &self.rules.date_format,
        );

        info!(
            sheet = %report.sheet,
            rows = report.rows_scanned,
            rewritten = report.rows_rewritten,
            unparsable = report.unparsable_rows.len(),
            "pass complete"
        );

        report
    }
}

/// Empty every existing cell of `column`; returns how many held a value
fn clear_column(sheet: &mut Sheet, column: crate::types::ColumnRef) -> usize {
    let rows: Vec<u32> = sheet.column_cells(column).map(|(row, _)| row).collect();
    let mut cleared = 0;
    for row in rows {
        let cell = sheet.cell_mut(column, row);
        if !cell.value.is_empty() {
            cleared += 1;
        }
        cell.value = CellValue::Empty;
    }
    cleared
}
