//! Workbook load and save collaborators
//!
//! - Import: .xlsx/.xlsm (calamine) → `Workbook`
//! - Update: changed cells written back onto the source package
//!   (umya-spreadsheet), saved under a new name
//! - Export: `Workbook` → .xlsx (rust_xlsxwriter) when there is no source

pub mod dates;
mod exporter;
mod importer;
pub mod output;
mod updater;

pub use exporter::ExcelExporter;
pub use importer::ExcelImporter;
pub use output::{available_output_path, output_path, OutputNaming};
pub use updater::ExcelUpdater;
