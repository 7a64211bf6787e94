//! Transformation session: one loaded workbook, owned exclusively
//!
//! A session is created from a source path, mutated in memory by one or more
//! passes, and written once to a new file. The source file is only ever read:
//! on save its package is re-opened and only the cells that changed are
//! written, so styles, column widths and macros carry over. Run concurrent
//! transformations on separate sessions.

use crate::core::{SheetTransformer, TransformReport};
use crate::error::{CambioError, CambioResult};
use crate::excel::{
    available_output_path, ExcelExporter, ExcelImporter, ExcelUpdater, OutputNaming,
};
use crate::rules::RuleSet;
use crate::types::Workbook;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extensions the importer understands
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xltx", "xltm"];

/// Result of a pass followed by a save
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: PathBuf,
    pub report: TransformReport,
}

#[derive(Debug)]
pub struct Session {
    source: PathBuf,
    workbook: Workbook,
    /// Workbook as loaded; `None` when there is no source package to update
    loaded: Option<Workbook>,
}

impl Session {
    /// Load `path`. Nothing is mutated if loading fails.
    pub fn open<P: AsRef<Path>>(path: P) -> CambioResult<Self> {
        let source = path.as_ref().to_path_buf();

        let extension = source
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CambioError::load(
                &source,
                format!(
                    "unsupported file type (expected one of: {})",
                    SUPPORTED_EXTENSIONS.join(", ")
                ),
            ));
        }

        if !source.is_file() {
            return Err(CambioError::load(&source, "file not found"));
        }

        let workbook = ExcelImporter::new(&source).import()?;
        info!(path = %source.display(), sheets = workbook.sheets.len(), "workbook loaded");

        Ok(Self {
            source,
            loaded: Some(workbook.clone()),
            workbook,
        })
    }

    /// Wrap an in-memory workbook. Saving exports it whole as .xlsx.
    pub fn from_workbook(source: impl Into<PathBuf>, workbook: Workbook) -> Self {
        Self {
            source: source.into(),
            workbook,
            loaded: None,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    pub fn first_sheet(&self) -> Option<&str> {
        self.workbook.first_sheet_name()
    }

    /// Apply `rules` to `sheet`, or to the first sheet when `None`
    pub fn transform(&mut self, sheet: Option<&str>, rules: &RuleSet) -> CambioResult<TransformReport> {
        let name = match sheet {
            Some(name) => name.to_string(),
            None => self
                .first_sheet()
                .map(str::to_string)
                .ok_or_else(|| CambioError::MissingSheet {
                    sheet: "(first sheet)".to_string(),
                    available: Vec::new(),
                })?,
        };

        let target = self.workbook.require_sheet_mut(&name)?;
        Ok(SheetTransformer::new(rules).apply(target))
    }

    /// Write the workbook next to the source under a fresh name.
    ///
    /// The extension follows what is written: `.xlsm` when the source carries
    /// macros, `.xlsx` otherwise (templates are saved as workbooks).
    pub fn save(&self, naming: OutputNaming) -> CambioResult<PathBuf> {
        let now = chrono::Local::now().naive_local();
        let updater = self.updater()?;
        let extension = updater.as_ref().map_or("xlsx", |u| u.extension());
        let output = available_output_path(&self.source, naming, now, extension);
        self.write(updater, &output)?;
        Ok(output)
    }

    /// Write the workbook to `output`, refusing the source path
    pub fn save_as(&self, output: &Path) -> CambioResult<()> {
        let updater = self.updater()?;
        self.write(updater, output)
    }

    fn updater(&self) -> CambioResult<Option<ExcelUpdater>> {
        match self.loaded {
            Some(_) => ExcelUpdater::open(&self.source).map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, updater: Option<ExcelUpdater>, output: &Path) -> CambioResult<()> {
        if same_file(output, &self.source) {
            return Err(CambioError::save(output, "refusing to overwrite the source workbook"));
        }

        match (updater, &self.loaded) {
            (Some(mut updater), Some(loaded)) => {
                updater.apply(loaded, &self.workbook)?;
                updater.save(output)
            }
            _ => ExcelExporter::new(&self.workbook).export(output),
        }
    }

    /// Transform then save; nothing is written if the transform fails
    pub fn run(
        &mut self,
        sheet: Option<&str>,
        rules: &RuleSet,
        naming: OutputNaming,
    ) -> CambioResult<RunOutcome> {
        let report = self.transform(sheet, rules)?;
        let output = self.save(naming)?;
        Ok(RunOutcome { output, report })
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellValue, ColumnRef, Sheet};

    fn session() -> Session {
        let mut workbook = Workbook::new();
        let mut sheet = Sheet::new("Hoja1");
        sheet.set_value(ColumnRef::B, 1, CellValue::Text("Despachos".into()));
        sheet.set_value(ColumnRef::F, 1, CellValue::Number(10.0));
        sheet.set_value(ColumnRef::G, 1, CellValue::Text("USD".into()));
        workbook.add_sheet(sheet);
        workbook.add_sheet(Sheet::new("Resumen"));
        Session::from_workbook("libro.xlsx", workbook)
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Session::open("datos.csv").unwrap_err();
        assert!(matches!(err, CambioError::Load { .. }));
        assert!(err.to_string().contains("datos.csv"));
    }

    #[test]
    fn test_missing_file() {
        let err = Session::open("/nonexistent/libro.XLSX").unwrap_err();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_transform_defaults_to_first_sheet() {
        let mut session = session();
        let report = session.transform(None, &RuleSet::despachos()).unwrap();
        assert_eq!(report.sheet, "Hoja1");
        assert_eq!(
            session.workbook().sheet("Hoja1").unwrap().value(ColumnRef::E, 1),
            &CellValue::Formula("=10.0*0.79*TC".into())
        );
    }

    #[test]
    fn test_transform_missing_sheet() {
        let mut session = session();
        let before = session.workbook().clone();
        let err = session
            .transform(Some("Hoja9"), &RuleSet::despachos())
            .unwrap_err();
        assert!(matches!(err, CambioError::MissingSheet { .. }));
        assert_eq!(session.workbook(), &before);
    }

    #[test]
    fn test_save_as_refuses_source() {
        let session = session();
        let err = session.save_as(Path::new("libro.xlsx")).unwrap_err();
        assert!(matches!(err, CambioError::Save { .. }));
    }
}
