use super::*;
use crate::error::CambioError;
use crate::types::{CellValue, ColumnRef};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("movimientos.xlsx");
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Hoja1").unwrap();
    sheet.write_string(0, 1, "Descripcion").unwrap();
    sheet.write_string(0, 5, "Importe").unwrap();
    sheet.write_string(0, 6, "Moneda").unwrap();
    sheet.write_string(1, 1, "Despachos Enero").unwrap();
    sheet.write_number(1, 5, 1000.0).unwrap();
    sheet.write_string(1, 6, "USD").unwrap();
    sheet.write_string(2, 1, "TR_EXTERIOR").unwrap();
    sheet.write_number(2, 5, 500.0).unwrap();
    sheet.write_string(2, 6, "ARS").unwrap();
    workbook.save(&path).unwrap();
    path
}

fn options(file: PathBuf) -> ApplyOptions {
    ApplyOptions {
        file,
        mode: Mode::Despachos,
        sheet: None,
        rules: None,
        naming: OutputNaming::Suffix,
        dry_run: false,
        verbose: true,
    }
}

// =========================================================================
// load_rules Tests
// =========================================================================

#[test]
fn test_load_rules_preset() {
    let rules = load_rules(Mode::National, None).unwrap();
    assert_eq!(rules, RuleSet::national());
}

#[test]
fn test_load_rules_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reglas.yaml");
    fs::write(&path, "process_unmatched: true\n").unwrap();

    let rules = load_rules(Mode::Despachos, Some(&path)).unwrap();
    assert!(rules.process_unmatched);
    assert_eq!(rules.keywords.len(), 2);
}

#[test]
fn test_load_rules_file_fills_from_mode() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reglas.yaml");
    fs::write(&path, "number_format: \"#,##0.00\"\n").unwrap();

    let rules = load_rules(Mode::Conditional, Some(&path)).unwrap();
    assert_eq!(rules.number_format, "#,##0.00");
    assert_eq!(rules.clear_column, Some(ColumnRef::E));
    assert_eq!(rules.generic_column(), ColumnRef::F);
    assert!(rules.despachos_always_tc);
}

#[test]
fn test_load_rules_missing_file() {
    let err = load_rules(Mode::Despachos, Some(Path::new("/nonexistent/reglas.yaml"))).unwrap_err();
    assert!(matches!(err, CambioError::Config(_)));
    assert!(err.to_string().contains("/nonexistent/reglas.yaml"));
}

// =========================================================================
// apply Tests
// =========================================================================

#[test]
fn test_apply_writes_new_file() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir);
    let original = fs::read(&source).unwrap();

    let output = apply(options(source.clone())).unwrap().unwrap();

    assert_eq!(output, dir.path().join("movimientos_modificado.xlsx"));
    assert!(output.exists());
    assert_eq!(fs::read(&source).unwrap(), original);

    let session = Session::open(&output).unwrap();
    let sheet = session.workbook().sheet("Hoja1").unwrap();
    assert_eq!(
        sheet.value(ColumnRef::E, 2),
        &CellValue::Formula("=1000.0*0.79*TC".into())
    );
    assert_eq!(
        sheet.value(ColumnRef::E, 3),
        &CellValue::Formula("=500.0".into())
    );
}

#[test]
fn test_apply_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir);

    let mut opts = options(source);
    opts.dry_run = true;
    assert_eq!(apply(opts).unwrap(), None);
    assert!(!dir.path().join("movimientos_modificado.xlsx").exists());
}

#[test]
fn test_apply_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir);

    let mut opts = options(source);
    opts.sheet = Some("Otra".to_string());
    let err = apply(opts).unwrap_err();
    assert!(matches!(err, CambioError::MissingSheet { .. }));
    assert!(!dir.path().join("movimientos_modificado.xlsx").exists());
}

#[test]
fn test_apply_missing_file() {
    let err = apply(options(PathBuf::from("/nonexistent/libro.xlsx"))).unwrap_err();
    assert!(matches!(err, CambioError::Load { .. }));
}

// =========================================================================
// classify / rules / sheets Tests
// =========================================================================

#[test]
fn test_classify_command() {
    assert!(classify(
        "Despachos".to_string(),
        "USD".to_string(),
        10.0,
        Mode::Despachos,
        None
    )
    .is_ok());
    assert!(classify(String::new(), "USD".to_string(), 10.0, Mode::Despachos, None).is_ok());
}

#[test]
fn test_classify_rejects_non_finite_value() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = classify(
            "Despachos".to_string(),
            "USD".to_string(),
            value,
            Mode::Despachos,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, CambioError::InvalidValue(_)));
    }
}

#[test]
fn test_rules_command() {
    assert!(rules(Mode::Conditional, None).is_ok());
}

#[test]
fn test_sheets_command() {
    let dir = TempDir::new().unwrap();
    let source = write_fixture(&dir);
    assert!(sheets(source).is_ok());
    assert!(sheets(PathBuf::from("/nonexistent/libro.xlsx")).is_err());
}
