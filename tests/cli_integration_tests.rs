//! CLI Integration Tests
//!
//! Tests the CLI binary directly using assert_cmd to exercise main.rs code paths.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("libro.xlsx");
    let mut workbook = XlsxWorkbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Hoja1").unwrap();
    sheet.write_string(0, 1, "Despachos Enero").unwrap();
    sheet.write_number(0, 5, 1000.0).unwrap();
    sheet.write_string(0, 6, "USD").unwrap();
    workbook.save(&path).unwrap();
    path
}

fn cambio() -> Command {
    let mut cmd = Command::cargo_bin("cambio").unwrap();
    cmd.env_remove("CAMBIO_MODE").env_remove("CAMBIO_RULES");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    cambio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cambio"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    cambio()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cambio"));
}

#[test]
fn test_apply_help() {
    cambio()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("conditional"));
}

// ═══════════════════════════════════════════════════════════════════════════
// APPLY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_apply_suffix() {
    let dir = TempDir::new().unwrap();
    let source = write_workbook(dir.path());

    cambio()
        .args(["apply", source.to_str().unwrap(), "--naming", "suffix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows rewritten"))
        .stdout(predicate::str::contains("libro_modificado.xlsx"));

    assert!(dir.path().join("libro_modificado.xlsx").exists());
}

#[test]
fn test_apply_dry_run() {
    let dir = TempDir::new().unwrap();
    let source = write_workbook(dir.path());

    cambio()
        .args(["apply", source.to_str().unwrap(), "--dry-run", "--mode", "national"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_apply_missing_file() {
    cambio()
        .args(["apply", "/nonexistent/libro.xlsx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/libro.xlsx"));
}

#[test]
fn test_apply_missing_sheet() {
    let dir = TempDir::new().unwrap();
    let source = write_workbook(dir.path());

    cambio()
        .args(["apply", source.to_str().unwrap(), "--sheet", "Nada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nada"))
        .stderr(predicate::str::contains("Hoja1"));
}

#[test]
fn test_apply_invalid_mode() {
    cambio()
        .args(["apply", "libro.xlsx", "--mode", "bogus"])
        .assert()
        .failure();
}

#[test]
fn test_apply_with_rules_file() {
    let dir = TempDir::new().unwrap();
    let source = write_workbook(dir.path());
    let rules = dir.path().join("reglas.yaml");
    fs::write(&rules, "despachos_factor: 0\n").unwrap();

    cambio()
        .args([
            "apply",
            source.to_str().unwrap(),
            "--rules",
            rules.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("despachos_factor"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CLASSIFY / RULES / SHEETS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_classify_despachos() {
    cambio()
        .args(["classify", "Despachos Enero", "USD", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=1000.0*0.79*TC"))
        .stdout(predicate::str::contains("#,##0"));
}

#[test]
fn test_classify_negative_value() {
    cambio()
        .args(["classify", "TR_EXTERIOR", "EUR", "-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=-20.0*EUR"));
}

#[test]
fn test_classify_rejects_non_finite_value() {
    for value in ["NaN", "inf"] {
        cambio()
            .args(["classify", "Despachos", "USD", value])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a finite number"));
    }
}

#[test]
fn test_rules_file_fills_from_mode() {
    let dir = TempDir::new().unwrap();
    let rules = dir.path().join("reglas.yaml");
    fs::write(&rules, "number_format: \"#,##0.00\"\n").unwrap();

    cambio()
        .args(["rules", "--mode", "conditional", "--rules", rules.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("clear_column: E"))
        .stdout(predicate::str::contains("#,##0.00"));
}

#[test]
fn test_classify_skipped() {
    cambio()
        .args(["classify", "Venta", "USD", "5", "--mode", "despachos"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped"));
}

#[test]
fn test_rules_prints_yaml() {
    cambio()
        .args(["rules", "--mode", "conditional"])
        .assert()
        .success()
        .stdout(predicate::str::contains("despachos_always_tc: true"))
        .stdout(predicate::str::contains("clear_column: E"));
}

#[test]
fn test_sheets_lists_names() {
    let dir = TempDir::new().unwrap();
    let source = write_workbook(dir.path());

    cambio()
        .args(["sheets", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hoja1"));
}
