//! Output file naming. The source workbook is never the destination.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MODIFIED_SUFFIX: &str = "modificado";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// `<name>_<YYYY-MM-DD_HH-MM>.<ext>`
    #[default]
    Timestamp,
    /// `<name>_modificado.<ext>`
    Suffix,
}

/// Candidate destination next to `source`. `extension` is the saved
/// package's type (`xlsx` or `xlsm`), not necessarily the source's.
///
/// Examples:
/// - `ventas.xlsx`, Suffix → `ventas_modificado.xlsx`
/// - `ventas.xltm`, Timestamp at 2025-03-14 09:05, `xlsm` → `ventas_2025-03-14_09-05.xlsm`
pub fn output_path(
    source: &Path,
    naming: OutputNaming,
    now: NaiveDateTime,
    extension: &str,
) -> PathBuf {
    with_tag(source, &tag(naming, now), extension)
}

/// Like [`output_path`], but appends a counter (`_2`, `_3`, ...) until the
/// name is free, so a second run in the same minute keeps the first result.
pub fn available_output_path(
    source: &Path,
    naming: OutputNaming,
    now: NaiveDateTime,
    extension: &str,
) -> PathBuf {
    let candidate = output_path(source, naming, now, extension);
    if !candidate.exists() && candidate != source {
        return candidate;
    }

    let tag = tag(naming, now);
    let mut counter = 2u32;
    loop {
        let numbered = with_tag(source, &format!("{}_{}", tag, counter), extension);
        if !numbered.exists() && numbered != source {
            return numbered;
        }
        counter += 1;
    }
}

fn tag(naming: OutputNaming, now: NaiveDateTime) -> String {
    match naming {
        OutputNaming::Suffix => MODIFIED_SUFFIX.to_string(),
        OutputNaming::Timestamp => now.format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn with_tag(source: &Path, tag: &str, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = if extension.is_empty() {
        format!("{}_{}", stem, tag)
    } else {
        format!("{}_{}.{}", stem, tag, extension)
    };
    source.with_file_name(file_name)
}
