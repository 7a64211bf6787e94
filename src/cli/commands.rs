use crate::error::{CambioError, CambioResult};
use crate::excel::OutputNaming;
use crate::rules::{Decision, FormulaGenerator, Mode, RowClassifier, RuleSet};
use crate::session::Session;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Preset for `mode`, overridden by the rule file when given
fn load_rules(mode: Mode, rules: Option<&Path>) -> CambioResult<RuleSet> {
    match rules {
        Some(path) => RuleSet::from_yaml_file_over(path, mode.rule_set()),
        None => Ok(mode.rule_set()),
    }
}

/// Options for the apply command
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub file: PathBuf,
    pub mode: Mode,
    pub sheet: Option<String>,
    pub rules: Option<PathBuf>,
    pub naming: OutputNaming,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Execute the apply command
pub fn apply(options: ApplyOptions) -> CambioResult<Option<PathBuf>> {
    println!("{}", "💱 Cambio - Applying rules".bold().green());
    println!("   File: {}", options.file.display());
    println!("   Mode: {}", options.mode.to_string().bright_yellow().bold());
    if let Some(path) = &options.rules {
        println!("   Rules: {}", path.display().to_string().bright_yellow());
    }
    println!();

    if options.dry_run {
        println!(
            "{}",
            "📋 DRY RUN MODE - No file will be written\n".yellow()
        );
    }

    let rules = load_rules(options.mode, options.rules.as_deref())?;

    if options.verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }
    let mut session = Session::open(&options.file)?;
    if options.verbose {
        println!("   Sheets: {}\n", session.sheet_names().join(", "));
    }

    let report = session.transform(options.sheet.as_deref(), &rules)?;

    println!("{}", "✅ Rows processed:".bold().green());
    println!("   📊 Sheet: {}", report.sheet.bright_blue().bold());
    println!("      rows scanned     {}", report.rows_scanned);
    println!("      rows rewritten   {}", report.rows_rewritten.to_string().bold());
    if report.cells_cleared > 0 {
        println!("      cells cleared    {}", report.cells_cleared);
    }
    if report.dates_formatted > 0 {
        println!("      dates formatted  {}", report.dates_formatted);
    }
    if !report.unparsable_rows.is_empty() {
        println!(
            "      non-numeric      {}",
            report.unparsable_rows.len().to_string().yellow()
        );
        if options.verbose {
            let rows: Vec<String> = report.unparsable_rows.iter().map(|r| r.to_string()).collect();
            println!("         rows: {}", rows.join(", "));
        }
    }
    if options.verbose {
        for (row, reason) in &report.skipped {
            println!("      row {} skipped: {}", row, reason);
        }
    }
    println!();

    if options.dry_run {
        println!("{}", "📋 Dry run complete - no file written".yellow());
        return Ok(None);
    }

    let output = session.save(options.naming)?;
    println!("{}", "💾 Saved".bold().green());
    println!("   Output: {}\n", output.display());

    Ok(Some(output))
}

/// Execute the classify command: show what one row would become
pub fn classify(
    description: String,
    currency: String,
    value: f64,
    mode: Mode,
    rules: Option<PathBuf>,
) -> CambioResult<()> {
    if !value.is_finite() {
        return Err(CambioError::InvalidValue(format!(
            "{} is not a finite number",
            value
        )));
    }

    let rules = load_rules(mode, rules.as_deref())?;
    let class = RowClassifier::new(&rules).classify(&description, &currency);

    println!("   Category: {}", class.category.to_string().bright_blue());
    println!("   Currency: {}", class.currency.to_string().bright_blue());

    match FormulaGenerator::new(&rules).generate(class, value) {
        Decision::Rewrite(rewrite) => {
            println!("   Target:   {}", rewrite.column.to_string().bold());
            println!("   Output:   {}", rewrite.output.to_string().bold().green());
            println!("   Format:   {}", rewrite.number_format);
        }
        Decision::Skip(reason) => {
            println!("   {} {}", "Skipped:".yellow(), reason);
        }
    }

    Ok(())
}

/// Execute the rules command: print a rule set as YAML
pub fn rules(mode: Mode, rules: Option<PathBuf>) -> CambioResult<()> {
    let rules = load_rules(mode, rules.as_deref())?;
    print!("{}", rules.to_yaml()?);
    Ok(())
}

/// Execute the sheets command
pub fn sheets(file: PathBuf) -> CambioResult<()> {
    let session = Session::open(&file)?;
    for (idx, name) in session.sheet_names().iter().enumerate() {
        let rows = session
            .workbook()
            .sheet(name)
            .map(|s| s.max_row())
            .unwrap_or(0);
        println!("   {}. {} ({} rows)", idx + 1, name.bright_blue(), rows);
    }
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
