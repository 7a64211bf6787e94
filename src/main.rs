use cambio::cli;
use cambio::excel::OutputNaming;
use cambio::rules::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cambio")]
#[command(about = "Rewrite accounting rows into exchange-rate formulas.")]
#[command(long_about = "Cambio - exchange-rate formulas for accounting workbooks

Reads description (B), value (F) and currency (G) of every row, writes a
formula referencing the workbook names TC and EUR, and saves the result under
a new name. The source workbook is never modified.

COMMANDS:
  apply     - Rewrite a workbook and save a copy
  classify  - Show what a single row would become
  rules     - Print a rule set as YAML (start of a custom rules file)
  sheets    - List the sheets of a workbook

MODES:
  conditional - OC Clientes: clear E, DESPACHOS into E, other rows in F
  despachos   - DESPACHOS / TR_EXTERIOR rows into E (default)
  national    - OC Nacionales: currency-only rule into E

EXAMPLES:
  cambio apply libro.xlsx                          # despachos pass
  cambio apply libro.xlsx --mode conditional --naming suffix
  cambio classify \"Despachos Enero\" USD 1000
  cambio rules --mode national > reglas.yaml
  cambio apply libro.xlsx --rules reglas.yaml

Set CAMBIO_LOG (e.g. CAMBIO_LOG=cambio=debug) for per-row logging.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Apply a rule set to one sheet and save a copy.

The copy is written next to the source as <name>_<YYYY-MM-DD_HH-MM><ext>
(or <name>_modificado<ext> with --naming suffix). If that name is taken a
counter is appended. Rows whose value column is not a number are left as
they are.

Use --dry-run to see the row counts without writing anything.")]
    /// Rewrite a workbook and save a copy
    Apply {
        /// Path to the workbook (.xlsx, .xlsm, .xltx, .xltm)
        file: PathBuf,

        /// Rule preset
        #[arg(short, long, value_enum, default_value_t = Mode::Despachos, env = "CAMBIO_MODE")]
        mode: Mode,

        /// Sheet to rewrite (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// YAML rule file; fields it leaves out come from --mode
        #[arg(short, long, env = "CAMBIO_RULES")]
        rules: Option<PathBuf>,

        /// Output file naming
        #[arg(long, value_enum, default_value_t = OutputNaming::Timestamp)]
        naming: OutputNaming,

        /// Report without writing the output file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show what a single row would become
    Classify {
        /// Description text (column B)
        description: String,

        /// Currency code (column G)
        currency: String,

        /// Source value (column F)
        #[arg(allow_negative_numbers = true, value_parser = parse_finite)]
        value: f64,

        /// Rule preset
        #[arg(short, long, value_enum, default_value_t = Mode::Despachos, env = "CAMBIO_MODE")]
        mode: Mode,

        /// YAML rule file; fields it leaves out come from --mode
        #[arg(short, long, env = "CAMBIO_RULES")]
        rules: Option<PathBuf>,
    },

    /// Print a rule set as YAML
    Rules {
        /// Rule preset
        #[arg(short, long, value_enum, default_value_t = Mode::Despachos, env = "CAMBIO_MODE")]
        mode: Mode,

        /// YAML rule file to validate and print (on top of --mode)
        #[arg(short, long)]
        rules: Option<PathBuf>,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Path to the workbook
        file: PathBuf,
    },
}

/// Cell values are only eligible when finite; `NaN` and `inf` are refused
fn parse_finite(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("{} is not a finite number", s)),
        Err(e) => Err(e.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "cambio=info" } else { "cambio=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CAMBIO_LOG").unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Apply { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Apply {
            file,
            mode,
            sheet,
            rules,
            naming,
            dry_run,
            verbose,
        } => {
            cli::apply(cli::ApplyOptions {
                file,
                mode,
                sheet,
                rules,
                naming,
                dry_run,
                verbose,
            })?;
        }

        Commands::Classify {
            description,
            currency,
            value,
            mode,
            rules,
        } => cli::classify(description, currency, value, mode, rules)?,

        Commands::Rules { mode, rules } => cli::rules(mode, rules)?,

        Commands::Sheets { file } => cli::sheets(file)?,
    }

    Ok(())
}
