//! Cambio - exchange-rate formulas for accounting workbooks
//!
//! This library rewrites the rows of an accounting sheet according to a rule
//! set: each row's description and currency decide which column receives a
//! formula such as `=1000.0*0.79*TC`, where `TC` and `EUR` are names defined
//! in the workbook itself.
//!
//! # Features
//!
//! - Three rule presets (OC Clientes, Despachos / Tr_Exterior, OC Nacionales)
//!   behind one configurable `RuleSet`, loadable from YAML
//! - Lenient rows: non-numeric values are skipped and listed, never fatal
//! - Date and centering formatting for the date and description columns
//! - Output saved under a new name; the source workbook is never written
//!
//! # Example
//!
//! ```no_run
//! use cambio::excel::OutputNaming;
//! use cambio::rules::Mode;
//! use cambio::session::Session;
//!
//! let mut session = Session::open("movimientos.xlsx")?;
//! let outcome = session.run(None, &Mode::Despachos.rule_set(), OutputNaming::Timestamp)?;
//!
//! println!("Rows rewritten: {}", outcome.report.rows_rewritten);
//! println!("Saved to: {}", outcome.output.display());
//! # Ok::<(), cambio::error::CambioError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod rules;
pub mod session;
pub mod types;

// Re-export commonly used types
pub use error::{CambioError, CambioResult};
pub use rules::{Mode, RuleSet};
pub use session::{RunOutcome, Session};
pub use types::{Cell, CellValue, ColumnRef, Sheet, Workbook};
