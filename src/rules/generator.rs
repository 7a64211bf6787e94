//! Formula Generator: classified row + source value → cell rewrite
//!
//! Formulas reference the workbook names `TC` and `EUR` (configurable) and are
//! emitted as plain text; the spreadsheet application evaluates them.

use super::classifier::{Category, Classification, Currency};
use super::config::{LocalCurrency, RuleSet, UnknownCurrency};
use crate::types::{CellValue, ColumnRef};
use std::fmt;

/// New content for the target cell
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Formula(String),
    Number(f64),
    /// Value left as is; only the number format changes
    Keep,
}

impl Output {
    /// Cell value to store, or `None` when the existing value stays
    pub fn into_value(self) -> Option<CellValue> {
        match self {
            Output::Formula(text) => Some(CellValue::Formula(text)),
            Output::Number(n) => Some(CellValue::Number(n)),
            Output::Keep => None,
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Formula(text) => f.write_str(text),
            Output::Number(n) => write!(f, "{}", formula_literal(*n)),
            Output::Keep => f.write_str("(unchanged)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub column: ColumnRef,
    pub output: Output,
    pub number_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    EmptyDescription,
    Unmatched,
    UnknownCurrency,
    BlankCurrency,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::EmptyDescription => "empty description",
            SkipReason::Unmatched => "description matches no keyword",
            SkipReason::UnknownCurrency => "unrecognised currency",
            SkipReason::BlankCurrency => "blank currency",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Rewrite(Rewrite),
    Skip(SkipReason),
}

/// Render a value the way it appears inside generated formulas
///
/// Examples:
/// - 1000 → `1000.0`
/// - 12.5 → `12.5`
/// - -3 → `-3.0`
pub fn formula_literal(value: f64) -> String {
    format!("{:?}", value)
}

pub struct FormulaGenerator<'a> {
    rules: &'a RuleSet,
}

impl<'a> FormulaGenerator<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { rules }
    }

    /// `value` is the source column's number, read before anything in the row
    /// is written.
    pub fn generate(&self, class: Classification, value: f64) -> Decision {
        match class.category {
            Category::Empty => Decision::Skip(SkipReason::EmptyDescription),
            Category::Despachos => Decision::Rewrite(self.despachos(class.currency, value)),
            Category::TrExterior => self.transfer(self.rules.layout.primary, class.currency, value),
            Category::GenericNonEmpty => {
                if self.rules.match_descriptions && !self.rules.process_unmatched {
                    return Decision::Skip(SkipReason::Unmatched);
                }
                self.transfer(self.rules.generic_column(), class.currency, value)
            }
        }
    }

    fn despachos(&self, currency: Currency, value: f64) -> Rewrite {
        let base = format!(
            "={}*{}",
            formula_literal(value),
            self.rules.despachos_factor
        );

        let formula = if currency.is_local() {
            base
        } else if self.rules.despachos_always_tc {
            format!("{}*{}", base, self.rules.rates.default)
        } else {
            format!("{}*{}", base, self.rate_name(currency))
        };

        self.rewrite(self.rules.layout.primary, Output::Formula(formula))
    }

    fn transfer(&self, column: ColumnRef, currency: Currency, value: f64) -> Decision {
        let literal = formula_literal(value);

        let output = match currency {
            Currency::Ars => match self.rules.local_currency {
                LocalCurrency::Formula => Output::Formula(format!("={}", literal)),
                LocalCurrency::Literal => Output::Number(value),
                LocalCurrency::Keep => Output::Keep,
            },
            Currency::Usd | Currency::Eur => {
                Output::Formula(format!("={}*{}", literal, self.rate_name(currency)))
            }
            Currency::Other | Currency::Blank => {
                let (treatment, reason) = if currency == Currency::Blank {
                    (self.rules.blank_currency, SkipReason::BlankCurrency)
                } else {
                    (self.rules.unknown_currency, SkipReason::UnknownCurrency)
                };
                match treatment {
                    UnknownCurrency::Rate => {
                        Output::Formula(format!("={}*{}", literal, self.rules.rates.default))
                    }
                    UnknownCurrency::Keep => Output::Keep,
                    UnknownCurrency::Skip => return Decision::Skip(reason),
                }
            }
        };

        Decision::Rewrite(self.rewrite(column, output))
    }

    fn rate_name(&self, currency: Currency) -> &str {
        match currency {
            Currency::Usd => &self.rules.rates.usd,
            Currency::Eur => &self.rules.rates.eur,
            Currency::Ars | Currency::Other | Currency::Blank => &self.rules.rates.default,
        }
    }

    fn rewrite(&self, column: ColumnRef, output: Output) -> Rewrite {
        Rewrite {
            column,
            output,
            number_format: self.rules.number_format.clone(),
        }
    }
}
