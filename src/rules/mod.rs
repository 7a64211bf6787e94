//! Row rules: classification, formula generation, and their configuration

pub mod classifier;
pub mod config;
pub mod generator;

pub use classifier::{Category, Classification, Currency, RowClassifier};
pub use config::{
    ColumnLayout, KeywordRule, LocalCurrency, Mode, RateNames, RuleSet, Target, UnknownCurrency,
};
pub use generator::{formula_literal, Decision, FormulaGenerator, Output, Rewrite, SkipReason};
