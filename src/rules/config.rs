//! Rule configuration: one `RuleSet` value describes every rewrite pass.
//!
//! The three passes the tool offers (`conditional`, `despachos`, `national`)
//! are presets of the same structure, so they share one classifier and one
//! generator instead of three copies of the row loop.

use super::classifier::Category;
use crate::error::{CambioError, CambioResult};
use crate::types::ColumnRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_NUMBER_FORMAT: &str = "#,##0";
pub const DEFAULT_DATE_FORMAT: &str = "DD/MM/YY";
pub const DESPACHOS_FACTOR: f64 = 0.79;

//==============================================================================
// Mode
//==============================================================================

/// Which rewrite pass to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// OC Clientes: clear E, DESPACHOS rows into E, everything else rewritten in F
    Conditional,
    /// Despachos / Tr_Exterior rows into E, with the EUR rate for EUR rows
    #[default]
    Despachos,
    /// OC Nacionales: currency-only rule into E, description ignored
    National,
}

impl Mode {
    pub fn rule_set(self) -> RuleSet {
        match self {
            Mode::Conditional => RuleSet::conditional(),
            Mode::Despachos => RuleSet::despachos(),
            Mode::National => RuleSet::national(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Conditional => "conditional",
            Mode::Despachos => "despachos",
            Mode::National => "national",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = CambioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conditional" | "oc_clientes" => Ok(Mode::Conditional),
            "despachos" | "tr_exterior" => Ok(Mode::Despachos),
            "national" | "oc_nacionales" => Ok(Mode::National),
            other => Err(CambioError::Config(format!("unknown mode '{}'", other))),
        }
    }
}

//==============================================================================
// Rule Set
//==============================================================================

/// Description keyword mapped to a category (substring match after uppercasing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub category: Category,
}

impl KeywordRule {
    pub fn new(keyword: &str, category: Category) -> Self {
        Self {
            keyword: keyword.to_string(),
            category,
        }
    }
}

/// Named spreadsheet references used as multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateNames {
    pub usd: String,
    pub eur: String,
    /// Used for unrecognised currencies, and for every foreign currency on
    /// DESPACHOS rows when `despachos_always_tc` is set
    pub default: String,
}

impl Default for RateNames {
    fn default() -> Self {
        Self {
            usd: "TC".to_string(),
            eur: "EUR".to_string(),
            default: "TC".to_string(),
        }
    }
}

/// ARS treatment for non-DESPACHOS rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalCurrency {
    /// `=value`
    Formula,
    /// The number itself
    Literal,
    /// Leave the value alone, only apply the number format
    Keep,
}

/// Treatment of currencies other than USD/EUR/ARS on non-DESPACHOS rows; used
/// separately for unrecognised codes and for a blank currency cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCurrency {
    /// Multiply by `rates.default`
    Rate,
    /// Leave the value alone, only apply the number format
    Keep,
    /// Leave the row untouched
    Skip,
}

/// Column letters of the accounting layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub description: ColumnRef,
    pub primary: ColumnRef,
    pub value: ColumnRef,
    pub currency: ColumnRef,
    pub date: ColumnRef,
    pub center: ColumnRef,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            description: ColumnRef::B,
            primary: ColumnRef::E,
            value: ColumnRef::F,
            currency: ColumnRef::G,
            date: ColumnRef::A,
            center: ColumnRef::B,
        }
    }
}

/// Where generic rows are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The layout's primary column (E)
    Primary,
    /// The layout's value column (F), overwriting the source value
    Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Ordered; the first keyword contained in the description wins
    pub keywords: Vec<KeywordRule>,
    /// When false every row is generic, whatever its description
    pub match_descriptions: bool,
    /// Rewrite non-empty descriptions that match no keyword
    pub process_unmatched: bool,
    pub despachos_factor: f64,
    /// DESPACHOS rows in any foreign currency use `rates.default`
    pub despachos_always_tc: bool,
    pub rates: RateNames,
    pub generic_target: Target,
    pub local_currency: LocalCurrency,
    pub unknown_currency: UnknownCurrency,
    pub blank_currency: UnknownCurrency,
    /// Column emptied before the pass
    pub clear_column: Option<ColumnRef>,
    pub layout: ColumnLayout,
    pub number_format: String,
    pub date_format: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::despachos()
    }
}

impl RuleSet {
    /// OC Clientes pass
    pub fn conditional() -> Self {
        Self {
            keywords: vec![KeywordRule::new("DESPACHOS", Category::Despachos)],
            match_descriptions: true,
            process_unmatched: true,
            despachos_factor: DESPACHOS_FACTOR,
            despachos_always_tc: true,
            rates: RateNames::default(),
            generic_target: Target::Value,
            local_currency: LocalCurrency::Keep,
            unknown_currency: UnknownCurrency::Keep,
            blank_currency: UnknownCurrency::Skip,
            clear_column: Some(ColumnRef::E),
            layout: ColumnLayout::default(),
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Despachos / Tr_Exterior pass
    pub fn despachos() -> Self {
        Self {
            keywords: vec![
                KeywordRule::new("DESPACHOS", Category::Despachos),
                KeywordRule::new("TR_EXTERIOR", Category::TrExterior),
            ],
            match_descriptions: true,
            process_unmatched: false,
            despachos_factor: DESPACHOS_FACTOR,
            despachos_always_tc: false,
            rates: RateNames::default(),
            generic_target: Target::Primary,
            local_currency: LocalCurrency::Formula,
            unknown_currency: UnknownCurrency::Rate,
            blank_currency: UnknownCurrency::Rate,
            clear_column: None,
            layout: ColumnLayout::default(),
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// OC Nacionales pass
    pub fn national() -> Self {
        Self {
            keywords: Vec::new(),
            match_descriptions: false,
            process_unmatched: true,
            despachos_factor: DESPACHOS_FACTOR,
            despachos_always_tc: false,
            rates: RateNames::default(),
            generic_target: Target::Primary,
            local_currency: LocalCurrency::Literal,
            unknown_currency: UnknownCurrency::Skip,
            blank_currency: UnknownCurrency::Skip,
            clear_column: None,
            layout: ColumnLayout::default(),
            number_format: DEFAULT_NUMBER_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Load a rule file. Fields left out take the `despachos` preset's values.
    pub fn from_yaml_file(path: &Path) -> CambioResult<Self> {
        Self::from_yaml_file_over(path, Self::default())
    }

    /// Load a rule file on top of `base`: fields left out keep `base`'s values
    pub fn from_yaml_file_over(path: &Path, base: RuleSet) -> CambioResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CambioError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str_over(&content, base)
    }

    pub fn from_yaml_str(content: &str) -> CambioResult<Self> {
        Self::from_yaml_str_over(content, Self::default())
    }

    /// Nested mappings (`rates`, `layout`) merge key by key; lists such as
    /// `keywords` replace the base list whole.
    pub fn from_yaml_str_over(content: &str, base: RuleSet) -> CambioResult<Self> {
        let overrides: serde_yaml::Value = serde_yaml::from_str(content)?;
        let mut merged = serde_yaml::to_value(&base)?;
        if !overrides.is_null() {
            overlay(&mut merged, overrides);
        }

        let rules: RuleSet = serde_yaml::from_value(merged)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_yaml(&self) -> CambioResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> CambioResult<()> {
        for rule in &self.keywords {
            if rule.keyword.trim().is_empty() {
                return Err(CambioError::Config("keyword must not be empty".to_string()));
            }
            if matches!(rule.category, Category::Empty | Category::GenericNonEmpty) {
                return Err(CambioError::Config(format!(
                    "keyword '{}' must map to despachos or tr_exterior",
                    rule.keyword
                )));
            }
        }

        for (label, name) in [
            ("usd", &self.rates.usd),
            ("eur", &self.rates.eur),
            ("default", &self.rates.default),
        ] {
            if name.trim().is_empty() {
                return Err(CambioError::Config(format!(
                    "rate name '{}' must not be empty",
                    label
                )));
            }
        }

        if !self.despachos_factor.is_finite() || self.despachos_factor <= 0.0 {
            return Err(CambioError::Config(format!(
                "despachos_factor must be a positive number, got {}",
                self.despachos_factor
            )));
        }

        if self.number_format.trim().is_empty() {
            return Err(CambioError::Config("number_format must not be empty".to_string()));
        }

        Ok(())
    }

    /// Resolved column for generic rows
    pub fn generic_column(&self) -> ColumnRef {
        match self.generic_target {
            Target::Primary => self.layout.primary,
            Target::Value => self.layout.value,
        }
    }
}

fn overlay(base: &mut serde_yaml::Value, overrides: serde_yaml::Value) {
    match (base, overrides) {
        (serde_yaml::Value::Mapping(base), serde_yaml::Value::Mapping(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overrides) => *base = overrides,
    }
}
