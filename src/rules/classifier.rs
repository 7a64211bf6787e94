//! Row Classifier: description and currency text → rule category

use super::config::RuleSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Customs dispatch: fixed factor plus exchange multiplier
    Despachos,
    /// Foreign transfer: exchange multiplier only
    TrExterior,
    /// Non-empty description matching no keyword
    GenericNonEmpty,
    /// Blank description; the row is skipped
    Empty,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Despachos => "DESPACHOS",
            Category::TrExterior => "TR_EXTERIOR",
            Category::GenericNonEmpty => "GENERIC",
            Category::Empty => "EMPTY",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Usd,
    Eur,
    Ars,
    /// Any other code
    Other,
    /// Blank cell; rated like `Other` unless the rule set says otherwise
    Blank,
}

impl Currency {
    /// Exact match after trimming and uppercasing
    pub fn parse(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "" => Currency::Blank,
            "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            "ARS" => Currency::Ars,
            _ => Currency::Other,
        }
    }

    pub fn is_local(self) -> bool {
        self == Currency::Ars
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ars => "ARS",
            Currency::Other => "OTHER",
            Currency::Blank => "(blank)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub currency: Currency,
}

pub struct RowClassifier<'a> {
    rules: &'a RuleSet,
    keywords: Vec<(String, Category)>,
}

impl<'a> RowClassifier<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        let keywords = rules
            .keywords
            .iter()
            .map(|k| (k.keyword.trim().to_uppercase(), k.category))
            .collect();
        Self { rules, keywords }
    }

    pub fn classify(&self, description: &str, currency: &str) -> Classification {
        Classification {
            category: self.category(description),
            currency: Currency::parse(currency),
        }
    }

    fn category(&self, description: &str) -> Category {
        if !self.rules.match_descriptions {
            return Category::GenericNonEmpty;
        }

        let normalized = description.trim().to_uppercase();
        if normalized.is_empty() {
            return Category::Empty;
        }

        self.keywords
            .iter()
            .find(|(keyword, _)| normalized.contains(keyword.as_str()))
            .map(|(_, category)| *category)
            .unwrap_or(Category::GenericNonEmpty)
    }
}
