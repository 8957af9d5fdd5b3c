//! Instrument classification
//!
//! A heuristic, not a taxonomy: an ordered list of (field, keywords, category)
//! rules evaluated first match wins. Matching is a lower-cased substring test.

use crate::config::{ClassificationRule, ClassificationRules};
use crate::types::{CellValue, InstrumentType};

struct CompiledRule {
    field: String,
    keywords: Vec<String>,
    category: InstrumentType,
}

impl CompiledRule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

pub struct Classifier {
    rules: Vec<CompiledRule>,
    fallback: InstrumentType,
}

impl Classifier {
    pub fn new(config: &ClassificationRules) -> Self {
        let rules = config.rules.iter().map(compile).collect();
        Self {
            rules,
            fallback: config.fallback.clone(),
        }
    }

    /// Classify a record given a lookup from normalized column name to cell
    pub fn classify<'c, F>(&self, lookup: F) -> InstrumentType
    where
        F: Fn(&str) -> Option<&'c CellValue>,
    {
        for rule in &self.rules {
            let text = lookup(&rule.field)
                .map(|cell| cell.render().to_lowercase())
                .unwrap_or_default();
            if rule.matches(&text) {
                return rule.category.clone();
            }
        }
        self.fallback.clone()
    }
}

fn compile(rule: &ClassificationRule) -> CompiledRule {
    CompiledRule {
        field: rule.field.clone(),
        keywords: rule
            .keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| k.to_lowercase())
            .collect(),
        category: rule.category.clone(),
    }
}
