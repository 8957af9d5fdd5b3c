//! Engine configuration
//!
//! Everything the engine treats as a batch constant (fund house, as-of date,
//! header offset, classification keywords) is injected through [`EngineConfig`]
//! so the same engine runs across fund houses and periods.

use crate::core::HeaderNormalizer;
use crate::error::{ConsolidationError, ConsolidationResult};
use crate::types::InstrumentType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for one consolidation batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fund house stamped on every record
    pub amc_name: String,
    /// As-of date of the disclosure
    pub reporting_date: NaiveDate,
    /// Zero-indexed worksheet row holding the column headers
    pub header_offset: usize,
    /// Sheet name (case-insensitive) that lists contents rather than holdings
    pub index_sheet: String,
    pub columns: ColumnKeys,
    pub classification: ClassificationRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amc_name: "Axis Mutual Fund".to_string(),
            reporting_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            header_offset: 3,
            index_sheet: "index".to_string(),
            columns: ColumnKeys::default(),
            classification: ClassificationRules::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document; omitted fields keep their defaults
    pub fn from_yaml_str(content: &str) -> ConsolidationResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ConsolidationResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_amc_name(mut self, amc_name: impl Into<String>) -> Self {
        self.amc_name = amc_name.into();
        self
    }

    pub fn with_reporting_date(mut self, date: NaiveDate) -> Self {
        self.reporting_date = date;
        self
    }

    pub fn with_header_offset(mut self, offset: usize) -> Self {
        self.header_offset = offset;
        self
    }

    /// Rewrite column keys and rule fields into header-key form, so a key
    /// written as it appears on the sheet ("Quantity", "ISIN Code") still matches
    pub fn normalize_keys(mut self, headers: &HeaderNormalizer) -> Self {
        let columns = &mut self.columns;
        for key in [
            &mut columns.instrument_code,
            &mut columns.quantity,
            &mut columns.market_fair_value,
            &mut columns.pct_to_net_assets,
        ] {
            *key = headers.normalize(key);
        }
        for rule in &mut self.classification.rules {
            rule.field = headers.normalize(&rule.field);
        }
        self
    }

    pub fn validate(&self) -> ConsolidationResult<()> {
        if self.amc_name.trim().is_empty() {
            return Err(ConsolidationError::Config(
                "amc_name must not be empty".to_string(),
            ));
        }
        self.columns.validate()?;
        self.classification.validate()
    }
}

/// Parse an ISO `YYYY-MM-DD` date as given on the command line
pub fn parse_reporting_date(value: &str) -> ConsolidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ConsolidationError::Config(format!("Invalid reporting date '{}': {}", value, e))
    })
}

/// Normalized column keys for the semantic fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnKeys {
    pub instrument_code: String,
    pub quantity: String,
    pub market_fair_value: String,
    pub pct_to_net_assets: String,
}

impl Default for ColumnKeys {
    fn default() -> Self {
        Self {
            instrument_code: "instrument_code".to_string(),
            quantity: "quantity".to_string(),
            market_fair_value: "market_fair_value_(rs._in_lakhs)".to_string(),
            pct_to_net_assets: "%_to_net_assets".to_string(),
        }
    }
}

impl ColumnKeys {
    fn validate(&self) -> ConsolidationResult<()> {
        let keys = [
            ("instrument_code", &self.instrument_code),
            ("quantity", &self.quantity),
            ("market_fair_value", &self.market_fair_value),
            ("pct_to_net_assets", &self.pct_to_net_assets),
        ];
        for (field, key) in keys {
            if key.trim().is_empty() {
                return Err(ConsolidationError::Config(format!(
                    "columns.{} must not be empty",
                    field
                )));
            }
        }
        Ok(())
    }
}

/// One classification rule: `field` contains any of `keywords` → `category`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    pub field: String,
    pub keywords: Vec<String>,
    pub category: InstrumentType,
}

impl ClassificationRule {
    pub fn new(field: &str, keywords: &[&str], category: InstrumentType) -> Self {
        Self {
            field: field.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            category,
        }
    }
}

/// Ordered rule list, evaluated first match wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    pub rules: Vec<ClassificationRule>,
    pub fallback: InstrumentType,
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule::new(
                    "rating",
                    &["aaa", "aa", "crisil"],
                    InstrumentType::Debt,
                ),
                ClassificationRule::new(
                    "name_of_the_instrument",
                    &["%", "bond", "government"],
                    InstrumentType::Debt,
                ),
            ],
            fallback: InstrumentType::Other,
        }
    }
}

impl ClassificationRules {
    fn validate(&self) -> ConsolidationResult<()> {
        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.field.trim().is_empty() {
                return Err(ConsolidationError::Config(format!(
                    "classification rule {} has no field",
                    idx
                )));
            }
            if rule.keywords.iter().all(|k| k.is_empty()) {
                return Err(ConsolidationError::Config(format!(
                    "classification rule {} ({}) has no keywords",
                    idx, rule.field
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.amc_name, "Axis Mutual Fund");
        assert_eq!(config.header_offset, 3);
        assert_eq!(
            config.reporting_date,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert_eq!(config.classification.rules.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
amc_name: "HDFC Mutual Fund"
reporting_date: 2026-01-31
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.amc_name, "HDFC Mutual Fund");
        assert_eq!(
            config.reporting_date,
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        // untouched fields keep defaults
        assert_eq!(config.header_offset, 3);
        assert_eq!(config.columns.quantity, "quantity");
    }

    #[test]
    fn test_yaml_custom_rules() {
        let yaml = r#"
classification:
  fallback: Other
  rules:
    - field: name_of_the_instrument
      keywords: ["treps", "reverse repo"]
      category: Money Market
"#;
        let config = EngineConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.classification.rules.len(), 1);
        assert_eq!(
            config.classification.rules[0].category,
            InstrumentType::Custom("Money Market".to_string())
        );
    }

    #[test]
    fn test_rule_without_keywords_rejected() {
        let yaml = r#"
classification:
  rules:
    - field: rating
      keywords: []
      category: Debt
"#;
        let result = EngineConfig::from_yaml_str(yaml);
        assert!(matches!(result, Err(ConsolidationError::Config(_))));
    }

    #[test]
    fn test_empty_amc_rejected() {
        let config = EngineConfig::default().with_amc_name("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_reporting_date() {
        assert_eq!(
            parse_reporting_date("2025-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert!(parse_reporting_date("31/12/2025").is_err());
    }

    #[test]
    fn test_normalize_keys_accepts_sheet_spelling() {
        let yaml = r#"
columns:
  instrument_code: "ISIN Code"
  quantity: " Quantity "
  market_fair_value: "Market Value\n(Rs. in Lakhs)"
classification:
  rules:
    - field: "Issuer / Rating"
      keywords: ["aaa"]
      category: Debt
"#;
        let config = EngineConfig::from_yaml_str(yaml)
            .unwrap()
            .normalize_keys(&HeaderNormalizer::new().unwrap());
        assert_eq!(config.columns.instrument_code, "isin_code");
        assert_eq!(config.columns.quantity, "quantity");
        assert_eq!(config.columns.market_fair_value, "market_value_(rs._in_lakhs)");
        assert_eq!(config.columns.pct_to_net_assets, "%_to_net_assets");
        assert_eq!(config.classification.rules[0].field, "issuer_rating");
    }

    #[test]
    fn test_normalize_keys_keeps_defaults() {
        let config = EngineConfig::default();
        let normalized = config
            .clone()
            .normalize_keys(&HeaderNormalizer::new().unwrap());
        assert_eq!(normalized, config);
    }
}
