//! Column header normalization
//!
//! Disclosure headers arrive as display text ("Market Fair Value\n(Rs. in Lakhs)",
//! "% to Net Assets"). They are turned into stable machine keys: trimmed,
//! lower-cased, with runs of whitespace and slashes collapsed to one `_`.

use crate::error::{ConsolidationError, ConsolidationResult};
use regex::Regex;

pub struct HeaderNormalizer {
    separators: Regex,
}

impl HeaderNormalizer {
    pub fn new() -> ConsolidationResult<Self> {
        let separators = Regex::new(r"[\s/]+")
            .map_err(|e| ConsolidationError::Config(format!("Regex error: {}", e)))?;
        Ok(Self { separators })
    }

    /// Normalize a single header; applying it twice equals applying it once
    pub fn normalize(&self, header: &str) -> String {
        let lowered = header.trim().to_lowercase();
        self.separators.replace_all(&lowered, "_").into_owned()
    }

    /// Normalize a header row, suffixing repeats with `.1`, `.2`, ...
    pub fn normalize_all(&self, headers: &[String]) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(headers.len());
        for header in headers {
            let base = self.normalize(header);
            let mut key = base.clone();
            let mut n = 1;
            while keys.contains(&key) {
                key = format!("{}.{}", base, n);
                n += 1;
            }
            keys.push(key);
        }
        keys
    }
}
