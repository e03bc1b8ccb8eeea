pub mod hybrid;
pub mod model;
pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use hybrid::classify_place;

/// Which classifier produced a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionSource {
    #[serde(rename = "model")]
    Model,
    #[serde(rename = "rule-based")]
    RuleBased,
}

impl PredictionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::RuleBased => "rule-based",
        }
    }
}

impl fmt::Display for PredictionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: String,
    pub source: PredictionSource,
}

impl ClassificationResult {
    pub fn rule_based(category: &str) -> Self {
        Self { category: category.to_string(), source: PredictionSource::RuleBased }
    }

    pub fn model(category: &str) -> Self {
        Self { category: category.to_string(), source: PredictionSource::Model }
    }
}
