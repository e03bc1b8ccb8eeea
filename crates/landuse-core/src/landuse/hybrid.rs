//! Confidence-gated arbitration between a learned model and keyword rules.
//!
//! Per call:
//!   - no model                      → rules
//!   - model error                   → rules (error swallowed)
//!   - confidence < 0.5 or non-finite → rules
//!   - otherwise                     → model label, `Others` for an unknown index
use tracing::debug;

use super::model::LandUseModel;
use super::rules::{classify_land_use, OTHERS};
use super::ClassificationResult;

/// Predictions below this probability are replaced by the rule result.
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Classify one place. `model` is optional; its absence is not an error.
pub fn classify_place(name: &str, place_type: &str, model: Option<&dyn LandUseModel>) -> ClassificationResult {
    let Some(model) = model else {
        return ClassificationResult::rule_based(classify_land_use(name, place_type));
    };

    let text = format!("{name} {place_type}");
    let prediction = match model.predict(&text) {
        Ok(p) => p,
        Err(e) => {
            debug!(name, place_type, error = %e, "prediction failed, using rules");
            return ClassificationResult::rule_based(classify_land_use(name, place_type));
        }
    };

    if !prediction.confidence.is_finite() || prediction.confidence < CONFIDENCE_THRESHOLD {
        debug!(name, confidence = prediction.confidence, "low confidence, using rules");
        return ClassificationResult::rule_based(classify_land_use(name, place_type));
    }

    let label = model.label_for(prediction.class_index).unwrap_or(OTHERS);
    ClassificationResult::model(label)
}

/// Holds an optional model so a caller can keep one classifier value.
#[derive(Default)]
pub struct HybridClassifier {
    model: Option<Box<dyn LandUseModel>>,
}

impl HybridClassifier {
    /// Rules only.
    pub fn rules_only() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Box<dyn LandUseModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&dyn LandUseModel> {
        self.model.as_deref()
    }

    pub fn classify(&self, name: &str, place_type: &str) -> ClassificationResult {
        classify_place(name, place_type, self.model())
    }
}

impl std::fmt::Debug for HybridClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridClassifier").field("has_model", &self.has_model()).finish()
    }
}
