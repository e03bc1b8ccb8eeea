//! Machine-learned land-use scorer interface and an inference-only linear
//! text model loaded from exported weights.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Class index and its probability from one inference call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class_index: usize,
    /// Probability of `class_index`, in `[0, 1]`.
    pub confidence: f64,
}

/// A trained land-use model. Only inference is required.
pub trait LandUseModel: Send + Sync {
    /// Score the combined `"name place_type"` text.
    fn predict(&self, text: &str) -> Result<Prediction, ModelError>;

    /// Label for a class index, `None` when the index is unknown.
    fn label_for(&self, class_index: usize) -> Option<&str>;
}

/// Characters the training tokenizer treats as separators.
const FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

fn default_max_sequence_length() -> usize {
    20
}

/// Bag-of-words softmax classifier exported from the training pipeline.
///
/// Tokens are looked up in `word_index` (1-based, as the training tokenizer
/// assigns them); indices `>= num_words` are dropped, and only the last
/// `max_sequence_length` tokens are kept. Each kept token adds its weight row
/// to the class logits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagOfWordsModel {
    pub labels: Vec<String>,
    pub word_index: HashMap<String, usize>,
    #[serde(default)]
    pub num_words: Option<usize>,
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    /// `weights[word_index][class]`.
    pub weights: Vec<Vec<f64>>,
    /// One bias per class.
    pub bias: Vec<f64>,
}

impl BagOfWordsModel {
    /// Load and validate an exported model.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let text = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&text)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let classes = self.labels.len();
        if classes == 0 {
            return Err(ModelError::Shape("model has no labels".into()));
        }
        if self.bias.len() != classes {
            return Err(ModelError::Shape(format!("bias has {} entries, expected {classes}", self.bias.len())));
        }
        if let Some(row) = self.weights.iter().position(|r| r.len() != classes) {
            return Err(ModelError::Shape(format!(
                "weight row {row} has {} entries, expected {classes}",
                self.weights[row].len()
            )));
        }
        Ok(())
    }

    pub fn num_classes(&self) -> usize {
        self.labels.len()
    }

    /// Lower-case, split on whitespace and filter characters.
    pub fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| c.is_whitespace() || FILTERS.contains(c))
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Word indices fed to the classifier, oldest tokens truncated first.
    pub fn encode(&self, text: &str) -> Vec<usize> {
        let limit = self.num_words.unwrap_or(usize::MAX);
        let seq: Vec<usize> = Self::tokenize(text)
            .iter()
            .filter_map(|t| self.word_index.get(t).copied())
            .filter(|&i| i < limit)
            .collect();
        let skip = seq.len().saturating_sub(self.max_sequence_length);
        seq[skip..].to_vec()
    }

    /// Class probabilities for `text`.
    pub fn probabilities(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        let mut logits = self.bias.clone();
        for idx in self.encode(text) {
            let row = self
                .weights
                .get(idx)
                .ok_or_else(|| ModelError::Inference(format!("word index {idx} has no weight row")))?;
            for (l, w) in logits.iter_mut().zip(row) {
                *l += w;
            }
        }
        Ok(softmax(&logits))
    }
}

fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl LandUseModel for BagOfWordsModel {
    fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        let probs = self.probabilities(text)?;
        // argmax, first index on ties
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in probs.iter().enumerate() {
            if best.map_or(true, |(_, b)| p > b) {
                best = Some((i, p));
            }
        }
        let (class_index, confidence) =
            best.ok_or_else(|| ModelError::Inference("empty probability vector".into()))?;
        if !confidence.is_finite() {
            return Err(ModelError::Inference(format!("non-finite confidence {confidence}")));
        }
        Ok(Prediction { class_index, confidence })
    }

    fn label_for(&self, class_index: usize) -> Option<&str> {
        self.labels.get(class_index).map(String::as_str)
    }
}
