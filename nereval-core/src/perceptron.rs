//! # Averaged Perceptron Tagger
//!
//! Online, mistake-driven tagger over the sparse features of
//! [`crate::features`]. Uses lazy averaging so a weight's running total is
//! only touched when that weight changes.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::features::{self, FeatureVector, Gazetteers};
use crate::seed::TaggedSentence;
use crate::tokenizer::Token;

/// Averaged perceptron over `(feature, tag)` weights.
///
/// After [`PerceptronModel::train`] the weights hold the average over every
/// training step, which is far more stable than the last weight vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptronModel {
    /// Current weights: (feature_name, tag) -> weight.
    weights: HashMap<(String, String), f64>,
    /// Accumulated weights: (feature_name, tag) -> sum of w_t.
    total_weights: HashMap<(String, String), f64>,
    /// Step at which each weight last changed.
    last_update: HashMap<(String, String), usize>,
    steps: usize,
    tags: Vec<String>,
}

impl PerceptronModel {
    pub fn new() -> Self {
        Self {
            weights: HashMap::new(),
            total_weights: HashMap::new(),
            last_update: HashMap::new(),
            steps: 0,
            tags: Vec::new(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Trains for `iterations` passes over `corpus`, then averages.
    ///
    /// Per token: predict with the current weights, and on a mistake promote
    /// the gold tag's features and demote the predicted tag's.
    pub fn train(&mut self, corpus: &[TaggedSentence], gazetteers: &Gazetteers, iterations: usize) {
        let tag_set: BTreeSet<&String> = corpus.iter().flat_map(|s| s.tags.iter()).collect();
        self.tags = tag_set.into_iter().cloned().collect();

        for _ in 0..iterations {
            for sentence in corpus {
                let tokens = tokens_from_words(&sentence.words);
                let feature_vectors = features::extract_features(&tokens, gazetteers);

                for (fv, true_tag) in feature_vectors.iter().zip(&sentence.tags) {
                    let pred_tag = self.predict_single(fv);
                    if &pred_tag != true_tag {
                        self.update(fv, true_tag, &pred_tag);
                    }
                    self.steps += 1;
                }
            }
        }

        self.finalize_weights();
    }

    fn predict_single(&self, fv: &FeatureVector) -> String {
        let mut best_tag = self.tags.first().cloned().unwrap_or_else(|| "O".to_string());
        let mut best_score = f64::NEG_INFINITY;

        for tag in &self.tags {
            let score = self.score_tag(fv, tag);
            if score > best_score {
                best_score = score;
                best_tag = tag.clone();
            }
        }
        best_tag
    }

    fn score_tag(&self, fv: &FeatureVector, tag: &str) -> f64 {
        fv.features
            .iter()
            .filter_map(|(fname, fval)| {
                self.weights
                    .get(&(fname.clone(), tag.to_string()))
                    .map(|w| w * fval)
            })
            .sum()
    }

    fn update(&mut self, fv: &FeatureVector, true_tag: &str, pred_tag: &str) {
        for fname in fv.features.keys() {
            self.update_feature(fname, true_tag, 1.0);
            self.update_feature(fname, pred_tag, -1.0);
        }
    }

    /// Lazy averaging: credit the old weight for the steps it was unchanged,
    /// then apply `delta`.
    fn update_feature(&mut self, fname: &str, tag: &str, delta: f64) {
        let key = (fname.to_string(), tag.to_string());

        let current_w = *self.weights.get(&key).unwrap_or(&0.0);
        let last_step = *self.last_update.get(&key).unwrap_or(&0);
        let steps_since_update = (self.steps - last_step) as f64;

        *self.total_weights.entry(key.clone()).or_insert(0.0) += steps_since_update * current_w;
        self.last_update.insert(key.clone(), self.steps);

        *self.weights.entry(key).or_insert(0.0) += delta;
    }

    fn finalize_weights(&mut self) {
        let keys: Vec<(String, String)> = self.weights.keys().cloned().collect();

        for key in keys {
            let current_w = *self.weights.get(&key).unwrap_or(&0.0);
            let last_step = *self.last_update.get(&key).unwrap_or(&0);
            let steps_since_update = (self.steps - last_step) as f64;

            *self.total_weights.entry(key).or_insert(0.0) += steps_since_update * current_w;
        }

        let steps_f64 = self.steps as f64;
        if steps_f64 > 0.0 {
            for (key, total) in &self.total_weights {
                self.weights.insert(key.clone(), total / steps_f64);
            }
        }

        self.total_weights.clear();
        self.last_update.clear();
    }

    /// Tags every token with the averaged weights.
    pub fn predict(&self, tokens: &[Token], gazetteers: &Gazetteers) -> Vec<String> {
        features::extract_features(tokens, gazetteers)
            .iter()
            .map(|fv| self.predict_single(fv))
            .collect()
    }
}

impl Default for PerceptronModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokens without offsets, for training on pre-split words.
pub(crate) fn tokens_from_words(words: &[String]) -> Vec<Token> {
    words
        .iter()
        .enumerate()
        .map(|(i, text)| Token {
            text: text.clone(),
            start: 0,
            end: 0,
            index: i,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn sentence(pairs: &[(&str, &str)]) -> TaggedSentence {
        TaggedSentence {
            words: pairs.iter().map(|(w, _)| w.to_string()).collect(),
            tags: pairs.iter().map(|(_, t)| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_perceptron_learning_lazy() {
        let corpus = vec![sentence(&[("Tom", "B-PER"), ("schläft", "O"), (".", "O")])];

        let mut model = PerceptronModel::new();
        model.train(&corpus, &Gazetteers::default(), 5);

        let tags = model.predict(&tokenize("Tom schläft"), &Gazetteers::default());
        assert_eq!(tags, vec!["B-PER", "O"]);
    }

    #[test]
    fn test_untrained_model_predicts_outside() {
        let model = PerceptronModel::new();
        let tags = model.predict(&tokenize("Berlin"), &Gazetteers::default());
        assert_eq!(tags, vec!["O"]);
    }
}
