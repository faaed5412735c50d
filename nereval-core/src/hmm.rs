//! # Hidden Markov Model tagger
//!
//! Classic first-order HMM:
//! - **Hidden states**: BIO tags (`B-PER`, `I-ORG`, `O`, ...)
//! - **Observations**: tokens
//!
//! Training counts start, transition and emission events with add-one
//! smoothing; decoding runs Viterbi in log space.
//!
//! Words never seen in training are mapped to a shape class (`<UNK-CAP>`,
//! `<UNK-NUM>`, `<UNK>`). Words seen only once also feed their shape class,
//! so unknown capitalized words lean towards entity tags.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::seed::TaggedSentence;

const UNK: &str = "<UNK>";
const UNK_CAP: &str = "<UNK-CAP>";
const UNK_NUM: &str = "<UNK-NUM>";

/// Trained HMM. Every probability is stored as a natural log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmmModel {
    /// log P(curr | prev), keyed by `(prev_tag, curr_tag)`.
    transition_probs: HashMap<(String, String), f64>,
    /// log P(word | tag), keyed by `(tag, word)`.
    emission_probs: HashMap<(String, String), f64>,
    /// log P(tag starts the sentence).
    start_probs: HashMap<String, f64>,
    all_tags: Vec<String>,
    vocab: HashSet<String>,
}

impl HmmModel {
    pub fn new() -> Self {
        Self {
            transition_probs: HashMap::new(),
            emission_probs: HashMap::new(),
            start_probs: HashMap::new(),
            all_tags: Vec::new(),
            vocab: HashSet::new(),
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.all_tags
    }

    /// Supervised training from tagged sentences.
    pub fn train(&mut self, corpus: &[TaggedSentence]) {
        let mut transition_counts: HashMap<(String, String), u32> = HashMap::new();
        let mut emission_counts: HashMap<(String, String), u32> = HashMap::new();
        let mut start_counts: HashMap<String, u32> = HashMap::new();
        let mut tag_counts: HashMap<String, u32> = HashMap::new();
        let mut word_counts: HashMap<&str, u32> = HashMap::new();

        for sentence in corpus {
            for word in &sentence.words {
                *word_counts.entry(word.as_str()).or_insert(0) += 1;
            }
        }

        for sentence in corpus {
            let mut prev_tag: Option<&String> = None;

            for (i, (word, tag)) in sentence.words.iter().zip(&sentence.tags).enumerate() {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
                *emission_counts.entry((tag.clone(), word.clone())).or_insert(0) += 1;
                // Hapax words also train their shape class.
                if word_counts.get(word.as_str()) == Some(&1) {
                    *emission_counts
                        .entry((tag.clone(), shape_class(word).to_string()))
                        .or_insert(0) += 1;
                }

                if i == 0 {
                    *start_counts.entry(tag.clone()).or_insert(0) += 1;
                } else if let Some(prev) = prev_tag {
                    *transition_counts.entry((prev.clone(), tag.clone())).or_insert(0) += 1;
                }
                prev_tag = Some(tag);
            }
        }

        self.vocab = word_counts.keys().map(|w| w.to_string()).collect();
        let tag_set: BTreeSet<String> = tag_counts.keys().cloned().collect();
        self.all_tags = tag_set.into_iter().collect();

        let observations: Vec<String> = self
            .vocab
            .iter()
            .cloned()
            .chain([UNK, UNK_CAP, UNK_NUM].iter().map(|s| s.to_string()))
            .collect();
        let obs_size = observations.len() as f64;
        let num_tags = self.all_tags.len() as f64;

        let total_starts = corpus.len() as f64;
        for tag in &self.all_tags {
            let count = *start_counts.get(tag).unwrap_or(&0) as f64;
            let prob = (count + 1.0) / (total_starts + num_tags);
            self.start_probs.insert(tag.clone(), prob.ln());
        }

        for prev in &self.all_tags {
            let prev_count = *tag_counts.get(prev).unwrap_or(&0) as f64;
            for curr in &self.all_tags {
                let count = *transition_counts
                    .get(&(prev.clone(), curr.clone()))
                    .unwrap_or(&0) as f64;
                let prob = (count + 1.0) / (prev_count + num_tags);
                self.transition_probs.insert((prev.clone(), curr.clone()), prob.ln());
            }
        }

        for tag in &self.all_tags {
            let tag_count = *tag_counts.get(tag).unwrap_or(&0) as f64;
            for word in &observations {
                let count = *emission_counts
                    .get(&(tag.clone(), word.clone()))
                    .unwrap_or(&0) as f64;
                let prob = (count + 1.0) / (tag_count + obs_size);
                self.emission_probs.insert((tag.clone(), word.clone()), prob.ln());
            }
        }
    }

    fn observation<'a>(&self, word: &'a str) -> &'a str {
        if self.vocab.contains(word) {
            word
        } else {
            shape_class(word)
        }
    }

    fn emission(&self, tag: &str, word: &str) -> f64 {
        self.emission_probs
            .get(&(tag.to_string(), word.to_string()))
            .copied()
            .unwrap_or(f64::NEG_INFINITY)
    }

    /// Viterbi decoding, O(N * T^2). Returns one tag per token; an untrained
    /// model tags everything `O`.
    pub fn predict(&self, tokens: &[String]) -> Vec<String> {
        if tokens.is_empty() {
            return Vec::new();
        }
        if self.all_tags.is_empty() {
            return vec!["O".to_string(); tokens.len()];
        }

        let n_tokens = tokens.len();
        let n_tags = self.all_tags.len();

        let mut viterbi = vec![vec![f64::NEG_INFINITY; n_tags]; n_tokens];
        let mut backptr = vec![vec![0usize; n_tags]; n_tokens];

        let first = self.observation(&tokens[0]);
        for (s, tag) in self.all_tags.iter().enumerate() {
            let start_p = self.start_probs.get(tag).copied().unwrap_or(f64::NEG_INFINITY);
            viterbi[0][s] = start_p + self.emission(tag, first);
        }

        for t in 1..n_tokens {
            let word = self.observation(&tokens[t]);

            for (s, curr_tag) in self.all_tags.iter().enumerate() {
                let emit_p = self.emission(curr_tag, word);
                let mut best_prob = f64::NEG_INFINITY;
                let mut best_prev = 0;

                for (prev_s, prev_tag) in self.all_tags.iter().enumerate() {
                    let trans_p = self
                        .transition_probs
                        .get(&(prev_tag.clone(), curr_tag.clone()))
                        .copied()
                        .unwrap_or(f64::NEG_INFINITY);
                    let prob = viterbi[t - 1][prev_s] + trans_p + emit_p;
                    if prob > best_prob {
                        best_prob = prob;
                        best_prev = prev_s;
                    }
                }

                viterbi[t][s] = best_prob;
                backptr[t][s] = best_prev;
            }
        }

        let mut curr_idx = 0;
        let mut best_last_prob = f64::NEG_INFINITY;
        for (s, &prob) in viterbi[n_tokens - 1].iter().enumerate() {
            if prob > best_last_prob {
                best_last_prob = prob;
                curr_idx = s;
            }
        }

        let mut best_path = vec![String::new(); n_tokens];
        best_path[n_tokens - 1] = self.all_tags[curr_idx].clone();
        for t in (1..n_tokens).rev() {
            curr_idx = backptr[t][curr_idx];
            best_path[t - 1] = self.all_tags[curr_idx].clone();
        }
        best_path
    }
}

impl Default for HmmModel {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_class(word: &str) -> &'static str {
    match word.chars().next() {
        Some(c) if c.is_uppercase() => UNK_CAP,
        Some(c) if c.is_ascii_digit() => UNK_NUM,
        _ => UNK,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(pairs: &[(&str, &str)]) -> TaggedSentence {
        TaggedSentence {
            words: pairs.iter().map(|(w, _)| w.to_string()).collect(),
            tags: pairs.iter().map(|(_, t)| t.to_string()).collect(),
        }
    }

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_hmm_basic_training() {
        let corpus = vec![sentence(&[("Merkel", "B-PER"), ("spricht", "O"), ("heute", "O")])];

        let mut model = HmmModel::new();
        model.train(&corpus);

        assert!(model.tags().contains(&"B-PER".to_string()));
        assert!(model.tags().contains(&"O".to_string()));

        let tags = model.predict(&words(&["Merkel", "spricht", "heute"]));
        assert_eq!(tags, vec!["B-PER", "O", "O"]);
    }

    #[test]
    fn test_unknown_capitalized_word_uses_shape() {
        let corpus = vec![
            sentence(&[("Utrecht", "B-LOC"), ("is", "O"), ("mooi", "O")]),
            sentence(&[("Groningen", "B-LOC"), ("is", "O"), ("groot", "O")]),
            sentence(&[("het", "O"), ("is", "O"), ("mooi", "O")]),
        ];

        let mut model = HmmModel::new();
        model.train(&corpus);

        let tags = model.predict(&words(&["Leiden", "is", "mooi"]));
        assert_eq!(tags, vec!["B-LOC", "O", "O"]);
    }

    #[test]
    fn test_empty_input_and_untrained_model() {
        let model = HmmModel::new();
        assert!(model.predict(&[]).is_empty());
        assert_eq!(model.predict(&words(&["Amsterdam"])), vec!["O"]);
    }
}
