//! # Feature Engineering
//!
//! For each token, extracts the sparse binary features the averaged
//! perceptron scores tags with. Features capture spelling, vocabulary and
//! context.
//!
//! ## Features
//!
//! ### Current token
//! - Word form (lowercase)
//! - Capitalisation: IsCapitalized, IsAllCaps, IsMixed
//! - Prefixes and suffixes of 2, 3 and 4 characters
//! - Digits, hyphens, periods, punctuation
//!
//! ### Context (window of 2 tokens)
//! - Previous and next words, their capitalisation
//! - Bigram of the surrounding words
//!
//! ### Gazetteer
//! - Token is part of a known person, location, organisation or misc name

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::seed::GazetteerEntries;
use crate::tokenizer::Token;

/// Sparse features of one token: `{"is_capitalized": 1.0, "word=berlin": 1.0}`.
/// Ordered, so scores are summed in the same order on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.features.insert(key.into(), value);
    }
}

/// Gazetteer word sets, lowercase. Multi-word names contribute each of their
/// words, so "new" and "york" are both location words.
#[derive(Debug, Clone)]
pub struct Gazetteers {
    pub persons: HashSet<String>,
    pub locations: HashSet<String>,
    pub organizations: HashSet<String>,
    pub misc: HashSet<String>,
}

impl Gazetteers {
    pub fn new() -> Self {
        Self {
            persons: HashSet::new(),
            locations: HashSet::new(),
            organizations: HashSet::new(),
            misc: HashSet::new(),
        }
    }
}

impl From<&GazetteerEntries> for Gazetteers {
    fn from(entries: &GazetteerEntries) -> Self {
        let words = |names: &BTreeSet<String>| -> HashSet<String> {
            names
                .iter()
                .flat_map(|n| n.split_whitespace().map(str::to_string))
                .collect()
        };
        Self {
            persons: words(&entries.persons),
            locations: words(&entries.locations),
            organizations: words(&entries.organizations),
            misc: words(&entries.misc),
        }
    }
}

impl Default for Gazetteers {
    fn default() -> Self {
        Self::new()
    }
}

/// Feature vectors for every token, index-aligned with `tokens`.
pub fn extract_features(tokens: &[Token], gazetteers: &Gazetteers) -> Vec<FeatureVector> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, _)| extract_for_token(tokens, i, gazetteers))
        .collect()
}

/// Features of token `i` in its context.
pub fn extract_for_token(tokens: &[Token], i: usize, gazetteers: &Gazetteers) -> FeatureVector {
    let mut fv = FeatureVector::new();
    let token = &tokens[i];
    let word = &token.text;
    let lower = word.to_lowercase();

    // === Current word ===
    fv.insert(format!("word={lower}"), 1.0);
    fv.insert("bias", 1.0);

    // Capitalisation
    let all_upper = word.chars().all(|c| c.is_uppercase() || !c.is_alphabetic());
    let has_upper_in_middle = word.chars().skip(1).any(|c| c.is_uppercase());

    if token.is_capitalized() {
        fv.insert("is_capitalized", 1.0);
    }
    if all_upper && word.len() > 1 {
        fv.insert("is_all_caps", 1.0);
    }
    if has_upper_in_middle {
        fv.insert("is_mixed_case", 1.0);
    }

    // Prefixes and suffixes
    let chars: Vec<char> = word.chars().collect();
    for n in 2..=4 {
        if chars.len() >= n {
            let prefix: String = chars[..n].iter().collect();
            let suffix: String = chars[chars.len() - n..].iter().collect();
            fv.insert(format!("prefix{n}={}", prefix.to_lowercase()), 1.0);
            fv.insert(format!("suffix{n}={}", suffix.to_lowercase()), 1.0);
        }
    }

    // Numbers and punctuation
    if word.chars().all(char::is_numeric) {
        fv.insert("is_digit", 1.0);
    }
    if word.contains('-') {
        fv.insert("has_hyphen", 1.0);
    }
    if word.contains('.') {
        fv.insert("has_period", 1.0);
    }
    if word.chars().count() == 1 && word.chars().all(|c| !c.is_alphanumeric()) {
        fv.insert("is_punctuation", 1.0);
    }

    // Position
    if i == 0 {
        fv.insert("is_first", 1.0);
    }
    if i == tokens.len() - 1 {
        fv.insert("is_last", 1.0);
    }

    // === Context ===

    // Previous token
    if i > 0 {
        let prev = &tokens[i - 1];
        fv.insert(format!("prev_word={}", prev.text.to_lowercase()), 1.0);
        if prev.is_capitalized() {
            fv.insert("prev_is_capitalized", 1.0);
        }
    } else {
        fv.insert("BOS", 1.0); // Beginning Of Sentence
    }

    if i > 1 {
        let prev2 = &tokens[i - 2];
        fv.insert(format!("prev2_word={}", prev2.text.to_lowercase()), 1.0);
    }

    // Next token
    if i + 1 < tokens.len() {
        let next = &tokens[i + 1];
        fv.insert(format!("next_word={}", next.text.to_lowercase()), 1.0);
        if next.is_capitalized() {
            fv.insert("next_is_capitalized", 1.0);
        }
    } else {
        fv.insert("EOS", 1.0); // End Of Sentence
    }

    if i + 2 < tokens.len() {
        let next2 = &tokens[i + 2];
        fv.insert(format!("next2_word={}", next2.text.to_lowercase()), 1.0);
    }

    // Context bigram
    if i > 0 && i + 1 < tokens.len() {
        let bigram = format!(
            "bigram={}_{}",
            tokens[i - 1].text.to_lowercase(),
            tokens[i + 1].text.to_lowercase()
        );
        fv.insert(bigram, 1.0);
    }

    // === Gazetteer ===
    // Merged tokens ("new york") count when every word is known.
    let known = |set: &HashSet<String>| lower.split_whitespace().all(|w| set.contains(w));

    if known(&gazetteers.persons) {
        fv.insert("in_person_gazetteer", 1.0);
    }
    if known(&gazetteers.locations) {
        fv.insert("in_location_gazetteer", 1.0);
    }
    if known(&gazetteers.organizations) {
        fv.insert("in_org_gazetteer", 1.0);
    }
    if known(&gazetteers.misc) {
        fv.insert("in_misc_gazetteer", 1.0);
    }

    fv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_capitalization_feature() {
        let tokens = tokenize("Anna schläft");
        let gaz = Gazetteers::default();
        let features = extract_features(&tokens, &gaz);

        assert_eq!(features[0].features.get("is_capitalized"), Some(&1.0));
        assert!(features[1].features.get("is_capitalized").is_none());
    }

    #[test]
    fn test_prefix_suffix_features() {
        let tokens = tokenize("Rotterdam");
        let features = extract_features(&tokens, &Gazetteers::default());

        assert!(features[0].features.contains_key("prefix2=ro"));
        assert!(features[0].features.contains_key("suffix3=dam"));
    }

    #[test]
    fn test_context_features() {
        let tokens = tokenize("Mr. Jackson flew home");
        let features = extract_features(&tokens, &Gazetteers::default());

        let jackson = &features[1].features;
        assert!(jackson.contains_key("prev_word=mr."));
        assert!(jackson.contains_key("next_word=flew"));
    }

    #[test]
    fn test_gazetteer_feature_from_entries() {
        let mut entries = GazetteerEntries::default();
        entries.locations.insert("new york".to_string());
        let gaz = Gazetteers::from(&entries);

        let tokens = tokenize("in New York");
        let features = extract_features(&tokens, &gaz);
        assert_eq!(features[1].features.get("in_location_gazetteer"), Some(&1.0));
        assert_eq!(features[2].features.get("in_location_gazetteer"), Some(&1.0));
    }
}
