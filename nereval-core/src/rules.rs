//! # Rule Engine: Gazetteers and Regex Patterns
//!
//! The rule engine complements the statistical taggers with explicit
//! knowledge: lists of known names (gazetteers), a title pattern for people,
//! and regular expressions for the numeric and temporal OntoNotes types
//! (`DATE`, `TIME`, `MONEY`, `PERCENT`, `ORDINAL`, `CARDINAL`).
//!
//! Rules emit BIO tags in the engine's [`LabelScheme`]. A token claimed by an
//! earlier rule is never overwritten by a later one, so the pass order below
//! is also the precedence order.

use std::collections::HashMap;

use regex::Regex;

use crate::error::{NerError, Result};
use crate::lang::LabelScheme;
use crate::seed::GazetteerEntries;
use crate::tokenizer::{tokenize, Token};

/// Gazetteer categories, mapped onto the scheme's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Person,
    Location,
    Organization,
    Misc,
}

impl Category {
    fn label(&self, scheme: LabelScheme) -> &'static str {
        match self {
            Category::Person => scheme.person(),
            Category::Location => scheme.location(),
            Category::Organization => scheme.organization(),
            Category::Misc => scheme.misc(),
        }
    }
}

/// Words that introduce a person name.
const PERSON_TITLES: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sir", "president", "herr", "frau", "präsident",
    "präsidentin", "kanzler", "kanzlerin", "meneer", "mevrouw", "dhr.", "mevr.", "minister",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "januar", "februar", "märz", "mai", "juni", "juli",
    "oktober", "dezember", "januari", "februari", "maart", "mei", "augustus", "oktober",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "today",
    "yesterday", "tomorrow", "maandag", "dinsdag", "woensdag", "donderdag", "vrijdag",
    "zaterdag", "zondag", "vandaag", "gisteren", "morgen",
];

const ORDINAL_WORDS: &[&str] = &[
    "first", "second", "third", "fourth", "fifth", "tenth", "eerste", "tweede", "derde",
    "vierde", "vijfde", "tiende",
];

const NUMBER_WORDS: &[&str] = &[
    "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "twelve", "hundred",
    "thousand", "twee", "drie", "vier", "vijf", "zes", "zeven", "acht", "negen", "tien",
    "honderd", "duizend",
];

const CURRENCY_SYMBOLS: &[&str] = &["$", "€", "£", "¥"];
const CURRENCY_WORDS: &[&str] = &["dollar", "dollars", "euro", "euros", "pound", "pounds", "cent", "cents"];
const MAGNITUDES: &[&str] = &["million", "billion", "miljoen", "miljard"];
const PERCENT_WORDS: &[&str] = &["%", "percent", "procent"];
const TIME_WORDS: &[&str] = &["o'clock", "uur", "a.m.", "p.m."];

/// Rule engine with gazetteers and patterns.
pub struct RuleEngine {
    scheme: LabelScheme,
    /// Normalised name (lowercase tokens joined by spaces) → category.
    names: HashMap<String, Category>,
    /// Longest name in tokens.
    max_name_len: usize,
    number: Regex,
    year: Regex,
    ordinal_suffix: Regex,
}

impl RuleEngine {
    pub fn new(scheme: LabelScheme) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| NerError::model("rules", e.to_string()))
        };
        Ok(Self {
            scheme,
            names: HashMap::new(),
            max_name_len: 0,
            number: compile(r"^\d+(?:[.,]\d+)*$")?,
            year: compile(r"^(?:1[0-9]|20)\d{2}$")?,
            ordinal_suffix: compile(r"^\d+(?:st|nd|rd|th|e|ste|de)\.?$")?,
        })
    }

    /// Engine loaded with every entry of `entries`.
    pub fn with_gazetteers(scheme: LabelScheme, entries: &GazetteerEntries) -> Result<Self> {
        let mut engine = Self::new(scheme)?;
        engine.load(entries);
        Ok(engine)
    }

    pub fn scheme(&self) -> LabelScheme {
        self.scheme
    }

    pub fn load(&mut self, entries: &GazetteerEntries) {
        let groups = [
            (&entries.persons, Category::Person),
            (&entries.locations, Category::Location),
            (&entries.organizations, Category::Organization),
            (&entries.misc, Category::Misc),
        ];
        for (names, category) in groups {
            for name in names {
                self.add(name, category);
            }
        }
    }

    /// Adds a known name. Later additions of the same name win.
    pub fn add(&mut self, name: &str, category: Category) {
        let parts = normalize_name(name);
        if parts.is_empty() {
            return;
        }
        self.max_name_len = self.max_name_len.max(parts.len());
        self.names.insert(parts.join(" "), category);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Applies every rule to the token sequence.
    ///
    /// Returns one slot per token: the BIO tag of the tokens a rule claimed.
    pub fn apply(&self, tokens: &[Token]) -> Vec<Option<String>> {
        let mut result: Vec<Option<String>> = vec![None; tokens.len()];
        let lower: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();

        // 1. Numeric and temporal patterns (OntoNotes only)
        if self.scheme == LabelScheme::OntoNotes {
            self.apply_patterns(&lower, &mut result);
        }

        // 2. Gazetteers, longest match first
        let mut i = 0;
        while i < tokens.len() {
            let mut matched = 0;
            for len in (1..=self.max_name_len.min(tokens.len() - i)).rev() {
                if result[i..i + len].iter().any(Option::is_some) {
                    continue;
                }
                let window = lower[i..i + len].join(" ");
                if let Some(category) = self.names.get(&window) {
                    let label = category.label(self.scheme);
                    claim(&mut result, i, len, label);
                    matched = len;
                    break;
                }
            }
            i += matched.max(1);
        }

        // 3. Title pattern: "Herr Schmidt", "Mr. Jackson Smith" → PER
        for i in 0..tokens.len().saturating_sub(1) {
            if !PERSON_TITLES.contains(&lower[i].as_str()) || result[i + 1].is_some() {
                continue;
            }
            let len = tokens[i + 1..]
                .iter()
                .zip(&result[i + 1..])
                .take_while(|(t, r)| r.is_none() && t.is_capitalized())
                .count();
            if len > 0 {
                claim(&mut result, i + 1, len, self.scheme.person());
            }
        }

        // 4. Surname after a known first name: "Tom Jackson" → PER
        let person = self.scheme.person();
        for i in 1..tokens.len() {
            let extends_person = result[i - 1]
                .as_ref()
                .map(|tag| tag.ends_with(person) && tag.len() == person.len() + 2)
                .unwrap_or(false);
            if extends_person && result[i].is_none() && tokens[i].is_capitalized() {
                result[i] = Some(format!("I-{person}"));
            }
        }

        result
    }

    fn apply_patterns(&self, lower: &[String], result: &mut [Option<String>]) {
        let n = lower.len();
        let is_number = |i: usize| {
            i < n && (self.number.is_match(&lower[i]) || NUMBER_WORDS.contains(&lower[i].as_str()))
        };
        let word_in = |i: usize, list: &[&str]| i < n && list.contains(&lower[i].as_str());

        let mut i = 0;
        while i < n {
            // MONEY: "$ 5 million", "5 euro"
            if word_in(i, CURRENCY_SYMBOLS) && is_number(i + 1) {
                let len = if word_in(i + 2, MAGNITUDES) { 3 } else { 2 };
                claim(result, i, len, "MONEY");
                i += len;
                continue;
            }
            if is_number(i) && word_in(i + 1, MAGNITUDES) && word_in(i + 2, CURRENCY_WORDS) {
                claim(result, i, 3, "MONEY");
                i += 3;
                continue;
            }
            if is_number(i) && word_in(i + 1, CURRENCY_WORDS) {
                claim(result, i, 2, "MONEY");
                i += 2;
                continue;
            }
            // PERCENT: "50 %", "50 procent"
            if is_number(i) && word_in(i + 1, PERCENT_WORDS) {
                claim(result, i, 2, "PERCENT");
                i += 2;
                continue;
            }
            // TIME: "10 : 30", "5 uur"
            if self.number.is_match(&lower[i])
                && i + 2 < n
                && lower[i + 1] == ":"
                && self.number.is_match(&lower[i + 2])
            {
                claim(result, i, 3, "TIME");
                i += 3;
                continue;
            }
            if is_number(i) && word_in(i + 1, TIME_WORDS) {
                claim(result, i, 2, "TIME");
                i += 2;
                continue;
            }
            // DATE: "12 May 2020", "May 2020", "1990", "Monday"
            let month_at = if word_in(i, MONTHS) {
                Some(i)
            } else if is_number(i) && word_in(i + 1, MONTHS) {
                Some(i + 1)
            } else {
                None
            };
            if let Some(month) = month_at {
                let mut end = month + 1;
                if end < n && self.year.is_match(&lower[end]) {
                    end += 1;
                }
                // "may" alone is too ambiguous to claim
                if end - i > 1 || lower[i] != "may" {
                    claim(result, i, end - i, "DATE");
                    i = end;
                    continue;
                }
            }
            if self.year.is_match(&lower[i]) || word_in(i, WEEKDAYS) {
                claim(result, i, 1, "DATE");
                i += 1;
                continue;
            }
            // ORDINAL: "1st", "3e", "first"
            if self.ordinal_suffix.is_match(&lower[i]) || word_in(i, ORDINAL_WORDS) {
                claim(result, i, 1, "ORDINAL");
                i += 1;
                continue;
            }
            // CARDINAL: everything else that is a number
            if is_number(i) {
                claim(result, i, 1, "CARDINAL");
            }
            i += 1;
        }
    }
}

/// Marks `len` tokens from `start` as one entity.
fn claim(result: &mut [Option<String>], start: usize, len: usize, label: &str) {
    for j in 0..len {
        let prefix = if j == 0 { "B" } else { "I" };
        result[start + j] = Some(format!("{prefix}-{label}"));
    }
}

/// Tokenizes a gazetteer name the way sentences are tokenized.
fn normalize_name(name: &str) -> Vec<String> {
    tokenize(name).into_iter().map(|t| t.text.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize_with_mode, TokenizerMode};

    fn tags(engine: &RuleEngine, text: &str) -> Vec<String> {
        engine
            .apply(&tokenize(text))
            .into_iter()
            .map(|tag| tag.unwrap_or_else(|| "O".to_string()))
            .collect()
    }

    #[test]
    fn test_person_gazetteer() {
        let mut engine = RuleEngine::new(LabelScheme::Conll).unwrap();
        engine.add("Angela Merkel", Category::Person);
        assert_eq!(tags(&engine, "Angela Merkel lacht"), vec!["B-PER", "I-PER", "O"]);
    }

    #[test]
    fn test_labels_follow_scheme() {
        let mut engine = RuleEngine::new(LabelScheme::OntoNotes).unwrap();
        engine.add("London", Category::Location);
        assert_eq!(tags(&engine, "I like London"), vec!["O", "O", "B-GPE"]);
    }

    #[test]
    fn test_longest_match_wins() {
        let mut engine = RuleEngine::new(LabelScheme::Conll).unwrap();
        engine.add("Bayern", Category::Location);
        engine.add("Bayern München", Category::Organization);
        assert_eq!(tags(&engine, "Bayern München gewinnt"), vec!["B-ORG", "I-ORG", "O"]);
    }

    #[test]
    fn test_merged_token_matches_name() {
        let mut engine = RuleEngine::new(LabelScheme::Conll).unwrap();
        engine.add("Den Haag", Category::Location);
        let tokens = tokenize_with_mode("in Den Haag", TokenizerMode::Conservative);
        let matches = engine.apply(&tokens);
        assert_eq!(matches[1].as_deref(), Some("B-LOC"));
    }

    #[test]
    fn test_title_pattern() {
        let engine = RuleEngine::new(LabelScheme::Conll).unwrap();
        assert_eq!(tags(&engine, "Herr Schmidt kommt"), vec!["O", "B-PER", "O"]);
    }

    #[test]
    fn test_surname_extends_first_name() {
        let mut engine = RuleEngine::new(LabelScheme::OntoNotes).unwrap();
        engine.add("Tom", Category::Person);
        assert_eq!(
            tags(&engine, "Tom Jackson left"),
            vec!["B-PERSON", "I-PERSON", "O"]
        );
    }

    #[test]
    fn test_numeric_patterns() {
        let engine = RuleEngine::new(LabelScheme::OntoNotes).unwrap();
        assert_eq!(tags(&engine, "It costs $ 5"), vec!["O", "O", "B-MONEY", "I-MONEY"]);
        assert_eq!(tags(&engine, "50 % of 1990"), vec!["B-PERCENT", "I-PERCENT", "O", "B-DATE"]);
        assert_eq!(tags(&engine, "at 10:30"), vec!["O", "B-TIME", "I-TIME", "I-TIME"]);
        assert_eq!(tags(&engine, "the first 3 cats"), vec!["O", "B-ORDINAL", "B-CARDINAL", "O"]);
        assert_eq!(tags(&engine, "up 7 percent"), vec!["O", "B-PERCENT", "I-PERCENT"]);
    }

    #[test]
    fn test_conll_has_no_numeric_patterns() {
        let engine = RuleEngine::new(LabelScheme::Conll).unwrap();
        assert_eq!(tags(&engine, "im Jahr 1990"), vec!["O", "O", "O"]);
    }
}
