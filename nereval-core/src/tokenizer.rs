//! # Tokenizer for German, English and Dutch
//!
//! Splits raw text into tokens (words, punctuation). Every token keeps its
//! position in the original sentence as **character** offsets, which is the
//! unit entity spans are expressed in.
//!
//! ## Tokenization schemes
//!
//! - **Standard**: Unicode word boundaries (UAX #29), whitespace dropped,
//!   punctuation split off. Known abbreviations and initials keep their dot
//!   (`Dr.`, `z.B.`, `bijv.`, `J.`), hyphenated words stay whole
//!   (`Baden-Württemberg`, `Covid-19`).
//! - **Conservative**: Standard, then known multi-word names are merged into
//!   a single token (`New York`, `Den Haag`, `Frankfurt am Main`).
//!
//! ## Example
//!
//! ```rust
//! use nereval_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! // Standard: "Dr.", "Smith", "moved", "to", "New", "York", "."
//! let tokens = tokenize_with_mode("Dr. Smith moved to New York.", TokenizerMode::Standard);
//! assert_eq!(tokens.len(), 7);
//!
//! // Conservative: "Dr.", "Smith", "moved", "to", "New York", "."
//! let merged = tokenize_with_mode("Dr. Smith moved to New York.", TokenizerMode::Conservative);
//! assert_eq!(merged.len(), 6);
//! ```

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// A token taken from the original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// Token text, e.g. "London", ",", "z.B.".
    pub text: String,
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// Position in the token list (0, 1, 2...).
    pub index: usize,
}

impl Token {
    /// `(start, end)` pair, handy for boundary comparisons.
    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn is_capitalized(&self) -> bool {
        self.text.chars().next().map(char::is_uppercase).unwrap_or(false)
    }
}

/// Available tokenization strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Word boundaries plus abbreviation and hyphen handling.
    #[default]
    Standard,
    /// Standard plus merging of known multi-word names.
    Conservative,
}

/// Abbreviations (lowercase, without the final dot) that keep their dot.
const ABBREVIATIONS: &[&str] = &[
    // English
    "dr", "mr", "mrs", "ms", "prof", "st", "jr", "sr", "vs", "etc", "inc", "ltd", "co", "corp",
    "e.g", "i.e", "u.s", "u.k", "a.m", "p.m", "jan", "feb", "aug", "sept", "oct", "nov", "dec",
    // German
    "z.b", "u.a", "d.h", "bzw", "usw", "ca", "nr", "str", "hr", "fr", "okt", "dez", "evtl", "ggf",
    // Dutch
    "dhr", "mevr", "mw", "bijv", "o.a", "d.w.z", "enz", "blz", "ir", "ing", "drs", "mr.drs",
];

/// Multi-word names merged by the Conservative mode (lowercase, space-joined).
const COMPOUNDS: &[&str] = &[
    "new york", "los angeles", "san francisco", "hong kong", "new zealand", "sri lanka",
    "united states", "united kingdom", "buenos aires", "costa rica", "rio de janeiro",
    "den haag", "den bosch", "frankfurt am main", "sankt petersburg", "new delhi",
];

/// Tokenizes with the Standard mode.
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Standard)
}

/// Tokenizes with the given mode.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let mut tokens = match mode {
        TokenizerMode::Standard => tokenize_standard(text),
        TokenizerMode::Conservative => tokenize_conservative(text),
    };

    // Re-index
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

fn tokenize_standard(text: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut char_pos = 0;

    for segment in text.split_word_bounds() {
        let len = segment.chars().count();
        let start = char_pos;
        char_pos += len;

        if segment.chars().all(char::is_whitespace) {
            continue;
        }

        // Segments mixing punctuation chars ("?!") come out whole; split them.
        if len > 1 && segment.chars().all(is_punct) {
            for (i, ch) in segment.chars().enumerate() {
                push_token(&mut tokens, ch.to_string(), start + i, start + i + 1);
            }
            continue;
        }

        push_token(&mut tokens, segment.to_string(), start, char_pos);
    }

    let tokens = attach_abbreviation_dots(tokens);
    join_hyphenated(tokens)
}

fn is_punct(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace()
}

/// "Dr" "." → "Dr."; also initials ("J" ".") and dotted forms ("z.B" ".").
fn attach_abbreviation_dots(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.text == "." {
            if let Some(prev) = out.last_mut() {
                if prev.end == token.start && is_abbreviation(&prev.text) {
                    prev.text.push('.');
                    prev.end = token.end;
                    continue;
                }
            }
        }
        out.push(token);
    }
    out
}

fn is_abbreviation(word: &str) -> bool {
    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        // Single capital letter: an initial.
        (Some(c), None) => c.is_uppercase(),
        // Internal dots between letters: "U.S", "z.B".
        _ => word.contains('.') && word.chars().all(|c| c.is_alphabetic() || c == '.'),
    }
}

/// Joins `word - word` sequences with no surrounding whitespace.
fn join_hyphenated(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        let joinable = token.text == "-"
            && i + 1 < tokens.len()
            && tokens[i + 1].start == token.end
            && tokens[i + 1].text.chars().next().map(char::is_alphanumeric).unwrap_or(false)
            && out
                .last()
                .map(|p: &Token| p.end == token.start && p.text.chars().last().map(char::is_alphanumeric).unwrap_or(false))
                .unwrap_or(false);

        if joinable {
            let next = &tokens[i + 1];
            if let Some(prev) = out.last_mut() {
                prev.text.push('-');
                prev.text.push_str(&next.text);
                prev.end = next.end;
            }
            i += 2;
        } else {
            out.push(token.clone());
            i += 1;
        }
    }
    out
}

fn tokenize_conservative(text: &str) -> Vec<Token> {
    let standard = tokenize_standard(text);
    if standard.is_empty() {
        return standard;
    }
    let chars: Vec<char> = text.chars().collect();

    let mut merged = Vec::new();
    let mut i = 0;

    while i < standard.len() {
        // Longest compound starting at i (up to 4 tokens, "Frankfurt am Main")
        let mut best_match_len = 0;
        for window in 2..=4 {
            if i + window > standard.len() {
                break;
            }
            let candidate = &standard[i..i + window];
            let single_spaced = candidate
                .windows(2)
                .all(|w| w[1].start == w[0].end + 1 && chars[w[0].end] == ' ');
            if !single_spaced {
                continue;
            }
            let combined = candidate
                .iter()
                .map(|t| t.text.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            if COMPOUNDS.contains(&combined.as_str()) {
                best_match_len = window;
            }
        }

        if best_match_len > 0 {
            let first = &standard[i];
            let last = &standard[i + best_match_len - 1];
            merged.push(Token {
                text: chars[first.start..last.end].iter().collect(),
                start: first.start,
                end: last.end,
                index: 0,
            });
            i += best_match_len;
        } else {
            merged.push(standard[i].clone());
            i += 1;
        }
    }

    merged
}

fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0, // assigned later
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_standard_basic() {
        let tokens = tokenize("I like London.");
        assert_eq!(texts(&tokens), vec!["I", "like", "London", "."]);
        assert_eq!(tokens[2].bounds(), (7, 13));
        assert_eq!(tokens[3].index, 3);
    }

    #[test]
    fn test_offsets_are_characters() {
        let tokens = tokenize("Grüße aus Köln");
        assert_eq!(tokens[2].text, "Köln");
        assert_eq!(tokens[2].bounds(), (10, 14));
    }

    #[test]
    fn test_abbreviations_keep_dot() {
        let tokens = tokenize("Dr. Müller kommt z.B. morgen.");
        let t = texts(&tokens);
        assert!(t.contains(&"Dr."));
        assert!(t.contains(&"z.B."));
        assert_eq!(t.last(), Some(&"."));
    }

    #[test]
    fn test_hyphenated_words_stay_whole() {
        let tokens = tokenize("Er lebt in Baden-Württemberg.");
        assert!(texts(&tokens).contains(&"Baden-Württemberg"));
    }

    #[test]
    fn test_punctuation_runs_are_split() {
        let tokens = tokenize("Wat?!");
        assert_eq!(texts(&tokens), vec!["Wat", "?", "!"]);
    }

    #[test]
    fn test_tokenize_conservative() {
        let tokens = tokenize_with_mode("Hij woont in Den Haag.", TokenizerMode::Conservative);
        let t = texts(&tokens);
        assert!(t.contains(&"Den Haag"));
        let merged = tokens.iter().find(|t| t.text == "Den Haag").unwrap();
        assert_eq!(merged.bounds(), (13, 21));
    }

    #[test]
    fn test_empty_text() {
        assert!(tokenize("").is_empty());
        assert!(tokenize_with_mode("   ", TokenizerMode::Conservative).is_empty());
    }
}
