//! # Entity Spans and Annotated Examples
//!
//! An [`EntitySpan`] is a `(start, end, label)` triple with **character**
//! offsets into one sentence, end exclusive. An [`AnnotatedExample`] pairs a
//! sentence with the spans an annotator produced for it.
//!
//! Tokens carry character offsets too, so BIO tags over tokens convert to
//! spans without touching byte positions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::tokenizer::Token;

/// Entity span over a sentence, character offsets, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

impl EntitySpan {
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Checks the span fits inside `sentence`.
    pub fn validate(&self, sentence: &str) -> Result<()> {
        let len = sentence.chars().count();
        let reason = if self.start >= self.end {
            "empty or inverted span"
        } else if self.end > len {
            "span ends past the sentence"
        } else if self.label.is_empty() {
            "missing label"
        } else {
            return Ok(());
        };
        Err(NerError::InvalidSpan {
            sentence: sentence.to_string(),
            start: self.start,
            end: self.end,
            label: self.label.clone(),
            reason: reason.to_string(),
        })
    }

    /// Text covered by the span.
    pub fn text<'a>(&self, sentence: &'a str) -> &'a str {
        let (from, to) = char_range_to_bytes(sentence, self.start, self.end);
        &sentence[from..to]
    }
}

impl fmt::Display for EntitySpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, '{}']", self.start, self.end, self.label)
    }
}

/// A sentence with the entities found in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedExample {
    pub sentence: String,
    pub entities: Vec<EntitySpan>,
}

impl AnnotatedExample {
    pub fn new(sentence: impl Into<String>, mut entities: Vec<EntitySpan>) -> Self {
        entities.sort();
        Self {
            sentence: sentence.into(),
            entities,
        }
    }

    /// The entity list in the export format: `[[0, 6, 'LOC'], [10, 15, 'PER']]`.
    pub fn entities_display(&self) -> String {
        let inner: Vec<String> = self.entities.iter().map(ToString::to_string).collect();
        format!("[{}]", inner.join(", "))
    }
}

impl fmt::Display for AnnotatedExample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {})", self.sentence, self.entities_display())
    }
}

/// Converts char offsets into byte offsets of `text`. Offsets past the end
/// clamp to `text.len()`.
pub fn char_range_to_bytes(text: &str, start: usize, end: usize) -> (usize, usize) {
    let mut from = text.len();
    let mut to = text.len();
    for (i, (byte, _)) in text.char_indices().enumerate() {
        if i == start {
            from = byte;
        }
        if i == end {
            to = byte;
            break;
        }
    }
    (from.min(to), to)
}

/// Converts BIO tags aligned with `tokens` into character spans.
///
/// - `B-X` opens an entity.
/// - `I-X` continues an open entity of the same label, or opens one.
/// - `O` or a label change closes the open entity.
pub fn bio_to_spans(tokens: &[Token], tags: &[String]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut open: Option<EntitySpan> = None;

    for (token, tag) in tokens.iter().zip(tags) {
        let (prefix, label) = match tag.split_once('-') {
            Some((p, l)) if p == "B" || p == "I" => (p, l),
            _ => {
                spans.extend(open.take());
                continue;
            }
        };
        match open.as_mut() {
            Some(span) if prefix == "I" && span.label == label => span.end = token.end,
            _ => {
                spans.extend(open.take());
                open = Some(EntitySpan::new(token.start, token.end, label));
            }
        }
    }
    spans.extend(open);
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn test_validate() {
        let s = "Ich wohne in München.";
        assert!(EntitySpan::new(13, 20, "LOC").validate(s).is_ok());
        assert!(EntitySpan::new(13, 13, "LOC").validate(s).is_err());
        assert!(EntitySpan::new(13, 40, "LOC").validate(s).is_err());
    }

    #[test]
    fn test_text_uses_char_offsets() {
        let s = "Ich wohne in München.";
        assert_eq!(EntitySpan::new(13, 20, "LOC").text(s), "München");
    }

    #[test]
    fn test_bio_to_spans() {
        let tokens = tokenize("Peter Parker lives in New York");
        let tags: Vec<String> = ["B-PER", "I-PER", "O", "O", "B-LOC", "I-LOC"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let spans = bio_to_spans(&tokens, &tags);
        assert_eq!(
            spans,
            vec![EntitySpan::new(0, 12, "PER"), EntitySpan::new(22, 30, "LOC")]
        );
    }

    #[test]
    fn test_bio_label_change_closes_span() {
        let tokens = tokenize("Anna Berlin");
        let tags = vec!["B-PER".to_string(), "I-LOC".to_string()];
        let spans = bio_to_spans(&tokens, &tags);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].label, "LOC");
    }

    #[test]
    fn test_display_matches_export_format() {
        let ex = AnnotatedExample::new(
            "I like London.",
            vec![EntitySpan::new(7, 13, "GPE")],
        );
        assert_eq!(ex.entities_display(), "[[7, 13, 'GPE']]");
    }
}
