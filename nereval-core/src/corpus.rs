//! # Sentence corpora
//!
//! Each language has one tab-separated file without a header. A record holds
//! a sentence index, a language tag, then the sentence itself:
//!
//! ```text
//! 1	deu	Lass uns etwas versuchen!
//! 2	deu	Ich muss schlafen gehen.
//! ```
//!
//! The first two columns are dropped and every remaining column becomes one
//! sentence, in file order. Quoting follows the usual CSV dialect: a field
//! opening with `"` is quoted, `""` inside it is a literal quote, and a quoted
//! field may span lines.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{NerError, Result};
use crate::lang::Language;

/// Columns dropped from the front of every record.
const SKIPPED_COLUMNS: usize = 2;

/// Corpus file per language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusPaths {
    pub german: PathBuf,
    pub english: PathBuf,
    pub dutch: PathBuf,
}

impl CorpusPaths {
    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            german: dir.join(Language::German.corpus_file_name()),
            english: dir.join(Language::English.corpus_file_name()),
            dutch: dir.join(Language::Dutch.corpus_file_name()),
        }
    }

    pub fn get(&self, language: Language) -> &Path {
        match language {
            Language::German => &self.german,
            Language::English => &self.english,
            Language::Dutch => &self.dutch,
        }
    }
}

impl Default for CorpusPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

/// Sentences of all three languages, loaded up front.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpora {
    pub german: Vec<String>,
    pub english: Vec<String>,
    pub dutch: Vec<String>,
}

impl Corpora {
    /// Loads every corpus file. Stops at the first file that fails.
    pub fn load(paths: &CorpusPaths) -> Result<Self> {
        let mut corpora = Corpora::default();
        for language in Language::ALL {
            let path = paths.get(language);
            let sentences = load_sentences(path)?;
            info!(
                language = %language,
                path = %path.display(),
                sentences = sentences.len(),
                "corpus loaded"
            );
            *corpora.get_mut(language) = sentences;
        }
        Ok(corpora)
    }

    pub fn get(&self, language: Language) -> &[String] {
        match language {
            Language::German => &self.german,
            Language::English => &self.english,
            Language::Dutch => &self.dutch,
        }
    }

    fn get_mut(&mut self, language: Language) -> &mut Vec<String> {
        match language {
            Language::German => &mut self.german,
            Language::English => &mut self.english,
            Language::Dutch => &mut self.dutch,
        }
    }

    /// The first `limit` sentences of `language`, or all of them.
    pub fn limited(&self, language: Language, limit: Option<usize>) -> &[String] {
        let sentences = self.get(language);
        match limit {
            Some(n) => &sentences[..n.min(sentences.len())],
            None => sentences,
        }
    }
}

/// Reads one corpus file into its sentence list.
pub fn load_sentences(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| NerError::CorpusIo {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|e| NerError::MalformedCorpus {
        path: path.to_path_buf(),
        record: 0,
        reason: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
    })?;

    let records = parse_records(&text).map_err(|(record, reason)| NerError::MalformedCorpus {
        path: path.to_path_buf(),
        record,
        reason,
    })?;

    Ok(records
        .into_iter()
        .flat_map(|fields| fields.into_iter().skip(SKIPPED_COLUMNS))
        .collect())
}

/// Splits tab-separated text into records of fields.
///
/// Blank lines yield no record. On failure returns the 1-based number of the
/// offending record and a reason.
pub fn parse_records(text: &str) -> std::result::Result<Vec<Vec<String>>, (usize, String)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // True while the current field has not received any character yet.
    let mut at_field_start = true;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\r' if chars.peek() == Some(&'\n') => {}
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            '\t' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if !fields.is_empty() || !at_field_start {
                    fields.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut fields));
                }
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if in_quotes {
        return Err((records.len() + 1, "unterminated quoted field".to_string()));
    }
    if !fields.is_empty() || !at_field_start {
        fields.push(field);
        records.push(fields);
    }
    Ok(records)
}
