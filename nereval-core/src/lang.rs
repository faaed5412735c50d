//! # Languages and Entity Tagsets
//!
//! The three corpora are German, English and Dutch. Each monolingual backend
//! emits labels from one fixed tagset, and the multilingual backend always
//! uses the four CoNLL labels.
//!
//! | Backend               | Scheme      | Labels                          |
//! |-----------------------|-------------|---------------------------------|
//! | German                | `Conll`     | LOC, MISC, ORG, PER             |
//! | English, Dutch        | `OntoNotes` | CARDINAL … WORK_OF_ART (18)     |
//! | Multilingual          | `Conll`     | LOC, MISC, ORG, PER             |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Corpus languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    German,
    English,
    Dutch,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::German, Language::English, Language::Dutch];

    /// ISO 639-3 code, also the prefix of the corpus file name.
    pub fn iso3(&self) -> &'static str {
        match self {
            Language::German => "deu",
            Language::English => "eng",
            Language::Dutch => "nld",
        }
    }

    /// ISO 639-1 code.
    pub fn iso1(&self) -> &'static str {
        match self {
            Language::German => "de",
            Language::English => "en",
            Language::Dutch => "nl",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::German => "German",
            Language::English => "English",
            Language::Dutch => "Dutch",
        }
    }

    /// Default corpus file name, e.g. `deu_sentences.tsv`.
    pub fn corpus_file_name(&self) -> String {
        format!("{}_sentences.tsv", self.iso3())
    }

    /// Tagset of the monolingual backends for this language.
    pub fn scheme(&self) -> LabelScheme {
        match self {
            Language::German => LabelScheme::Conll,
            Language::English | Language::Dutch => LabelScheme::OntoNotes,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Entity tagsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelScheme {
    Conll,
    OntoNotes,
}

const CONLL_LABELS: &[&str] = &["LOC", "MISC", "ORG", "PER"];

const ONTONOTES_LABELS: &[&str] = &[
    "CARDINAL", "DATE", "EVENT", "FAC", "GPE", "LANGUAGE", "LAW", "LOC", "MONEY", "NORP",
    "ORDINAL", "ORG", "PERCENT", "PERSON", "PRODUCT", "QUANTITY", "TIME", "WORK_OF_ART",
];

impl LabelScheme {
    /// All labels of the scheme, sorted.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            LabelScheme::Conll => CONLL_LABELS,
            LabelScheme::OntoNotes => ONTONOTES_LABELS,
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels().contains(&label)
    }

    /// Label used for people, places and organisations in this scheme.
    pub fn person(&self) -> &'static str {
        match self {
            LabelScheme::Conll => "PER",
            LabelScheme::OntoNotes => "PERSON",
        }
    }

    pub fn location(&self) -> &'static str {
        match self {
            LabelScheme::Conll => "LOC",
            LabelScheme::OntoNotes => "GPE",
        }
    }

    pub fn organization(&self) -> &'static str {
        "ORG"
    }

    pub fn misc(&self) -> &'static str {
        match self {
            LabelScheme::Conll => "MISC",
            LabelScheme::OntoNotes => "NORP",
        }
    }

    /// Maps a label of `self` onto `target`. `None` when the target scheme has
    /// no counterpart (numeric and temporal OntoNotes labels under CoNLL).
    pub fn convert(&self, label: &str, target: LabelScheme) -> Option<&'static str> {
        if !self.contains(label) {
            return None;
        }
        match (self, target) {
            (LabelScheme::OntoNotes, LabelScheme::Conll) => match label {
                "PERSON" => Some("PER"),
                "GPE" | "LOC" | "FAC" => Some("LOC"),
                "ORG" => Some("ORG"),
                "NORP" | "EVENT" | "PRODUCT" | "WORK_OF_ART" | "LANGUAGE" | "LAW" => Some("MISC"),
                _ => None,
            },
            (LabelScheme::Conll, LabelScheme::OntoNotes) => match label {
                "PER" => Some("PERSON"),
                "LOC" => Some("GPE"),
                "ORG" => Some("ORG"),
                "MISC" => Some("NORP"),
                _ => None,
            },
            _ => target.labels().iter().copied().find(|l| *l == label),
        }
    }

    /// One-line description of a label.
    pub fn describe(label: &str) -> Option<&'static str> {
        let text = match label {
            "LOC" => "Non-GPE locations, mountain ranges, bodies of water",
            "MISC" => "Miscellaneous entities, e.g. events, nationalities, products or works of art",
            "ORG" => "Companies, agencies, institutions, etc.",
            "PER" => "Named person or family",
            "CARDINAL" => "Numerals that do not fall under another type",
            "DATE" => "Absolute or relative dates or periods",
            "EVENT" => "Named hurricanes, battles, wars, sports events, etc.",
            "FAC" => "Buildings, airports, highways, bridges, etc.",
            "GPE" => "Countries, cities, states",
            "LANGUAGE" => "Any named language",
            "LAW" => "Named documents made into laws",
            "MONEY" => "Monetary values, including unit",
            "NORP" => "Nationalities or religious or political groups",
            "ORDINAL" => "\"first\", \"second\", etc.",
            "PERCENT" => "Percentage, including \"%\"",
            "PERSON" => "People, including fictional",
            "PRODUCT" => "Objects, vehicles, foods, etc. (not services)",
            "QUANTITY" => "Measurements, as of weight or distance",
            "TIME" => "Times smaller than a day",
            "WORK_OF_ART" => "Titles of books, songs, etc.",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_file_names() {
        assert_eq!(Language::German.corpus_file_name(), "deu_sentences.tsv");
        assert_eq!(Language::Dutch.corpus_file_name(), "nld_sentences.tsv");
    }

    #[test]
    fn test_schemes_per_language() {
        assert_eq!(Language::German.scheme(), LabelScheme::Conll);
        assert_eq!(Language::English.scheme(), LabelScheme::OntoNotes);
        assert_eq!(LabelScheme::OntoNotes.labels().len(), 18);
    }

    #[test]
    fn test_convert_ontonotes_to_conll() {
        let on = LabelScheme::OntoNotes;
        assert_eq!(on.convert("PERSON", LabelScheme::Conll), Some("PER"));
        assert_eq!(on.convert("GPE", LabelScheme::Conll), Some("LOC"));
        assert_eq!(on.convert("NORP", LabelScheme::Conll), Some("MISC"));
        assert_eq!(on.convert("CARDINAL", LabelScheme::Conll), None);
        assert_eq!(on.convert("PERSON", LabelScheme::OntoNotes), Some("PERSON"));
        assert_eq!(on.convert("PER", LabelScheme::Conll), None);
    }

    #[test]
    fn test_every_label_is_described() {
        for scheme in [LabelScheme::Conll, LabelScheme::OntoNotes] {
            for label in scheme.labels() {
                assert!(LabelScheme::describe(label).is_some(), "{label}");
            }
        }
    }
}
