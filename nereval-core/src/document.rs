//! # Document pipeline
//!
//! Second annotator backend. Sentences are wrapped into [`Document`]s before
//! processing and the pipeline fills each document's entity list in place.
//! Processors are named and must be requested up front: tokenization merges
//! known multi-word names ([`TokenizerMode::Conservative`]), and the `ner`
//! processor tags with an HMM whose output is corrected by the gazetteers.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::hmm::HmmModel;
use crate::lang::{LabelScheme, Language};
use crate::rules::RuleEngine;
use crate::seed;
use crate::span::{bio_to_spans, EntitySpan};
use crate::tokenizer::{tokenize_with_mode, Token, TokenizerMode};

/// One sentence and, once processed, its entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    pub tokens: Vec<Token>,
    pub ents: Vec<EntitySpan>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: Vec::new(),
            ents: Vec::new(),
        }
    }
}

/// Processors requested when building a [`DocumentPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Processors {
    pub tokenize: bool,
    pub ner: bool,
}

impl Default for Processors {
    fn default() -> Self {
        Self {
            tokenize: true,
            ner: true,
        }
    }
}

/// HMM tagger with gazetteer correction, one language.
pub struct DocumentPipeline {
    language: Language,
    processors: Processors,
    hmm: Option<HmmModel>,
    rules: Option<RuleEngine>,
}

impl DocumentPipeline {
    pub fn new(language: Language, processors: Processors) -> Result<Self> {
        let (hmm, rules) = if processors.ner {
            let mut hmm = HmmModel::new();
            hmm.train(&seed::tagged_sentences(Some(language)));
            if hmm.tags().is_empty() {
                return Err(NerError::model(backend_name(language), "no seed sentences"));
            }

            let mut entries = seed::extract_gazetteers_from_seed(language);
            entries.extend(seed::curated_gazetteers(language));
            let rules = RuleEngine::with_gazetteers(language.scheme(), &entries)?;
            (Some(hmm), Some(rules))
        } else {
            (None, None)
        };

        debug!(language = %language, ?processors, "document pipeline loaded");
        Ok(Self {
            language,
            processors,
            hmm,
            rules,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn scheme(&self) -> LabelScheme {
        self.language.scheme()
    }

    /// Processes a batch of documents, returning them with tokens and
    /// entities filled in.
    pub fn process(&self, documents: Vec<Document>) -> Result<Vec<Document>> {
        if !self.processors.tokenize {
            return Err(NerError::model(
                backend_name(self.language),
                "processor 'tokenize' was not loaded",
            ));
        }
        let (hmm, rules) = match (&self.hmm, &self.rules) {
            (Some(hmm), Some(rules)) => (hmm, rules),
            _ => {
                return Err(NerError::model(
                    backend_name(self.language),
                    "processor 'ner' was not loaded",
                ))
            }
        };

        documents
            .into_iter()
            .map(|mut doc| {
                doc.tokens = tokenize_with_mode(&doc.text, TokenizerMode::Conservative);
                let words: Vec<String> = doc.tokens.iter().map(|t| t.text.clone()).collect();
                let mut tags = hmm.predict(&words);

                // Gazetteer hits override the HMM.
                for (tag, hit) in tags.iter_mut().zip(rules.apply(&doc.tokens)) {
                    if let Some(hit) = hit {
                        *tag = hit;
                    }
                }

                doc.ents = bio_to_spans(&doc.tokens, &tags);
                for ent in &doc.ents {
                    ent.validate(&doc.text)?;
                }
                Ok(doc)
            })
            .collect()
    }
}

pub(crate) fn backend_name(language: Language) -> String {
    format!("document-{}", language.iso1())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_pipeline_fills_entities() {
        let pipeline = DocumentPipeline::new(Language::Dutch, Processors::default()).unwrap();
        let docs = pipeline
            .process(vec![Document::new("Tom woont in Den Haag.")])
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].ents,
            vec![EntitySpan::new(0, 3, "PERSON"), EntitySpan::new(13, 21, "GPE")]
        );
    }

    #[test]
    fn test_missing_ner_processor_is_model_error() {
        let processors = Processors {
            tokenize: true,
            ner: false,
        };
        let pipeline = DocumentPipeline::new(Language::German, processors).unwrap();
        let err = pipeline.process(vec![Document::new("Tom wohnt in Berlin.")]).unwrap_err();
        assert!(matches!(err, NerError::Model { .. }));
    }

    #[test]
    fn test_empty_batch() {
        let pipeline = DocumentPipeline::new(Language::English, Processors::default()).unwrap();
        assert!(pipeline.process(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_seed_sentences_produce_scheme_labels() {
        for language in Language::ALL {
            let pipeline = DocumentPipeline::new(language, Processors::default()).unwrap();
            let docs: Vec<Document> = seed::seed_sentences(language)
                .iter()
                .map(|s| Document::new(s.text))
                .collect();
            for doc in pipeline.process(docs).unwrap() {
                assert!(doc.ents.iter().all(|e| language.scheme().contains(&e.label)));
            }
        }
    }
}
