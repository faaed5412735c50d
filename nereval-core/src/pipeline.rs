//! # Pipeline NER: per-language and multilingual annotator
//!
//! A [`Pipeline`] is built once per [`PipelineSpec`] and then reused for any
//! number of sentences. Building one trains its statistical tagger from the
//! embedded seed sentences and loads the rule engine with gazetteers.
//!
//! Processing a sentence runs:
//!
//! 1. **Tokenization** ([`crate::tokenizer`], Standard mode).
//! 2. **Rules** ([`crate::rules`]): gazetteers and patterns.
//! 3. **Perceptron** ([`crate::perceptron`]): tags every token from features.
//! 4. **Fusion**: in [`AlgorithmMode::Hybrid`] rule tags win and the
//!    perceptron fills the remaining tokens.
//! 5. **Spans**: BIO tags become character spans.
//!
//! ## Example
//!
//! ```rust
//! use nereval_core::lang::Language;
//! use nereval_core::pipeline::{ModelSize, Pipeline, PipelineSpec};
//!
//! let pipeline = Pipeline::load(PipelineSpec::new(Some(Language::English), ModelSize::Large)).unwrap();
//! let doc = pipeline.process("I like London.");
//! assert!(doc.ents.iter().any(|e| e.label == "GPE"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NerError, Result};
use crate::features::Gazetteers;
use crate::lang::{LabelScheme, Language};
use crate::perceptron::PerceptronModel;
use crate::rules::RuleEngine;
use crate::seed::{self, GazetteerEntries};
use crate::span::{bio_to_spans, EntitySpan};
use crate::tokenizer::{tokenize_with_mode, Token, TokenizerMode};

/// Model size. Large carries the curated gazetteers and a longer training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSize {
    Medium,
    #[default]
    Large,
}

impl ModelSize {
    fn epochs(&self) -> usize {
        match self {
            ModelSize::Medium => 3,
            ModelSize::Large => 8,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            ModelSize::Medium => "md",
            ModelSize::Large => "lg",
        }
    }
}

/// Which pipeline to build. `language: None` is the multilingual pipeline,
/// which labels with the CoNLL scheme whatever the input language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub language: Option<Language>,
    #[serde(default)]
    pub size: ModelSize,
}

impl PipelineSpec {
    pub fn new(language: Option<Language>, size: ModelSize) -> Self {
        Self { language, size }
    }

    pub fn multilingual() -> Self {
        Self::new(None, ModelSize::Large)
    }

    /// The reference pipeline for `language`: the large monolingual model.
    pub fn reference(language: Language) -> Self {
        Self::new(Some(language), ModelSize::Large)
    }

    pub fn scheme(&self) -> LabelScheme {
        self.language.map(|l| l.scheme()).unwrap_or(LabelScheme::Conll)
    }
}

impl fmt::Display for PipelineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.language {
            Some(language) => write!(f, "{}_ner_{}", language.iso1(), self.size.suffix()),
            None => write!(f, "xx_ner_{}", self.size.suffix()),
        }
    }
}

/// Which taggers take part in [`Pipeline::process_with_mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmMode {
    /// Rules first, perceptron for the tokens no rule claimed.
    #[default]
    Hybrid,
    /// Gazetteers and patterns only.
    RulesOnly,
    /// Perceptron only.
    Perceptron,
}

/// A processed sentence: its tokens and the entities found over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub text: String,
    pub tokens: Vec<Token>,
    pub ents: Vec<EntitySpan>,
}

impl Doc {
    /// Token boundaries as `(start, end)` character pairs.
    pub fn token_bounds(&self) -> Vec<(usize, usize)> {
        self.tokens.iter().map(Token::bounds).collect()
    }
}

/// A loaded annotator pipeline.
pub struct Pipeline {
    spec: PipelineSpec,
    rules: RuleEngine,
    perceptron: PerceptronModel,
    gazetteers: Gazetteers,
}

impl Pipeline {
    /// Builds the pipeline for `spec` from the embedded seed data.
    ///
    /// Fails with [`NerError::Model`] when the seed data cannot produce a
    /// working model (no sentences, or tags outside the pipeline's scheme).
    pub fn load(spec: PipelineSpec) -> Result<Self> {
        let scheme = spec.scheme();
        let languages: Vec<Language> = match spec.language {
            Some(language) => vec![language],
            None => Language::ALL.to_vec(),
        };

        let mut entries = GazetteerEntries::default();
        for &language in &languages {
            entries.extend(seed::extract_gazetteers_from_seed(language));
            if spec.size == ModelSize::Large {
                entries.extend(seed::curated_gazetteers(language));
            }
        }

        let corpus = seed::tagged_sentences(spec.language);
        if corpus.is_empty() {
            return Err(NerError::model(spec.to_string(), "no seed sentences"));
        }
        if let Some(tag) = corpus
            .iter()
            .flat_map(|s| s.tags.iter())
            .find(|t| t.split_once('-').map(|(_, l)| !scheme.contains(l)).unwrap_or(false))
        {
            return Err(NerError::model(
                spec.to_string(),
                format!("seed tag {tag} is not in the {scheme:?} scheme"),
            ));
        }

        let rules = RuleEngine::with_gazetteers(scheme, &entries)?;
        let gazetteers = Gazetteers::from(&entries);
        let mut perceptron = PerceptronModel::new();
        perceptron.train(&corpus, &gazetteers, spec.size.epochs());

        debug!(
            pipeline = %spec,
            sentences = corpus.len(),
            names = rules.len(),
            tags = perceptron.tags().len(),
            "pipeline loaded"
        );

        Ok(Self {
            spec,
            rules,
            perceptron,
            gazetteers,
        })
    }

    pub fn spec(&self) -> PipelineSpec {
        self.spec
    }

    pub fn scheme(&self) -> LabelScheme {
        self.spec.scheme()
    }

    /// Tokenization only, no entities.
    pub fn make_doc(&self, text: &str) -> Doc {
        Doc {
            text: text.to_string(),
            tokens: tokenize_with_mode(text, TokenizerMode::Standard),
            ents: Vec::new(),
        }
    }

    /// Full processing in [`AlgorithmMode::Hybrid`].
    pub fn process(&self, text: &str) -> Doc {
        self.process_with_mode(text, AlgorithmMode::Hybrid)
    }

    pub fn process_with_mode(&self, text: &str, mode: AlgorithmMode) -> Doc {
        let mut doc = self.make_doc(text);
        if doc.tokens.is_empty() {
            return doc;
        }
        let tags = self.tag(&doc.tokens, mode);
        doc.ents = bio_to_spans(&doc.tokens, &tags);
        doc
    }

    fn tag(&self, tokens: &[Token], mode: AlgorithmMode) -> Vec<String> {
        let rule_tags: Vec<Option<String>> = match mode {
            AlgorithmMode::Perceptron => vec![None; tokens.len()],
            _ => self.rules.apply(tokens),
        };

        let model_tags = match mode {
            AlgorithmMode::RulesOnly => vec!["O".to_string(); tokens.len()],
            _ => self.perceptron.predict(tokens, &self.gazetteers),
        };

        rule_tags
            .into_iter()
            .zip(model_tags)
            .map(|(rule, model)| rule.unwrap_or(model))
            .collect()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("spec", &self.spec)
            .field("names", &self.rules.len())
            .finish()
    }
}
