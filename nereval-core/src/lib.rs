//! # nereval-core: NER evaluation harness
//!
//! Loads parallel sentence corpora in German, English and Dutch, annotates
//! them with named-entity backends, and scores the annotations against a
//! reference pipeline (precision, recall and F1 overall and per label, plus
//! tokenization accuracy).
//!
//! ## Architecture
//!
//! Data flows through a linear pipeline:
//!
//! 1.  **Corpus** ([`corpus`]): tab-separated files → sentence lists.
//! 2.  **Annotation** ([`annotator`]): a backend turns each sentence into
//!     character spans ([`span::EntitySpan`]).
//!     *   **Pipeline** ([`pipeline`]): tokenizer + rules + averaged
//!         perceptron, per language or multilingual.
//!     *   **Document pipeline** ([`document`]): documents in, documents out,
//!         HMM tagging with gazetteer correction.
//! 3.  **Scoring** ([`scorer`]): annotations as gold standard, reference
//!     pipeline as prediction.
//! 4.  **Report** ([`report`]): timing, console output, optional CSV
//!     export ([`export`]).
//!
//! Backends build themselves at load time from embedded seed data
//! ([`seed`]): gazetteers for the [`rules`] engine and BIO sentences for the
//! statistical taggers ([`perceptron`], [`hmm`]).
//!
//! ## Example
//!
//! ```rust
//! use nereval_core::{annotate, AnnotateOptions, Language, Pipeline, PipelineSpec, Scorer};
//!
//! let backend = Pipeline::load(PipelineSpec::multilingual()).unwrap();
//! let reference = Pipeline::load(PipelineSpec::reference(Language::English)).unwrap();
//!
//! let sentences = vec!["I like London.".to_string()];
//! let examples = annotate(&sentences, &backend, &AnnotateOptions::default()).unwrap();
//! let report = Scorer::score(&examples, &reference).unwrap();
//! assert!(report.to_map().contains_key("ents_f"));
//! ```

pub mod annotator;
pub mod config;
pub mod corpus;
pub mod document;
pub mod error;
pub mod export;
pub mod features;
pub mod hmm;
pub mod lang;
pub mod perceptron;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod scorer;
pub mod seed;
pub mod span;
pub mod tokenizer;

pub use annotator::{annotate, AnnotateOptions, Annotator};
pub use config::ExperimentConfig;
pub use corpus::{Corpora, CorpusPaths};
pub use document::{Document, DocumentPipeline, Processors};
pub use error::{NerError, Result};
pub use lang::{LabelScheme, Language};
pub use pipeline::{ModelSize, Pipeline, PipelineSpec};
pub use report::{run_experiment, RunOutcome};
pub use scorer::{ScoreReport, Scorer};
pub use span::{AnnotatedExample, EntitySpan};
pub use tokenizer::{Token, TokenizerMode};
