//! # Experiment configuration
//!
//! One JSON document describes a whole experiment: where the corpora live,
//! how many sentences of each to use, which backend runs against which
//! reference, and whether results are printed and exported. Every field has
//! a default, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "corpus": { "german": "./deu_sentences.tsv", "english": "./eng_sentences.tsv", "dutch": "./nld_sentences.tsv" },
//!   "limits": { "german": 163111, "english": 163111 },
//!   "runs": [
//!     { "language": "german", "backend": { "kind": "pipeline", "size": "medium" } },
//!     { "language": "german", "backend": { "kind": "document" }, "reference": "multilingual" }
//!   ],
//!   "export": "./results.csv"
//! }
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::CorpusPaths;
use crate::error::{NerError, Result};
use crate::lang::Language;
use crate::pipeline::{ModelSize, PipelineSpec};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "NEREVAL_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "nereval.json";
/// Sentence limit for the German and English corpora.
pub const DEFAULT_LIMIT: usize = 163_111;
pub const DEFAULT_EXPORT_FILE: &str = "./results.csv";

/// The annotator of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backend {
    /// Monolingual pipeline of the run's language.
    Pipeline {
        #[serde(default = "medium")]
        size: ModelSize,
    },
    /// Multilingual pipeline, CoNLL labels.
    Multilingual,
    /// Document pipeline of the run's language.
    Document,
}

fn medium() -> ModelSize {
    ModelSize::Medium
}

/// The pipeline whose output the annotations are scored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    /// Large monolingual pipeline of the run's language.
    #[default]
    Large,
    Multilingual,
}

impl Reference {
    pub fn spec(&self, language: Language) -> PipelineSpec {
        match self {
            Reference::Large => PipelineSpec::reference(language),
            Reference::Multilingual => PipelineSpec::multilingual(),
        }
    }
}

/// One tag-evaluate-export cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub language: Language,
    pub backend: Backend,
    #[serde(default)]
    pub reference: Reference,
}

/// Sentence limit per language; `None` uses the whole corpus. Languages
/// left out of the JSON object keep their default limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub german: Option<usize>,
    pub english: Option<usize>,
    pub dutch: Option<usize>,
}

impl Limits {
    pub fn get(&self, language: Language) -> Option<usize> {
        match language {
            Language::German => self.german,
            Language::English => self.english,
            Language::Dutch => self.dutch,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            german: Some(DEFAULT_LIMIT),
            english: Some(DEFAULT_LIMIT),
            dutch: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub corpus: CorpusPaths,
    pub limits: Limits,
    pub runs: Vec<RunConfig>,
    /// CSV file results are appended to; no export when unset.
    pub export: Option<PathBuf>,
    /// Print every annotated example before scoring.
    pub print_annotations: bool,
    /// Keep sentences without entities in the annotation results.
    pub keep_unannotated: bool,
}

impl Default for ExperimentConfig {
    /// Every backend on every language, each scored against the large
    /// monolingual pipeline.
    fn default() -> Self {
        let runs = Language::ALL
            .iter()
            .flat_map(|&language| {
                [
                    Backend::Pipeline {
                        size: ModelSize::Medium,
                    },
                    Backend::Multilingual,
                    Backend::Document,
                ]
                .into_iter()
                .map(move |backend| RunConfig {
                    language,
                    backend,
                    reference: Reference::Large,
                })
            })
            .collect();

        Self {
            corpus: CorpusPaths::default(),
            limits: Limits::default(),
            runs,
            export: None,
            print_annotations: true,
            keep_unannotated: false,
        }
    }
}

impl ExperimentConfig {
    /// Loads from `$NEREVAL_CONFIG`, else `./nereval.json` if present, else
    /// the defaults.
    pub fn load() -> Result<Self> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_path(PathBuf::from(path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }
        debug!("no config file, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| NerError::Config(format!("cannot read {}: {e}", path.display())))?;
        debug!(path = %path.display(), "config file read");
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.runs.is_empty() {
            return Err(NerError::Config("no runs configured".to_string()));
        }
        for language in Language::ALL {
            if self.limits.get(language) == Some(0) {
                return Err(NerError::Config(format!("limit for {language} must be positive")));
            }
        }
        if let Some(path) = &self.export {
            if path.as_os_str().is_empty() || path.is_dir() {
                return Err(NerError::Config(format!(
                    "export target {} is not a file path",
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Export target with the conventional default file name.
    pub fn with_default_export(mut self) -> Self {
        self.export = Some(PathBuf::from(DEFAULT_EXPORT_FILE));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = ExperimentConfig::from_json("{}").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert_eq!(config.runs.len(), 9);
        assert_eq!(config.limits.get(Language::English), Some(163_111));
        assert_eq!(config.limits.get(Language::Dutch), None);
        assert!(config.export.is_none());
    }

    #[test]
    fn test_parse_runs() {
        let config = ExperimentConfig::from_json(
            r#"{
                "runs": [
                    { "language": "dutch", "backend": { "kind": "pipeline" } },
                    { "language": "german", "backend": { "kind": "document" }, "reference": "multilingual" }
                ],
                "limits": { "german": 10, "english": null, "dutch": 5 },
                "export": "out.csv"
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.runs[0].backend,
            Backend::Pipeline {
                size: ModelSize::Medium
            }
        );
        assert_eq!(config.runs[0].reference, Reference::Large);
        assert_eq!(config.runs[1].reference.spec(Language::German), PipelineSpec::multilingual());
        assert_eq!(config.limits.get(Language::Dutch), Some(5));
        assert_eq!(config.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            ExperimentConfig::from_json(r#"{ "runs": [] }"#),
            Err(NerError::Config(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json(r#"{ "limits": { "german": 0, "english": null, "dutch": null } }"#),
            Err(NerError::Config(_))
        ));
        assert!(matches!(
            ExperimentConfig::from_json(r#"{ "runs": "nope" }"#),
            Err(NerError::Config(_))
        ));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nereval.json");
        fs::write(&path, r#"{ "print_annotations": false }"#).unwrap();
        let config = ExperimentConfig::from_path(&path).unwrap();
        assert!(!config.print_annotations);

        let missing = ExperimentConfig::from_path(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(NerError::Config(_))));
    }

    #[test]
    fn test_default_export_file() {
        let config = ExperimentConfig::default().with_default_export();
        assert_eq!(config.export, Some(PathBuf::from("./results.csv")));
    }
}
