//! # Report driver
//!
//! Runs a configured experiment: for each run, tag the language's corpus
//! with the run's backend, score the annotations against the reference
//! pipeline, and optionally append them to the CSV export. Every run is
//! timed; the caller receives each [`RunOutcome`] as soon as it completes.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::info;

use crate::annotator::{annotate, AnnotateOptions, Annotator};
use crate::config::{Backend, ExperimentConfig, RunConfig};
use crate::corpus::Corpora;
use crate::document::{DocumentPipeline, Processors};
use crate::error::Result;
use crate::export::export_csv;
use crate::pipeline::{Pipeline, PipelineSpec};
use crate::scorer::{ScoreReport, Scorer};
use crate::span::AnnotatedExample;

/// Result of one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run: RunConfig,
    pub annotator: String,
    pub reference: String,
    /// Sentences handed to the annotator.
    pub sentences: usize,
    pub examples: Vec<AnnotatedExample>,
    pub report: ScoreReport,
    /// Rows appended to the CSV export, if exporting.
    pub exported: Option<usize>,
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Console rendering: optional annotation list, score map, timing.
    pub fn render(&self, with_annotations: bool) -> String {
        let mut lines = vec![format!("{} ({}):", self.run.language, self.annotator)];
        if with_annotations {
            let listed: Vec<String> = self.examples.iter().map(ToString::to_string).collect();
            lines.push(format!("[{}]", listed.join(", ")));
        }
        lines.push(format!("Evaluation against {}:", self.reference));
        lines.push(serde_json::to_string_pretty(&self.report.to_map()).unwrap_or_default());
        if let Some(rows) = self.exported {
            lines.push(format!("Exported {rows} rows."));
        }
        lines.push(format!("Time: {:.3}s", self.elapsed.as_secs_f64()));
        lines.join("\n")
    }
}

/// Builds the annotator a run asks for.
pub fn build_annotator(run: &RunConfig) -> Result<Box<dyn Annotator>> {
    Ok(match run.backend {
        Backend::Pipeline { size } => Box::new(Pipeline::load(PipelineSpec::new(Some(run.language), size))?),
        Backend::Multilingual => Box::new(Pipeline::load(PipelineSpec::multilingual())?),
        Backend::Document => Box::new(DocumentPipeline::new(run.language, Processors::default())?),
    })
}

/// Loads the corpora named in `config` and runs every configured run.
pub fn run_experiment(
    config: &ExperimentConfig,
    on_run: impl FnMut(&RunOutcome),
) -> Result<Vec<RunOutcome>> {
    let corpora = Corpora::load(&config.corpus)?;
    run_with_corpora(config, &corpora, on_run)
}

/// Runs every configured run over already loaded corpora.
///
/// Stops at the first failing run. Reference pipelines are loaded once and
/// shared between runs that use the same one.
pub fn run_with_corpora(
    config: &ExperimentConfig,
    corpora: &Corpora,
    mut on_run: impl FnMut(&RunOutcome),
) -> Result<Vec<RunOutcome>> {
    let started = Instant::now();
    let options = AnnotateOptions {
        keep_unannotated: config.keep_unannotated,
    };
    let mut references: HashMap<PipelineSpec, Pipeline> = HashMap::new();
    let mut outcomes = Vec::with_capacity(config.runs.len());

    for run in &config.runs {
        let run_started = Instant::now();
        let sentences = corpora.limited(run.language, config.limits.get(run.language));
        let annotator = build_annotator(run)?;
        info!(language = %run.language, annotator = %annotator.name(), sentences = sentences.len(), "tagging");
        let examples = annotate(sentences, annotator.as_ref(), &options)?;

        let spec = run.reference.spec(run.language);
        let reference = match references.entry(spec) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Pipeline::load(spec)?),
        };
        info!(reference = %spec, examples = examples.len(), "evaluating");
        let report = Scorer::score(&examples, reference)?;

        let exported = match &config.export {
            Some(path) => Some(export_csv(path, &examples)?),
            None => None,
        };

        let outcome = RunOutcome {
            run: *run,
            annotator: annotator.name(),
            reference: spec.to_string(),
            sentences: sentences.len(),
            examples,
            report,
            exported,
            elapsed: run_started.elapsed(),
        };
        info!(
            language = %run.language,
            annotator = %outcome.annotator,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "run finished"
        );
        on_run(&outcome);
        outcomes.push(outcome);
    }

    info!(
        runs = outcomes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "experiment finished"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Reference;
    use crate::error::NerError;
    use crate::lang::Language;
    use crate::pipeline::ModelSize;
    use std::fs;

    fn corpora() -> Corpora {
        Corpora {
            german: vec!["Tom wohnt in Berlin.".into(), "Es regnet.".into()],
            english: vec!["I like London.".into(), "Mary works for Google.".into()],
            dutch: vec!["Jan woont in Utrecht.".into()],
        }
    }

    fn config(runs: Vec<RunConfig>) -> ExperimentConfig {
        ExperimentConfig {
            runs,
            print_annotations: false,
            ..ExperimentConfig::default()
        }
    }

    #[test]
    fn test_runs_every_configured_run() {
        let config = config(vec![
            RunConfig {
                language: Language::English,
                backend: Backend::Pipeline {
                    size: ModelSize::Medium,
                },
                reference: Reference::Large,
            },
            RunConfig {
                language: Language::German,
                backend: Backend::Document,
                reference: Reference::Multilingual,
            },
        ]);

        let mut seen = 0;
        let outcomes = run_with_corpora(&config, &corpora(), |_| seen += 1).unwrap();
        assert_eq!(seen, 2);
        assert_eq!(outcomes[0].reference, "en_ner_lg");
        assert_eq!(outcomes[1].reference, "xx_ner_lg");
        assert!(outcomes.iter().all(|o| o.exported.is_none()));
        assert!(outcomes[0].report.ents_p.is_some());
    }

    #[test]
    fn test_limits_apply() {
        let mut config = config(vec![RunConfig {
            language: Language::German,
            backend: Backend::Multilingual,
            reference: Reference::Large,
        }]);
        config.limits.german = Some(1);
        config.keep_unannotated = true;

        let outcomes = run_with_corpora(&config, &corpora(), |_| {}).unwrap();
        assert_eq!(outcomes[0].sentences, 1);
        assert_eq!(outcomes[0].examples.len(), 1);
    }

    #[test]
    fn test_export_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut config = config(vec![RunConfig {
            language: Language::English,
            backend: Backend::Pipeline {
                size: ModelSize::Large,
            },
            reference: Reference::Large,
        }]);
        config.export = Some(path.clone());

        let outcomes = run_with_corpora(&config, &corpora(), |_| {}).unwrap();
        let rows = outcomes[0].exported.unwrap();
        assert_eq!(rows, outcomes[0].examples.len());
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), rows + 1);
    }

    #[test]
    fn test_missing_corpus_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(ExperimentConfig::default().runs);
        config.corpus = crate::corpus::CorpusPaths::in_dir(dir.path());
        let err = run_experiment(&config, |_| {}).unwrap_err();
        assert!(matches!(err, NerError::CorpusIo { .. }));
    }

    #[test]
    fn test_render() {
        let config = config(vec![RunConfig {
            language: Language::English,
            backend: Backend::Pipeline {
                size: ModelSize::Large,
            },
            reference: Reference::Large,
        }]);
        let outcomes = run_with_corpora(&config, &corpora(), |_| {}).unwrap();
        let text = outcomes[0].render(true);
        assert!(text.contains("\"ents_f\""));
        assert!(text.contains("[7, 13, 'GPE']"));
        assert!(text.contains("Time: "));
        assert!(text.starts_with("English ("));
        assert!(!outcomes[0].render(false).contains("'GPE'"));
    }
}
