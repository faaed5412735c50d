//! # Annotation
//!
//! [`Annotator`] is the seam between the harness and the NER backends: a
//! batch of sentences in, one list of character spans per sentence out.
//! [`annotate`] runs a backend over a corpus slice and collects
//! [`AnnotatedExample`]s. Its accumulator lives inside the call, so calling
//! it twice on the same sentences gives the same result both times.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::{backend_name, Document, DocumentPipeline};
use crate::error::{NerError, Result};
use crate::lang::LabelScheme;
use crate::pipeline::Pipeline;
use crate::span::{AnnotatedExample, EntitySpan};

/// An NER backend.
pub trait Annotator {
    /// Name used in logs and reports.
    fn name(&self) -> String;

    /// Tagset every returned label belongs to.
    fn scheme(&self) -> LabelScheme;

    /// Entities for each sentence, index-aligned with `sentences`.
    fn annotate_batch(&self, sentences: &[String]) -> Result<Vec<Vec<EntitySpan>>>;
}

impl Annotator for Pipeline {
    fn name(&self) -> String {
        self.spec().to_string()
    }

    fn scheme(&self) -> LabelScheme {
        Pipeline::scheme(self)
    }

    fn annotate_batch(&self, sentences: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
        Ok(sentences.iter().map(|s| self.process(s).ents).collect())
    }
}

impl Annotator for DocumentPipeline {
    fn name(&self) -> String {
        backend_name(self.language())
    }

    fn scheme(&self) -> LabelScheme {
        DocumentPipeline::scheme(self)
    }

    fn annotate_batch(&self, sentences: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
        let documents = sentences.iter().map(Document::new).collect();
        Ok(self.process(documents)?.into_iter().map(|d| d.ents).collect())
    }
}

/// Options for [`annotate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotateOptions {
    /// Keep sentences for which the backend found no entity.
    #[serde(default)]
    pub keep_unannotated: bool,
}

/// Annotates `sentences` with `annotator`.
///
/// Produces at most one example per sentence, in input order. Sentences
/// without entities are skipped unless [`AnnotateOptions::keep_unannotated`]
/// is set. Every returned span has been validated against its sentence.
pub fn annotate(
    sentences: &[String],
    annotator: &dyn Annotator,
    options: &AnnotateOptions,
) -> Result<Vec<AnnotatedExample>> {
    if sentences.is_empty() {
        return Ok(Vec::new());
    }

    let batches = annotator.annotate_batch(sentences)?;
    if batches.len() != sentences.len() {
        return Err(NerError::model(
            annotator.name(),
            format!("returned {} results for {} sentences", batches.len(), sentences.len()),
        ));
    }

    let scheme = annotator.scheme();
    let mut examples = Vec::with_capacity(sentences.len());
    for (sentence, entities) in sentences.iter().zip(batches) {
        for entity in &entities {
            entity.validate(sentence)?;
            if !scheme.contains(&entity.label) {
                return Err(NerError::model(
                    annotator.name(),
                    format!("label {} is outside the {scheme:?} tagset", entity.label),
                ));
            }
        }
        if entities.is_empty() && !options.keep_unannotated {
            continue;
        }
        debug!(%sentence, entities = entities.len(), "annotated");
        examples.push(AnnotatedExample::new(sentence.clone(), entities));
    }

    info!(
        annotator = %annotator.name(),
        sentences = sentences.len(),
        examples = examples.len(),
        "annotation finished"
    );
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Processors;
    use crate::lang::Language;
    use crate::pipeline::{ModelSize, PipelineSpec};

    struct Fixed(Vec<Vec<EntitySpan>>);

    impl Annotator for Fixed {
        fn name(&self) -> String {
            "fixed".to_string()
        }

        fn scheme(&self) -> LabelScheme {
            LabelScheme::OntoNotes
        }

        fn annotate_batch(&self, _sentences: &[String]) -> Result<Vec<Vec<EntitySpan>>> {
            Ok(self.0.clone())
        }
    }

    fn sentences(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        let annotator = Fixed(vec![]);
        let out = annotate(&[], &annotator, &AnnotateOptions::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_one_example_per_sentence() {
        let annotator = Fixed(vec![
            vec![EntitySpan::new(0, 3, "PERSON"), EntitySpan::new(11, 17, "GPE")],
            vec![],
        ]);
        let input = sentences(&["Tom visits London.", "Nothing here."]);

        let out = annotate(&input, &annotator, &AnnotateOptions::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].entities.len(), 2);

        let keep = AnnotateOptions {
            keep_unannotated: true,
        };
        let out = annotate(&input, &annotator, &keep).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[1].entities.is_empty());
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let pipeline = Pipeline::load(PipelineSpec::new(Some(Language::English), ModelSize::Large)).unwrap();
        let input = sentences(&["I like London.", "Mary works for Google in New York."]);
        let first = annotate(&input, &pipeline, &AnnotateOptions::default()).unwrap();
        let second = annotate(&input, &pipeline, &AnnotateOptions::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_out_of_range_span_is_rejected() {
        let annotator = Fixed(vec![vec![EntitySpan::new(0, 99, "GPE")]]);
        let err = annotate(&sentences(&["Short."]), &annotator, &AnnotateOptions::default()).unwrap_err();
        assert!(matches!(err, NerError::InvalidSpan { .. }));
    }

    #[test]
    fn test_batch_length_mismatch_is_model_error() {
        let annotator = Fixed(vec![]);
        let err = annotate(&sentences(&["One."]), &annotator, &AnnotateOptions::default()).unwrap_err();
        assert!(matches!(err, NerError::Model { .. }));
    }

    #[test]
    fn test_document_backend_failure_surfaces() {
        let processors = Processors {
            tokenize: true,
            ner: false,
        };
        let pipeline = DocumentPipeline::new(Language::Dutch, processors).unwrap();
        let err = annotate(&sentences(&["Tom woont in Amsterdam."]), &pipeline, &AnnotateOptions::default())
            .unwrap_err();
        assert!(matches!(err, NerError::Model { .. }));
    }
}
