//! # Scoring against a reference pipeline
//!
//! For every [`AnnotatedExample`] the annotated entities are the gold
//! standard, aligned to the tokens of the reference pipeline's
//! [`Pipeline::make_doc`]. The reference's full [`Pipeline::process`] output
//! is the prediction. Scores follow the usual exact-match convention: an
//! entity counts as correct only when start, end and label all agree.
//!
//! | Key | Meaning |
//! |---|---|
//! | `token_acc` | predicted tokens whose boundaries match a reference token |
//! | `token_p/r/f` | tokenization precision, recall, F1 |
//! | `ents_p/r/f` | entity precision, recall, F1 |
//! | `ents_per_type` | per-label P/R/F1, labels present in the gold set |

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::span::{AnnotatedExample, EntitySpan};

/// True positive, false positive and false negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prf {
    pub tp: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl Prf {
    fn is_empty(&self) -> bool {
        self.tp + self.fp + self.fn_ == 0
    }

    /// `None` only when there is nothing to score. No predictions against
    /// missed gold entities give 0.0.
    pub fn precision(&self) -> Option<f64> {
        self.share(self.tp + self.fp)
    }

    pub fn recall(&self) -> Option<f64> {
        self.share(self.tp + self.fn_)
    }

    pub fn f1(&self) -> Option<f64> {
        let p = self.precision()?;
        let r = self.recall()?;
        if p + r == 0.0 {
            Some(0.0)
        } else {
            Some(2.0 * p * r / (p + r))
        }
    }

    fn share(&self, den: usize) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(ratio(self.tp, den).unwrap_or(0.0))
        }
    }

    fn add(&mut self, other: &Prf) {
        self.tp += other.tp;
        self.fp += other.fp;
        self.fn_ += other.fn_;
    }

    /// Counts for one predicted set against one gold set.
    fn compare<T: Eq + std::hash::Hash>(predicted: &HashSet<T>, gold: &HashSet<T>) -> Prf {
        let tp = predicted.intersection(gold).count();
        Prf {
            tp,
            fp: predicted.len() - tp,
            fn_: gold.len() - tp,
        }
    }
}

fn ratio(num: usize, den: usize) -> Option<f64> {
    if den == 0 {
        None
    } else {
        Some(num as f64 / den as f64)
    }
}

/// Precision, recall and F1 of one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub p: Option<f64>,
    pub r: Option<f64>,
    pub f: Option<f64>,
}

impl From<&Prf> for LabelScore {
    fn from(prf: &Prf) -> Self {
        Self {
            p: prf.precision(),
            r: prf.recall(),
            f: prf.f1(),
        }
    }
}

/// Evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub token_acc: Option<f64>,
    pub token_p: Option<f64>,
    pub token_r: Option<f64>,
    pub token_f: Option<f64>,
    pub ents_p: Option<f64>,
    pub ents_r: Option<f64>,
    pub ents_f: Option<f64>,
    pub ents_per_type: BTreeMap<String, LabelScore>,
    /// Gold spans skipped because they do not fall on token boundaries.
    pub misaligned: usize,
    /// Number of examples scored.
    pub examples: usize,
}

impl ScoreReport {
    /// The scores as a JSON object with fixed keys. Undefined values are `null`.
    pub fn to_map(&self) -> Map<String, Value> {
        let per_type: Map<String, Value> = self
            .ents_per_type
            .iter()
            .map(|(label, s)| (label.clone(), json!({ "p": s.p, "r": s.r, "f": s.f })))
            .collect();

        let mut map = Map::new();
        map.insert("token_acc".into(), json!(self.token_acc));
        map.insert("token_p".into(), json!(self.token_p));
        map.insert("token_r".into(), json!(self.token_r));
        map.insert("token_f".into(), json!(self.token_f));
        map.insert("ents_p".into(), json!(self.ents_p));
        map.insert("ents_r".into(), json!(self.ents_r));
        map.insert("ents_f".into(), json!(self.ents_f));
        map.insert("ents_per_type".into(), Value::Object(per_type));
        map
    }
}

/// Scores annotated examples against a reference pipeline.
pub struct Scorer;

impl Scorer {
    /// Aligns and scores every example.
    ///
    /// Fails with [`crate::NerError::InvalidSpan`] when an annotated span
    /// does not fit its sentence. Spans that fit but cut through a token are
    /// skipped and counted in [`ScoreReport::misaligned`].
    pub fn score(examples: &[AnnotatedExample], reference: &Pipeline) -> Result<ScoreReport> {
        let mut tokens = Prf::default();
        let mut token_matches = 0;
        let mut predicted_tokens = 0;
        let mut ents = Prf::default();
        let mut per_label: BTreeMap<String, Prf> = BTreeMap::new();
        let mut gold_labels: BTreeSet<String> = BTreeSet::new();
        let mut misaligned = 0;

        for example in examples {
            let gold_doc = reference.make_doc(&example.sentence);
            let predicted = reference.process(&example.sentence);

            let gold_bounds: HashSet<(usize, usize)> = gold_doc.token_bounds().into_iter().collect();
            let pred_bounds: HashSet<(usize, usize)> = predicted.token_bounds().into_iter().collect();
            token_matches += pred_bounds.intersection(&gold_bounds).count();
            predicted_tokens += pred_bounds.len();
            tokens.add(&Prf::compare(&pred_bounds, &gold_bounds));

            let starts: HashSet<usize> = gold_doc.tokens.iter().map(|t| t.start).collect();
            let ends: HashSet<usize> = gold_doc.tokens.iter().map(|t| t.end).collect();

            let mut gold: HashSet<&EntitySpan> = HashSet::new();
            for span in &example.entities {
                span.validate(&example.sentence)?;
                if starts.contains(&span.start) && ends.contains(&span.end) {
                    gold.insert(span);
                    gold_labels.insert(span.label.clone());
                } else {
                    misaligned += 1;
                    warn!(
                        sentence = %example.sentence,
                        span = %span,
                        "entity does not align with token boundaries, skipped"
                    );
                }
            }
            let pred: HashSet<&EntitySpan> = predicted.ents.iter().collect();
            ents.add(&Prf::compare(&pred, &gold));

            let labels: BTreeSet<&str> = gold
                .iter()
                .chain(pred.iter())
                .map(|s| s.label.as_str())
                .collect();
            for label in labels {
                let p: HashSet<&EntitySpan> = pred.iter().copied().filter(|s| s.label == label).collect();
                let g: HashSet<&EntitySpan> = gold.iter().copied().filter(|s| s.label == label).collect();
                per_label
                    .entry(label.to_string())
                    .or_default()
                    .add(&Prf::compare(&p, &g));
            }
        }

        let ents_per_type = per_label
            .iter()
            .filter(|(label, _)| gold_labels.contains(*label))
            .map(|(label, prf)| (label.clone(), LabelScore::from(prf)))
            .collect();

        let report = ScoreReport {
            token_acc: ratio(token_matches, predicted_tokens),
            token_p: tokens.precision(),
            token_r: tokens.recall(),
            token_f: tokens.f1(),
            ents_p: ents.precision(),
            ents_r: ents.recall(),
            ents_f: ents.f1(),
            ents_per_type,
            misaligned,
            examples: examples.len(),
        };

        info!(
            reference = %reference.spec(),
            examples = report.examples,
            misaligned,
            ents_f = ?report.ents_f,
            "scoring finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NerError;
    use crate::lang::Language;
    use crate::pipeline::PipelineSpec;

    fn reference() -> Pipeline {
        Pipeline::load(PipelineSpec::reference(Language::English)).unwrap()
    }

    #[test]
    fn test_prf_math() {
        let prf = Prf { tp: 2, fp: 2, fn_: 0 };
        assert_eq!(prf.precision(), Some(0.5));
        assert_eq!(prf.recall(), Some(1.0));
        let f = prf.f1().unwrap();
        assert!((f - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(Prf::default().precision(), None);
        assert_eq!(Prf::default().f1(), None);
    }

    #[test]
    fn test_zero_denominator_scores_zero() {
        let missed = Prf { tp: 0, fp: 0, fn_: 3 };
        assert_eq!(missed.precision(), Some(0.0));
        assert_eq!(missed.recall(), Some(0.0));
        assert_eq!(missed.f1(), Some(0.0));

        let spurious = Prf { tp: 0, fp: 2, fn_: 0 };
        assert_eq!(spurious.precision(), Some(0.0));
        assert_eq!(spurious.recall(), Some(0.0));
        assert_eq!(spurious.f1(), Some(0.0));
    }

    #[test]
    fn test_missed_gold_label_scores_zero() {
        let reference = reference();
        let sentence = "It rains a lot here.";
        assert!(reference.process(sentence).ents.is_empty());
        let examples = vec![AnnotatedExample::new(sentence, vec![EntitySpan::new(0, 2, "PERSON")])];

        let report = Scorer::score(&examples, &reference).unwrap();
        assert_eq!(report.ents_p, Some(0.0));
        assert_eq!(report.ents_r, Some(0.0));
        assert_eq!(report.ents_f, Some(0.0));
        let person = report.ents_per_type["PERSON"];
        assert_eq!((person.p, person.r, person.f), (Some(0.0), Some(0.0), Some(0.0)));
    }

    #[test]
    fn test_matching_annotations_score_perfectly() {
        let reference = reference();
        let sentence = "I like London.";
        let ents = reference.process(sentence).ents;
        assert!(!ents.is_empty());
        let examples = vec![AnnotatedExample::new(sentence, ents)];

        let report = Scorer::score(&examples, &reference).unwrap();
        assert_eq!(report.token_acc, Some(1.0));
        assert_eq!(report.ents_p, Some(1.0));
        assert_eq!(report.ents_r, Some(1.0));
        assert_eq!(report.ents_f, Some(1.0));
        assert_eq!(report.misaligned, 0);
        assert!(report.ents_per_type.contains_key("GPE"));
    }

    #[test]
    fn test_per_type_only_lists_gold_labels() {
        let reference = reference();
        let sentence = "Mary lives in London.";
        let examples = vec![AnnotatedExample::new(sentence, vec![EntitySpan::new(14, 20, "GPE")])];

        let report = Scorer::score(&examples, &reference).unwrap();
        let labels: Vec<&String> = report.ents_per_type.keys().collect();
        assert_eq!(labels, vec!["GPE"]);
    }

    #[test]
    fn test_misaligned_span_is_skipped() {
        let reference = reference();
        let examples = vec![AnnotatedExample::new("I like London.", vec![EntitySpan::new(8, 13, "GPE")])];
        let report = Scorer::score(&examples, &reference).unwrap();
        assert_eq!(report.misaligned, 1);
        assert!(report.ents_per_type.is_empty());
    }

    #[test]
    fn test_invalid_span_is_error() {
        let reference = reference();
        let examples = vec![AnnotatedExample::new("Hi.", vec![EntitySpan::new(0, 10, "GPE")])];
        let err = Scorer::score(&examples, &reference).unwrap_err();
        assert!(matches!(err, NerError::InvalidSpan { .. }));
    }

    #[test]
    fn test_report_keys_are_stable() {
        let report = Scorer::score(&[], &reference()).unwrap();
        let map = report.to_map();
        for key in [
            "token_acc", "token_p", "token_r", "token_f", "ents_p", "ents_r", "ents_f", "ents_per_type",
        ] {
            assert!(map.contains_key(key), "missing {key}");
        }
        assert_eq!(report.ents_f, None);
    }
}
