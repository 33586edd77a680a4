//! Batch evaluation of candidate depth maps against references.
//!
//! The evaluator pairs files, then runs load -> align -> metrics on every
//! pair. Each pair ends either as a [`MetricRecord`] or as a [`PairFailure`];
//! one bad pair never stops the batch. With the `rayon` feature and
//! `EvalConfig::parallel`, pairs are processed on the rayon pool and
//! collected back in pair order.

mod summary;

pub use summary::Summary;

use crate::align::{align_to_reference, AlignParams};
use crate::image::io::load_depth_map;
use crate::metrics::{compute_metrics, MetricRecord, SsimParams};
use crate::pairs::{discover_pairs, NamingConvention, Pair, UnmatchedCandidate};
use crate::report::write_csv;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{DepthEvalError, DepthEvalResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Inputs and parameters of one evaluation run.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalConfig {
    /// Directory of trusted reference depth maps.
    pub reference_dir: PathBuf,
    /// Directory of candidate depth maps to score.
    pub candidate_dir: PathBuf,
    /// CSV file written by [`Evaluator::run`].
    pub output_path: PathBuf,
    pub naming: NamingConvention,
    pub align: AlignParams,
    pub ssim: SsimParams,
    /// Process pairs in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl EvalConfig {
    /// Creates a configuration with default naming and metric parameters.
    pub fn new(
        reference_dir: impl Into<PathBuf>,
        candidate_dir: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reference_dir: reference_dir.into(),
            candidate_dir: candidate_dir.into(),
            output_path: output_path.into(),
            naming: NamingConvention::default(),
            align: AlignParams::default(),
            ssim: SsimParams::default(),
            parallel: false,
        }
    }
}

/// A pair excluded from the results, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct PairFailure {
    pub key: String,
    pub reason: DepthEvalError,
}

/// Per-pair outcome.
pub type PairOutcome = Result<MetricRecord, PairFailure>;

/// Everything a run learned.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    /// Number of pairs that passed matching.
    pub matched: usize,
    pub unmatched: Vec<UnmatchedCandidate>,
    /// One outcome per matched pair, in pair order.
    pub outcomes: Vec<PairOutcome>,
}

impl EvaluationReport {
    /// Successful records in pair order.
    pub fn records(&self) -> Vec<&MetricRecord> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok()).collect()
    }

    /// Excluded pairs in pair order.
    pub fn failures(&self) -> Vec<&PairFailure> {
        self.outcomes
            .iter()
            .filter_map(|o| o.as_ref().err())
            .collect()
    }

    /// Aggregate statistics over the successful records.
    pub fn summary(&self) -> Summary {
        Summary::from_records(self.records())
    }
}

/// Result of [`Evaluator::run`].
#[derive(Clone, Debug, PartialEq)]
pub enum RunOutcome {
    /// Records were written to `path`.
    Written {
        path: PathBuf,
        report: EvaluationReport,
    },
    /// No pair produced a record; no file was written.
    EmptyBatch { report: EvaluationReport },
}

impl RunOutcome {
    pub fn report(&self) -> &EvaluationReport {
        match self {
            RunOutcome::Written { report, .. } | RunOutcome::EmptyBatch { report } => report,
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Loads, aligns and scores one pair.
pub fn evaluate_pair(
    pair: &Pair,
    align: AlignParams,
    ssim: SsimParams,
) -> DepthEvalResult<MetricRecord> {
    let _span = trace_span!("pair", key = pair.key.as_str()).entered();
    let candidate = load_depth_map(&pair.candidate)?;
    let reference = load_depth_map(&pair.reference)?;
    let alignment = align_to_reference(&candidate, &reference, align).map_err(|err| match err {
        DepthEvalError::EmptyMask => DepthEvalError::NoOverlap {
            candidate: file_label(&pair.candidate),
            reference: file_label(&pair.reference),
        },
        other => other,
    })?;
    let metrics = compute_metrics(&reference, &alignment.aligned, &alignment.mask, ssim)?;
    Ok(MetricRecord::new(
        pair.key.as_str(),
        alignment.scale,
        metrics,
    ))
}

/// Batch driver bound to one [`EvalConfig`].
pub struct Evaluator {
    config: EvalConfig,
}

impl Evaluator {
    /// Validates the parameters and binds the configuration.
    pub fn new(config: EvalConfig) -> DepthEvalResult<Self> {
        config.align.validate()?;
        config.ssim.validate()?;
        if config.naming.candidate_suffix.is_empty() {
            return Err(DepthEvalError::InvalidInput(
                "candidate_suffix must not be empty",
            ));
        }
        Ok(Self { config })
    }

    /// Returns the bound configuration.
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    fn outcome(&self, pair: &Pair) -> PairOutcome {
        evaluate_pair(pair, self.config.align, self.config.ssim).map_err(|reason| PairFailure {
            key: pair.key.clone(),
            reason,
        })
    }

    fn outcomes(&self, pairs: &[Pair]) -> Vec<PairOutcome> {
        #[cfg(feature = "rayon")]
        {
            if self.config.parallel {
                return pairs.par_iter().map(|pair| self.outcome(pair)).collect();
            }
        }
        pairs.iter().map(|pair| self.outcome(pair)).collect()
    }

    /// Scores every matched pair without writing any output.
    ///
    /// Fails only when a directory cannot be listed.
    pub fn evaluate(&self) -> DepthEvalResult<EvaluationReport> {
        let _span = trace_span!("evaluate").entered();
        let matched = discover_pairs(
            &self.config.candidate_dir,
            &self.config.reference_dir,
            &self.config.naming,
        )?;
        trace_event!(
            "pairs_matched",
            pairs = matched.pairs.len(),
            unmatched = matched.unmatched.len()
        );

        let mut report = EvaluationReport {
            matched: matched.pairs.len(),
            unmatched: matched.unmatched,
            ..EvaluationReport::default()
        };
        report.outcomes = self.outcomes(&matched.pairs);
        for outcome in &report.outcomes {
            match outcome {
                Ok(record) => {
                    trace_event!(
                        "pair_scored",
                        key = record.image.as_str(),
                        psnr = record.psnr,
                        ssim = record.ssim
                    );
                }
                Err(failure) => {
                    let reason = failure.reason.to_string();
                    trace_warn!(
                        "pair_failed",
                        key = failure.key.as_str(),
                        reason = reason.as_str()
                    );
                }
            }
        }
        Ok(report)
    }

    /// Evaluates the batch and writes the CSV when any record exists.
    pub fn run(&self) -> DepthEvalResult<RunOutcome> {
        let report = self.evaluate()?;
        if report.records().is_empty() {
            trace_warn!("empty_batch", matched = report.matched);
            return Ok(RunOutcome::EmptyBatch { report });
        }
        let rows = {
            let records = report.records();
            write_csv(&self.config.output_path, records.iter().copied())?;
            records.len()
        };
        trace_event!("results_written", rows = rows);
        Ok(RunOutcome::Written {
            path: self.config.output_path.clone(),
            report,
        })
    }
}
