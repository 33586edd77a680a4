//! deptheval scores candidate depth maps against trusted reference depth maps.
//!
//! Candidates are paired with references by filename, resampled onto the
//! reference grid, rescaled by the median depth ratio over pixels valid in
//! both sources, and scored with RMSE, PSNR and SSIM. Results are written as
//! CSV. Pair processing can fan out over threads with the `rayon` feature.

pub mod align;
pub mod eval;
pub mod image;
pub mod metrics;
pub mod pairs;
pub mod report;
mod trace;
pub mod util;

pub use align::{align_to_reference, AlignParams, Alignment, ValidityMask};
pub use eval::{
    evaluate_pair, EvalConfig, EvaluationReport, Evaluator, PairFailure, PairOutcome, RunOutcome,
    Summary,
};
pub use crate::image::io::load_depth_map;
pub use crate::image::{DepthMap, ImageView};
pub use metrics::{compute_metrics, MetricRecord, Metrics, SsimParams};
pub use pairs::{match_pairs, NamingConvention, Pair, PairMatch, UnmatchedCandidate};
pub use report::{write_csv, write_records};
pub use util::{DepthEvalError, DepthEvalResult};
