//! Error and similarity metrics between a reference and an aligned candidate.
//!
//! RMSE and PSNR use only the pixels of the validity mask. PSNR uses the span
//! of the valid reference values as its peak, since depth units vary from
//! scene to scene. SSIM runs over the full grids with invalid pixels zeroed
//! in both images so the windowed statistics keep their spatial layout.

pub mod ssim;

use crate::align::ValidityMask;
use crate::image::DepthMap;
use crate::trace::trace_span;
use crate::util::math::min_max;
use crate::util::{DepthEvalError, DepthEvalResult};
use serde::Serialize;

pub use ssim::{ssim, SsimParams};

/// Metric values for one aligned pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub rmse: f64,
    /// Decibels; `+inf` when the masked values agree exactly.
    pub psnr: f64,
    pub ssim: f64,
}

/// One output row: key, recovered scale and metrics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricRecord {
    pub image: String,
    pub scale: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "PSNR")]
    pub psnr: f64,
    #[serde(rename = "SSIM")]
    pub ssim: f64,
}

impl MetricRecord {
    /// Combines a key and scale with the computed metrics.
    pub fn new(image: impl Into<String>, scale: f64, metrics: Metrics) -> Self {
        Self {
            image: image.into(),
            scale,
            rmse: metrics.rmse,
            psnr: metrics.psnr,
            ssim: metrics.ssim,
        }
    }
}

fn check_same_len(reference: &[f32], candidate: &[f32]) -> DepthEvalResult<()> {
    if reference.len() != candidate.len() {
        return Err(DepthEvalError::DimensionMismatch {
            expected: (reference.len(), 1),
            got: (candidate.len(), 1),
        });
    }
    if reference.is_empty() {
        return Err(DepthEvalError::EmptyMask);
    }
    Ok(())
}

/// Mean squared error between two equally long value vectors.
pub fn mse(reference: &[f32], candidate: &[f32]) -> DepthEvalResult<f64> {
    check_same_len(reference, candidate)?;
    let sum: f64 = reference
        .iter()
        .zip(candidate)
        .map(|(&r, &c)| {
            let d = f64::from(c) - f64::from(r);
            d * d
        })
        .sum();
    Ok(sum / reference.len() as f64)
}

/// Root-mean-squared error between two equally long value vectors.
pub fn rmse(reference: &[f32], candidate: &[f32]) -> DepthEvalResult<f64> {
    Ok(mse(reference, candidate)?.sqrt())
}

/// Peak signal-to-noise ratio `10 log10(L^2 / MSE)` in decibels.
///
/// Zero error gives `+inf`; a zero `data_range` with non-zero error gives `-inf`.
pub fn psnr(reference: &[f32], candidate: &[f32], data_range: f64) -> DepthEvalResult<f64> {
    let err = mse(reference, candidate)?;
    Ok(10.0 * (data_range * data_range / err).log10())
}

/// Span `max - min` of the values, or zero when none are comparable.
pub fn value_range(values: &[f32]) -> f64 {
    min_max(values.iter().copied())
        .map(|(lo, hi)| f64::from(hi) - f64::from(lo))
        .unwrap_or(0.0)
}

/// Computes RMSE, PSNR and SSIM for an aligned pair.
pub fn compute_metrics(
    reference: &DepthMap,
    aligned: &DepthMap,
    mask: &ValidityMask,
    ssim_params: SsimParams,
) -> DepthEvalResult<Metrics> {
    let _span = trace_span!("metrics", valid = mask.count()).entered();
    if mask.is_empty() {
        return Err(DepthEvalError::EmptyMask);
    }
    if reference.dims() != aligned.dims() {
        return Err(DepthEvalError::DimensionMismatch {
            expected: reference.dims(),
            got: aligned.dims(),
        });
    }

    let ref_values = mask.select(reference)?;
    let cand_values = mask.select(aligned)?;
    let rmse = rmse(&ref_values, &cand_values)?;
    let psnr = psnr(&ref_values, &cand_values, value_range(&ref_values))?;

    let ref_full = reference.zeroed_outside(mask.as_slice())?;
    let cand_full = aligned.zeroed_outside(mask.as_slice())?;
    let ssim = ssim(
        ref_full.view(),
        cand_full.view(),
        value_range(ref_full.data()),
        ssim_params,
    )?;

    Ok(Metrics { rmse, psnr, ssim })
}
