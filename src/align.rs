//! Resolution and scale alignment of a candidate depth map.
//!
//! The candidate is resampled onto the reference grid, pixels lacking a
//! reading in either source are masked out, and the unknown global scale is
//! recovered as the ratio of the masked medians:
//!
//! `scale = median(reference[mask]) / (median(candidate[mask]) + epsilon)`
//!
//! Medians keep the estimate stable against depth spikes and holes that
//! either pipeline may produce.

use crate::image::resize::resize_nearest;
use crate::image::DepthMap;
use crate::trace::{trace_event, trace_span};
use crate::util::math::median_in_place;
use crate::util::{DepthEvalError, DepthEvalResult};

/// Parameters for scale recovery.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignParams {
    /// Added to the candidate median to keep the ratio finite.
    pub epsilon: f64,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self { epsilon: 1e-8 }
    }
}

impl AlignParams {
    pub(crate) fn validate(&self) -> DepthEvalResult<()> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(DepthEvalError::InvalidInput(
                "epsilon must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Pixels holding a non-zero depth in both the reference and the candidate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityMask {
    data: Vec<bool>,
    width: usize,
    height: usize,
    count: usize,
}

impl ValidityMask {
    /// Builds the mask `reference > 0 && candidate > 0`.
    pub fn from_pair(reference: &DepthMap, candidate: &DepthMap) -> DepthEvalResult<Self> {
        if reference.dims() != candidate.dims() {
            return Err(DepthEvalError::DimensionMismatch {
                expected: reference.dims(),
                got: candidate.dims(),
            });
        }
        let data: Vec<bool> = reference
            .data()
            .iter()
            .zip(candidate.data())
            .map(|(&r, &c)| r > 0.0 && c > 0.0)
            .collect();
        let count = data.iter().filter(|&&v| v).count();
        Ok(Self {
            data,
            width: reference.width(),
            height: reference.height(),
            count,
        })
    }

    /// Returns the per-pixel flags in row-major order.
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of valid pixels.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Collects the samples of `grid` at valid pixels.
    pub fn select(&self, grid: &DepthMap) -> DepthEvalResult<Vec<f32>> {
        if grid.dims() != self.dims() {
            return Err(DepthEvalError::DimensionMismatch {
                expected: self.dims(),
                got: grid.dims(),
            });
        }
        let mut out = Vec::with_capacity(self.count);
        out.extend(
            grid.data()
                .iter()
                .zip(&self.data)
                .filter_map(|(&v, &keep)| keep.then_some(v)),
        );
        Ok(out)
    }
}

/// Candidate brought onto the reference grid and scale.
#[derive(Clone, Debug)]
pub struct Alignment {
    /// Multiplicative factor applied to the candidate. Always positive.
    pub scale: f64,
    /// Resized candidate multiplied by `scale`.
    pub aligned: DepthMap,
    pub mask: ValidityMask,
}

/// Resizes `candidate` to the reference shape, masks invalid pixels and
/// rescales it by the median ratio.
///
/// Fails with [`DepthEvalError::EmptyMask`] when the sources share no valid
/// pixel; callers that know the file names report it as `NoOverlap`.
pub fn align_to_reference(
    candidate: &DepthMap,
    reference: &DepthMap,
    params: AlignParams,
) -> DepthEvalResult<Alignment> {
    params.validate()?;
    let _span = trace_span!(
        "align",
        width = reference.width(),
        height = reference.height()
    )
    .entered();

    let resized = if candidate.dims() == reference.dims() {
        candidate.clone()
    } else {
        resize_nearest(candidate.view(), reference.width(), reference.height())?
    };

    let mask = ValidityMask::from_pair(reference, &resized)?;
    if mask.is_empty() {
        return Err(DepthEvalError::EmptyMask);
    }

    let mut ref_values = mask.select(reference)?;
    let mut cand_values = mask.select(&resized)?;
    let ref_median = median_in_place(&mut ref_values).ok_or(DepthEvalError::EmptyMask)?;
    let cand_median = median_in_place(&mut cand_values).ok_or(DepthEvalError::EmptyMask)?;
    let scale = ref_median / (cand_median + params.epsilon);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(DepthEvalError::InvalidInput(
            "depth samples produced a non-finite scale",
        ));
    }
    trace_event!("scale_recovered", scale = scale, valid = mask.count());

    Ok(Alignment {
        scale,
        aligned: resized.scaled(scale),
        mask,
    })
}
