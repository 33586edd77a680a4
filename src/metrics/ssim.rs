//! Structural similarity over full grids.
//!
//! Standard formulation with a uniform `window_size` x `window_size` window,
//! stabilizers `C1 = (k1 * L)^2` and `C2 = (k2 * L)^2` for data range `L`,
//! and sample (N - 1) covariance normalization. The index is the mean of the
//! local SSIM map over every window lying fully inside the image.

use crate::image::ImageView;
use crate::util::{DepthEvalError, DepthEvalResult};

/// Window and stabilization constants for SSIM.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SsimParams {
    /// Side of the square window; odd and at least 3.
    pub window_size: usize,
    pub k1: f64,
    pub k2: f64,
}

impl Default for SsimParams {
    fn default() -> Self {
        Self {
            window_size: 7,
            k1: 0.01,
            k2: 0.03,
        }
    }
}

impl SsimParams {
    pub(crate) fn validate(&self) -> DepthEvalResult<()> {
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return Err(DepthEvalError::InvalidInput(
                "window_size must be odd and at least 3",
            ));
        }
        let valid_k = |k: f64| k.is_finite() && k > 0.0;
        if !valid_k(self.k1) || !valid_k(self.k2) {
            return Err(DepthEvalError::InvalidInput(
                "k1 and k2 must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Per-window sums of x, y, x^2, y^2 and xy.
struct WindowSums {
    width: usize,
    height: usize,
    sx: Vec<f64>,
    sy: Vec<f64>,
    sxx: Vec<f64>,
    syy: Vec<f64>,
    sxy: Vec<f64>,
}

impl WindowSums {
    fn compute(x: ImageView<'_, f32>, y: ImageView<'_, f32>, win: usize) -> DepthEvalResult<Self> {
        let width = x.width();
        let height = x.height();
        let out_w = width - win + 1;
        let out_h = height - win + 1;

        // Horizontal pass: sums over `win` consecutive columns for every row.
        let h_len = height * out_w;
        let mut hx = vec![0.0f64; h_len];
        let mut hy = vec![0.0f64; h_len];
        let mut hxx = vec![0.0f64; h_len];
        let mut hyy = vec![0.0f64; h_len];
        let mut hxy = vec![0.0f64; h_len];
        for row_idx in 0..height {
            let (Some(xr), Some(yr)) = (x.row(row_idx), y.row(row_idx)) else {
                return Err(DepthEvalError::InvalidDimensions { width, height });
            };
            for x0 in 0..out_w {
                let idx = row_idx * out_w + x0;
                for (&a, &b) in xr[x0..x0 + win].iter().zip(&yr[x0..x0 + win]) {
                    let a = f64::from(a);
                    let b = f64::from(b);
                    hx[idx] += a;
                    hy[idx] += b;
                    hxx[idx] += a * a;
                    hyy[idx] += b * b;
                    hxy[idx] += a * b;
                }
            }
        }

        // Vertical pass over the horizontal sums.
        let len = out_h * out_w;
        let vertical = |h: &[f64]| {
            let mut out = vec![0.0f64; len];
            for y0 in 0..out_h {
                for x0 in 0..out_w {
                    out[y0 * out_w + x0] = (y0..y0 + win).map(|r| h[r * out_w + x0]).sum();
                }
            }
            out
        };

        Ok(Self {
            width: out_w,
            height: out_h,
            sx: vertical(&hx),
            sy: vertical(&hy),
            sxx: vertical(&hxx),
            syy: vertical(&hyy),
            sxy: vertical(&hxy),
        })
    }
}

/// Mean structural similarity of two equally sized grids.
///
/// `data_range` is the value span `L` used for the stabilizers.
pub fn ssim(
    x: ImageView<'_, f32>,
    y: ImageView<'_, f32>,
    data_range: f64,
    params: SsimParams,
) -> DepthEvalResult<f64> {
    params.validate()?;
    if (x.width(), x.height()) != (y.width(), y.height()) {
        return Err(DepthEvalError::DimensionMismatch {
            expected: (x.width(), x.height()),
            got: (y.width(), y.height()),
        });
    }
    let win = params.window_size;
    if x.width() < win || x.height() < win {
        return Err(DepthEvalError::ImageTooSmall {
            width: x.width(),
            height: x.height(),
            window: win,
        });
    }

    let sums = WindowSums::compute(x, y, win)?;
    let np = (win * win) as f64;
    let cov_norm = np / (np - 1.0);
    let c1 = (params.k1 * data_range).powi(2);
    let c2 = (params.k2 * data_range).powi(2);

    let mut total = 0.0f64;
    for i in 0..sums.width * sums.height {
        let ux = sums.sx[i] / np;
        let uy = sums.sy[i] / np;
        let vx = cov_norm * (sums.sxx[i] / np - ux * ux);
        let vy = cov_norm * (sums.syy[i] / np - uy * uy);
        let vxy = cov_norm * (sums.sxy[i] / np - ux * uy);

        let a1 = 2.0 * ux * uy + c1;
        let a2 = 2.0 * vxy + c2;
        let b1 = ux * ux + uy * uy + c1;
        let b2 = vx + vy + c2;
        total += (a1 * a2) / (b1 * b2);
    }
    Ok(total / (sums.width * sums.height) as f64)
}
