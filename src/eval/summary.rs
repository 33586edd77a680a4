//! Batch-level means over the metric records.

use crate::metrics::MetricRecord;

/// Record count and metric means.
///
/// PSNR is averaged over finite values only; `psnr_infinite` counts the
/// pairs that agreed exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_rmse: Option<f64>,
    pub mean_psnr: Option<f64>,
    pub psnr_infinite: usize,
    pub mean_ssim: Option<f64>,
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values.fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

impl Summary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a MetricRecord>,
    {
        let records: Vec<&MetricRecord> = records.into_iter().collect();
        Self {
            count: records.len(),
            mean_rmse: mean(records.iter().map(|r| r.rmse).filter(|v| v.is_finite())),
            mean_psnr: mean(records.iter().map(|r| r.psnr).filter(|v| v.is_finite())),
            psnr_infinite: records
                .iter()
                .filter(|r| r.psnr.is_infinite() && r.psnr > 0.0)
                .count(),
            mean_ssim: mean(records.iter().map(|r| r.ssim).filter(|v| v.is_finite())),
        }
    }
}
