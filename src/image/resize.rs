//! Nearest-neighbor resampling.
//!
//! Depth maps have hard discontinuities at object boundaries, so the
//! resampler never blends neighbouring samples. Destination pixel `d` reads
//! source pixel `floor(d * src_len / dst_len)`, clamped to the last index.

use crate::image::{DepthMap, ImageView};
use crate::util::{DepthEvalError, DepthEvalResult};

fn nearest_index(dst: usize, src_len: usize, dst_len: usize) -> usize {
    let scale = src_len as f64 / dst_len as f64;
    let idx = (dst as f64 * scale).floor() as usize;
    idx.min(src_len - 1)
}

/// Resizes `src` to exactly `width` x `height` using nearest-neighbor sampling.
pub fn resize_nearest(
    src: ImageView<'_, f32>,
    width: usize,
    height: usize,
) -> DepthEvalResult<DepthMap> {
    if width == 0 || height == 0 {
        return Err(DepthEvalError::InvalidDimensions { width, height });
    }
    let x_map: Vec<usize> = (0..width)
        .map(|x| nearest_index(x, src.width(), width))
        .collect();

    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        let sy = nearest_index(y, src.height(), height);
        let row = src.row(sy).ok_or(DepthEvalError::BufferTooSmall {
            needed: (sy + 1) * src.width(),
            got: sy * src.width(),
        })?;
        data.extend(x_map.iter().map(|&sx| row[sx]));
    }
    DepthMap::new(data, width, height)
}
