//! Loading depth maps via the `image` crate.
//!
//! Samples keep their native magnitude: 8-bit, 16-bit and float images are
//! widened to `f32` without normalization, since depth PNGs usually store
//! millimetres or similar units in 16 bits. Colour sources are collapsed to
//! one channel with the Rec. 601 luma weights; alpha is ignored.

use crate::image::DepthMap;
use crate::util::{DepthEvalError, DepthEvalResult};
use image::{DynamicImage, ImageBuffer, Pixel, Primitive};
use std::path::Path;

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Weighted luminance of an RGB triple.
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

fn luma_channel<P, S>(img: &ImageBuffer<P, Vec<S>>) -> DepthEvalResult<DepthMap>
where
    P: Pixel<Subpixel = S>,
    S: Primitive + Into<f32>,
{
    let data = img.pixels().map(|p| p.channels()[0].into()).collect();
    DepthMap::new(data, img.width() as usize, img.height() as usize)
}

fn luminance_channels<P, S>(img: &ImageBuffer<P, Vec<S>>, round: bool) -> DepthEvalResult<DepthMap>
where
    P: Pixel<Subpixel = S>,
    S: Primitive + Into<f32>,
{
    let data = img
        .pixels()
        .map(|p| {
            let c = p.channels();
            let y = luminance(c[0].into(), c[1].into(), c[2].into());
            // Integer sources produce integer gray levels.
            if round {
                y.round()
            } else {
                y
            }
        })
        .collect();
    DepthMap::new(data, img.width() as usize, img.height() as usize)
}

/// Converts a decoded image into a single-channel depth grid.
pub fn depth_from_dynamic_image(img: &DynamicImage) -> DepthEvalResult<DepthMap> {
    match img {
        DynamicImage::ImageLuma8(buf) => luma_channel(buf),
        DynamicImage::ImageLumaA8(buf) => luma_channel(buf),
        DynamicImage::ImageLuma16(buf) => luma_channel(buf),
        DynamicImage::ImageLumaA16(buf) => luma_channel(buf),
        DynamicImage::ImageRgb8(buf) => luminance_channels(buf, true),
        DynamicImage::ImageRgba8(buf) => luminance_channels(buf, true),
        DynamicImage::ImageRgb16(buf) => luminance_channels(buf, true),
        DynamicImage::ImageRgba16(buf) => luminance_channels(buf, true),
        DynamicImage::ImageRgb32F(buf) => luminance_channels(buf, false),
        DynamicImage::ImageRgba32F(buf) => luminance_channels(buf, false),
        other => luminance_channels(&other.to_rgb32f(), false),
    }
}

/// Loads an image from disk as a single-channel depth grid.
///
/// Missing or undecodable files yield [`DepthEvalError::ImageIo`].
pub fn load_depth_map<P: AsRef<Path>>(path: P) -> DepthEvalResult<DepthMap> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| DepthEvalError::ImageIo {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    depth_from_dynamic_image(&img)
}
