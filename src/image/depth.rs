//! Owned single-channel depth grid.

use crate::image::ImageView;
use crate::util::{DepthEvalError, DepthEvalResult};

/// Owned contiguous `f32` depth grid. Zero marks a missing reading.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMap {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl DepthMap {
    /// Wraps a row-major buffer of exactly `width * height` samples.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> DepthEvalResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthEvalError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(DepthEvalError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(DepthEvalError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(DepthEvalError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Creates a grid filled with `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> DepthEvalResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(DepthEvalError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Copies a view into an owned grid.
    pub fn from_view(view: ImageView<'_, f32>) -> DepthEvalResult<Self> {
        let data = view.rows().flatten().copied().collect();
        Self::new(data, view.width(), view.height())
    }

    /// Returns a borrowed view of the grid.
    pub fn view(&self) -> ImageView<'_, f32> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns the grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns a new grid with every sample multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let data = self
            .data
            .iter()
            .map(|&v| (f64::from(v) * factor) as f32)
            .collect();
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns a copy in which every sample where `keep` is false is zero.
    pub fn zeroed_outside(&self, keep: &[bool]) -> DepthEvalResult<Self> {
        if keep.len() != self.data.len() {
            return Err(DepthEvalError::BufferTooSmall {
                needed: self.data.len(),
                got: keep.len(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(keep)
            .map(|(&v, &k)| if k { v } else { 0.0 })
            .collect();
        Ok(Self {
            data,
            width: self.width,
            height: self.height,
        })
    }
}
