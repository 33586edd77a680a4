//! Depth grids, views and loading helpers.
//!
//! `ImageView` borrows a row-major grid without copying it; `DepthMap` is the
//! owned `f32` grid every pipeline stage works on.

use crate::util::{DepthEvalError, DepthEvalResult};

pub mod depth;
pub mod io;
pub mod resize;

pub use depth::DepthMap;

/// Borrowed row-major 2D grid.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Views the first `width * height` elements of `data`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> DepthEvalResult<Self> {
        if width == 0 || height == 0 {
            return Err(DepthEvalError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(DepthEvalError::InvalidDimensions { width, height })?;
        let data = data.get(..needed).ok_or(DepthEvalError::BufferTooSmall {
            needed,
            got: data.len(),
        })?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width {
            return None;
        }
        self.row(y)?.get(x)
    }

    /// Returns row `y` as a slice of length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        let start = y.checked_mul(self.width)?;
        self.data.get(start..start + self.width)
    }

    /// Iterates over rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> {
        let data: &'a [T] = self.data;
        data.chunks_exact(self.width)
    }
}
