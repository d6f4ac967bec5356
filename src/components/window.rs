use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::errors::{EarthioError, Result};

/// Rectangular pixel region of a layer.
///
/// Defined by two half-open index ranges:
///     - `rows`: `(row_min, row_max)`,
///     - `cols`: `(col_min, col_max)`,
///
/// with origin at the top left pixel of the layer. Serialized as
/// `((row_min, row_max), (col_min, col_max))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WindowRanges", into = "WindowRanges")]
pub struct Window {
    rows: (usize, usize),
    cols: (usize, usize),
}

type WindowRanges = ((usize, usize), (usize, usize));

impl From<WindowRanges> for Window {
    fn from((rows, cols): WindowRanges) -> Self {
        Self { rows, cols }
    }
}

impl From<Window> for WindowRanges {
    fn from(window: Window) -> Self {
        (window.rows, window.cols)
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(({}, {}), ({}, {}))",
            self.rows.0, self.rows.1, self.cols.0, self.cols.1
        )
    }
}

impl Window {
    pub fn new(rows: (usize, usize), cols: (usize, usize)) -> Self {
        Self { rows, cols }
    }

    /// Window covering a whole `(rows, cols)` extent.
    pub fn full(extent: (usize, usize)) -> Self {
        Self::new((0, extent.0), (0, extent.1))
    }

    pub fn rows(&self) -> (usize, usize) {
        self.rows
    }

    pub fn cols(&self) -> (usize, usize) {
        self.cols
    }

    /// (H, W) of the window.
    pub fn shape(&self) -> (usize, usize) {
        (
            self.rows.1.saturating_sub(self.rows.0),
            self.cols.1.saturating_sub(self.cols.0),
        )
    }

    /// Check the window is non-empty and fits inside `extent`.
    ///
    /// Nothing is clipped: a window reaching past the extent is an error.
    pub fn validate(&self, layer: &str, extent: (usize, usize)) -> Result<()> {
        let fits = |(min, max): (usize, usize), len: usize| min < max && max <= len;
        if fits(self.rows, extent.0) && fits(self.cols, extent.1) {
            Ok(())
        } else {
            Err(EarthioError::SpecOutOfBounds {
                layer: layer.to_string(),
                window: *self,
                extent,
            })
        }
    }

    /// Offset of the top left pixel as GDAL expects it, `(x, y)`.
    pub fn gdal_offset(&self) -> (isize, isize) {
        (self.cols.0 as isize, self.rows.0 as isize)
    }

    /// Window size as GDAL expects it, `(width, height)`.
    pub fn gdal_size(&self) -> (usize, usize) {
        let (height, width) = self.shape();
        (width, height)
    }
}
