use gdal::raster::ResampleAlg;
use serde::{Deserialize, Serialize};

use crate::components::Window;

/// Declarative description of one named layer to read.
///
/// `source` identifies the layer inside the source handed to a
/// [`FormatReader`](crate::FormatReader): a subdataset field or dataset path
/// for HDF files, a file name or stem for a directory of TIFs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub window: Option<Window>,
    #[serde(default)]
    pub options: ReadOptions,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            window: None,
            options: ReadOptions::default(),
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Region to read from a layer of native `extent`.
    pub fn read_window(&self, extent: (usize, usize)) -> Window {
        self.window.unwrap_or_else(|| Window::full(extent))
    }

    /// (H, W) of the array this spec produces.
    pub fn output_shape(&self, extent: (usize, usize)) -> (usize, usize) {
        self.options
            .buf_shape
            .unwrap_or_else(|| self.read_window(extent).shape())
    }
}

/// Per-layer read parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// 1-based raster band inside the resolved dataset.
    pub band: usize,
    /// `(rows, cols)` of the output buffer, the window gets resampled into it.
    pub buf_shape: Option<(usize, usize)>,
    pub resample: Resample,
    /// Replace the band nodata value with NaN.
    pub mask_nodata: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            band: 1,
            buf_shape: None,
            resample: Resample::default(),
            mask_nodata: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resample {
    #[default]
    Nearest,
    Bilinear,
    Cubic,
    Average,
    Mode,
}

impl From<Resample> for ResampleAlg {
    fn from(value: Resample) -> Self {
        match value {
            Resample::Nearest => ResampleAlg::NearestNeighbour,
            Resample::Bilinear => ResampleAlg::Bilinear,
            Resample::Cubic => ResampleAlg::Cubic,
            Resample::Average => ResampleAlg::Average,
            Resample::Mode => ResampleAlg::Mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserializes_with_defaults() {
        let spec: LayerSpec =
            serde_json::from_str(r#"{"name": "band_1", "source": "sur_refl_b01"}"#).unwrap();
        assert_eq!(spec, LayerSpec::new("band_1", "sur_refl_b01"));
        assert_eq!(spec.options.band, 1);
    }

    #[rstest]
    fn deserializes_window_and_options() {
        let spec: LayerSpec = serde_json::from_str(
            r#"{
                "name": "b2",
                "source": "B2.TIF",
                "window": [[10, 200], [210, 400]],
                "options": {"buf_shape": [95, 95], "resample": "average"}
            }"#,
        )
        .unwrap();
        assert_eq!(spec.window, Some(Window::new((10, 200), (210, 400))));
        assert_eq!(spec.options.buf_shape, Some((95, 95)));
        assert_eq!(spec.options.resample, Resample::Average);
        assert!(!spec.options.mask_nodata);
    }

    #[rstest]
    #[case(LayerSpec::new("a", "a"), (4, 3))]
    #[case(LayerSpec::new("a", "a").with_window(Window::new((1, 3), (0, 2))), (2, 2))]
    #[case(
        LayerSpec::new("a", "a").with_options(ReadOptions { buf_shape: Some((8, 6)), ..Default::default() }),
        (8, 6)
    )]
    fn output_shape(#[case] spec: LayerSpec, #[case] shape: (usize, usize)) {
        assert_eq!(spec.output_shape((4, 3)), shape);
    }
}
