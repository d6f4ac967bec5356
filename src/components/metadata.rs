use std::collections::HashMap;

use geo::AffineTransform;
use shrinkwraprs::Shrinkwrap;

use crate::components::Window;

/// Pixel to geospace transform of a layer.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform(AffineTransform);

impl GeoTransform {
    /// From GDAL coefficient order `[xoff, a, b, yoff, d, e]`.
    pub fn from_gdal(gdal_transform: [f64; 6]) -> Self {
        Self(AffineTransform::new(
            gdal_transform[1],
            gdal_transform[2],
            gdal_transform[0],
            gdal_transform[4],
            gdal_transform[5],
            gdal_transform[3],
        ))
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.xoff(),
            self.a(),
            self.b(),
            self.yoff(),
            self.d(),
            self.e(),
        ]
    }

    /// Same grid with origin moved to the top left pixel of `window`.
    pub fn windowed(&self, window: &Window) -> Self {
        let (row, col) = (window.rows().0 as f64, window.cols().0 as f64);
        Self(AffineTransform::new(
            self.a(),
            self.b(),
            self.xoff() + self.a() * col + self.b() * row,
            self.d(),
            self.e(),
            self.yoff() + self.d() * col + self.e() * row,
        ))
    }

    /// Same footprint sampled on a `to` (H, W) grid instead of `from`.
    pub fn rescaled(&self, from: (usize, usize), to: (usize, usize)) -> Self {
        let x_ratio = from.1 as f64 / to.1 as f64;
        let y_ratio = from.0 as f64 / to.0 as f64;
        Self(AffineTransform::new(
            self.a() * x_ratio,
            self.b() * y_ratio,
            self.xoff(),
            self.d() * x_ratio,
            self.e() * y_ratio,
            self.yoff(),
        ))
    }
}

/// One readable layer of a source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// Short key [`LayerSpec::source`](crate::LayerSpec) is matched against.
    pub key: String,
    /// Path GDAL opens to reach the layer.
    pub path: String,
    pub description: String,
    /// Native (H, W).
    pub extent: (usize, usize),
    pub band_count: usize,
    pub crs: Option<String>,
    pub transform: Option<GeoTransform>,
    pub nodata: Option<f64>,
}

/// Metadata of a source, as decoded by a [`FormatReader`](crate::FormatReader).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub description: String,
    pub crs: Option<String>,
    pub transform: Option<GeoTransform>,
    pub nodata: Option<f64>,
    pub attrs: HashMap<String, String>,
    pub layers: Vec<LayerInfo>,
}

impl Metadata {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_layer(mut self, layer: LayerInfo) -> Self {
        self.layers.push(layer);
        self
    }
}
