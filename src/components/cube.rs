use log::info;
use std::fmt::Debug;

use crate::{
    components::{LayerArray, Metadata},
    errors::{EarthioError, Result},
};

/// Collection of named layers that share one (H, W) shape.
///
/// Layer order is the order layers were supplied in and is the column
/// order of [`flatten`](crate::flatten).
#[derive(Clone, PartialEq)]
pub struct RasterCube {
    shape: (usize, usize),
    layers: Vec<(String, LayerArray)>,
    metadata: Metadata,
}

impl Debug for RasterCube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let f = &mut f.debug_struct("RasterCube");
        let layers: Vec<(&str, _)> = self
            .iter()
            .map(|(name, array)| (name, array.dtype()))
            .collect();
        f.field("shape", &self.shape)
            .field("layers", &layers)
            .field("description", &self.metadata.description)
            .finish()
    }
}

impl RasterCube {
    fn init(shape: (usize, usize), layers: Vec<(String, LayerArray)>, metadata: Metadata) -> Self {
        let cube = Self {
            shape,
            layers,
            metadata,
        };
        info!("new {cube:?}");
        cube
    }

    /// Cube without layers over a `(rows, cols)` grid.
    pub fn empty(shape: (usize, usize), metadata: Metadata) -> Self {
        Self::init(shape, Vec::new(), metadata)
    }

    /// Assemble layers into a cube.
    ///
    /// Every layer must have the shape of the first one and every name must
    /// be unique.
    pub fn assemble<N: Into<String>>(
        layers: impl IntoIterator<Item = (N, LayerArray)>,
        metadata: Metadata,
    ) -> Result<Self> {
        let layers: Vec<(String, LayerArray)> = layers
            .into_iter()
            .map(|(name, array)| (name.into(), array))
            .collect();
        let shape = layers.first().map_or((0, 0), |(_, array)| array.shape());
        for (idx, (name, array)) in layers.iter().enumerate() {
            if array.shape() != shape {
                return Err(EarthioError::ShapeMismatch {
                    layer: name.clone(),
                    expected: shape,
                    found: array.shape(),
                });
            }
            if layers[..idx].iter().any(|(other, _)| other == name) {
                return Err(EarthioError::DuplicateLayer(name.clone()));
            }
        }
        Ok(Self::init(shape, layers, metadata))
    }

    /// (H, W) shared by all layers.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn layer(&self, name: &str) -> Option<&LayerArray> {
        self.layers
            .iter()
            .find_map(|(layer, array)| (layer == name).then_some(array))
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|(name, _)| name.as_str())
    }

    /// Iterator over `(name, array)` in cube order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LayerArray)> {
        self.layers.iter().map(|(name, array)| (name.as_str(), array))
    }

    pub fn into_layers(self) -> Vec<(String, LayerArray)> {
        self.layers
    }
}
