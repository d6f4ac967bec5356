mod gdal_engine;
pub mod hdf4;
pub mod hdf5;
pub mod tif;

pub use hdf4::Hdf4Reader;
pub use hdf5::Hdf5Reader;
pub use tif::TifDirReader;

use log::{info, warn};
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use crate::{
    components::{LayerInfo, LayerSpec, Metadata, RasterCube},
    errors::{EarthioError, Result},
};

/// Reads [`LayerSpec`]s from one source into a [`RasterCube`].
pub trait FormatReader: Debug + Send + Sync {
    /// File or directory the reader was opened on.
    fn source(&self) -> &Path;

    /// Decode source metadata, listing every readable layer with its extent.
    fn read_metadata(&self) -> Result<Metadata>;

    /// Read `layer_specs`, in order, into one cube.
    ///
    /// Every window is checked against `metadata` before any pixel is read.
    /// Only the requested windows are decoded.
    fn read_layers(&self, metadata: &Metadata, layer_specs: &[LayerSpec]) -> Result<RasterCube> {
        let source_name = self.source().to_string_lossy();
        let resolved = layer_specs
            .iter()
            .map(|spec| {
                let info = resolve(metadata, spec, &source_name)?;
                if let Some(window) = &spec.window {
                    window.validate(&spec.name, info.extent)?;
                }
                if let Some(shape @ (0, _) | shape @ (_, 0)) = spec.options.buf_shape {
                    return Err(EarthioError::EmptyBufferShape {
                        layer: spec.name.clone(),
                        shape,
                    });
                }
                Ok((spec, info))
            })
            .collect::<Result<Vec<_>>>()?;

        let layers = resolved
            .iter()
            .map(|(spec, info)| Ok((spec.name.clone(), gdal_engine::read_layer(info, spec)?)))
            .collect::<Result<Vec<_>>>()?;
        RasterCube::assemble(layers, cube_metadata(metadata, &resolved))
    }
}

/// Which [`FormatReader`] handles a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Hdf4,
    Hdf5,
    /// Directory with one GeoTIFF per layer.
    Tif,
}

impl Format {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            return Ok(Self::Tif);
        }
        let extension = path
            .extension()
            .map(|extension| extension.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some("hdf" | "hdf4" | "h4" | "hdfeos") => Ok(Self::Hdf4),
            Some("h5" | "hdf5" | "he5" | "nc") => Ok(Self::Hdf5),
            Some("tif" | "tiff") => Ok(Self::Tif),
            _ => Err(EarthioError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Open the reader matching `path`.
///
/// A single `.tif` path reads that file from its directory.
pub fn open_reader(path: impl AsRef<Path>) -> Result<Box<dyn FormatReader>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EarthioError::SourceNotFound(path.to_path_buf()));
    }
    let reader: Box<dyn FormatReader> = match Format::from_path(path)? {
        Format::Hdf4 => Box::new(Hdf4Reader::new(path)?),
        Format::Hdf5 => Box::new(Hdf5Reader::new(path)?),
        Format::Tif if path.is_dir() => Box::new(TifDirReader::new(path)?),
        Format::Tif => {
            let dir = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Box::new(TifDirReader::new(dir)?.with_files([file]))
        }
    };
    info!("opened {reader:?}");
    Ok(reader)
}

pub(crate) fn existing(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(EarthioError::SourceNotFound(path.to_path_buf()))
    }
}

/// Find the layer of `metadata` that `spec.source` names.
///
/// Tried in order: exact key, key path suffix, description substring.
fn resolve<'a>(metadata: &'a Metadata, spec: &LayerSpec, source_name: &str) -> Result<&'a LayerInfo> {
    let wanted = spec.source.as_str();
    let not_found = || EarthioError::LayerNotFound {
        layer: spec.name.clone(),
        key: spec.source.clone(),
        source_name: source_name.to_string(),
    };
    // Every key ends with and every description contains "".
    if wanted.is_empty() {
        return Err(not_found());
    }
    let tiers: [&dyn Fn(&LayerInfo) -> bool; 3] = [
        &|layer: &LayerInfo| layer.key == wanted,
        &|layer: &LayerInfo| {
            layer.key.ends_with(wanted)
                && layer.key[..layer.key.len() - wanted.len()].ends_with(['/', ':', '_'])
        },
        &|layer: &LayerInfo| layer.description.contains(wanted),
    ];
    for is_match in tiers {
        let mut found = metadata.layers.iter().filter(|layer| is_match(layer));
        if let Some(layer) = found.next() {
            if found.next().is_some() {
                warn!(
                    "{:?} matches several layers of {source_name:?}, using {:?}",
                    wanted, layer.key
                );
            }
            return Ok(layer);
        }
    }
    Err(not_found())
}

/// Metadata of a cube read from `metadata` with the first spec's grid.
fn cube_metadata(metadata: &Metadata, resolved: &[(&LayerSpec, &LayerInfo)]) -> Metadata {
    let mut cube_metadata = Metadata {
        layers: resolved.iter().map(|(_, info)| (*info).clone()).collect(),
        ..metadata.clone()
    };
    if let Some((spec, info)) = resolved.first() {
        let window = spec.read_window(info.extent);
        cube_metadata.crs = info.crs.clone().or(cube_metadata.crs);
        cube_metadata.nodata = info.nodata.or(cube_metadata.nodata);
        cube_metadata.transform = info.transform.or(metadata.transform).map(|transform| {
            transform
                .windowed(&window)
                .rescaled(window.shape(), spec.output_shape(info.extent))
        });
    }
    cube_metadata
}
