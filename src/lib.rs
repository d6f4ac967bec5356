//! Read HDF4, HDF5 and GeoTIFF layers into a [`RasterCube`] and move between
//! the cube and a row-per-cell [`FlatArray`] table.
//!
//! ```no_run
//! use earthio::{drop_na_rows, flatten, inverse_flatten, load_layers, LayerSpec, Window};
//!
//! let specs = [
//!     LayerSpec::new("red", "B4").with_window(Window::new((10, 200), (210, 400))),
//!     LayerSpec::new("nir", "B5").with_window(Window::new((10, 200), (210, 400))),
//! ];
//! let cube = load_layers("LC08_L1TP_015033", &specs)?;
//! let table = drop_na_rows(&flatten(&cube));
//! // ... fit on table.values() ...
//! let back = inverse_flatten(&table)?;
//! # Ok::<(), earthio::EarthioError>(())
//! ```

mod components;
mod errors;
mod indexes;

use std::path::Path;

pub use components::{
    drop_na_rows, flatten, inverse_flatten, open_reader, reinsert_na_rows, DType,
    DroppedFlatArray, FlatArray, Format, FormatReader, GeoTransform, Hdf4Reader, Hdf5Reader,
    Invertible, LayerArray, LayerInfo, LayerSpec, Metadata, RasterCube, ReadOptions, Resample,
    TifDirReader, Window,
};
pub use errors::{EarthioError, Result};
pub use indexes::RetainedRows;

/// Decode the metadata of the source at `path`.
pub fn load_meta(path: impl AsRef<Path>) -> Result<Metadata> {
    open_reader(path)?.read_metadata()
}

/// Read `layer_specs` from the source at `path`, with metadata already decoded.
pub fn load_array(
    path: impl AsRef<Path>,
    metadata: &Metadata,
    layer_specs: &[LayerSpec],
) -> Result<RasterCube> {
    open_reader(path)?.read_layers(metadata, layer_specs)
}

/// Decode metadata and read `layer_specs` from the source at `path`.
pub fn load_layers(path: impl AsRef<Path>, layer_specs: &[LayerSpec]) -> Result<RasterCube> {
    let reader = open_reader(path)?;
    let metadata = reader.read_metadata()?;
    reader.read_layers(&metadata, layer_specs)
}
