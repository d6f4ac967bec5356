//! HDF5 / HDF-EOS5 / netCDF4 files.
//!
//! Every 2D dataset is a subdataset named `HDF5:"file.h5"://group/dataset`.

use std::path::{Path, PathBuf};

use crate::{
    components::{
        readers::{existing, gdal_engine, FormatReader},
        Metadata,
    },
    errors::Result,
};

#[derive(Debug, Clone)]
pub struct Hdf5Reader {
    path: PathBuf,
}

impl Hdf5Reader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            path: existing(path)?,
        })
    }
}

impl FormatReader for Hdf5Reader {
    fn source(&self) -> &Path {
        &self.path
    }

    fn read_metadata(&self) -> Result<Metadata> {
        let dataset = gdal_engine::open(&self.path)?;
        let mut metadata = gdal_engine::source_metadata(&dataset, &self.path.to_string_lossy())?;
        for (name, description) in gdal_engine::subdatasets(&dataset) {
            let key = dataset_path(&name);
            metadata
                .layers
                .push(gdal_engine::layer_info(&name, key, description)?);
        }
        if metadata.layers.is_empty() && dataset.raster_count() > 0 {
            let path = self.path.to_string_lossy();
            let key = gdal_engine::file_stem(&self.path);
            metadata.layers.push(gdal_engine::layer_info(&path, key, metadata.description.clone())?);
        }
        Ok(metadata)
    }
}

/// Dataset path of a subdataset name, without leading slashes.
pub(crate) fn dataset_path(name: &str) -> String {
    name.rsplit_once(':')
        .map_or(name, |(_, path)| path)
        .trim_start_matches('/')
        .to_string()
}
