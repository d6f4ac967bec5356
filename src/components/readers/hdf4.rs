//! HDF4 / HDF-EOS granules.
//!
//! GDAL exposes every grid field or scientific dataset of the file as a
//! subdataset named like `HDF4_EOS:EOS_GRID:"file.hdf":MOD_Grid_500m:sur_refl_b01`
//! or `HDF4_SDS:UNKNOWN:"file.hdf":0`.

use std::path::{Path, PathBuf};

use crate::{
    components::{
        readers::{existing, gdal_engine, FormatReader},
        Metadata,
    },
    errors::Result,
};

#[derive(Debug, Clone)]
pub struct Hdf4Reader {
    pub(super) path: PathBuf,
}

impl Hdf4Reader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            path: existing(path)?,
        })
    }
}

impl FormatReader for Hdf4Reader {
    fn source(&self) -> &Path {
        &self.path
    }

    fn read_metadata(&self) -> Result<Metadata> {
        let dataset = gdal_engine::open(&self.path)?;
        let mut metadata = gdal_engine::source_metadata(&dataset, &self.path.to_string_lossy())?;
        let subdatasets = gdal_engine::subdatasets(&dataset);
        if subdatasets.is_empty() {
            let path = self.path.to_string_lossy();
            let key = gdal_engine::file_stem(&self.path);
            metadata.layers.push(gdal_engine::layer_info(&path, key, metadata.description.clone())?);
        }
        for (name, description) in subdatasets {
            let key = subdataset_key(&name, &description);
            metadata
                .layers
                .push(gdal_engine::layer_info(&name, key, description)?);
        }
        Ok(metadata)
    }
}

/// Grid and field of an HDF-EOS subdataset, or the SDS name for plain HDF4.
pub(crate) fn subdataset_key(name: &str, description: &str) -> String {
    let mut fields = name.rsplit(':');
    let last = fields.next().unwrap_or(name);
    if last.parse::<usize>().is_ok() || last.contains('"') {
        // Plain SDS are indexed, the description holds "[HxW] name (type)".
        return description
            .split_once("] ")
            .map(|(_, rest)| rest)
            .map(|rest| rest.rsplit_once(" (").map_or(rest, |(name, _)| name))
            .unwrap_or(last)
            .to_string();
    }
    match fields.next() {
        Some(grid) if !grid.contains('"') => format!("{grid}:{last}"),
        _ => last.to_string(),
    }
}
