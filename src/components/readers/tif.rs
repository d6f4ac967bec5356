//! Directory of single-layer GeoTIFFs, e.g. an unpacked Landsat scene.

use itertools::Itertools;
use std::path::{Path, PathBuf};

use crate::{
    components::{
        readers::{existing, gdal_engine, FormatReader},
        Metadata,
    },
    errors::{EarthioError, Result},
};

#[derive(Debug, Clone)]
pub struct TifDirReader {
    dir: PathBuf,
    files: Option<Vec<String>>,
}

impl TifDirReader {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            dir: existing(dir)?,
            files: None,
        })
    }

    /// Only expose `files` (names relative to the directory), in this order.
    pub fn with_files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    fn tif_paths(&self) -> Result<Vec<PathBuf>> {
        match &self.files {
            Some(files) => files
                .iter()
                .map(|file| existing(self.dir.join(file)))
                .collect(),
            None => {
                let entries = std::fs::read_dir(&self.dir)
                    .map_err(|err| EarthioError::decode(self.dir.to_string_lossy(), err))?;
                Ok(entries
                    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                    .filter(|path| is_tif(path))
                    .sorted()
                    .collect())
            }
        }
    }
}

fn is_tif(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .is_some_and(|extension| matches!(extension.as_str(), "tif" | "tiff"))
}

impl FormatReader for TifDirReader {
    fn source(&self) -> &Path {
        &self.dir
    }

    fn read_metadata(&self) -> Result<Metadata> {
        let mut metadata = Metadata::new(self.dir.to_string_lossy());
        for path in self.tif_paths()? {
            let key = gdal_engine::file_stem(&path);
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let info = gdal_engine::layer_info(&path.to_string_lossy(), key, file_name)?;
            if metadata.layers.is_empty() {
                metadata.crs = info.crs.clone();
                metadata.transform = info.transform;
                metadata.nodata = info.nodata;
            }
            metadata.layers.push(info);
        }
        Ok(metadata)
    }
}
