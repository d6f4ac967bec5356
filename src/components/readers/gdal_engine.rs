//! GDAL plumbing shared by every [`FormatReader`](super::FormatReader).

use gdal::{
    raster::{GdalDataType, GdalType, RasterBand, ResampleAlg},
    Dataset as GdalDataset, Metadata as GdalMetadata, MetadataEntry as GdalMetadataEntry,
};
use log::debug;
use ndarray::Array2;
use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

use crate::{
    components::{GeoTransform, LayerArray, LayerInfo, LayerSpec, Metadata, Window},
    errors::{DecodeContext, Result},
};

fn filter_metadata_gdal(metadata: &impl GdalMetadata) -> HashMap<String, String> {
    GdalMetadata::metadata(metadata)
        .filter_map(|GdalMetadataEntry { domain, key, value }| {
            if domain.eq("") {
                Some((key, value))
            } else {
                None
            }
        })
        .collect()
}

pub(super) fn open(path: impl AsRef<Path>) -> Result<GdalDataset> {
    let name = path.as_ref().to_string_lossy();
    GdalDataset::open(path.as_ref()).decoding(&name)
}

pub(super) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Source level metadata of an open dataset.
pub(super) fn source_metadata(dataset: &GdalDataset, source_name: &str) -> Result<Metadata> {
    let description = dataset.description().decoding(source_name)?;
    let (crs, transform, nodata) = georeference(dataset);
    Ok(Metadata {
        crs,
        transform,
        nodata,
        attrs: filter_metadata_gdal(dataset),
        ..Metadata::new(description)
    })
}

fn georeference(dataset: &GdalDataset) -> (Option<String>, Option<GeoTransform>, Option<f64>) {
    let crs = Some(dataset.projection()).filter(|projection| !projection.is_empty());
    let transform = dataset.geo_transform().ok().map(GeoTransform::from_gdal);
    let nodata = dataset
        .rasterband(1)
        .ok()
        .and_then(|band| band.no_data_value());
    (crs, transform, nodata)
}

/// `(name, description)` of every subdataset, in GDAL order.
pub(super) fn subdatasets(dataset: &GdalDataset) -> Vec<(String, String)> {
    let mut found: BTreeMap<usize, (String, String)> = BTreeMap::new();
    for GdalMetadataEntry { domain, key, value } in GdalMetadata::metadata(dataset) {
        if domain != "SUBDATASETS" {
            continue;
        }
        let Some(rest) = key.strip_prefix("SUBDATASET_") else {
            continue;
        };
        let Some((index, field)) = rest.split_once('_') else {
            continue;
        };
        let Ok(index) = index.parse::<usize>() else {
            continue;
        };
        let entry = found.entry(index).or_default();
        match field {
            "NAME" => entry.0 = value,
            "DESC" => entry.1 = value,
            _ => (),
        }
    }
    found
        .into_values()
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Open the dataset at `path` and describe it as one layer.
pub(super) fn layer_info(
    path: &str,
    key: impl Into<String>,
    description: impl Into<String>,
) -> Result<LayerInfo> {
    let dataset = open(path)?;
    let (width, height) = dataset.raster_size();
    let (crs, transform, nodata) = georeference(&dataset);
    Ok(LayerInfo {
        key: key.into(),
        path: path.to_string(),
        description: description.into(),
        extent: (height, width),
        band_count: dataset.raster_count(),
        crs,
        transform,
        nodata,
    })
}

/// Read the window `spec` asks for from the layer described by `info`.
pub(super) fn read_layer(info: &LayerInfo, spec: &LayerSpec) -> Result<LayerArray> {
    let dataset = open(&info.path)?;
    let band = dataset.rasterband(spec.options.band).decoding(&info.path)?;
    let window = spec.read_window(info.extent);
    let shape = spec.output_shape(info.extent);
    let resample = spec.options.buf_shape.map(|_| spec.options.resample.into());
    debug!(
        "reading {} of {:?} into {:?} as {:?}",
        window, info.path, shape, spec.name
    );

    macro_rules! read_as {
        ($t:ty) => {
            LayerArray::from(read_window::<$t>(&band, &window, shape, resample, info)?)
        };
    }
    let array = match band.band_type() {
        GdalDataType::UInt8 => read_as!(u8),
        GdalDataType::UInt16 => read_as!(u16),
        GdalDataType::Int16 => read_as!(i16),
        GdalDataType::UInt32 => read_as!(u32),
        GdalDataType::Int32 => read_as!(i32),
        GdalDataType::Float32 => read_as!(f32),
        _ => read_as!(f64),
    };

    match band.no_data_value() {
        Some(nodata) if spec.options.mask_nodata => Ok(array.mask_nodata(nodata)),
        _ => Ok(array),
    }
}

fn read_window<T: GdalType + Copy>(
    band: &RasterBand<'_>,
    window: &Window,
    shape: (usize, usize),
    resample: Option<ResampleAlg>,
    info: &LayerInfo,
) -> Result<Array2<T>> {
    let buffer = band
        .read_as::<T>(window.gdal_offset(), window.gdal_size(), (shape.1, shape.0), resample)
        .decoding(&info.path)?;
    let (width, height) = buffer.shape();
    Ok(Array2::from_shape_vec((height, width), buffer.data().to_vec())?)
}
