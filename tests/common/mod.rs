#![allow(dead_code)]

use gdal::{
    raster::{Buffer, GdalType},
    DriverManager,
};
use ndarray::Array2;
use std::path::{Path, PathBuf};

pub const TRANSFORM: [f64; 6] = [600_000., 30., 0., 4_300_000., 0., -30.];

/// Write `values` as a single band GeoTIFF.
pub fn write_tif<T: GdalType + Copy>(path: &Path, values: &Array2<T>, nodata: Option<f64>) {
    let (rows, cols) = values.dim();
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<T, _>(path, cols, rows, 1)
        .unwrap();
    dataset.set_geo_transform(&TRANSFORM).unwrap();
    let mut band = dataset.rasterband(1).unwrap();
    band.set_no_data_value(nodata).unwrap();
    let mut buffer = Buffer::new((cols, rows), values.iter().copied().collect());
    band.write((0, 0), (cols, rows), &mut buffer).unwrap();
}

/// Write `bands` as one `f32` file through `driver`.
///
/// `None` when this GDAL build lacks the driver.
pub fn write_bands(driver: &str, path: &Path, bands: &[Array2<f32>]) -> Option<PathBuf> {
    let driver = DriverManager::get_driver_by_name(driver).ok()?;
    let (rows, cols) = bands[0].dim();
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, cols, rows, bands.len())
        .unwrap();
    dataset.set_geo_transform(&TRANSFORM).unwrap();
    for (idx, values) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(idx + 1).unwrap();
        let mut buffer = Buffer::new((cols, rows), values.iter().copied().collect());
        band.write((0, 0), (cols, rows), &mut buffer).unwrap();
    }
    Some(path.to_path_buf())
}

/// Two band `f32` grids of `shape`.
pub fn grids(shape: (usize, usize)) -> [Array2<f32>; 2] {
    [
        Array2::from_shape_fn(shape, |(r, c)| (r * 1000 + c) as f32),
        Array2::from_shape_fn(shape, |(r, c)| r as f32 * 0.5 - c as f32 * 0.25),
    ]
}

/// Landsat-like scene directory with a `u16` and a `f32` band of `shape`.
///
/// `LC08_B1` holds its nodata value 0 at `(0, 0)` only.
pub fn scene(dir: &Path, shape: (usize, usize)) {
    let mut b1 = Array2::from_shape_fn(shape, |(r, c)| (r * 100 + c % 100 + 1) as u16);
    b1[[0, 0]] = 0;
    let b2 = Array2::from_shape_fn(shape, |(r, c)| r as f32 * 0.5 - c as f32 * 0.25);
    write_tif(&dir.join("LC08_B1.TIF"), &b1, Some(0.));
    write_tif(&dir.join("LC08_B2.TIF"), &b2, None);
}
