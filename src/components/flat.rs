//! Cube <-> table transforms.
//!
//! A cube of `(rows, cols)` layers flattens to a `(rows * cols, layers)`
//! table. Cell `(r, c)` of every layer lands on table row `r * cols + c`
//! and layer `j` (in cube order) on column `j`.

use log::debug;
use ndarray::{Array2, Axis};
use std::borrow::Cow;

use crate::{
    components::{DType, LayerArray, Metadata, RasterCube},
    errors::{EarthioError, Result},
    indexes::RetainedRows,
};

/// What is needed to turn a table back into a cube.
#[derive(Debug, Clone, PartialEq)]
struct FlatInfo {
    /// (H, W) of the source cube.
    shape: Option<(usize, usize)>,
    layer_names: Option<Vec<String>>,
    dtypes: Vec<DType>,
    metadata: Metadata,
}

impl FlatInfo {
    fn shape(&self) -> Result<(usize, usize)> {
        self.shape.ok_or(EarthioError::MissingShapeMetadata)
    }

    fn layer_names(&self) -> Result<&[String]> {
        self.layer_names
            .as_deref()
            .ok_or(EarthioError::MissingShapeMetadata)
    }

    fn dtype(&self, column: usize) -> DType {
        self.dtypes.get(column).copied().unwrap_or(DType::F64)
    }
}

/// `(rows * cols, layers)` table of a flattened [`RasterCube`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlatArray {
    values: Array2<f64>,
    info: FlatInfo,
}

impl FlatArray {
    /// Table built outside [`flatten`].
    ///
    /// Without `shape` or `layer_names` it can not be inverted. Columns
    /// without `dtypes` come back as `F64`.
    pub fn from_parts(
        values: Array2<f64>,
        shape: Option<(usize, usize)>,
        layer_names: Option<Vec<String>>,
        dtypes: Option<Vec<DType>>,
    ) -> Result<Self> {
        check_columns(&values, layer_names.as_deref())?;
        let dtypes = match dtypes {
            Some(dtypes) if dtypes.len() != values.ncols() => {
                return Err(EarthioError::ColumnCountMismatch {
                    columns: values.ncols(),
                    layers: dtypes.len(),
                })
            }
            Some(dtypes) => dtypes,
            None => vec![DType::F64; values.ncols()],
        };
        Ok(Self {
            values,
            info: FlatInfo {
                shape,
                layer_names,
                dtypes,
                metadata: Metadata::default(),
            },
        })
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Values written here into an integer column must be whole and in
    /// range of that type, otherwise the column is rebuilt as `F64`.
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn rows_hint(&self) -> Option<usize> {
        self.info.shape.map(|shape| shape.0)
    }

    pub fn cols_hint(&self) -> Option<usize> {
        self.info.shape.map(|shape| shape.1)
    }

    pub fn layer_names(&self) -> Option<&[String]> {
        self.info.layer_names.as_deref()
    }

    /// Element type each column had in the cube.
    pub fn dtypes(&self) -> &[DType] {
        &self.info.dtypes
    }

    pub fn metadata(&self) -> &Metadata {
        &self.info.metadata
    }
}

/// [`FlatArray`] without the rows that held a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedFlatArray {
    values: Array2<f64>,
    retained: RetainedRows,
    info: FlatInfo,
}

impl DroppedFlatArray {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    /// Row of the source table for each row of [`Self::values`].
    pub fn retained(&self) -> &RetainedRows {
        &self.retained
    }

    /// Row count of the source table.
    pub fn original_rows(&self) -> usize {
        self.retained.total()
    }

    pub fn layer_names(&self) -> Option<&[String]> {
        self.info.layer_names.as_deref()
    }

    /// Swap the retained values for externally computed columns, e.g. the
    /// output of a model run on [`Self::values`].
    ///
    /// `values` must have one row per retained row.
    pub fn with_columns(&self, values: Array2<f64>, layer_names: Vec<String>) -> Result<Self> {
        if values.nrows() != self.retained.len() {
            let (rows, cols) = self.info.shape()?;
            return Err(EarthioError::IncompleteRowSet {
                found: values.nrows(),
                rows,
                cols,
            });
        }
        check_columns(&values, Some(layer_names.as_slice()))?;
        let info = FlatInfo {
            dtypes: vec![DType::F64; values.ncols()],
            layer_names: Some(layer_names),
            ..self.info.clone()
        };
        Ok(Self {
            values,
            retained: self.retained.clone(),
            info,
        })
    }

    pub fn reinsert_na_rows(&self) -> FlatArray {
        reinsert_na_rows(self)
    }
}

fn check_columns(values: &Array2<f64>, layer_names: Option<&[String]>) -> Result<()> {
    match layer_names {
        Some(names) if names.len() != values.ncols() => Err(EarthioError::ColumnCountMismatch {
            columns: values.ncols(),
            layers: names.len(),
        }),
        _ => Ok(()),
    }
}

/// Table that [`inverse_flatten`] can turn back into a cube.
pub trait Invertible {
    /// Table with one row per cell of the source cube.
    fn complete(&self) -> Cow<'_, FlatArray>;
}

impl Invertible for FlatArray {
    fn complete(&self) -> Cow<'_, FlatArray> {
        Cow::Borrowed(self)
    }
}

impl Invertible for DroppedFlatArray {
    fn complete(&self) -> Cow<'_, FlatArray> {
        Cow::Owned(reinsert_na_rows(self))
    }
}

/// Flatten `cube` into a `(rows * cols, layers)` table.
///
/// Missing values pass through.
pub fn flatten(cube: &RasterCube) -> FlatArray {
    let (rows, cols) = cube.shape();
    let mut values = Array2::zeros((rows * cols, cube.len()));
    let mut layer_names = Vec::with_capacity(cube.len());
    let mut dtypes = Vec::with_capacity(cube.len());
    for (column, (name, array)) in cube.iter().enumerate() {
        for ((r, c), value) in array.to_f64().indexed_iter() {
            values[[r * cols + c, column]] = *value;
        }
        layer_names.push(name.to_string());
        dtypes.push(array.dtype());
    }
    debug!(
        "flattened {rows}x{cols} cube into {:?} table",
        values.dim()
    );
    FlatArray {
        values,
        info: FlatInfo {
            shape: Some((rows, cols)),
            layer_names: Some(layer_names),
            dtypes,
            metadata: cube.metadata().clone(),
        },
    }
}

/// Rebuild the cube a table was flattened from.
///
/// A [`DroppedFlatArray`] gets its dropped rows reinserted as missing first.
pub fn inverse_flatten(flat: &impl Invertible) -> Result<RasterCube> {
    let flat = flat.complete();
    let (rows, cols) = flat.info.shape()?;
    let layer_names = flat.info.layer_names()?;
    let found = flat.nrows();
    if found < rows * cols {
        return Err(EarthioError::IncompleteRowSet { found, rows, cols });
    }
    if found > rows * cols {
        return Err(EarthioError::ExcessRowSet { found, rows, cols });
    }
    check_columns(&flat.values, Some(layer_names))?;

    let metadata = flat.info.metadata.clone();
    if layer_names.is_empty() {
        return Ok(RasterCube::empty((rows, cols), metadata));
    }
    let layers = layer_names.iter().enumerate().map(|(column, name)| {
        let column_values = flat.values.column(column);
        let values = Array2::from_shape_fn((rows, cols), |(r, c)| column_values[r * cols + c]);
        (name.clone(), LayerArray::from_f64(values, flat.info.dtype(column)))
    });
    RasterCube::assemble(layers, metadata)
}

/// Drop every row holding at least one NaN.
pub fn drop_na_rows(flat: &FlatArray) -> DroppedFlatArray {
    let retained = RetainedRows::from_mask(
        flat.values
            .axis_iter(Axis(0))
            .map(|row| row.iter().all(|value| !value.is_nan())),
    );
    let values = flat.values.select(Axis(0), retained.as_slice());
    debug!(
        "dropped {} of {} rows with missing values",
        retained.total() - retained.len(),
        retained.total()
    );
    DroppedFlatArray {
        values,
        retained,
        info: flat.info.clone(),
    }
}

/// Put retained rows back at their original position, NaN everywhere else.
pub fn reinsert_na_rows(dropped: &DroppedFlatArray) -> FlatArray {
    let mut values = Array2::from_elem(
        (dropped.retained.total(), dropped.values.ncols()),
        f64::NAN,
    );
    for (row, original) in dropped.retained.iter().enumerate() {
        values
            .row_mut(original)
            .assign(&dropped.values.row(row));
    }
    FlatArray {
        values,
        info: dropped.info.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, s};
    use rstest::{fixture, rstest};

    fn not_nan(values: &Array2<f64>) -> Vec<f64> {
        values.iter().copied().filter(|value| !value.is_nan()).collect()
    }

    #[fixture]
    fn raster() -> RasterCube {
        let layer_1 = Array2::from_shape_fn((4, 3), |(r, c)| (r * 3 + c) as f64 * 0.37 - 1.);
        let layer_2 = Array2::from_shape_fn((4, 3), |(r, c)| ((r + 1) * (c + 2)) as f64 / 7.);
        RasterCube::assemble(
            [
                ("layer_1", LayerArray::from(layer_1)),
                ("layer_2", LayerArray::from(layer_2)),
            ],
            Metadata::default(),
        )
        .unwrap()
    }

    #[rstest]
    fn flatten_no_meta(raster: RasterCube) {
        let flat = flatten(&raster);
        assert_eq!(flat.values().dim(), (12, 2));
        assert_eq!((flat.rows_hint(), flat.cols_hint()), (Some(4), Some(3)));
        let layer_1 = raster.layer("layer_1").unwrap();
        assert!(flat.values().column(0).iter().copied().eq(layer_1.iter_f64()));

        let inv = inverse_flatten(&flat).unwrap();
        assert_eq!(inv, raster);
    }

    #[rstest]
    fn row_index_is_row_major(raster: RasterCube) {
        let flat = flatten(&raster);
        let layer_2 = raster.layer("layer_2").unwrap().to_f64();
        for (r, c) in [(0, 0), (0, 2), (1, 0), (3, 2)] {
            assert_eq!(flat.values()[[r * 3 + c, 1]], layer_2[[r, c]]);
        }
    }

    #[rstest]
    fn na_drop_no_meta(raster: RasterCube) {
        let mut flat = flatten(&raster);
        flat.values_mut().slice_mut(s![..3, ..]).fill(f64::NAN);
        flat.values_mut().slice_mut(s![10..12, ..]).fill(f64::NAN);

        let na_dropped = drop_na_rows(&flat);
        assert_eq!(na_dropped.nrows(), flat.nrows() - 5);
        assert_eq!(na_dropped.retained().as_slice(), [3, 4, 5, 6, 7, 8, 9]);

        let inv = inverse_flatten(&na_dropped).unwrap();
        let flat2 = flatten(&inv);
        assert_eq!(not_nan(flat.values()), not_nan(flat2.values()));

        let inv2 = inverse_flatten(&flat2).unwrap();
        let val1 = inv.layer("layer_1").unwrap().to_f64();
        let val2 = inv2.layer("layer_1").unwrap().to_f64();
        assert_eq!(not_nan(&val1), not_nan(&val2));
        assert!(val1[[0, 0]].is_nan());
        assert_eq!(val1[[1, 0]], raster.layer("layer_1").unwrap().to_f64()[[1, 0]]);
    }

    #[rstest]
    fn any_missing_column_drops_row() {
        let values = array![[1., 2.], [f64::NAN, 2.], [3., f64::NAN], [4., 5.]];
        let flat = FlatArray::from_parts(values, Some((2, 2)), None, None).unwrap();
        let dropped = drop_na_rows(&flat);
        assert_eq!(dropped.values(), &array![[1., 2.], [4., 5.]]);

        let reinserted = dropped.reinsert_na_rows();
        assert_eq!(reinserted.values().row(0), flat.values().row(0));
        assert_eq!(reinserted.values().row(3), flat.values().row(3));
        assert!(reinserted.values().row(1).iter().all(|value| value.is_nan()));
        assert!(reinserted.values().row(2).iter().all(|value| value.is_nan()));
    }

    #[rstest]
    fn integer_layers_round_trip() {
        let cube = RasterCube::assemble(
            [
                ("qa", LayerArray::from(array![[0u16, 65535], [12, 13]])),
                ("dn", LayerArray::from(array![[-5i16, 5], [0, 1]])),
                ("refl", LayerArray::from(array![[0.25f32, 0.5], [0.75, 1.]])),
            ],
            Metadata::new("mixed"),
        )
        .unwrap();
        let flat = flatten(&cube);
        assert_eq!(flat.dtypes(), [DType::U16, DType::I16, DType::F32]);
        assert_eq!(inverse_flatten(&flat).unwrap(), cube);
    }

    #[rstest]
    fn zero_layers_flatten(#[values((4, 3), (1, 1), (0, 5))] shape: (usize, usize)) {
        let cube = RasterCube::empty(shape, Metadata::default());
        let flat = flatten(&cube);
        assert_eq!(flat.values().dim(), (shape.0 * shape.1, 0));
        assert_eq!(inverse_flatten(&flat).unwrap().shape(), shape);
        assert_eq!(drop_na_rows(&flat).nrows(), shape.0 * shape.1);
    }

    #[rstest]
    fn missing_shape_is_reported() {
        let flat = FlatArray::from_parts(Array2::zeros((12, 2)), None, None, None).unwrap();
        assert!(matches!(
            inverse_flatten(&flat),
            Err(EarthioError::MissingShapeMetadata)
        ));
        let names = vec!["a".to_string(), "b".to_string()];
        let flat = FlatArray::from_parts(Array2::zeros((12, 2)), None, Some(names), None).unwrap();
        assert!(matches!(
            inverse_flatten(&flat),
            Err(EarthioError::MissingShapeMetadata)
        ));
    }

    #[rstest]
    fn short_table_is_incomplete() {
        let names = vec!["a".to_string()];
        let flat =
            FlatArray::from_parts(Array2::zeros((7, 1)), Some((4, 3)), Some(names), None).unwrap();
        assert!(matches!(
            inverse_flatten(&flat),
            Err(EarthioError::IncompleteRowSet {
                found: 7,
                rows: 4,
                cols: 3
            })
        ));
    }

    #[rstest]
    fn long_table_is_excess() {
        let names = vec!["a".to_string()];
        let flat =
            FlatArray::from_parts(Array2::zeros((13, 1)), Some((4, 3)), Some(names), None).unwrap();
        assert!(matches!(
            inverse_flatten(&flat),
            Err(EarthioError::ExcessRowSet {
                found: 13,
                rows: 4,
                cols: 3
            })
        ));
    }

    #[rstest]
    fn external_table_keeps_dtypes() {
        let values = array![[1., 0.5], [2., 1.5], [3., 2.5], [4., 3.5]];
        let names = vec!["qa".to_string(), "refl".to_string()];
        let flat = FlatArray::from_parts(
            values,
            Some((2, 2)),
            Some(names),
            Some(vec![DType::U8, DType::F32]),
        )
        .unwrap();
        let cube = inverse_flatten(&flat).unwrap();
        assert_eq!(cube.layer("qa"), Some(&LayerArray::from(array![[1u8, 2], [3, 4]])));
        assert_eq!(cube.layer("refl").map(LayerArray::dtype), Some(DType::F32));
    }

    #[rstest]
    fn dtypes_must_match_columns() {
        assert!(matches!(
            FlatArray::from_parts(Array2::zeros((4, 2)), Some((2, 2)), None, Some(vec![DType::U8])),
            Err(EarthioError::ColumnCountMismatch {
                columns: 2,
                layers: 1
            })
        ));
    }

    #[rstest]
    fn edited_integer_column_keeps_edits() {
        let cube = RasterCube::assemble(
            [("qa", LayerArray::from(array![[1u8, 2], [3, 4]]))],
            Metadata::default(),
        )
        .unwrap();
        let mut flat = flatten(&cube);
        flat.values_mut()[[1, 0]] = 2.5;
        flat.values_mut()[[2, 0]] = 300.;
        let qa = inverse_flatten(&flat).unwrap();
        assert_eq!(
            qa.layer("qa"),
            Some(&LayerArray::from(array![[1., 2.5], [300., 4.]]))
        );
    }

    #[rstest]
    fn model_output_maps_back(raster: RasterCube) {
        let mut flat = flatten(&raster);
        flat.values_mut().row_mut(5).fill(f64::NAN);
        let dropped = drop_na_rows(&flat);
        let predicted = dropped.values().sum_axis(Axis(1)).insert_axis(Axis(1));
        let predicted = dropped
            .with_columns(predicted, vec!["predict".to_string()])
            .unwrap();

        let cube = inverse_flatten(&predicted).unwrap();
        let predict = cube.layer("predict").unwrap().to_f64();
        assert!(predict[[1, 2]].is_nan());
        let expected = raster.layer("layer_1").unwrap().to_f64()[[3, 1]]
            + raster.layer("layer_2").unwrap().to_f64()[[3, 1]];
        assert_eq!(predict[[3, 1]], expected);
    }

    #[rstest]
    fn with_columns_needs_retained_rows(raster: RasterCube) {
        let dropped = drop_na_rows(&flatten(&raster));
        assert!(matches!(
            dropped.with_columns(Array2::zeros((3, 1)), vec!["predict".to_string()]),
            Err(EarthioError::IncompleteRowSet { found: 3, .. })
        ));
    }
}
