use ndarray::Array2;
use num_traits::{AsPrimitive, Float};

/// Element type of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl DType {
    pub fn is_float(&self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }
}

/// 2D (H, W) array of one layer, keeping the type it was stored with.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerArray {
    U8(Array2<u8>),
    U16(Array2<u16>),
    I16(Array2<i16>),
    U32(Array2<u32>),
    I32(Array2<i32>),
    F32(Array2<f32>),
    F64(Array2<f64>),
}

macro_rules! impl_from_array {
    ($($variant:ident => $t:ty),*) => {
        $(
            impl From<Array2<$t>> for LayerArray {
                fn from(value: Array2<$t>) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_array!(U8 => u8, U16 => u16, I16 => i16, U32 => u32, I32 => i32, F32 => f32, F64 => f64);

macro_rules! each_variant {
    ($value:expr, $array:ident => $body:expr) => {
        match $value {
            LayerArray::U8($array) => $body,
            LayerArray::U16($array) => $body,
            LayerArray::I16($array) => $body,
            LayerArray::U32($array) => $body,
            LayerArray::I32($array) => $body,
            LayerArray::F32($array) => $body,
            LayerArray::F64($array) => $body,
        }
    };
}

impl LayerArray {
    pub fn dtype(&self) -> DType {
        match self {
            Self::U8(_) => DType::U8,
            Self::U16(_) => DType::U16,
            Self::I16(_) => DType::I16,
            Self::U32(_) => DType::U32,
            Self::I32(_) => DType::I32,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    /// (H, W).
    pub fn shape(&self) -> (usize, usize) {
        each_variant!(self, array => array.dim())
    }

    /// Values in row-major order, promoted to `f64`.
    ///
    /// Lossless for every [`DType`].
    pub fn iter_f64(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        each_variant!(self, array => Box::new(array.iter().map(|value| AsPrimitive::<f64>::as_(*value))))
    }

    pub fn to_f64(&self) -> Array2<f64> {
        each_variant!(self, array => array.mapv(AsPrimitive::<f64>::as_))
    }

    /// Number of NaN cells, always 0 for integer layers.
    pub fn count_missing(&self) -> usize {
        match self {
            Self::F32(array) => count_nan(array),
            Self::F64(array) => count_nan(array),
            _ => 0,
        }
    }

    /// Build a layer of `dtype` from promoted values.
    ///
    /// Integer columns holding NaN, fractions or values out of range of
    /// `dtype` stay `F64`. `F32` columns are narrowed.
    pub fn from_f64(values: Array2<f64>, dtype: DType) -> Self {
        let narrowed = match dtype {
            DType::U8 => exact_cast::<u8>(&values).map(Self::U8),
            DType::U16 => exact_cast::<u16>(&values).map(Self::U16),
            DType::I16 => exact_cast::<i16>(&values).map(Self::I16),
            DType::U32 => exact_cast::<u32>(&values).map(Self::U32),
            DType::I32 => exact_cast::<i32>(&values).map(Self::I32),
            DType::F32 => Some(Self::F32(values.mapv(AsPrimitive::<f32>::as_))),
            DType::F64 => None,
        };
        narrowed.unwrap_or(Self::F64(values))
    }

    /// Replace `nodata` with NaN, promoting to `f64`.
    pub fn mask_nodata(self, nodata: f64) -> Self {
        let mut values = match self {
            Self::F64(array) => array,
            other => other.to_f64(),
        };
        values.mapv_inplace(|value| if value == nodata { f64::NAN } else { value });
        Self::F64(values)
    }
}

/// `None` unless every value survives the round trip through `T`.
fn exact_cast<T>(values: &Array2<f64>) -> Option<Array2<T>>
where
    T: AsPrimitive<f64>,
    f64: AsPrimitive<T>,
{
    let cast = values.mapv(AsPrimitive::<T>::as_);
    cast.iter()
        .zip(values.iter())
        .all(|(narrow, wide)| narrow.as_() == *wide)
        .then_some(cast)
}

fn count_nan<T: Float>(array: &Array2<T>) -> usize {
    array.iter().filter(|value| value.is_nan()).count()
}
