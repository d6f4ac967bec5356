pub mod array;
pub mod cube;
pub mod flat;
pub mod layer_spec;
pub mod metadata;
pub mod readers;
pub mod window;

pub use array::{DType, LayerArray};
pub use cube::RasterCube;
pub use flat::{
    drop_na_rows, flatten, inverse_flatten, reinsert_na_rows, DroppedFlatArray, FlatArray,
    Invertible,
};
pub use layer_spec::{LayerSpec, ReadOptions, Resample};
pub use metadata::{GeoTransform, LayerInfo, Metadata};
pub use readers::{open_reader, Format, FormatReader, Hdf4Reader, Hdf5Reader, TifDirReader};
pub use window::Window;
