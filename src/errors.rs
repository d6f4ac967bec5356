use std::path::PathBuf;

use crate::components::Window;

pub type Result<T> = std::result::Result<T, EarthioError>;

#[derive(thiserror::Error, Debug)]
pub enum EarthioError {
    #[error("Source {0:?} does not exist")]
    SourceNotFound(PathBuf),
    #[error("Window {window} of layer {layer:?} does not fit its native extent {extent:?}")]
    SpecOutOfBounds {
        layer: String,
        window: Window,
        extent: (usize, usize),
    },
    #[error("Buffer shape {shape:?} of layer {layer:?} has an empty dimension")]
    EmptyBufferShape { layer: String, shape: (usize, usize) },
    #[error("Could not decode {source_name:?}: {reason}")]
    FormatDecodeError { source_name: String, reason: String },
    #[error("Layer {layer:?} has shape {found:?}, cube shape is {expected:?}")]
    ShapeMismatch {
        layer: String,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("Flat array carries no (rows, cols) shape or layer names")]
    MissingShapeMetadata,
    #[error("Flat array has {found} rows, reshaping to {rows}x{cols} needs {}", .rows * .cols)]
    IncompleteRowSet {
        found: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Flat array has {found} rows, more than the {} cells of a {rows}x{cols} grid", .rows * .cols)]
    ExcessRowSet {
        found: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Table has {columns} columns but {layers} layer names")]
    ColumnCountMismatch { columns: usize, layers: usize },
    #[error("No layer of {source_name:?} matches {key:?} (requested as {layer:?})")]
    LayerNotFound {
        layer: String,
        key: String,
        source_name: String,
    },
    #[error("Layer {0:?} is present more than once")]
    DuplicateLayer(String),
    #[error("No reader for {0:?}")]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    NdarrayError(#[from] ndarray::ShapeError),
}

impl EarthioError {
    pub(crate) fn decode(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::FormatDecodeError {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Tag decoder errors with the source being decoded.
pub(crate) trait DecodeContext<T> {
    fn decoding(self, source_name: &str) -> Result<T>;
}

impl<T> DecodeContext<T> for std::result::Result<T, gdal::errors::GdalError> {
    fn decoding(self, source_name: &str) -> Result<T> {
        self.map_err(|err| EarthioError::decode(source_name, err))
    }
}
