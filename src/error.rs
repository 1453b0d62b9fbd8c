use thiserror::Error;

#[derive(Error, Debug)]
pub enum NNError {
    // Model related errors
    #[error("Invalid layer configuration: {0}")]
    InvalidLayerConfiguration(String),
    #[error("Layer shape mismatch: {0}")]
    LayerShapeMismatch(String),
    #[error("Model has no layers")]
    EmptyModel,

    // Training related errors
    #[error("Invalid input shape: {0}")]
    InvalidInputShape(String),
    #[error("Invalid output shape: {0}")]
    InvalidOutputShape(String),
    #[error("Dataset has no datapoints")]
    EmptyDataset,

    // Learning configuration errors
    #[error("Invalid learning configuration: {0}")]
    InvalidConfiguration(String),

    // File operations
    #[error("Failed to load model: {0}")]
    ModelLoadError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] Box<bincode::ErrorKind>),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, NNError>;
