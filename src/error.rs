use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("preprocess error: {0}")]
    Preprocess(String),

    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("every recognition strategy failed")]
    AllStrategiesFailed,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
