use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Bezier x values must be in [0, 1] range (x1 = {x1}, x2 = {x2})")]
    InvalidParameter { x1: f64, x2: f64 },

    #[error("Element is required in scroll_into_view")]
    MissingElement,

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Invalid scheduler: {0}")]
    InvalidScheduler(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
