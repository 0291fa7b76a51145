use rolodex_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("nothing to export: {0}")]
    EmptyExportSelection(String),
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("unavailable: {0}")]
    Unavailable(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "extract-service")]
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[cfg(feature = "extract-service")]
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, CodecError>;
