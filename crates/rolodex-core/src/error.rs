use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
    #[error("invalid column edit: {0}")]
    InvalidColumnEdit(String),
}
