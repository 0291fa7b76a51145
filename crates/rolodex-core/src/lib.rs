pub mod decoration;
pub mod domain;
pub mod error;
pub mod format;
pub mod schema;

pub use decoration::NameDecoration;
pub use domain::*;
pub use error::CoreError;
pub use format::ExportFormat;
pub use schema::{ColumnEdit, ColumnSchema, ColumnSpec};
