pub mod csv;
pub mod error;
pub mod export;
pub mod extract;
pub mod generative;
pub mod ingest;
pub mod report;
pub mod session;
pub mod source;
pub mod vcf;

pub use error::{CodecError, Result};
pub use export::{build_export, preview, write_bundle, ExportBundle, ExportFile};
pub use extract::{extract_with_retry, CancelToken, ExtractionOutcome, RetryPolicy};
pub use generative::{GenerativeConfig, GenerativeExtractor};
pub use ingest::{ingest, IngestInput, IngestKind, IngestReport};
pub use session::Session;
pub use source::{ExtractionRequest, ExtractionService, ImagePayload};
