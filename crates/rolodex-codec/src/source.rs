use crate::Result;
use rolodex_core::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Free-form input for the extraction service: text, an image, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub text: String,
    pub image: Option<ImagePayload>,
}

impl ExtractionRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn image(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            text: String::new(),
            image: Some(ImagePayload {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }
}

/// A service that turns unstructured input into canonical records.
/// `extract` performs exactly one attempt; retrying is the caller's job.
pub trait ExtractionService {
    fn service_name(&self) -> &'static str;
    fn extract(&self, request: &ExtractionRequest) -> Result<Vec<Record>>;
}
