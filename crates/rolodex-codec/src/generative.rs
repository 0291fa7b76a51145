use crate::source::ExtractionRequest;
use crate::{CodecError, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use rolodex_core::{Field, Record};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct GenerativeConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Request body for a `generateContent` call: instructions, the input text,
/// an optional inline image, and a response schema that requires every
/// canonical field.
pub fn build_payload(request: &ExtractionRequest) -> Value {
    let field_list = Field::ALL
        .iter()
        .map(|field| format!("'{}'", field.id()))
        .collect::<Vec<_>>()
        .join(", ");
    let prompt = format!(
        "Extract every political contact found in the input below (it may come from an image) \
         and return a JSON array. Each object must have exactly these keys: {field_list}. \
         Use an empty string for any value that is not present. Put additional mobile numbers \
         in mobilePhone2 and mobilePhone3.\n\nInput:\n{}",
        request.text
    );

    let mut parts = vec![json!({ "text": prompt })];
    if let Some(image) = &request.image {
        parts.push(json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": BASE64_STANDARD.encode(&image.data),
            }
        }));
    }

    let properties: Map<String, Value> = Field::ALL
        .iter()
        .map(|field| (field.id().to_string(), json!({ "type": "STRING" })))
        .collect();
    let required: Vec<&str> = Field::ALL.iter().map(|field| field.id()).collect();

    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Pulls the JSON array out of the first candidate's first text part.
pub fn parse_response(body: &str) -> Result<Vec<Record>> {
    let envelope: GenerateResponse = serde_json::from_str(body)?;
    let text = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or_else(|| CodecError::Extraction("unexpected response format".to_string()))?;
    records_from_json(&text)
}

/// Every canonical field is set on the resulting records; keys outside the
/// canonical set are dropped.
pub fn records_from_json(text: &str) -> Result<Vec<Record>> {
    let objects: Vec<Map<String, Value>> = serde_json::from_str(text)?;
    let records = objects
        .into_iter()
        .map(|object| {
            let mut record = Record::new();
            for field in Field::ALL {
                record.set(field, String::new());
            }
            for (key, value) in object {
                let Some(field) = Field::from_id(&key) else {
                    continue;
                };
                let value = match value {
                    Value::String(text) => text.trim().to_string(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                record.set(field, value);
            }
            record
        })
        .collect();
    Ok(records)
}

#[cfg(feature = "extract-service")]
mod imp {
    use super::{build_payload, parse_response, GenerativeConfig};
    use crate::source::{ExtractionRequest, ExtractionService};
    use crate::{CodecError, Result};
    use reqwest::blocking::Client;
    use rolodex_core::Record;
    use std::time::Duration;
    use url::Url;

    #[derive(Debug, Clone)]
    pub struct GenerativeExtractor {
        config: GenerativeConfig,
        client: Client,
    }

    impl GenerativeExtractor {
        pub fn new(config: GenerativeConfig) -> Result<Self> {
            let client = Client::builder()
                .user_agent("rolodex")
                .timeout(config.timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()?;
            Ok(Self { config, client })
        }

        fn request_url(&self) -> Result<Url> {
            let base = self.config.endpoint.trim_end_matches('/');
            let mut url = Url::parse(&format!(
                "{base}/models/{}:generateContent",
                self.config.model
            ))?;
            if url.scheme() != "https" {
                return Err(CodecError::Parse(
                    "extraction endpoint must use https".to_string(),
                ));
            }
            url.query_pairs_mut().append_pair("key", &self.config.api_key);
            Ok(url)
        }
    }

    impl ExtractionService for GenerativeExtractor {
        fn service_name(&self) -> &'static str {
            "generative"
        }

        fn extract(&self, request: &ExtractionRequest) -> Result<Vec<Record>> {
            let url = self.request_url()?;
            let body = self
                .client
                .post(url)
                .json(&build_payload(request))
                .send()?
                .error_for_status()?
                .text()?;
            parse_response(&body)
        }
    }
}

#[cfg(not(feature = "extract-service"))]
mod imp {
    use super::GenerativeConfig;
    use crate::source::{ExtractionRequest, ExtractionService};
    use crate::{CodecError, Result};
    use rolodex_core::Record;

    #[derive(Debug, Clone)]
    pub struct GenerativeExtractor {
        config: GenerativeConfig,
    }

    impl GenerativeExtractor {
        pub fn new(config: GenerativeConfig) -> Result<Self> {
            Ok(Self { config })
        }
    }

    impl ExtractionService for GenerativeExtractor {
        fn service_name(&self) -> &'static str {
            "generative"
        }

        fn extract(&self, _request: &ExtractionRequest) -> Result<Vec<Record>> {
            let _ = &self.config;
            Err(CodecError::Unavailable(
                "text and image extraction requires the extract-service feature".to_string(),
            ))
        }
    }
}

pub use imp::GenerativeExtractor;
