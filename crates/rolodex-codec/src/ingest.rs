use crate::extract::{extract_with_retry, CancelToken, ExtractionOutcome, RetryPolicy};
use crate::source::{ExtractionRequest, ExtractionService};
use crate::{csv, vcf, CodecError, Result};
use rolodex_core::Record;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestKind {
    Tabular,
    Card,
    Text,
    Image,
}

impl IngestKind {
    /// Picks the ingestion route from the filename suffix; the image flag
    /// wins when the caller already knows the content type.
    pub fn detect(filename: Option<&str>, image: bool) -> Self {
        if image {
            return IngestKind::Image;
        }
        match extension(filename).as_deref() {
            Some("csv") => IngestKind::Tabular,
            Some("vcf") | Some("vcard") => IngestKind::Card,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => IngestKind::Image,
            _ => IngestKind::Text,
        }
    }
}

fn extension(filename: Option<&str>) -> Option<String> {
    Path::new(filename?)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn image_mime_type(filename: Option<&str>) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestInput {
    pub kind: IngestKind,
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

impl IngestInput {
    pub fn new(filename: Option<String>, bytes: Vec<u8>, image: bool) -> Self {
        let kind = IngestKind::detect(filename.as_deref(), image);
        Self {
            kind,
            filename,
            bytes,
        }
    }

    pub fn text(kind: IngestKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            filename: None,
            bytes: text.into().into_bytes(),
        }
    }

    fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes)
            .map_err(|err| CodecError::Parse(format!("input is not valid UTF-8: {err}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
    pub skipped: usize,
    /// Set when the extraction service gave up; `records` is then empty.
    pub extraction_failure: Option<String>,
}

/// Turns raw input into normalized canonical records.
pub fn ingest(
    input: &IngestInput,
    service: &dyn ExtractionService,
    policy: RetryPolicy,
    cancel: &CancelToken,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    match input.kind {
        IngestKind::Tabular => {
            let parsed = csv::parse_csv(input.as_text()?);
            report.records = parsed.records;
            report.warnings = parsed.warnings;
            report.skipped = parsed.skipped;
        }
        IngestKind::Card => {
            let parsed = vcf::parse_vcf(input.as_text()?);
            report.records = parsed.records;
            report.warnings = parsed.warnings;
        }
        IngestKind::Text | IngestKind::Image => {
            let request = if input.kind == IngestKind::Image {
                ExtractionRequest::image(
                    image_mime_type(input.filename.as_deref()),
                    input.bytes.clone(),
                )
            } else {
                ExtractionRequest::text(input.as_text()?)
            };
            match extract_with_retry(service, &request, policy, cancel) {
                ExtractionOutcome::Success(records) => report.records = records,
                ExtractionOutcome::Failure(message) => {
                    warn!(error = %message, "extraction gave up");
                    report.extraction_failure = Some(message);
                }
            }
        }
    }

    for record in &mut report.records {
        record.normalize_phones();
    }
    debug!(
        kind = ?input.kind,
        records = report.records.len(),
        skipped = report.skipped,
        "ingested input"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::Field;
    use std::cell::RefCell;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingService {
        requests: RefCell<Vec<ExtractionRequest>>,
        fail: bool,
    }

    impl ExtractionService for RecordingService {
        fn service_name(&self) -> &'static str {
            "recording"
        }

        fn extract(&self, request: &ExtractionRequest) -> Result<Vec<Record>> {
            self.requests.borrow_mut().push(request.clone());
            if self.fail {
                return Err(CodecError::Extraction("offline".to_string()));
            }
            Ok(vec![Record::from_pairs([
                (Field::Name, "Ali"),
                (Field::MobilePhone1, "0300 1234567"),
            ])])
        }
    }

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
        }
    }

    #[test]
    fn detect_uses_suffix_then_flag() {
        assert_eq!(IngestKind::detect(Some("list.CSV"), false), IngestKind::Tabular);
        assert_eq!(IngestKind::detect(Some("cards.vcf"), false), IngestKind::Card);
        assert_eq!(IngestKind::detect(Some("scan.jpeg"), false), IngestKind::Image);
        assert_eq!(IngestKind::detect(Some("notes.txt"), false), IngestKind::Text);
        assert_eq!(IngestKind::detect(None, false), IngestKind::Text);
        assert_eq!(IngestKind::detect(Some("list.csv"), true), IngestKind::Image);
        assert_eq!(image_mime_type(Some("scan.JPG")), "image/jpeg");
        assert_eq!(image_mime_type(None), "image/png");
    }

    #[test]
    fn tabular_input_is_parsed_and_phones_normalized() {
        let service = RecordingService::default();
        let input = IngestInput::new(
            Some("members.csv".to_string()),
            b"name,mobilePhone1,mobilePhone2\nAli,0300-1234567,\nbad row\n".to_vec(),
            false,
        );
        let report = ingest(&input, &service, instant(), &CancelToken::new()).expect("ingest");
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].get(Field::MobilePhone1), "+923001234567");
        assert_eq!(report.records[0].get(Field::MobilePhone2), "");
        assert_eq!(report.skipped, 1);
        assert!(service.requests.borrow().is_empty());
    }

    #[test]
    fn card_input_normalizes_phones() {
        let service = RecordingService::default();
        let input = IngestInput::text(
            IngestKind::Card,
            "BEGIN:VCARD\nFN:Ali\nTEL:3001234567\nEND:VCARD\n",
        );
        let report = ingest(&input, &service, instant(), &CancelToken::new()).expect("ingest");
        assert_eq!(report.records[0].get(Field::MobilePhone1), "+923001234567");
    }

    #[test]
    fn free_text_goes_to_the_extraction_service() {
        let service = RecordingService::default();
        let input = IngestInput::new(None, b"Ali, 0300 1234567".to_vec(), false);
        let report = ingest(&input, &service, instant(), &CancelToken::new()).expect("ingest");
        assert_eq!(report.records[0].get(Field::MobilePhone1), "+923001234567");
        let requests = service.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, "Ali, 0300 1234567");
        assert!(requests[0].image.is_none());
    }

    #[test]
    fn images_are_sent_inline() {
        let service = RecordingService::default();
        let input = IngestInput::new(Some("card.webp".to_string()), vec![0xff, 0x00], false);
        ingest(&input, &service, instant(), &CancelToken::new()).expect("ingest");
        let requests = service.requests.borrow();
        let image = requests[0].image.as_ref().expect("image");
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(image.data, vec![0xff, 0x00]);
    }

    #[test]
    fn extraction_failure_yields_empty_report() {
        let service = RecordingService {
            fail: true,
            ..RecordingService::default()
        };
        let input = IngestInput::text(IngestKind::Text, "Ali");
        let report = ingest(&input, &service, instant(), &CancelToken::new()).expect("ingest");
        assert!(report.records.is_empty());
        assert!(report
            .extraction_failure
            .as_deref()
            .is_some_and(|message| message.contains("offline")));
        assert_eq!(service.requests.borrow().len(), 2);
    }

    #[test]
    fn non_utf8_tabular_input_is_an_error() {
        let service = RecordingService::default();
        let input = IngestInput::new(Some("a.csv".to_string()), vec![0xff, 0xfe], false);
        let err = ingest(&input, &service, instant(), &CancelToken::new()).unwrap_err();
        assert!(matches!(err, CodecError::Parse(_)));
    }
}
