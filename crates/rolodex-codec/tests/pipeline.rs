use rolodex_codec::csv::parse_csv;
use rolodex_codec::vcf::parse_vcf;
use rolodex_codec::{
    CancelToken, CodecError, ExtractionRequest, ExtractionService, IngestInput, IngestKind,
    RetryPolicy, Session,
};
use rolodex_core::{ColumnEdit, ExportFormat, Field, NameDecoration, Record};
use std::time::Duration;

struct CannedService(Vec<Record>);

impl ExtractionService for CannedService {
    fn service_name(&self) -> &'static str {
        "canned"
    }

    fn extract(&self, _request: &ExtractionRequest) -> rolodex_codec::Result<Vec<Record>> {
        Ok(self.0.clone())
    }
}

fn no_wait() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 5,
        base_delay: Duration::ZERO,
    }
}

fn full_record(name: &str, phone: &str) -> Record {
    let mut record = Record::new();
    for field in Field::ALL {
        record.set(field, String::new());
    }
    record.set(Field::Name, name);
    record.set(Field::MobilePhone1, phone);
    record.set(Field::Party, "PPP");
    record.set(Field::Address, "Clifton, Karachi");
    record
}

#[test]
fn extracted_records_flow_through_every_format() {
    let service = CannedService(vec![
        full_record("Ali", "0300-1234567"),
        full_record("Sana", "3331234567"),
    ]);
    let mut session = Session::new();
    session
        .ingest(
            &IngestInput::text(IngestKind::Text, "Ali and Sana"),
            &service,
            no_wait(),
            &CancelToken::new(),
        )
        .expect("ingest");

    assert_eq!(session.columns().len(), 17);
    assert_eq!(session.records()[1].get(Field::MobilePhone1), "+923331234567");

    let hidden: Vec<ColumnEdit> = Field::ALL
        .into_iter()
        .filter(|field| !matches!(field, Field::Name | Field::MobilePhone1))
        .map(ColumnEdit::Hide)
        .collect();
    session.edit_columns(&hidden).expect("hide");
    session.set_decoration(NameDecoration::new("MNA", "Sindh"));

    let bundle = session.export(&["csv", "vcf", "txt"]).expect("export");
    assert!(bundle.rejected.is_empty());

    let csv = &bundle.file(ExportFormat::Tabular).expect("csv").content;
    assert_eq!(
        csv,
        "\"Name\",\"Mobile 1\"\n\"MNA Ali Sindh\",\"+923001234567\"\n\"MNA Sana Sindh\",\"+923331234567\""
    );

    let card = &bundle.file(ExportFormat::Card).expect("vcf").content;
    let cards = parse_vcf(card);
    assert_eq!(cards.records.len(), 2);
    assert_eq!(cards.records[0].get(Field::Name), "MNA Ali Sindh");
    assert_eq!(cards.records[0].get(Field::Address), "Clifton, Karachi");
    assert_eq!(cards.records[0].get(Field::Party), "PPP");

    let report = &bundle.file(ExportFormat::Report).expect("txt").content;
    assert!(report.contains("Name: MNA Sana Sindh\nMobile 1: +923331234567"));

    assert_eq!(session.records()[0].get(Field::Name), "Ali");
}

#[test]
fn exported_tabular_file_parses_back_to_the_same_records() {
    let mut session = Session::new();
    session.replace_records(vec![
        full_record("Doe, Jr", "+923001234567"),
        full_record("Zara \"Z\" Ahmed", ""),
    ]);
    let file = session.preview(ExportFormat::Tabular).expect("preview");
    let parsed = parse_csv(&file.content);
    assert_eq!(parsed.records, session.records());
}

#[test]
fn empty_selection_produces_nothing() {
    let mut session = Session::new();
    session.replace_records(vec![full_record("Ali", "")]);
    let formats: [&str; 0] = [];
    assert!(matches!(
        session.export(&formats),
        Err(CodecError::EmptyExportSelection(_))
    ));
}

#[test]
fn unknown_format_is_reported_alongside_good_output() {
    let mut session = Session::new();
    session.replace_records(vec![full_record("Ali", "")]);
    let bundle = session.export(&["xlsx", "vcf"]).expect("export");
    assert_eq!(bundle.files.len(), 1);
    assert_eq!(bundle.files[0].mime_type, "text/vcard");
    assert_eq!(bundle.rejected, vec!["unknown export format: xlsx".to_string()]);
}
