use crate::export::{build_export, preview, ExportBundle, ExportFile};
use crate::extract::{CancelToken, RetryPolicy};
use crate::ingest::{ingest, IngestInput, IngestReport};
use crate::source::ExtractionService;
use crate::Result;
use rolodex_core::{ColumnEdit, ColumnSchema, ExportFormat, NameDecoration, Record};

/// Everything one operator works on between ingestions. Each session owns
/// its records and column schema; nothing is shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<Record>,
    columns: ColumnSchema,
    decoration: NameDecoration,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &ColumnSchema {
        &self.columns
    }

    /// Runs ingestion and, only if it completes, replaces the record set and
    /// re-derives the column schema. Taking `&mut self` keeps a session to
    /// one extraction call at a time.
    pub fn ingest(
        &mut self,
        input: &IngestInput,
        service: &dyn ExtractionService,
        policy: RetryPolicy,
        cancel: &CancelToken,
    ) -> Result<IngestReport> {
        let report = ingest(input, service, policy, cancel)?;
        self.replace_records(report.records.clone());
        Ok(report)
    }

    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.columns = ColumnSchema::derive_initial(&records);
        self.records = records;
    }

    pub fn edit_columns(&mut self, edits: &[ColumnEdit]) -> Result<()> {
        self.columns.apply_all(edits)?;
        Ok(())
    }

    pub fn set_decoration(&mut self, decoration: NameDecoration) {
        self.decoration = decoration;
    }

    pub fn preview(&self, format: ExportFormat) -> Result<ExportFile> {
        preview(&self.records, &self.columns, format, &self.decoration)
    }

    pub fn export<S: AsRef<str>>(&self, formats: &[S]) -> Result<ExportBundle> {
        build_export(&self.records, &self.columns, formats, &self.decoration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::ingest::IngestKind;
    use crate::source::ExtractionRequest;
    use rolodex_core::Field;
    use std::time::Duration;

    struct Offline;

    impl ExtractionService for Offline {
        fn service_name(&self) -> &'static str {
            "offline"
        }

        fn extract(&self, _request: &ExtractionRequest) -> Result<Vec<Record>> {
            Err(CodecError::Unavailable("offline".to_string()))
        }
    }

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    fn loaded_session() -> Session {
        let mut session = Session::new();
        let input = IngestInput::text(
            IngestKind::Tabular,
            "name,email,mobilePhone1\nAli,ali@x.pk,0300-1234567\nSana,s@x.pk,\n",
        );
        session
            .ingest(&input, &Offline, instant(), &CancelToken::new())
            .expect("ingest");
        session
    }

    #[test]
    fn ingest_derives_columns_from_first_record() {
        let session = loaded_session();
        assert_eq!(session.records().len(), 2);
        assert_eq!(
            session.columns().ids(),
            vec![Field::Name, Field::MobilePhone1, Field::Email]
        );
    }

    #[test]
    fn column_edits_survive_repeated_previews() {
        let mut session = loaded_session();
        session
            .edit_columns(&[
                ColumnEdit::Move(Field::Email, 0),
                ColumnEdit::Label(Field::Name, "Member".to_string()),
            ])
            .expect("edit");
        let first = session.preview(ExportFormat::Tabular).expect("preview");
        let second = session.preview(ExportFormat::Tabular).expect("preview");
        assert_eq!(first, second);
        assert!(first.content.starts_with("\"Email\",\"Member\",\"Mobile 1\"\n"));
        assert_eq!(session.columns().ids()[0], Field::Email);
    }

    #[test]
    fn preview_and_export_agree() {
        let mut session = loaded_session();
        session.set_decoration(NameDecoration::new("MNA", "Sindh"));
        session
            .edit_columns(&[ColumnEdit::Hide(Field::Email)])
            .expect("edit");
        let bundle = session.export(&["csv", "vcf", "txt"]).expect("export");
        for format in ExportFormat::ALL {
            let previewed = session.preview(format).expect("preview");
            assert_eq!(bundle.file(format), Some(&previewed));
        }
        assert_eq!(session.records()[0].get(Field::Name), "Ali");
    }

    #[test]
    fn failed_edit_batch_leaves_schema_untouched() {
        let mut session = loaded_session();
        let before = session.columns().clone();
        let err = session
            .edit_columns(&[ColumnEdit::Hide(Field::Name), ColumnEdit::Show(Field::Notes)])
            .unwrap_err();
        assert!(matches!(err, CodecError::Core(_)));
        assert_eq!(session.columns(), &before);
    }

    #[test]
    fn extraction_failure_clears_the_session() {
        let mut session = loaded_session();
        let report = session
            .ingest(
                &IngestInput::text(IngestKind::Text, "free text"),
                &Offline,
                instant(),
                &CancelToken::new(),
            )
            .expect("ingest");
        assert!(report.extraction_failure.is_some());
        assert!(session.records().is_empty());
        assert!(session.columns().is_empty());
        let err = session.export(&["csv"]).unwrap_err();
        assert!(matches!(err, CodecError::EmptyExportSelection(_)));
    }

    #[test]
    fn ingest_errors_leave_state_unchanged() {
        let mut session = loaded_session();
        let before_records = session.records().to_vec();
        let bad = IngestInput::new(Some("x.csv".to_string()), vec![0xc3, 0x28], false);
        assert!(session
            .ingest(&bad, &Offline, instant(), &CancelToken::new())
            .is_err());
        assert_eq!(session.records(), before_records.as_slice());
        assert_eq!(session.columns().len(), 3);
    }
}
