use crate::error::{CodecError, Result};
use crate::{csv, report, vcf};
use rolodex_core::{ColumnSchema, ColumnSpec, ExportFormat, NameDecoration, Record};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub filename: String,
    pub mime_type: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportBundle {
    pub files: Vec<ExportFile>,
    /// Validation messages for requested formats that were not recognised.
    pub rejected: Vec<String>,
}

impl ExportBundle {
    pub fn file(&self, format: ExportFormat) -> Option<&ExportFile> {
        self.files.iter().find(|file| file.format == format)
    }
}

/// Cards always carry the fixed field set; the other formats follow the
/// visible columns.
fn render(format: ExportFormat, records: &[Record], columns: &[&ColumnSpec]) -> String {
    match format {
        ExportFormat::Tabular => csv::export_csv(records, columns),
        ExportFormat::Card => vcf::export_vcf(records),
        ExportFormat::Report => report::export_report(records, columns),
    }
}

/// Renders every requested format from decorated copies of `records`.
///
/// Fails without producing anything when no column is visible or no format
/// was requested. Unrecognised format names are reported in
/// [`ExportBundle::rejected`] while the remaining formats still render.
pub fn build_export<S: AsRef<str>>(
    records: &[Record],
    columns: &ColumnSchema,
    formats: &[S],
    decoration: &NameDecoration,
) -> Result<ExportBundle> {
    let visible = columns.visible();
    if visible.is_empty() {
        return Err(CodecError::EmptyExportSelection(
            "select at least one field to export".to_string(),
        ));
    }
    if formats.is_empty() {
        return Err(CodecError::EmptyExportSelection(
            "select at least one download format".to_string(),
        ));
    }

    let mut bundle = ExportBundle::default();
    let mut selected: Vec<ExportFormat> = Vec::new();
    for raw in formats {
        match raw.as_ref().parse::<ExportFormat>() {
            Ok(format) => {
                if !selected.contains(&format) {
                    selected.push(format);
                }
            }
            Err(err) => {
                warn!(format = raw.as_ref(), "skipping unknown export format");
                bundle.rejected.push(err.to_string());
            }
        }
    }

    let decorated: Vec<Record> = records
        .iter()
        .map(|record| decoration.apply(record))
        .collect();

    for format in selected {
        debug!(%format, records = decorated.len(), columns = visible.len(), "rendering export");
        let content = render(format, &decorated, &visible);
        bundle.files.push(ExportFile {
            format,
            filename: format.default_filename().to_string(),
            mime_type: format.mime_type(),
            content,
        });
    }

    Ok(bundle)
}

/// Renders a single format through [`build_export`], so the preview is
/// byte-identical to the exported file.
pub fn preview(
    records: &[Record],
    columns: &ColumnSchema,
    format: ExportFormat,
    decoration: &NameDecoration,
) -> Result<ExportFile> {
    let bundle = build_export(records, columns, &[format.to_string()], decoration)?;
    bundle
        .files
        .into_iter()
        .next()
        .ok_or_else(|| CodecError::Parse(format!("no output rendered for {format}")))
}

pub fn write_bundle(bundle: &ExportBundle, dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    let mut written = Vec::with_capacity(bundle.files.len());
    for file in &bundle.files {
        let path = dir.join(&file.filename);
        fs::write(&path, &file.content)?;
        info!(path = %path.display(), mime = file.mime_type, "export written");
        written.push(path);
    }
    Ok(written)
}
