use rolodex_core::{ColumnSpec, Field, Record};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
    pub skipped: usize,
}

/// Parses comma-separated text whose first non-blank line is the header.
/// Rows whose field count differs from the header are dropped without a
/// warning; only the count is kept.
pub fn parse_csv(data: &str) -> ParsedCsv {
    let mut parsed = ParsedCsv::default();
    let mut rows = data
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let Some(header) = rows.next() else {
        return parsed;
    };

    let headers: Vec<Option<Field>> = split_row(header)
        .into_iter()
        .map(|cell| {
            let field = Field::from_header(&cell);
            if field.is_none() && !cell.is_empty() {
                parsed
                    .warnings
                    .push(format!("unknown column {cell:?}; ignoring"));
            }
            field
        })
        .collect();

    for (idx, line) in rows.enumerate() {
        let values = split_row(line);
        if values.len() != headers.len() {
            debug!(
                row = idx + 1,
                expected = headers.len(),
                found = values.len(),
                "skipping row with mismatched field count"
            );
            parsed.skipped += 1;
            continue;
        }

        let mut record = Record::new();
        for (field, value) in headers.iter().zip(values) {
            if let Some(field) = field {
                record.set(*field, value);
            }
        }
        parsed.records.push(record);
    }

    parsed
}

pub fn export_csv(records: &[Record], columns: &[&ColumnSpec]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|column| quote_field(&column.label))
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        lines.push(
            columns
                .iter()
                .map(|column| quote_field(record.get(column.id)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Splits on commas that have an even number of quote characters between
/// them and the end of the line, so quoted commas stay inside their field.
fn split_row(line: &str) -> Vec<String> {
    let total_quotes = line.matches('"').count();
    let mut seen_quotes = 0;
    let mut fields = Vec::new();
    let mut start = 0;

    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => seen_quotes += 1,
            ',' if (total_quotes - seen_quotes) % 2 == 0 => {
                fields.push(clean_field(&line[start..idx]));
                start = idx + 1;
            }
            _ => {}
        }
    }
    fields.push(clean_field(&line[start..]));
    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let wrapped = trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"');
    let inner = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    if wrapped {
        inner.replace("\"\"", "\"").trim().to_string()
    } else {
        inner.trim().to_string()
    }
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolodex_core::ColumnSchema;

    #[test]
    fn parse_csv_keeps_quoted_commas_together() {
        let parsed = parse_csv("name,email\n\"Doe, Jr\",a@b.com");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(
            parsed.records[0],
            Record::from_pairs([(Field::Name, "Doe, Jr"), (Field::Email, "a@b.com")])
        );
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn parse_csv_skips_rows_with_wrong_arity() {
        let data = "name,email\nAli,ali@x.pk\nOnly One\nSana,s@x.pk,extra\nZara,z@x.pk\n";
        let parsed = parse_csv(data);
        let names: Vec<&str> = parsed
            .records
            .iter()
            .map(|record| record.get(Field::Name))
            .collect();
        assert_eq!(names, vec!["Ali", "Zara"]);
        assert_eq!(parsed.skipped, 2);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn parse_csv_drops_blank_lines_and_crlf() {
        let data = "\r\n  \nname , mobilePhone1\r\n\r\n Ali , 0300-1234567 \r\n";
        let parsed = parse_csv(data);
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].get(Field::Name), "Ali");
        assert_eq!(parsed.records[0].get(Field::MobilePhone1), "0300-1234567");
    }

    #[test]
    fn parse_csv_accepts_labels_and_warns_on_unknown_headers() {
        let parsed = parse_csv("\"Name\",\"Mobile 1\",\"Nickname\"\n\"Ali\",\"123\",\"Al\"");
        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.get(Field::Name), "Ali");
        assert_eq!(record.get(Field::MobilePhone1), "123");
        assert_eq!(record.supplied().count(), 2);
        assert_eq!(parsed.warnings.len(), 1);
        assert!(parsed.warnings[0].contains("Nickname"));
    }

    #[test]
    fn parse_csv_empty_input() {
        let parsed = parse_csv("\n\n   \n");
        assert!(parsed.records.is_empty());
        let parsed = parse_csv("name,email\n");
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn export_csv_quotes_and_escapes() {
        let record = Record::from_pairs([
            (Field::Name, "Ali \"Lion\" Khan"),
            (Field::Email, ""),
        ]);
        let schema = ColumnSchema::derive_initial(std::slice::from_ref(&record));
        let mut schema = schema;
        schema.set_label(Field::Name, "Full \"Name\"").expect("label");
        let output = export_csv(&[record], &schema.visible());
        assert_eq!(
            output,
            "\"Full \"\"Name\"\"\",\"Email\"\n\"Ali \"\"Lion\"\" Khan\",\"\""
        );
    }

    #[test]
    fn export_csv_without_records_is_header_only() {
        let record = Record::from_pairs([(Field::Name, "Ali")]);
        let schema = ColumnSchema::derive_initial(&[record]);
        assert_eq!(export_csv(&[], &schema.visible()), "\"Name\"");
    }

    #[test]
    fn csv_export_roundtrip_parses() {
        let records = vec![
            Record::from_pairs([
                (Field::Name, "Doe, Jr"),
                (Field::Email, "doe@example.com"),
                (Field::MobilePhone1, "+923001234567"),
                (Field::Notes, "said \"hello\", twice"),
            ]),
            Record::from_pairs([
                (Field::Name, "Sana"),
                (Field::Email, ""),
                (Field::MobilePhone1, ""),
                (Field::Notes, "\""),
            ]),
        ];
        let schema = ColumnSchema::derive_initial(&records);
        let output = export_csv(&records, &schema.visible());
        let parsed = parse_csv(&output);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.records, records);
    }
}
