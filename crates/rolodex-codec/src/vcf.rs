use rolodex_core::{Field, Record};
use std::borrow::Cow;

/// Fields written as `X-` properties because vCard has no standard tag for
/// them. Order here is the order they are emitted in.
const VENDOR_FIELDS: [Field; 10] = [
    Field::AssemblyTenure,
    Field::FatherHusbandName,
    Field::Constituency,
    Field::PlaceOfBirth,
    Field::MaritalStatus,
    Field::Religion,
    Field::Notes,
    Field::AcademicQualifications,
    Field::Schooling,
    Field::PartyAffiliation,
];

#[derive(Debug, Clone, Default)]
pub struct ParsedVcf {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
}

/// Parses vCard text. Every non-blank fragment between `BEGIN:VCARD` markers
/// becomes one record; properties apply in line order, so a later `N` line
/// overrides an earlier `FN` line and vice versa.
pub fn parse_vcf(data: &str) -> ParsedVcf {
    let mut parsed = ParsedVcf::default();
    let mut current: Option<RawCard> = None;

    for line in unfold_lines(data) {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("BEGIN:VCARD") {
            if let Some(card) = current.take() {
                card.finish(&mut parsed);
            }
            current = Some(RawCard::default());
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        let card = current.get_or_insert_with(RawCard::default);
        card.lines += 1;

        let Some((key, raw_value)) = split_property(trimmed) else {
            continue;
        };
        if raw_value.trim().is_empty() {
            continue;
        }

        // Names are compared whole, so NOTE and NICKNAME never land in N
        // and TELEX never lands in TEL.
        match key.as_str() {
            "FN" => card.record.set(Field::Name, unescape_vcard_value(raw_value.trim())),
            "N" => {
                let components = split_components(raw_value.trim());
                if let Some(family) = components.first() {
                    card.record.set(Field::Name, unescape_vcard_value(family));
                }
            }
            "TEL" => card.phones.push(unescape_vcard_value(raw_value.trim())),
            "EMAIL" => card
                .record
                .set(Field::Email, unescape_vcard_value(raw_value.trim())),
            "ADR" => {
                let components = split_components(raw_value.trim());
                if let Some(last) = components.last() {
                    card.record
                        .set(Field::Address, unescape_vcard_value(last).trim().to_string());
                }
            }
            "ORG" => card
                .record
                .set(Field::Party, unescape_vcard_value(raw_value.trim())),
            other => {
                if let Some(field) = vendor_field(other) {
                    card.record.set(field, unescape_vcard_value(raw_value.trim()));
                }
            }
        }
    }

    if let Some(card) = current.take() {
        card.finish(&mut parsed);
    }

    parsed
}

pub fn export_vcf(records: &[Record]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str("BEGIN:VCARD\r\n");
        out.push_str("VERSION:3.0\r\n");

        let name = record.get(Field::Name);
        if !name.is_empty() {
            let escaped = escape_vcard_value(name);
            out.push_str(&format!("FN:{escaped}\r\n"));
            out.push_str(&format!("N:{escaped};;;;\r\n"));
        }
        let email = record.get(Field::Email);
        if !email.is_empty() {
            out.push_str(&format!(
                "EMAIL;TYPE=INTERNET:{}\r\n",
                escape_vcard_value(email)
            ));
        }
        for field in Field::PHONES {
            let phone = record.get(field).trim();
            if !phone.is_empty() {
                out.push_str(&format!("TEL;TYPE=CELL:{}\r\n", escape_vcard_value(phone)));
            }
        }
        let address = record.get(Field::Address);
        if !address.is_empty() {
            out.push_str(&format!(
                "ADR;TYPE=WORK:;;{}\r\n",
                escape_vcard_value(address)
            ));
        }
        let party = record.get(Field::Party);
        if !party.is_empty() {
            out.push_str(&format!("ORG:{}\r\n", escape_vcard_value(party)));
        }
        for field in VENDOR_FIELDS {
            let value = record.get(field);
            if !value.is_empty() {
                out.push_str(&format!(
                    "{}:{}\r\n",
                    field.vendor_tag(),
                    escape_vcard_value(value)
                ));
            }
        }

        out.push_str("END:VCARD\r\n");
    }
    out
}

#[derive(Default)]
struct RawCard {
    record: Record,
    phones: Vec<String>,
    lines: usize,
}

impl RawCard {
    fn finish(mut self, parsed: &mut ParsedVcf) {
        if self.lines == 0 {
            return;
        }
        if self.phones.len() > Field::PHONES.len() {
            parsed.warnings.push(format!(
                "dropping {} extra phone number(s) for {:?}",
                self.phones.len() - Field::PHONES.len(),
                self.record.get(Field::Name)
            ));
        }
        for (field, phone) in Field::PHONES.into_iter().zip(self.phones) {
            self.record.set(field, phone);
        }
        parsed.records.push(self.record);
    }
}

fn vendor_field(tag: &str) -> Option<Field> {
    Field::from_vendor_tag(tag).filter(|field| VENDOR_FIELDS.contains(field))
}

fn unfold_lines(input: &str) -> Vec<String> {
    let input = normalize_line_endings(input);
    let mut lines: Vec<String> = Vec::new();
    for line in input.lines() {
        if line.starts_with(' ') || line.starts_with('\t') {
            if let Some(last) = lines.last_mut() {
                last.push_str(&line[1..]);
            } else {
                lines.push(line[1..].to_string());
            }
        } else {
            lines.push(line.to_string());
        }
    }
    lines
}

fn normalize_line_endings(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            if matches!(chars.peek(), Some('\n')) {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Splits `NAME;PARAM=X:value` into the upper-cased property name (group
/// prefix removed) and the raw value after the first colon.
fn split_property(line: &str) -> Option<(String, &str)> {
    let (left, value) = line.split_once(':')?;
    let mut name = left.split(';').next()?.trim();
    if let Some((_, grouped)) = name.rsplit_once('.') {
        name = grouped;
    }
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_uppercase(), value))
}

/// Splits a structured value on semicolons that are not backslash-escaped.
/// Components keep their escapes.
fn split_components(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escape = false;

    for ch in value.chars() {
        if escape {
            current.push(ch);
            escape = false;
            continue;
        }

        if ch == '\\' {
            current.push(ch);
            escape = true;
            continue;
        }

        if ch == ';' {
            items.push(current);
            current = String::new();
        } else {
            current.push(ch);
        }
    }

    items.push(current);
    items
}

fn escape_vcard_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' | '\r' => out.push_str("\\n"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_vcard_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') | Some('N') => out.push('\n'),
                Some(other) => out.push(other),
                None => break,
            }
        } else {
            out.push(ch);
        }
    }
    out
}
