use crate::domain::phone::normalize_phone;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One canonical contact field. The set is closed; no codec may add its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Constituency,
    Party,
    FatherHusbandName,
    Email,
    MobilePhone1,
    MobilePhone2,
    MobilePhone3,
    Address,
    PlaceOfBirth,
    MaritalStatus,
    Religion,
    AssemblyTenure,
    Notes,
    AcademicQualifications,
    Schooling,
    PartyAffiliation,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Name,
        Field::Constituency,
        Field::Party,
        Field::FatherHusbandName,
        Field::Email,
        Field::MobilePhone1,
        Field::MobilePhone2,
        Field::MobilePhone3,
        Field::Address,
        Field::PlaceOfBirth,
        Field::MaritalStatus,
        Field::Religion,
        Field::AssemblyTenure,
        Field::Notes,
        Field::AcademicQualifications,
        Field::Schooling,
        Field::PartyAffiliation,
    ];

    pub const PHONES: [Field; 3] = [Field::MobilePhone1, Field::MobilePhone2, Field::MobilePhone3];

    /// Wire identifier used by tabular headers and the extraction schema.
    pub fn id(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Constituency => "constituency",
            Field::Party => "party",
            Field::FatherHusbandName => "fatherHusbandName",
            Field::Email => "email",
            Field::MobilePhone1 => "mobilePhone1",
            Field::MobilePhone2 => "mobilePhone2",
            Field::MobilePhone3 => "mobilePhone3",
            Field::Address => "address",
            Field::PlaceOfBirth => "placeOfBirth",
            Field::MaritalStatus => "maritalStatus",
            Field::Religion => "religion",
            Field::AssemblyTenure => "assemblyTenure",
            Field::Notes => "notes",
            Field::AcademicQualifications => "academicQualifications",
            Field::Schooling => "schooling",
            Field::PartyAffiliation => "partyAffiliation",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Constituency => "Constituency",
            Field::Party => "Party",
            Field::FatherHusbandName => "Father /Husband Name",
            Field::Email => "Email",
            Field::MobilePhone1 => "Mobile 1",
            Field::MobilePhone2 => "Mobile 2",
            Field::MobilePhone3 => "Mobile 3",
            Field::Address => "Permanent Address",
            Field::PlaceOfBirth => "Place of Birth",
            Field::MaritalStatus => "Marital Status",
            Field::Religion => "Religion",
            Field::AssemblyTenure => "Tenure",
            Field::Notes => "Notes",
            Field::AcademicQualifications => "Academic Qualifications",
            Field::Schooling => "Schooling",
            Field::PartyAffiliation => "Party Affiliation",
        }
    }

    /// `X-` property name for fields the card format has no standard tag for,
    /// e.g. `X-FATHER-HUSBAND-NAME`.
    pub fn vendor_tag(self) -> String {
        let mut out = String::from("X-");
        for ch in self.id().chars() {
            if ch.is_ascii_uppercase() {
                out.push('-');
            }
            out.push(ch.to_ascii_uppercase());
        }
        out
    }

    /// Accepts the wire id in any case or its snake_case spelling.
    pub fn from_id(value: &str) -> Option<Field> {
        let key = fold_key(value);
        if key.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|field| fold_key(field.id()) == key)
    }

    /// Resolves a tabular header cell: wire id, snake_case id, or default label.
    pub fn from_header(value: &str) -> Option<Field> {
        Self::from_id(value).or_else(|| {
            let trimmed = value.trim();
            Self::ALL
                .into_iter()
                .find(|field| field.default_label().eq_ignore_ascii_case(trimmed))
        })
    }

    pub fn from_vendor_tag(tag: &str) -> Option<Field> {
        Self::ALL
            .into_iter()
            .find(|field| field.vendor_tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

fn fold_key(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| *ch != '_')
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// A contact in canonical form. Fields the source never supplied read as the
/// empty string; the record still remembers which ones were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<Field, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Field, V)>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (field, value) in pairs {
            record.set(field, value);
        }
        record
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn supplied(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.as_str()))
    }

    pub fn normalize_phones(&mut self) {
        for field in Field::PHONES {
            if let Some(value) = self.values.get_mut(&field) {
                if !value.is_empty() {
                    *value = normalize_phone(value);
                }
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Field::ALL.len()))?;
        for field in Field::ALL {
            map.serialize_entry(field.id(), self.get(field))?;
        }
        map.end()
    }
}
