use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Tabular,
    Card,
    Report,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Tabular,
        ExportFormat::Card,
        ExportFormat::Report,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Tabular => "text/csv",
            ExportFormat::Card => "text/vcard",
            ExportFormat::Report => "text/plain",
        }
    }

    pub fn default_filename(self) -> &'static str {
        match self {
            ExportFormat::Tabular => "formatted_contacts.csv",
            ExportFormat::Card => "formatted_contacts.vcf",
            ExportFormat::Report => "formatted_contacts.txt",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Tabular => "csv",
            ExportFormat::Card => "vcf",
            ExportFormat::Report => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" | "tabular" => Ok(ExportFormat::Tabular),
            "vcf" | "vcard" | "card" => Ok(ExportFormat::Card),
            "txt" | "text" | "report" => Ok(ExportFormat::Report),
            _ => Err(CoreError::UnknownFormat(value.to_string())),
        }
    }
}
