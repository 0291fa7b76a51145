use crate::domain::{Field, Record};
use crate::error::CoreError;
use serde::Serialize;
use std::str::FromStr;

/// Column order used when a fresh schema is derived.
pub const PREFERRED_ORDER: [Field; 17] = [
    Field::Name,
    Field::AssemblyTenure,
    Field::Constituency,
    Field::FatherHusbandName,
    Field::Party,
    Field::PlaceOfBirth,
    Field::MaritalStatus,
    Field::Religion,
    Field::Address,
    Field::MobilePhone1,
    Field::MobilePhone2,
    Field::MobilePhone3,
    Field::Email,
    Field::AcademicQualifications,
    Field::Schooling,
    Field::PartyAffiliation,
    Field::Notes,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub id: Field,
    pub label: String,
    pub visible: bool,
}

impl ColumnSpec {
    pub fn new(id: Field) -> Self {
        Self {
            id,
            label: id.default_label().to_string(),
            visible: true,
        }
    }
}

/// Ordered, operator-editable projection of the canonical fields. Order is
/// the tabular/report column order; hidden columns keep their position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<ColumnSpec>,
}

impl ColumnSchema {
    /// Builds the initial schema from the fields the first record supplied.
    pub fn derive_initial(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Self::default();
        };
        let columns = PREFERRED_ORDER
            .into_iter()
            .filter(|field| first.has(*field))
            .map(ColumnSpec::new)
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn visible(&self) -> Vec<&ColumnSpec> {
        self.columns.iter().filter(|column| column.visible).collect()
    }

    pub fn ids(&self) -> Vec<Field> {
        self.columns.iter().map(|column| column.id).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, id: Field) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn set_visible(&mut self, id: Field, visible: bool) -> Result<(), CoreError> {
        self.find_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_label(&mut self, id: Field, label: impl Into<String>) -> Result<(), CoreError> {
        self.find_mut(id)?.label = label.into();
        Ok(())
    }

    /// Moves a column to `index`, clamped to the last position.
    pub fn move_to(&mut self, id: Field, index: usize) -> Result<(), CoreError> {
        let from = self.position(id)?;
        let column = self.columns.remove(from);
        let index = index.min(self.columns.len());
        self.columns.insert(index, column);
        Ok(())
    }

    pub fn apply(&mut self, edit: &ColumnEdit) -> Result<(), CoreError> {
        match edit {
            ColumnEdit::Show(id) => self.set_visible(*id, true),
            ColumnEdit::Hide(id) => self.set_visible(*id, false),
            ColumnEdit::Label(id, label) => self.set_label(*id, label.clone()),
            ColumnEdit::Move(id, index) => self.move_to(*id, *index),
        }
    }

    /// Applies every edit or none of them.
    pub fn apply_all(&mut self, edits: &[ColumnEdit]) -> Result<(), CoreError> {
        let mut staged = self.clone();
        for edit in edits {
            staged.apply(edit)?;
        }
        *self = staged;
        Ok(())
    }

    fn position(&self, id: Field) -> Result<usize, CoreError> {
        self.columns
            .iter()
            .position(|column| column.id == id)
            .ok_or_else(|| CoreError::UnknownColumn(id.to_string()))
    }

    fn find_mut(&mut self, id: Field) -> Result<&mut ColumnSpec, CoreError> {
        let idx = self.position(id)?;
        Ok(&mut self.columns[idx])
    }
}

/// Operator edit to a column schema. Parses from `show=<id>`, `hide=<id>`,
/// `label=<id>:<text>` and `move=<id>:<index>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEdit {
    Show(Field),
    Hide(Field),
    Label(Field, String),
    Move(Field, usize),
}

impl FromStr for ColumnEdit {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidColumnEdit(value.to_string());
        let (action, rest) = value.split_once('=').ok_or_else(invalid)?;
        let field = |raw: &str| {
            Field::from_header(raw).ok_or_else(|| CoreError::UnknownColumn(raw.trim().to_string()))
        };

        match action.trim().to_ascii_lowercase().as_str() {
            "show" => Ok(ColumnEdit::Show(field(rest)?)),
            "hide" => Ok(ColumnEdit::Hide(field(rest)?)),
            "label" => {
                let (id, label) = rest.split_once(':').ok_or_else(invalid)?;
                Ok(ColumnEdit::Label(field(id)?, label.to_string()))
            }
            "move" => {
                let (id, index) = rest.rsplit_once(':').ok_or_else(invalid)?;
                let index = index.trim().parse::<usize>().map_err(|_| invalid())?;
                Ok(ColumnEdit::Move(field(id)?, index))
            }
            _ => Err(invalid()),
        }
    }
}
