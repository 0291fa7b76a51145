use crate::domain::{Field, Record};
use serde::{Deserialize, Serialize};

/// Title text placed around the name of exported copies only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDecoration {
    pub prefix: String,
    pub suffix: String,
}

impl NameDecoration {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.suffix.is_empty()
    }

    pub fn apply(&self, record: &Record) -> Record {
        let mut copy = record.clone();
        let name = record.get(Field::Name);
        if name.is_empty() || self.is_empty() {
            return copy;
        }

        let mut decorated = name.to_string();
        if !self.prefix.is_empty() {
            decorated = format!("{} {}", self.prefix, decorated);
        }
        if !self.suffix.is_empty() {
            decorated = format!("{} {}", decorated, self.suffix);
        }
        copy.set(Field::Name, decorated);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::NameDecoration;
    use crate::domain::{Field, Record};

    #[test]
    fn decorates_copy_and_keeps_original() {
        let record = Record::from_pairs([(Field::Name, "Ali")]);
        let decorated = NameDecoration::new("MNA", "Sindh").apply(&record);
        assert_eq!(decorated.get(Field::Name), "MNA Ali Sindh");
        assert_eq!(record.get(Field::Name), "Ali");
    }

    #[test]
    fn prefix_or_suffix_alone() {
        let record = Record::from_pairs([(Field::Name, "Sana")]);
        assert_eq!(
            NameDecoration::new("Adv", "").apply(&record).get(Field::Name),
            "Adv Sana"
        );
        assert_eq!(
            NameDecoration::new("", "Punjab").apply(&record).get(Field::Name),
            "Sana Punjab"
        );
    }

    #[test]
    fn empty_name_is_left_alone() {
        let record = Record::from_pairs([(Field::Name, ""), (Field::Email, "a@b.com")]);
        let decorated = NameDecoration::new("MNA", "Sindh").apply(&record);
        assert_eq!(decorated.get(Field::Name), "");
        assert!(!NameDecoration::new("MNA", "Sindh")
            .apply(&Record::new())
            .has(Field::Name));
    }
}
