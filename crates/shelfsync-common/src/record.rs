//! In-flight record types
//!
//! A [`Record`] is the unit handed from an extractor to the sync commands:
//! a named-attribute map describing one entity before it has a backend
//! identity. Embedded people stay inside the record (as the `author` /
//! `translator` attributes) until the commands resolve them to page ids.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Result, ShelfsyncError};

/// Attribute names with meaning to the sync commands.
pub mod attr {
    pub const TITLE: &str = "title";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const AUTHOR: &str = "author";
    pub const TRANSLATOR: &str = "translator";
    pub const SOURCE_ID: &str = "source_id";
}

/// Discriminator selecting which collection a composite record lands in.
///
/// A closed set: an extractor emitting anything else is a configuration
/// fault, surfaced by [`Record::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Podcast,
    Book,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Podcast => "Podcast",
            RecordKind::Book => "Book",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = ShelfsyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Podcast" => Ok(RecordKind::Podcast),
            "Book" => Ok(RecordKind::Book),
            other => Err(ShelfsyncError::UnknownRecordKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person embedded in a record, keyed by `name` for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon_emoji: Option<String>,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// View this person as a standalone record for find-or-create against
    /// the people collection.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.set(attr::NAME, self.name.clone());
        if let Some(ref description) = self.description {
            record.set("description", description.clone());
        }
        if let Some(ref icon_url) = self.icon_url {
            record.set("icon_url", icon_url.clone());
        }
        if let Some(ref icon_emoji) = self.icon_emoji {
            record.set("icon_emoji", icon_emoji.clone());
        }
        record
    }
}

/// One entity in flight: a mapping from attribute name to value.
///
/// Extractors may include attributes no collection schema maps; the
/// persistence gateway drops those silently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute. `Value::Null` unsets it instead, so extractors can
    /// pass optional fields through without branching.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let name = name.into();
        if value.is_null() {
            self.attributes.remove(&name);
        } else {
            self.attributes.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The deduplication key for composite and source records.
    pub fn title(&self) -> Option<&str> {
        self.get_str(attr::TITLE)
    }

    /// Parse the `type` discriminator into the closed kind set.
    pub fn kind(&self) -> Result<RecordKind> {
        let raw = self
            .get_str(attr::TYPE)
            .ok_or_else(|| ShelfsyncError::MalformedAttribute {
                attribute: attr::TYPE.to_string(),
                expected: "a string discriminator",
            })?;
        raw.parse()
    }

    /// Deserialize a list-of-people attribute (`author`, `translator`).
    ///
    /// Returns `Ok(None)` when the attribute is absent, which for
    /// `translator` is an expected state rather than an error.
    pub fn people(&self, name: &str) -> Result<Option<Vec<Person>>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Array(items)) => {
                let people = items
                    .iter()
                    .map(|item| serde_json::from_value(item.clone()))
                    .collect::<std::result::Result<Vec<Person>, _>>()?;
                Ok(Some(people))
            }
            Some(_) => Err(ShelfsyncError::MalformedAttribute {
                attribute: name.to_string(),
                expected: "a list of people",
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn podcast_record() -> Record {
        let mut record = Record::new();
        record.set(attr::TITLE, "Ep1");
        record.set(attr::TYPE, "Podcast");
        record.set(
            attr::AUTHOR,
            json!([{"name": "X"}, {"name": "Y", "icon_emoji": "🎙"}]),
        );
        record.set("duration", 10);
        record
    }

    #[test]
    fn kind_parses_known_discriminators() {
        assert_eq!(podcast_record().kind().unwrap(), RecordKind::Podcast);

        let mut record = Record::new();
        record.set(attr::TYPE, "Book");
        assert_eq!(record.kind().unwrap(), RecordKind::Book);
    }

    #[test]
    fn kind_rejects_unknown_discriminator() {
        let mut record = Record::new();
        record.set(attr::TYPE, "Magazine");
        assert!(matches!(
            record.kind(),
            Err(ShelfsyncError::UnknownRecordKind(kind)) if kind == "Magazine"
        ));
    }

    #[test]
    fn kind_requires_the_type_attribute() {
        assert!(matches!(
            Record::new().kind(),
            Err(ShelfsyncError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn people_preserves_order_and_extras() {
        let people = podcast_record().people(attr::AUTHOR).unwrap().unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "X");
        assert_eq!(people[1].name, "Y");
        assert_eq!(people[1].icon_emoji.as_deref(), Some("🎙"));
    }

    #[test]
    fn people_absent_attribute_is_none() {
        assert!(podcast_record()
            .people(attr::TRANSLATOR)
            .unwrap()
            .is_none());
    }

    #[test]
    fn people_rejects_non_list_values() {
        let mut record = Record::new();
        record.set(attr::AUTHOR, "not a list");
        assert!(matches!(
            record.people(attr::AUTHOR),
            Err(ShelfsyncError::MalformedAttribute { .. })
        ));
    }

    #[test]
    fn set_null_removes_the_attribute() {
        let mut record = Record::new();
        record.set("publisher", "ACME");
        record.set("publisher", Value::Null);
        assert!(!record.contains("publisher"));
    }

    #[test]
    fn person_round_trips_through_a_record() {
        let person = Person {
            name: "X".to_string(),
            description: Some("podcaster".to_string()),
            icon_url: None,
            icon_emoji: Some("🎙".to_string()),
        };
        let record = person.to_record();
        assert_eq!(record.get_str(attr::NAME), Some("X"));
        assert_eq!(record.get_str("description"), Some("podcaster"));
        assert!(!record.contains("icon_url"));
    }
}
