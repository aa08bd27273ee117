//! Column schemas for the shelfsync collections
//!
//! Each schema lists the attributes one collection persists and the Notion
//! column each maps to. Anything not listed is dropped by the gateway.

use serde_json::Value;

use super::Schema;
use crate::notion::PropertyValue;

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// A list of page ids, as produced by reference resolution.
fn ids(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|id| id.as_str().map(str::to_string))
        .collect()
}

/// The people collection, deduplicated by name.
#[derive(Debug, Clone, Copy)]
pub struct PersonSchema;

impl Schema for PersonSchema {
    const NATURAL_KEY: &'static str = "name";
    const NATURAL_KEY_COLUMN: &'static str = "Name";

    fn property(name: &str, value: &Value) -> Option<(&'static str, PropertyValue)> {
        match name {
            "name" => Some(("Name", PropertyValue::Title(text(value)?))),
            "description" => Some(("Description", PropertyValue::RichText(text(value)?))),
            "original_name" => Some(("Original Name", PropertyValue::RichText(text(value)?))),
            "country_id" => Some(("Country", PropertyValue::Relation(vec![text(value)?]))),
            _ => None,
        }
    }
}

/// The sources collection: the facet shared by every composite kind.
#[derive(Debug, Clone, Copy)]
pub struct SourceSchema;

impl Schema for SourceSchema {
    const NATURAL_KEY: &'static str = "title";
    const NATURAL_KEY_COLUMN: &'static str = "Title";

    fn property(name: &str, value: &Value) -> Option<(&'static str, PropertyValue)> {
        match name {
            "title" => Some(("Title", PropertyValue::Title(text(value)?))),
            "type" => Some(("Type", PropertyValue::Select(text(value)?))),
            "description" => Some(("Description", PropertyValue::RichText(text(value)?))),
            "language" => Some(("Language", PropertyValue::Select(text(value)?))),
            "published" => Some(("Published", PropertyValue::Date(text(value)?))),
            _ => None,
        }
    }
}

/// The podcast episodes collection.
#[derive(Debug, Clone, Copy)]
pub struct PodcastSchema;

impl Schema for PodcastSchema {
    const NATURAL_KEY: &'static str = "title";
    const NATURAL_KEY_COLUMN: &'static str = "Title";

    fn property(name: &str, value: &Value) -> Option<(&'static str, PropertyValue)> {
        match name {
            "title" => Some(("Title", PropertyValue::Title(text(value)?))),
            "author" => Some(("Author", PropertyValue::Relation(ids(value)?))),
            "duration" => Some(("Duration", PropertyValue::Number(number(value)?))),
            "series" => Some(("Series", PropertyValue::Select(text(value)?))),
            "source_id" => Some(("Source", PropertyValue::Relation(vec![text(value)?]))),
            _ => None,
        }
    }
}

/// The books collection.
#[derive(Debug, Clone, Copy)]
pub struct BookSchema;

impl Schema for BookSchema {
    const NATURAL_KEY: &'static str = "title";
    const NATURAL_KEY_COLUMN: &'static str = "Title";

    fn property(name: &str, value: &Value) -> Option<(&'static str, PropertyValue)> {
        match name {
            "title" => Some(("Title", PropertyValue::Title(text(value)?))),
            "original_title" => Some(("Original Title", PropertyValue::RichText(text(value)?))),
            "author" => Some(("Author", PropertyValue::Relation(ids(value)?))),
            "translator" => Some(("Translator", PropertyValue::Relation(ids(value)?))),
            "pages" => Some(("Pages", PropertyValue::Number(number(value)?))),
            "publisher" => Some(("Publisher", PropertyValue::Select(text(value)?))),
            "isbn" => Some(("ISBN", PropertyValue::RichText(text(value)?))),
            "douban_url" => Some(("Douban", PropertyValue::Url(text(value)?))),
            "source_id" => Some(("Source", PropertyValue::Relation(vec![text(value)?]))),
            _ => None,
        }
    }
}
