//! Notion property value fragments
//!
//! A [`PropertyValue`] is the column-level wire representation of one
//! attribute. The variants cover the column types the shelfsync databases
//! use; each renders the exact JSON fragment the Notion API expects under
//! a property name.

use serde_json::{json, Value};

/// One property value, ready to be rendered under its column name.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// The title column of a database
    Title(String),
    /// Plain rich-text content
    RichText(String),
    /// A select option, created on first use by Notion
    Select(String),
    Number(f64),
    /// An ISO-8601 date (start only)
    Date(String),
    Url(String),
    /// Relation to pages in another database, by page id
    Relation(Vec<String>),
}

impl PropertyValue {
    /// True when the value carries no content and should be omitted from
    /// the page payload entirely.
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Title(s)
            | PropertyValue::RichText(s)
            | PropertyValue::Select(s)
            | PropertyValue::Date(s)
            | PropertyValue::Url(s) => s.is_empty(),
            PropertyValue::Number(_) => false,
            PropertyValue::Relation(ids) => ids.is_empty(),
        }
    }

    /// Render the Notion wire fragment for this value.
    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Title(content) => json!({
                "title": [{"text": {"content": content}}]
            }),
            PropertyValue::RichText(content) => json!({
                "rich_text": [{"type": "text", "text": {"content": content}}]
            }),
            PropertyValue::Select(name) => json!({
                "select": {"name": name}
            }),
            PropertyValue::Number(value) => json!({
                "number": value
            }),
            PropertyValue::Date(start) => json!({
                "date": {"start": start}
            }),
            PropertyValue::Url(url) => json!({
                "url": url
            }),
            PropertyValue::Relation(ids) => json!({
                "relation": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>()
            }),
        }
    }
}

/// An exact-match filter on one column of a database.
///
/// Notion matches title and rich-text columns alike through the
/// `rich_text` condition, which is the only filter shape the sync path
/// needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PageFilter {
    pub column: String,
    pub equals: String,
}

impl PageFilter {
    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            equals: value.into(),
        }
    }

    /// Render the query-endpoint payload.
    pub fn to_json(&self) -> Value {
        json!({
            "filter": {
                "property": self.column,
                "rich_text": {"equals": self.equals}
            }
        })
    }
}
