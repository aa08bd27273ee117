//! Notion page objects
//!
//! [`NewPage`] is the outbound create-page payload; [`Page`] is the subset
//! of the response the sync path cares about (the page id is the stable
//! identifier every relation refers to).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::property::PropertyValue;

/// Page icon, either an emoji or an external image.
#[derive(Debug, Clone, PartialEq)]
pub enum PageIcon {
    Emoji(String),
    External(String),
}

impl PageIcon {
    fn to_json(&self) -> Value {
        match self {
            PageIcon::Emoji(emoji) => json!({"emoji": emoji}),
            PageIcon::External(url) => json!({"external": {"url": url}}),
        }
    }
}

/// Outbound payload for creating a page in a database.
#[derive(Debug, Clone)]
pub struct NewPage {
    database_id: String,
    properties: Vec<(String, PropertyValue)>,
    icon: Option<PageIcon>,
    cover_url: Option<String>,
}

impl NewPage {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            properties: Vec::new(),
            icon: None,
            cover_url: None,
        }
    }

    /// Add a property; empty values are skipped so optional attributes can
    /// be passed through unconditionally.
    pub fn property(mut self, column: impl Into<String>, value: PropertyValue) -> Self {
        if !value.is_empty() {
            self.properties.push((column.into(), value));
        }
        self
    }

    pub fn icon(mut self, icon: Option<PageIcon>) -> Self {
        self.icon = icon;
        self
    }

    pub fn cover_url(mut self, url: Option<String>) -> Self {
        self.cover_url = url;
        self
    }

    /// Render the create-page body.
    pub fn to_json(&self) -> Value {
        let mut properties = Map::new();
        for (column, value) in &self.properties {
            properties.insert(column.clone(), value.to_json());
        }

        let mut page = json!({
            "parent": {"database_id": self.database_id},
            "properties": properties,
        });

        if let Some(ref icon) = self.icon {
            page["icon"] = icon.to_json();
        }
        if let Some(ref cover_url) = self.cover_url {
            page["cover"] = json!({"external": {"url": cover_url}});
        }

        page
    }

    /// Render just the properties object, for page updates.
    pub fn properties_json(&self) -> Value {
        let mut properties = Map::new();
        for (column, value) in &self.properties {
            properties.insert(column.clone(), value.to_json());
        }
        Value::Object(properties)
    }
}

/// A persisted page as returned by the Notion API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// The stable identifier assigned by Notion
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
