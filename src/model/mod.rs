mod block;
pub mod blocks;
pub mod common;
mod property_value;

pub use block::Block;
pub use blocks::*;
pub use common::*;
pub use property_value::{PropertyTypeValue, PropertyValue};

use crate::types::{BlockId, DatabaseId, NotionId, PageId, PropertyName};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Notion page: either a record of the gallery database or a page
/// whose body is being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub title: PageTitle,
    pub url: String,
    pub created_time: Option<chrono::DateTime<chrono::Utc>>,
    pub last_edited_time: Option<chrono::DateTime<chrono::Utc>>,
    pub cover: Option<FileObject>,
    pub icon: Option<Icon>,
    pub properties: HashMap<PropertyName, PropertyValue>,
    pub parent: Option<Parent>,
    pub archived: bool,
}

impl Page {
    /// A bare page with no properties, mostly useful for fixtures.
    pub fn new(id: PageId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: PageTitle::new(title),
            url: String::new(),
            created_time: None,
            last_edited_time: None,
            cover: None,
            icon: None,
            properties: HashMap::new(),
            parent: None,
            archived: false,
        }
    }

    pub fn with_property(mut self, name: &str, value: PropertyTypeValue) -> Self {
        self.properties
            .insert(PropertyName::new(name), PropertyValue::new(name, value));
        self
    }

    pub fn title(&self) -> &PageTitle {
        &self.title
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// The containing page, when this page is nested under another page.
    pub fn parent_page_id(&self) -> Option<NotionId> {
        match &self.parent {
            Some(Parent::Page { page_id }) => Some(NotionId::from(page_id)),
            _ => None,
        }
    }
}

/// Parent reference with typed IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: BlockId },
    #[serde(rename = "workspace")]
    Workspace,
}

/// Page title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTitle(String);

impl PageTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for PageTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
