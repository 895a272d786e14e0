// src/formatting/records.rs
//! JSON shapes produced for page payloads.

use crate::model::{FileObject, Icon, Page};
use crate::types::{Color, NotionId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One flattened block. Only the fields relevant to the block's type are
/// present in the serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct BlockRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    /// Formatted markup of the block's main text (empty when it has none).
    pub text: String,
    pub has_children: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_column_header: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_row_header: Option<bool>,
    /// Table row cells as formatted markup, in column order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cells: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<BlockRecord>>,
    /// Columns of a column list, each carrying its own `children`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<BlockRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<BlockRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_content: Option<Box<BlockRecord>>,
}

impl BlockRecord {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            ..Default::default()
        }
    }
}

/// Header of a page payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageHeader {
    pub id: String,
    pub title: String,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub show_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl PageHeader {
    pub fn from_page(page: &Page, show_back: bool) -> Self {
        Self {
            id: page.id.to_hyphenated(),
            title: page.title().to_string(),
            created_time: page.created_time,
            last_edited_time: page.last_edited_time,
            parent_id: page.parent_page_id().map(|id| id.to_hyphenated()),
            show_back,
            cover: page.cover.as_ref().map(|cover| FileObject::url(cover).to_string()),
        }
    }
}

/// Everything `/page/{id}` returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagePayload {
    pub page: PageHeader,
    pub blocks: Vec<BlockRecord>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub complete: bool,
    pub timed_out: bool,
}

/// Hyphenated form of an id, for JSON output.
pub fn display_id(id: impl Into<NotionId>) -> String {
    id.into().to_hyphenated()
}
