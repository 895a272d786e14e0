// src/catalog.rs
//! Classifies gallery database records into images, files and pages.
//!
//! Every field is read leniently: a missing or oddly typed property falls
//! back to its default instead of failing the record.

use crate::constants::UNTITLED;
use crate::model::{Page, PropertyTypeValue};
use crate::types::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Property holding the record kind (`image`, `file` or `page`).
pub const TYPE_PROPERTY: &str = "type";
/// Files property whose first entry is the record's content.
pub const CONTENT_PROPERTY: &str = "Content";
pub const SUFFIX_PROPERTY: &str = "suffix";

const HIDDEN_PROPERTIES: [&str; 2] = ["hidden", "Hidden"];
const SHOW_BACK_PROPERTIES: [&str; 2] = ["show_back", "Back"];
const TITLE_PROPERTIES: [&str; 2] = ["Name", "title"];

/// The three kinds of gallery records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Image,
    File,
    Page,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Image, RecordKind::File, RecordKind::Page];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Image => "image",
            RecordKind::File => "file",
            RecordKind::Page => "page",
        }
    }

    /// Key of the listing in JSON responses (`images`, `files`, `pages`).
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Image => "images",
            RecordKind::File => "files",
            RecordKind::Page => "pages",
        }
    }

    /// Whether records of this kind are served through their `Content` file.
    pub fn has_content(&self) -> bool {
        matches!(self, RecordKind::Image | RecordKind::File)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(RecordKind::Image),
            "file" => Ok(RecordKind::File),
            "page" => Ok(RecordKind::Page),
            _ => Err(ValidationError::InvalidRecordKind(s.to_string())),
        }
    }
}

/// One entry of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// Preview URL of the record's content, for images and files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    pub show_back: bool,
    pub created_time: Option<DateTime<Utc>>,
    pub last_edited_time: Option<DateTime<Utc>>,
}

/// Summarizes `page` when it is a visible record of `kind`.
///
/// Images and files without any `Content` file are skipped, since there is
/// nothing to serve for them.
pub fn classify_record(page: &Page, kind: RecordKind) -> Option<RecordSummary> {
    if record_kind(page)? != kind || is_hidden(page) {
        return None;
    }

    let url = content_url(page);
    if kind.has_content() && url.is_none() {
        log::debug!("Record {} has no {} file; skipped", page.id, CONTENT_PROPERTY);
        return None;
    }

    Some(RecordSummary {
        id: page.id.to_hyphenated(),
        title: record_title(page),
        kind,
        url,
        suffix: suffix(page),
        show_back: show_back(page),
        created_time: page.created_time,
        last_edited_time: page.last_edited_time,
    })
}

/// Summaries of every visible record of `kind`, in query order.
pub fn classify_records(pages: &[Page], kind: RecordKind) -> Vec<RecordSummary> {
    pages
        .iter()
        .filter_map(|page| classify_record(page, kind))
        .collect()
}

/// The kind named by the record's `type` property, if any.
pub fn record_kind(page: &Page) -> Option<RecordKind> {
    page.property(TYPE_PROPERTY)?
        .as_plain_text()?
        .parse()
        .ok()
}

pub fn is_hidden(page: &Page) -> bool {
    HIDDEN_PROPERTIES
        .iter()
        .filter_map(|name| page.property(name)?.as_checkbox())
        .any(|hidden| hidden)
}

/// Whether the frontend shows a back link for this page. Defaults to true.
pub fn show_back(page: &Page) -> bool {
    SHOW_BACK_PROPERTIES
        .iter()
        .find_map(|name| page.property(name)?.as_checkbox())
        .unwrap_or(true)
}

/// URL of the first `Content` file.
pub fn content_url(page: &Page) -> Option<String> {
    page.property(CONTENT_PROPERTY)?
        .files()
        .iter()
        .map(|file| file.url.as_str())
        .find(|url| !url.is_empty())
        .map(str::to_string)
}

pub fn suffix(page: &Page) -> Option<String> {
    page.property(SUFFIX_PROPERTY)?
        .as_plain_text()
        .map(|suffix| suffix.trim().to_string())
        .filter(|suffix| !suffix.is_empty())
}

/// `Name`, then `title`, then any title-typed property, then `Untitled`.
pub fn record_title(page: &Page) -> String {
    let named = TITLE_PROPERTIES
        .iter()
        .filter_map(|name| page.property(name)?.as_plain_text())
        .find(|title| !title.trim().is_empty());

    named
        .or_else(|| {
            page.properties
                .values()
                .filter(|value| matches!(value.type_specific_value, PropertyTypeValue::Title { .. }))
                .filter_map(|value| value.as_plain_text())
                .find(|title| !title.trim().is_empty())
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}
