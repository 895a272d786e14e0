// src/formatting/rich_text/types.rs
//! Type definitions for rich text representation.
//!
//! Spans are first turned into `TextSegment`s (what to show, how to style
//! it) and only then rendered, so structure stays separate from markup.

use crate::types::{Color, NotionId};

/// Represents a formatted text segment with styling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormattedText {
    pub segments: Vec<TextSegment>,
}

impl FormattedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment to the formatted text.
    pub fn with_segment(mut self, segment: TextSegment) -> Self {
        self.segments.push(segment);
        self
    }
}

/// Represents a single segment of text with consistent formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    pub content: TextContent,
    pub style: TextStyle,
}

impl TextSegment {
    pub fn is_empty(&self) -> bool {
        match &self.content {
            TextContent::Plain(s) => s.is_empty(),
            TextContent::Equation(expression) => expression.is_empty(),
            TextContent::Mention(m) => m.is_empty(),
        }
    }
}

/// Content types for text segments.
#[derive(Debug, Clone, PartialEq)]
pub enum TextContent {
    Plain(String),
    Equation(String),
    Mention(MentionContent),
}

/// Mention content types.
#[derive(Debug, Clone, PartialEq)]
pub enum MentionContent {
    /// A page in the same workspace, rendered as a link into this service.
    Page { id: NotionId, text: String },
    /// An external link preview or unrecognised mention with a URL.
    Link { url: String, text: String },
    /// Users, dates and databases: the display text only.
    Text(String),
}

impl MentionContent {
    pub fn is_empty(&self) -> bool {
        match self {
            MentionContent::Page { text, .. }
            | MentionContent::Link { text, .. }
            | MentionContent::Text(text) => text.is_empty(),
        }
    }
}

/// Text styling options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: Color,
    pub link: Option<String>,
}

impl TextStyle {
    /// Checks if any styling is applied.
    pub fn has_styling(&self) -> bool {
        self.bold
            || self.italic
            || self.strikethrough
            || self.underline
            || self.code
            || !self.color.is_default()
            || self.link.is_some()
    }
}

/// Whether a link target may be emitted into an `href`.
///
/// Web and mail links plus same-site paths and fragments are allowed;
/// anything else (e.g. `javascript:`) is rendered as plain text.
pub fn is_renderable_link(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    if url.starts_with('/') || url.starts_with('#') {
        return true;
    }
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:")
}
