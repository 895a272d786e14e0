use super::NotionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of rich text content.
///
/// Each variant carries its specific data: a mention always has mention
/// data and an equation always has an expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RichTextType {
    Text { content: String, link: Option<Link> },
    Mention(MentionData),
    Equation(EquationData),
}

/// One span of text with a uniform set of annotations.
///
/// `plain_text` is the fallback rendering for every variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextItem {
    pub text_type: RichTextType,
    pub annotations: Annotations,
    pub plain_text: String,
    pub href: Option<String>,
}

impl RichTextItem {
    /// A plain, unannotated text span.
    pub fn plain_text(text: &str) -> Self {
        Self {
            text_type: RichTextType::Text {
                content: text.to_string(),
                link: None,
            },
            annotations: Annotations::default(),
            plain_text: text.to_string(),
            href: None,
        }
    }

    /// The same span with different annotations.
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// The same span linked to `url`.
    pub fn with_link(mut self, url: &str) -> Self {
        if let RichTextType::Text { link, .. } = &mut self.text_type {
            *link = Some(Link {
                url: url.to_string(),
            });
        }
        self.href = Some(url.to_string());
        self
    }

    /// The link target: the span-level `href`, else the text link.
    pub fn link_target(&self) -> Option<&str> {
        if let Some(href) = self.href.as_deref() {
            return Some(href);
        }
        match &self.text_type {
            RichTextType::Text {
                link: Some(Link { url }),
                ..
            } => Some(url.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Annotations {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub underline: bool,
    pub code: bool,
    pub color: crate::types::Color,
}

impl Annotations {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }
}

/// Mention data with type information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MentionData {
    pub mention_type: MentionType,
}

/// Different types of mentions in rich text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MentionType {
    User { name: Option<String> },
    Page { id: NotionId },
    Database { id: NotionId },
    Date { start: String, end: Option<String> },
    LinkPreview { url: String },
    LinkMention { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquationData {
    pub expression: String,
}

/// Select option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    pub color: crate::types::Color,
}

/// Date value with optional end date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: chrono::NaiveDate,
    pub end: Option<chrono::NaiveDate>,
}

/// File attached to a `files` property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub name: String,
    pub url: String,
    pub expiry_time: Option<chrono::DateTime<chrono::Utc>>,
}

impl File {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            expiry_time: None,
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}
