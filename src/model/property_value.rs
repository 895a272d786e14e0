use crate::types::*;
use serde::{Deserialize, Serialize};

/// Property value, wrapping a typed value with its property ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub id: PropertyName,
    #[serde(flatten)]
    pub type_specific_value: PropertyTypeValue,
}

impl PropertyValue {
    pub fn new(name: &str, value: PropertyTypeValue) -> Self {
        Self {
            id: PropertyName::new(name),
            type_specific_value: value,
        }
    }

    /// Returns the Notion API type name for this property value.
    pub fn type_name(&self) -> &str {
        match &self.type_specific_value {
            PropertyTypeValue::Title { .. } => "title",
            PropertyTypeValue::RichText { .. } => "rich_text",
            PropertyTypeValue::Number { .. } => "number",
            PropertyTypeValue::Select { .. } => "select",
            PropertyTypeValue::MultiSelect { .. } => "multi_select",
            PropertyTypeValue::Status { .. } => "status",
            PropertyTypeValue::Date { .. } => "date",
            PropertyTypeValue::Files { .. } => "files",
            PropertyTypeValue::Checkbox { .. } => "checkbox",
            PropertyTypeValue::Url { .. } => "url",
            PropertyTypeValue::CreatedTime { .. } => "created_time",
            PropertyTypeValue::LastEditedTime { .. } => "last_edited_time",
            PropertyTypeValue::Unsupported { type_name } => type_name,
        }
    }

    /// Text projection for text-like properties (title, rich text,
    /// select, status, url). `None` for everything else.
    pub fn as_plain_text(&self) -> Option<String> {
        match &self.type_specific_value {
            PropertyTypeValue::Title { title: spans }
            | PropertyTypeValue::RichText { rich_text: spans } => Some(
                spans
                    .iter()
                    .map(|item| item.plain_text.as_str())
                    .collect::<String>(),
            ),
            PropertyTypeValue::Select { select } | PropertyTypeValue::Status { status: select } => {
                select.as_ref().map(|option| option.name.clone())
            }
            PropertyTypeValue::Url { url } => url.clone(),
            _ => None,
        }
    }

    pub fn as_checkbox(&self) -> Option<bool> {
        match &self.type_specific_value {
            PropertyTypeValue::Checkbox { checkbox } => Some(*checkbox),
            _ => None,
        }
    }

    pub fn files(&self) -> &[File] {
        match &self.type_specific_value {
            PropertyTypeValue::Files { files } => files,
            _ => &[],
        }
    }
}

/// The property value types this service reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyTypeValue {
    Title {
        title: Vec<RichTextItem>,
    },
    RichText {
        rich_text: Vec<RichTextItem>,
    },
    Number {
        number: Option<f64>,
    },
    Select {
        select: Option<SelectOption>,
    },
    MultiSelect {
        multi_select: Vec<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    Date {
        date: Option<DateValue>,
    },
    Files {
        files: Vec<File>,
    },
    Checkbox {
        checkbox: bool,
    },
    Url {
        url: Option<String>,
    },
    CreatedTime {
        created_time: chrono::DateTime<chrono::Utc>,
    },
    LastEditedTime {
        last_edited_time: chrono::DateTime<chrono::Utc>,
    },
    /// Property kinds with no bearing on listings (people, relations,
    /// formulas, rollups, ...). Only the type name is kept.
    Unsupported {
        type_name: String,
    },
}
