// src/formatting/rich_text/mod.rs
//! Handles formatting of Notion RichTextItem arrays into HTML markup.
//!
//! Every span is converted into a `TextSegment` first and then rendered,
//! so the same input always produces the same bytes.

mod annotations;
mod types;

pub use annotations::html_escape;
pub use types::{is_renderable_link, FormattedText, MentionContent, TextContent, TextSegment, TextStyle};

use crate::types::{EquationData, MentionData, MentionType, RichTextItem, RichTextType};
use annotations::{annotations_to_style, HtmlStyleRenderer};

// --- Main Formatting Functions ---

/// Formats an array of RichTextItems into HTML. Empty input yields `""`.
pub fn rich_text_to_html(items: &[RichTextItem]) -> String {
    render_to_html(&format_rich_text_items(items))
}

/// Concatenated plain text of the spans, without markup.
pub fn rich_text_to_plain(items: &[RichTextItem]) -> String {
    items.iter().map(|item| item.plain_text.as_str()).collect()
}

/// Formats rich text items into a structured representation.
pub fn format_rich_text_items(items: &[RichTextItem]) -> FormattedText {
    items
        .iter()
        .map(format_single_item)
        .filter(|segment| !segment.is_empty())
        .fold(FormattedText::new(), FormattedText::with_segment)
}

/// Formats a single rich text item.
fn format_single_item(item: &RichTextItem) -> TextSegment {
    let mut style = annotations_to_style(&item.annotations);

    let content = match &item.text_type {
        RichTextType::Equation(EquationData { expression }) => {
            TextContent::Equation(expression.clone())
        }
        RichTextType::Mention(mention) => TextContent::Mention(mention_content(mention, item)),
        RichTextType::Text { content, .. } => {
            style.link = item
                .link_target()
                .filter(|url| is_renderable_link(url))
                .map(str::to_string);
            TextContent::Plain(content.clone())
        }
    };

    TextSegment { content, style }
}

fn mention_content(mention: &MentionData, item: &RichTextItem) -> MentionContent {
    let text = item.plain_text.clone();
    match &mention.mention_type {
        MentionType::Page { id } => MentionContent::Page {
            id: id.clone(),
            text,
        },
        MentionType::LinkPreview { url } | MentionType::LinkMention { url }
            if is_renderable_link(url) =>
        {
            MentionContent::Link {
                url: url.clone(),
                text: if text.is_empty() { url.clone() } else { text },
            }
        }
        MentionType::User { name } if text.is_empty() => {
            MentionContent::Text(name.as_deref().map(|n| format!("@{}", n)).unwrap_or_default())
        }
        MentionType::Date { start, end } if text.is_empty() => MentionContent::Text(match end {
            Some(end) => format!("{} → {}", start, end),
            None => start.clone(),
        }),
        _ => MentionContent::Text(text),
    }
}

/// Renders formatted text to HTML.
pub fn render_to_html(formatted: &FormattedText) -> String {
    formatted.segments.iter().map(render_segment_html).collect()
}

fn render_segment_html(segment: &TextSegment) -> String {
    match &segment.content {
        TextContent::Plain(text) => HtmlStyleRenderer::apply_styles(&html_escape(text), &segment.style),
        // Equations ignore styling
        TextContent::Equation(expression) => format!(
            "<span class=\"notion-equation\">{}</span>",
            html_escape(expression)
        ),
        TextContent::Mention(mention) => {
            let mut style = segment.style.clone();
            let text = match mention {
                MentionContent::Page { id, text } => {
                    style.link = Some(format!("/page/{}", id.to_hyphenated()));
                    text
                }
                MentionContent::Link { url, text } => {
                    style.link = Some(url.clone());
                    text
                }
                MentionContent::Text(text) => {
                    style.link = None;
                    text
                }
            };
            HtmlStyleRenderer::apply_styles(&html_escape(text), &style)
        }
    }
}
