// src/formatting/rich_text/annotations.rs
//! Annotation processing for rich text.
//!
//! Styles are applied innermost first in one fixed order:
//! code, strikethrough, bold, italic, underline, then the color span,
//! then the link. Callers never choose the order.

use super::types::TextStyle;
use crate::types::Annotations;

/// Converts model annotations to text style.
pub fn annotations_to_style(annotations: &Annotations) -> TextStyle {
    TextStyle {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
        color: annotations.color,
        link: None, // Links are handled separately
    }
}

/// Renderer for text styles to HTML.
pub struct HtmlStyleRenderer;

impl HtmlStyleRenderer {
    /// Wraps already-escaped markup in the tags `style` calls for.
    pub fn apply_styles(escaped: &str, style: &TextStyle) -> String {
        let mut result = escaped.to_string();

        if style.code {
            result = format!("<code>{}</code>", result);
        }

        if style.strikethrough {
            result = format!("<s>{}</s>", result);
        }

        if style.bold {
            result = format!("<strong>{}</strong>", result);
        }

        if style.italic {
            result = format!("<em>{}</em>", result);
        }

        if style.underline {
            result = format!("<u>{}</u>", result);
        }

        if !style.color.is_default() {
            result = format!("<span class=\"{}\">{}</span>", style.color.css_class(), result);
        }

        if let Some(url) = &style.link {
            result = format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                html_escape(url),
                result
            );
        }

        result
    }
}

/// Basic HTML escaping.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_styles_nest_in_fixed_order() {
        let style = TextStyle {
            bold: true,
            italic: true,
            strikethrough: true,
            underline: true,
            code: true,
            color: Color::Blue,
            link: Some("https://example.com".to_string()),
        };

        assert_eq!(
            HtmlStyleRenderer::apply_styles("x", &style),
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">\
             <span class=\"notion-blue\"><u><em><strong><s><code>x</code></s></strong></em></u></span></a>"
        );
    }

    #[test]
    fn test_background_color_class() {
        let style = TextStyle {
            color: Color::YellowBackground,
            ..Default::default()
        };
        assert_eq!(
            HtmlStyleRenderer::apply_styles("hi", &style),
            "<span class=\"notion-yellow_background\">hi</span>"
        );
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
