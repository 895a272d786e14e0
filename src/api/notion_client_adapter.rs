// src/api/notion_client_adapter.rs
//! Adapter layer for converting notion-client types to our domain model.

use crate::constants::UNTITLED;
use crate::error::{AppError, NotionClientError};
use crate::model::blocks::*;
use crate::model::common::BlockCommon;
use crate::model::{Block, PageTitle, PropertyTypeValue, PropertyValue};
use crate::types::{
    Annotations, BlockId, Color, EquationData, Link, MentionData, MentionType, NotionId, PageId,
    PropertyName, RichTextItem, RichTextType,
};
use notion_client::objects::page::PageProperty;
use std::collections::HashMap;

/// Convert notion-client Block to our domain Block
pub fn convert_block(
    notion_block: notion_client::objects::block::Block,
) -> Result<Block, AppError> {
    let common = convert_block_common(&notion_block)?;

    use notion_client::objects::block::BlockType;

    match notion_block.block_type {
        BlockType::Paragraph { paragraph } => Ok(Block::Paragraph(ParagraphBlock {
            common,
            content: convert_text_block_content(paragraph.rich_text, paragraph.color)?,
        })),

        BlockType::Heading1 { heading_1 } => Ok(Block::Heading1(Heading1Block {
            common,
            content: convert_text_block_content(heading_1.rich_text, heading_1.color)?,
        })),

        BlockType::Heading2 { heading_2 } => Ok(Block::Heading2(Heading2Block {
            common,
            content: convert_text_block_content(heading_2.rich_text, heading_2.color)?,
        })),

        BlockType::Heading3 { heading_3 } => Ok(Block::Heading3(Heading3Block {
            common,
            content: convert_text_block_content(heading_3.rich_text, heading_3.color)?,
        })),

        BlockType::ChildDatabase { child_database } => {
            Ok(Block::ChildDatabase(ChildDatabaseBlock {
                common,
                title: child_database.title,
            }))
        }

        BlockType::BulletedListItem { bulleted_list_item } => {
            Ok(Block::BulletedListItem(BulletedListItemBlock {
                common,
                content: convert_text_block_content(
                    bulleted_list_item.rich_text,
                    Some(bulleted_list_item.color),
                )?,
            }))
        }

        BlockType::NumberedListItem { numbered_list_item } => {
            Ok(Block::NumberedListItem(NumberedListItemBlock {
                common,
                content: convert_text_block_content(
                    numbered_list_item.rich_text,
                    Some(numbered_list_item.color),
                )?,
            }))
        }

        BlockType::ToDo { to_do } => Ok(Block::ToDo(ToDoBlock {
            common,
            content: convert_text_block_content(to_do.rich_text, to_do.color)?,
            checked: to_do.checked.unwrap_or(false),
        })),

        BlockType::Toggle { toggle } => Ok(Block::Toggle(ToggleBlock {
            common,
            content: convert_text_block_content(toggle.rich_text, Some(toggle.color))?,
        })),

        BlockType::Quote { quote } => Ok(Block::Quote(QuoteBlock {
            common,
            content: convert_text_block_content(quote.rich_text, Some(quote.color))?,
        })),

        // The language tag is replaced with the raw API string by the parser.
        BlockType::Code { code } => Ok(Block::Code(CodeBlock {
            common,
            content: convert_text_block_content(code.rich_text, Default::default())?,
            language: format!("{:?}", code.language).to_lowercase(),
            caption: convert_rich_text_array(code.caption)?,
        })),

        BlockType::Divider { .. } => Ok(Block::Divider(DividerBlock { common })),

        BlockType::Breadcrumb { .. } => Ok(Block::Breadcrumb(BreadcrumbBlock { common })),

        BlockType::TableOfContents { .. } => {
            Ok(Block::TableOfContents(TableOfContentsBlock { common }))
        }

        BlockType::Bookmark { bookmark } => Ok(Block::Bookmark(BookmarkBlock {
            common,
            url: bookmark.url,
            caption: convert_rich_text_array(bookmark.caption)?,
        })),

        BlockType::Embed { embed } => Ok(Block::Embed(EmbedBlock {
            common,
            url: embed.url,
        })),

        BlockType::Equation { equation } => Ok(Block::Equation(EquationBlock {
            common,
            expression: equation.expression,
        })),

        BlockType::ChildPage { child_page } => Ok(Block::ChildPage(ChildPageBlock {
            common,
            title: child_page.title,
        })),

        // Image and video captions are not modelled by notion-client; the
        // parser fills them in from the raw payload.
        BlockType::Image { image } => Ok(Block::Image(ImageBlock {
            common,
            image: convert_file_object(image.file_type),
            caption: Vec::new(),
        })),

        BlockType::Video { video } => Ok(Block::Video(VideoBlock {
            common,
            video: convert_file_object(video.file_type),
            caption: Vec::new(),
        })),

        BlockType::File { file } => Ok(Block::File(FileBlock {
            common,
            file: convert_file_object(file.file_type),
            name: None,
            caption: convert_rich_text_array(file.caption)?,
        })),

        BlockType::Pdf { pdf } => Ok(Block::Pdf(PdfBlock {
            common,
            pdf: convert_file_object(pdf.file_type),
            caption: convert_rich_text_array(pdf.caption)?,
        })),

        BlockType::Callout { callout } => Ok(Block::Callout(CalloutBlock {
            common,
            icon: callout.icon.map(convert_icon),
            content: convert_text_block_content(callout.rich_text, Some(callout.color))?,
        })),

        BlockType::Table { table } => Ok(Block::Table(TableBlock {
            common,
            table_width: table.table_width as usize,
            has_column_header: table.has_column_header,
            has_row_header: table.has_row_header,
        })),

        BlockType::TableRow { table_row } => Ok(Block::TableRow(TableRowBlock {
            common,
            cells: table_row
                .cells
                .into_iter()
                .map(convert_rich_text_array)
                .collect::<Result<Vec<_>, _>>()?,
        })),

        BlockType::ColumnList { .. } => Ok(Block::ColumnList(ColumnListBlock { common })),

        BlockType::Column { .. } => Ok(Block::Column(ColumnBlock { common })),

        BlockType::LinkToPage { link_to_page } => {
            let page_id = match link_to_page {
                notion_client::objects::parent::Parent::PageId { page_id } => {
                    PageId::parse(&page_id)?
                }
                _ => {
                    return Err(NotionClientError::ConversionError {
                        message: "LinkToPage block must have PageId parent".to_string(),
                    }
                    .into())
                }
            };
            Ok(Block::LinkToPage(LinkToPageBlock { common, page_id }))
        }

        BlockType::SyncedBlock { synced_block } => {
            let synced_from = match synced_block.synced_from {
                Some(notion_client::objects::block::SyncedFrom::BlockId { block_id }) => {
                    Some(SyncedFrom {
                        block_id: BlockId::parse(&block_id)?,
                    })
                }
                None => None,
            };
            Ok(Block::Synced(SyncedBlock {
                common,
                synced_from,
            }))
        }

        BlockType::Template { template } => Ok(Block::Template(TemplateBlock {
            common,
            content: convert_text_block_content(template.rich_text, None)?,
        })),

        BlockType::LinkPreview { link_preview } => Ok(Block::LinkPreview(LinkPreviewBlock {
            common,
            url: link_preview.url,
        })),

        // The parser replaces the tag and salvages text from the raw payload.
        _ => Ok(Block::Unsupported(UnsupportedBlock {
            common,
            block_type: "unsupported".to_string(),
            text: String::new(),
        })),
    }
}

/// Convert block common fields
fn convert_block_common(
    notion_block: &notion_client::objects::block::Block,
) -> Result<BlockCommon, AppError> {
    let id = BlockId::parse(&notion_block.id.clone().ok_or_else(|| {
        NotionClientError::ConversionError {
            message: "Block missing required ID field".to_string(),
        }
    })?)?;

    Ok(BlockCommon {
        id,
        has_children: notion_block.has_children.unwrap_or(false),
        archived: notion_block.archived.unwrap_or(false),
    })
}

/// Convert text block content (rich text + color)
fn convert_text_block_content(
    rich_text: Vec<notion_client::objects::rich_text::RichText>,
    color: Option<notion_client::objects::block::TextColor>,
) -> Result<TextBlockContent, AppError> {
    Ok(TextBlockContent {
        rich_text: convert_rich_text_array(rich_text)?,
        color: convert_block_color(
            color.unwrap_or(notion_client::objects::block::TextColor::Default),
        ),
    })
}

/// Convert array of rich text items
pub fn convert_rich_text_array(
    rich_texts: Vec<notion_client::objects::rich_text::RichText>,
) -> Result<Vec<RichTextItem>, AppError> {
    rich_texts.into_iter().map(convert_rich_text).collect()
}

/// Convert single rich text item
fn convert_rich_text(
    rich_text: notion_client::objects::rich_text::RichText,
) -> Result<RichTextItem, AppError> {
    use notion_client::objects::rich_text::RichText as NcRichText;

    match rich_text {
        NcRichText::Text {
            text,
            annotations,
            plain_text,
            href,
        } => Ok(RichTextItem {
            text_type: RichTextType::Text {
                content: text.content,
                link: text.link.map(|link| Link { url: link.url }),
            },
            annotations: convert_annotations(annotations.unwrap_or_default()),
            plain_text: plain_text.unwrap_or_default(),
            href,
        }),

        NcRichText::Mention {
            mention,
            annotations,
            plain_text,
            href,
        } => {
            let mention_type = convert_mention(mention).unwrap_or_else(|| {
                MentionType::LinkMention {
                    url: href.clone().unwrap_or_default(),
                }
            });

            Ok(RichTextItem {
                text_type: RichTextType::Mention(MentionData { mention_type }),
                annotations: convert_annotations(annotations),
                plain_text,
                href,
            })
        }

        NcRichText::Equation {
            equation,
            annotations,
            plain_text,
            href,
        } => Ok(RichTextItem {
            text_type: RichTextType::Equation(EquationData {
                expression: equation.expression,
            }),
            annotations: convert_annotations(annotations),
            plain_text,
            href,
        }),

        _ => Ok(RichTextItem::plain_text("")),
    }
}

fn convert_annotations(annotations: notion_client::objects::rich_text::Annotations) -> Annotations {
    Annotations {
        bold: annotations.bold,
        italic: annotations.italic,
        strikethrough: annotations.strikethrough,
        underline: annotations.underline,
        code: annotations.code,
        color: convert_rich_text_color(annotations.color),
    }
}

/// Convert a mention. `None` for mention kinds we don't model, or whose
/// target id is malformed; the caller falls back to the span's href.
fn convert_mention(mention: notion_client::objects::rich_text::Mention) -> Option<MentionType> {
    use notion_client::objects::rich_text::Mention as NcMention;

    match mention {
        NcMention::User { user } => Some(MentionType::User { name: user.name }),
        NcMention::Page { page } => NotionId::parse(&page.id)
            .ok()
            .map(|id| MentionType::Page { id }),
        NcMention::Database { database } => NotionId::parse(&database.id)
            .ok()
            .map(|id| MentionType::Database { id }),
        NcMention::Date { date } => Some(MentionType::Date {
            start: date.start.naive_utc().date().to_string(),
            end: date.end.map(|end| end.naive_utc().date().to_string()),
        }),
        NcMention::LinkPreview { link_preview } => Some(MentionType::LinkPreview {
            url: link_preview.url,
        }),
        _ => {
            log::debug!("Unsupported mention type encountered, falling back to href");
            None
        }
    }
}

/// Convert file object from notion-client to our domain type
fn convert_file_object(file: notion_client::objects::file::File) -> FileObject {
    use notion_client::objects::file::File as NcFile;

    match file {
        NcFile::External { external } => FileObject::External {
            external: ExternalFile { url: external.url },
        },
        NcFile::File { file } => FileObject::File {
            file: NotionFile {
                url: file.url,
                expiry_time: Some(file.expiry_time),
            },
        },
    }
}

fn convert_icon(icon: notion_client::objects::block::Icon) -> Icon {
    use notion_client::objects::block::Icon as NcIcon;

    match icon {
        NcIcon::Emoji(notion_client::objects::emoji::Emoji::Emoji { emoji }) => {
            Icon::Emoji { emoji }
        }
        NcIcon::File(file) => match convert_file_object(file) {
            FileObject::File { file } => Icon::File { file },
            FileObject::External { external } => Icon::External { external },
        },
    }
}

/// Generates a color conversion function from a Notion color enum to our Color type.
/// The `with_backgrounds` variant keeps *Background variants distinct.
macro_rules! impl_color_conversion {
    ($fn_name:ident, $source:ty) => {
        fn $fn_name(color: $source) -> Color {
            match color {
                <$source>::Default => Color::Default,
                <$source>::Gray => Color::Gray,
                <$source>::Brown => Color::Brown,
                <$source>::Orange => Color::Orange,
                <$source>::Yellow => Color::Yellow,
                <$source>::Green => Color::Green,
                <$source>::Blue => Color::Blue,
                <$source>::Purple => Color::Purple,
                <$source>::Pink => Color::Pink,
                <$source>::Red => Color::Red,
            }
        }
    };
    ($fn_name:ident, $source:ty, with_backgrounds) => {
        fn $fn_name(color: $source) -> Color {
            match color {
                <$source>::Default => Color::Default,
                <$source>::Gray => Color::Gray,
                <$source>::Brown => Color::Brown,
                <$source>::Orange => Color::Orange,
                <$source>::Yellow => Color::Yellow,
                <$source>::Green => Color::Green,
                <$source>::Blue => Color::Blue,
                <$source>::Purple => Color::Purple,
                <$source>::Pink => Color::Pink,
                <$source>::Red => Color::Red,
                <$source>::GrayBackground => Color::GrayBackground,
                <$source>::BrownBackground => Color::BrownBackground,
                <$source>::OrangeBackground => Color::OrangeBackground,
                <$source>::YellowBackground => Color::YellowBackground,
                <$source>::GreenBackground => Color::GreenBackground,
                <$source>::BlueBackground => Color::BlueBackground,
                <$source>::PurpleBackground => Color::PurpleBackground,
                <$source>::PinkBackground => Color::PinkBackground,
                <$source>::RedBackground => Color::RedBackground,
            }
        }
    };
}

impl_color_conversion!(
    convert_block_color,
    notion_client::objects::block::TextColor,
    with_backgrounds
);
impl_color_conversion!(
    convert_rich_text_color,
    notion_client::objects::rich_text::TextColor,
    with_backgrounds
);
impl_color_conversion!(
    convert_page_property_color,
    notion_client::objects::page::Color
);

// --- Page properties ---

/// Title of a page: the text of its title-typed property.
pub fn extract_page_title(properties: &HashMap<PropertyName, PropertyValue>) -> PageTitle {
    properties
        .values()
        .find(|property| matches!(property.type_specific_value, PropertyTypeValue::Title { .. }))
        .and_then(PropertyValue::as_plain_text)
        .filter(|title| !title.trim().is_empty())
        .map(PageTitle::new)
        .unwrap_or_else(|| PageTitle::new(UNTITLED))
}

/// Convert raw page properties one at a time. A property that fails to
/// parse or convert is skipped; the rest of the record is kept.
pub fn convert_page_properties(
    properties: serde_json::Map<String, serde_json::Value>,
) -> HashMap<PropertyName, PropertyValue> {
    let mut converted = HashMap::new();

    for (name, raw) in properties {
        let parsed = serde_json::from_value::<PageProperty>(raw)
            .map_err(AppError::from)
            .and_then(|property| convert_page_property(&name, property));
        match parsed {
            Ok(prop_value) => {
                converted.insert(PropertyName::new(name), prop_value);
            }
            Err(e) => {
                log::warn!(
                    "Failed to convert page property '{}': {}. Skipping.",
                    name,
                    e
                );
            }
        }
    }

    converted
}

/// Converts a Notion `DateOrDateTime` to a `NaiveDate`.
fn resolve_date(dod: notion_client::objects::page::DateOrDateTime) -> chrono::NaiveDate {
    match dod {
        notion_client::objects::page::DateOrDateTime::Date(d) => d,
        notion_client::objects::page::DateOrDateTime::DateTime(dt) => dt.date_naive(),
    }
}

fn convert_notion_date(
    d: notion_client::objects::page::DatePropertyValue,
) -> Option<crate::types::DateValue> {
    let start = d.start.map(resolve_date)?;
    Some(crate::types::DateValue {
        start,
        end: d.end.map(resolve_date),
    })
}

fn convert_select_option(
    s: notion_client::objects::page::SelectPropertyValue,
) -> crate::types::SelectOption {
    crate::types::SelectOption {
        name: s.name.unwrap_or_default(),
        color: convert_page_property_color(
            s.color
                .unwrap_or(notion_client::objects::page::Color::Default),
        ),
    }
}

fn convert_file_ref(f: notion_client::objects::page::FilePropertyValue) -> crate::types::File {
    use notion_client::objects::file::File as NcFile;

    let (url, expiry_time) = match f.file {
        NcFile::External { external } => (external.url, None),
        NcFile::File { file } => (file.url, Some(file.expiry_time)),
    };
    crate::types::File {
        name: f.name,
        url,
        expiry_time,
    }
}

fn unsupported(type_name: &str) -> PropertyTypeValue {
    PropertyTypeValue::Unsupported {
        type_name: type_name.to_string(),
    }
}

/// Convert an individual page property.
fn convert_page_property(name: &str, property: PageProperty) -> Result<PropertyValue, AppError> {
    let value = match property {
        PageProperty::Title { title, .. } => PropertyTypeValue::Title {
            title: convert_rich_text_array(title)?,
        },
        PageProperty::RichText { rich_text, .. } => PropertyTypeValue::RichText {
            rich_text: convert_rich_text_array(rich_text)?,
        },
        PageProperty::Number { number, .. } => PropertyTypeValue::Number {
            number: number.and_then(|n| n.as_f64()),
        },
        PageProperty::Checkbox { checkbox, .. } => PropertyTypeValue::Checkbox { checkbox },
        PageProperty::Url { url, .. } => PropertyTypeValue::Url { url },
        PageProperty::Select { select, .. } => PropertyTypeValue::Select {
            select: select.map(convert_select_option),
        },
        PageProperty::MultiSelect { multi_select, .. } => PropertyTypeValue::MultiSelect {
            multi_select: multi_select
                .into_iter()
                .map(convert_select_option)
                .collect(),
        },
        PageProperty::Status { status, .. } => PropertyTypeValue::Status {
            status: status.map(convert_select_option),
        },
        PageProperty::Date { date, .. } => PropertyTypeValue::Date {
            date: date.and_then(convert_notion_date),
        },
        PageProperty::Files { files, .. } => PropertyTypeValue::Files {
            files: files.into_iter().map(convert_file_ref).collect(),
        },
        PageProperty::CreatedTime { created_time, .. } => {
            PropertyTypeValue::CreatedTime { created_time }
        }
        PageProperty::LastEditedTime {
            last_edited_time, ..
        } => match last_edited_time {
            Some(last_edited_time) => PropertyTypeValue::LastEditedTime { last_edited_time },
            None => unsupported("last_edited_time"),
        },
        PageProperty::Email { .. } => unsupported("email"),
        PageProperty::PhoneNumber { .. } => unsupported("phone_number"),
        PageProperty::People { .. } => unsupported("people"),
        PageProperty::CreatedBy { .. } => unsupported("created_by"),
        PageProperty::LastEditedBy { .. } => unsupported("last_edited_by"),
        PageProperty::Relation { .. } => unsupported("relation"),
        PageProperty::Formula { .. } => unsupported("formula"),
        PageProperty::Rollup { .. } => unsupported("rollup"),
        PageProperty::UniqueID { .. } => unsupported("unique_id"),
        PageProperty::Verification { .. } => unsupported("verification"),
        PageProperty::Button { .. } => unsupported("button"),
    };

    Ok(PropertyValue::new(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_properties_are_converted_independently() {
        let raw = json!({
            "type": {"id": "a", "type": "rich_text", "rich_text": [
                {"type": "text", "text": {"content": "image", "link": null},
                 "annotations": {"bold": false, "italic": false, "strikethrough": false,
                                 "underline": false, "code": false, "color": "default"},
                 "plain_text": "image", "href": null}
            ]},
            "hidden": {"id": "b", "type": "checkbox", "checkbox": true},
            "broken": {"id": "c", "type": "checkbox", "checkbox": "not a bool"}
        });
        let serde_json::Value::Object(map) = raw else {
            panic!("expected object");
        };

        let properties = convert_page_properties(map);

        assert_eq!(properties.len(), 2);
        assert_eq!(
            properties["type"].as_plain_text().as_deref(),
            Some("image")
        );
        assert_eq!(properties["hidden"].as_checkbox(), Some(true));
    }

    #[test]
    fn test_missing_title_falls_back_to_untitled() {
        assert_eq!(extract_page_title(&HashMap::new()).as_str(), UNTITLED);
    }
}
