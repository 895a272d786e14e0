// src/formatting/block_transformer.rs
//! Turns one Notion block into a flat `BlockRecord`.
//!
//! The transform is pure: anything that needs another upstream read is
//! described by `NestedContent` and left to the tree assembler.

use super::records::{display_id, BlockRecord};
use super::rich_text::{html_escape, rich_text_to_html};
use crate::constants::UNTITLED;
use crate::model::{Block, FileObject, TextBlockContent};
use crate::types::{NotionId, RichTextItem};

/// What the assembler still has to fetch for a transformed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedContent {
    None,
    /// The block's own children, attached as `children`.
    Children,
    /// Table rows, attached as `rows`.
    TableRows,
    /// Columns of a column list, each with its own children, attached as `columns`.
    Columns,
    /// A synced duplicate: the original block, attached as `synced_content`.
    SyncedSource(NotionId),
    /// A linked page whose title goes into `title`.
    PageTitle(NotionId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub record: BlockRecord,
    pub nested: NestedContent,
}

/// Transforms one block. Never fails: types without dedicated handling
/// pass through with their type tag and raw text.
pub fn transform_block(block: &Block) -> Transformed {
    let mut record = BlockRecord::new(display_id(block.id()), block.block_type());
    record.has_children = block.has_children();

    let children_if_any = if block.has_children() {
        NestedContent::Children
    } else {
        NestedContent::None
    };

    let nested = match block {
        Block::Paragraph(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Heading1(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Heading2(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Heading3(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::BulletedListItem(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::NumberedListItem(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::ToDo(b) => {
            apply_text(&mut record, &b.content);
            record.checked = Some(b.checked);
            children_if_any
        }
        Block::Toggle(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Quote(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Callout(b) => {
            apply_text(&mut record, &b.content);
            record.icon = b.icon.clone();
            children_if_any
        }
        Block::Template(b) => {
            apply_text(&mut record, &b.content);
            children_if_any
        }
        Block::Code(b) => {
            record.text = rich_text_to_html(&b.content.rich_text);
            record.language = Some(b.language.clone());
            record.caption = caption(&b.caption);
            NestedContent::None
        }
        Block::Equation(b) => {
            record.expression = Some(b.expression.clone());
            NestedContent::None
        }
        Block::Divider(_) | Block::Breadcrumb(_) | Block::TableOfContents(_) => {
            NestedContent::None
        }
        Block::Image(b) => {
            apply_media(&mut record, &b.image, &b.caption);
            NestedContent::None
        }
        Block::Video(b) => {
            apply_media(&mut record, &b.video, &b.caption);
            NestedContent::None
        }
        Block::Audio(b) => {
            apply_media(&mut record, &b.audio, &b.caption);
            NestedContent::None
        }
        Block::Pdf(b) => {
            apply_media(&mut record, &b.pdf, &b.caption);
            NestedContent::None
        }
        Block::File(b) => {
            apply_media(&mut record, &b.file, &b.caption);
            record.name = b.name.clone();
            NestedContent::None
        }
        Block::Bookmark(b) => {
            record.url = Some(b.url.clone());
            record.caption = caption(&b.caption);
            NestedContent::None
        }
        Block::Embed(b) => {
            record.url = Some(b.url.clone());
            NestedContent::None
        }
        Block::LinkPreview(b) => {
            record.url = Some(b.url.clone());
            NestedContent::None
        }
        Block::ChildPage(b) => {
            let title = non_empty_title(&b.title);
            record.text = html_escape(&title);
            record.title = Some(title);
            record.page_id = Some(display_id(&b.common.id));
            NestedContent::None
        }
        Block::ChildDatabase(b) => {
            let title = non_empty_title(&b.title);
            record.text = html_escape(&title);
            record.title = Some(title);
            record.page_id = Some(display_id(&b.common.id));
            NestedContent::None
        }
        Block::LinkToPage(b) => {
            record.page_id = Some(display_id(&b.page_id));
            NestedContent::PageTitle(NotionId::from(&b.page_id))
        }
        Block::Table(b) => {
            record.table_width = Some(b.table_width);
            record.has_column_header = Some(b.has_column_header);
            record.has_row_header = Some(b.has_row_header);
            if b.common.has_children {
                NestedContent::TableRows
            } else {
                record.rows = Some(Vec::new());
                NestedContent::None
            }
        }
        Block::TableRow(b) => {
            record.cells = Some(b.cells.iter().map(|cell| rich_text_to_html(cell)).collect());
            NestedContent::None
        }
        Block::ColumnList(_) => {
            if block.has_children() {
                NestedContent::Columns
            } else {
                NestedContent::None
            }
        }
        Block::Column(_) => children_if_any,
        Block::Synced(b) => match &b.synced_from {
            Some(source) => NestedContent::SyncedSource(NotionId::from(&source.block_id)),
            None => children_if_any,
        },
        Block::Unsupported(b) => {
            record.text = html_escape(&b.text);
            NestedContent::None
        }
    };

    Transformed { record, nested }
}

fn apply_text(record: &mut BlockRecord, content: &TextBlockContent) {
    record.text = rich_text_to_html(&content.rich_text);
    record.color = Some(content.color);
}

fn apply_media(record: &mut BlockRecord, file: &FileObject, spans: &[RichTextItem]) {
    record.url = Some(file.url().to_string());
    record.caption = caption(spans);
}

fn caption(spans: &[RichTextItem]) -> Option<String> {
    if spans.is_empty() {
        None
    } else {
        Some(rich_text_to_html(spans))
    }
}

fn non_empty_title(title: &str) -> String {
    if title.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::*;
    use crate::types::{Annotations, BlockId, Color, PageId};
    use pretty_assertions::assert_eq;

    fn common(has_children: bool) -> BlockCommon {
        BlockCommon::default().with_children_flag(has_children)
    }

    #[test]
    fn test_paragraph_renders_markup_and_color() {
        let block = Block::Paragraph(ParagraphBlock {
            common: common(false),
            content: TextBlockContent {
                rich_text: vec![RichTextItem::plain_text("a").with_annotations(Annotations::bold())],
                color: Color::GrayBackground,
            },
        });

        let transformed = transform_block(&block);
        assert_eq!(transformed.record.block_type, "paragraph");
        assert_eq!(transformed.record.text, "<strong>a</strong>");
        assert_eq!(transformed.record.color, Some(Color::GrayBackground));
        assert_eq!(transformed.nested, NestedContent::None);
    }

    #[test]
    fn test_toggle_with_children_requests_children() {
        let block = Block::Toggle(ToggleBlock {
            common: common(true),
            content: TextBlockContent::from_spans(vec![RichTextItem::plain_text("more")]),
        });
        assert_eq!(transform_block(&block).nested, NestedContent::Children);
    }

    #[test]
    fn test_unsupported_block_keeps_type_and_text() {
        let block = Block::Unsupported(UnsupportedBlock {
            common: common(true),
            block_type: "ai_block".to_string(),
            text: "<raw>".to_string(),
        });

        let transformed = transform_block(&block);
        assert_eq!(transformed.record.block_type, "ai_block");
        assert_eq!(transformed.record.text, "&lt;raw&gt;");
        assert_eq!(transformed.nested, NestedContent::None);
    }

    #[test]
    fn test_media_prefers_hosted_file_url() {
        let block = Block::Image(ImageBlock {
            common: common(false),
            image: FileObject::File {
                file: NotionFile {
                    url: "https://s3.example/signed.png".to_string(),
                    expiry_time: None,
                },
            },
            caption: vec![RichTextItem::plain_text("A cat")],
        });

        let record = transform_block(&block).record;
        assert_eq!(record.url.as_deref(), Some("https://s3.example/signed.png"));
        assert_eq!(record.caption.as_deref(), Some("A cat"));
    }

    #[test]
    fn test_table_row_cells_keep_column_order() {
        let block = Block::TableRow(TableRowBlock {
            common: common(false),
            cells: vec![
                vec![RichTextItem::plain_text("left")],
                vec![RichTextItem::plain_text("right").with_annotations(Annotations::bold())],
            ],
        });

        assert_eq!(
            transform_block(&block).record.cells,
            Some(vec!["left".to_string(), "<strong>right</strong>".to_string()])
        );
    }

    #[test]
    fn test_synced_duplicate_points_at_source() {
        let source = BlockId::new_v4();
        let block = Block::Synced(SyncedBlock {
            common: common(false),
            synced_from: Some(SyncedFrom {
                block_id: source.clone(),
            }),
        });
        assert_eq!(
            transform_block(&block).nested,
            NestedContent::SyncedSource(NotionId::from(&source))
        );
    }

    #[test]
    fn test_child_page_uses_own_title() {
        let block = Block::ChildPage(ChildPageBlock {
            common: common(true),
            title: "  ".to_string(),
        });

        let transformed = transform_block(&block);
        assert_eq!(transformed.record.title.as_deref(), Some(UNTITLED));
        assert!(transformed.record.page_id.is_some());
        assert_eq!(transformed.nested, NestedContent::None);
    }

    #[test]
    fn test_link_to_page_requests_title() {
        let target = PageId::new_v4();
        let block = Block::LinkToPage(LinkToPageBlock {
            common: common(false),
            page_id: target.clone(),
        });

        let transformed = transform_block(&block);
        assert_eq!(transformed.record.page_id, Some(target.to_hyphenated()));
        assert_eq!(
            transformed.nested,
            NestedContent::PageTitle(NotionId::from(&target))
        );
    }
}
