use super::blocks::*;
use super::common::BlockCommon;
use crate::types::BlockId;
use serde::{Deserialize, Serialize};

/// Declares `Block` from a table of `Variant(Payload) => "api_tag"` rows,
/// together with the accessors that have to cover every variant.
macro_rules! notion_blocks {
    ($($variant:ident($payload:ty) => $tag:literal,)+) => {
        /// A Notion block, one variant per block type the service renders.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub enum Block {
            $($variant($payload),)+
            /// Any type not listed above, kept with its raw tag.
            Unsupported(UnsupportedBlock),
        }

        impl Block {
            pub fn common(&self) -> &BlockCommon {
                match self {
                    $(Block::$variant(b) => &b.common,)+
                    Block::Unsupported(b) => &b.common,
                }
            }

            /// The Notion API type tag. Unsupported blocks report the tag
            /// they arrived with.
            pub fn block_type(&self) -> &str {
                match self {
                    $(Block::$variant(_) => $tag,)+
                    Block::Unsupported(b) => &b.block_type,
                }
            }
        }
    };
}

notion_blocks! {
    Paragraph(ParagraphBlock) => "paragraph",
    Heading1(Heading1Block) => "heading_1",
    Heading2(Heading2Block) => "heading_2",
    Heading3(Heading3Block) => "heading_3",
    BulletedListItem(BulletedListItemBlock) => "bulleted_list_item",
    NumberedListItem(NumberedListItemBlock) => "numbered_list_item",
    ToDo(ToDoBlock) => "to_do",
    Toggle(ToggleBlock) => "toggle",
    Quote(QuoteBlock) => "quote",
    Callout(CalloutBlock) => "callout",
    Code(CodeBlock) => "code",
    Equation(EquationBlock) => "equation",
    Divider(DividerBlock) => "divider",
    Breadcrumb(BreadcrumbBlock) => "breadcrumb",
    TableOfContents(TableOfContentsBlock) => "table_of_contents",
    Image(ImageBlock) => "image",
    Video(VideoBlock) => "video",
    Audio(AudioBlock) => "audio",
    File(FileBlock) => "file",
    Pdf(PdfBlock) => "pdf",
    Bookmark(BookmarkBlock) => "bookmark",
    Embed(EmbedBlock) => "embed",
    ChildPage(ChildPageBlock) => "child_page",
    ChildDatabase(ChildDatabaseBlock) => "child_database",
    LinkToPage(LinkToPageBlock) => "link_to_page",
    Table(TableBlock) => "table",
    TableRow(TableRowBlock) => "table_row",
    ColumnList(ColumnListBlock) => "column_list",
    Column(ColumnBlock) => "column",
    Synced(SyncedBlock) => "synced_block",
    Template(TemplateBlock) => "template",
    LinkPreview(LinkPreviewBlock) => "link_preview",
}

impl Block {
    pub fn id(&self) -> &BlockId {
        &self.common().id
    }

    pub fn has_children(&self) -> bool {
        self.common().has_children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RichTextItem;

    #[test]
    fn test_unsupported_reports_raw_type() {
        let block = Block::Unsupported(UnsupportedBlock {
            common: BlockCommon::default(),
            block_type: "ai_block".to_string(),
            text: String::new(),
        });
        assert_eq!(block.block_type(), "ai_block");
    }

    #[test]
    fn test_common_accessors() {
        let block = Block::Paragraph(ParagraphBlock {
            common: BlockCommon::default().with_children_flag(true),
            content: TextBlockContent::from_spans(vec![RichTextItem::plain_text("a")]),
        });
        assert!(block.has_children());
        assert_eq!(block.block_type(), "paragraph");
    }
}
