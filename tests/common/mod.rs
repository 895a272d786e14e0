// tests/common/mod.rs
//! In-memory `NotionRepository` and block builders shared by integration tests.

#![allow(dead_code)]

use notion_image_bed::error::NotionErrorCode;
use notion_image_bed::model::{
    Block, BlockCommon, ColumnBlock, ColumnListBlock, ParagraphBlock, SyncedBlock, SyncedFrom, TableBlock, TableRowBlock,
    TextBlockContent, ToggleBlock,
};
use notion_image_bed::types::{BlockId, File, PageId};
use notion_image_bed::{
    Annotations, AppError, NotionId, NotionRepository, Page, PaginatedResponse,
    PropertyTypeValue, RichTextItem,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Serves blocks, pages and database records from memory, paginating
/// children with numeric cursors.
#[derive(Default)]
pub struct FakeNotion {
    children: HashMap<NotionId, Vec<Block>>,
    blocks: HashMap<NotionId, Block>,
    pages: HashMap<NotionId, Page>,
    records: Vec<Page>,
    failing_parents: HashSet<NotionId>,
    max_batch: Option<usize>,
    delay: Option<Duration>,
    children_calls: AtomicUsize,
    page_calls: AtomicUsize,
    query_calls: AtomicUsize,
    requested_sizes: Mutex<Vec<usize>>,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children(mut self, parent: &NotionId, blocks: Vec<Block>) -> Self {
        for block in &blocks {
            self.blocks.insert(NotionId::from(block.id()), block.clone());
        }
        self.children.insert(parent.clone(), blocks);
        self
    }

    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.insert(NotionId::from(block.id()), block);
        self
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.insert(NotionId::from(&page.id), page);
        self
    }

    /// Adds a database record; records are also retrievable as pages.
    pub fn with_record(mut self, page: Page) -> Self {
        self.pages.insert(NotionId::from(&page.id), page.clone());
        self.records.push(page);
        self
    }

    pub fn failing_children_of(mut self, parent: &NotionId) -> Self {
        self.failing_parents.insert(parent.clone());
        self
    }

    /// Caps every batch at `size`, whatever the caller asks for.
    pub fn with_max_batch(mut self, size: usize) -> Self {
        self.max_batch = Some(size);
        self
    }

    /// Delays every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn requested_sizes(&self) -> Vec<usize> {
        self.requested_sizes.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn batch<T: Clone>(&self, items: &[T], cursor: Option<&str>, page_size: usize) -> PaginatedResponse<T> {
        let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let size = self.max_batch.map_or(page_size, |max| page_size.min(max)).max(1);
        let end = (start + size).min(items.len());
        let has_more = end < items.len();
        PaginatedResponse {
            object: "list".to_string(),
            results: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        }
    }
}

pub fn not_found(what: &NotionId) -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::ObjectNotFound,
        message: format!("Could not find {}", what.to_hyphenated()),
        status: reqwest::StatusCode::NOT_FOUND,
    }
}

/// What Notion answers for a `start_cursor` it never issued.
pub fn rejected_cursor(cursor: &str) -> AppError {
    AppError::NotionService {
        code: NotionErrorCode::ValidationFailed,
        message: format!("start_cursor {} is not valid", cursor),
        status: reqwest::StatusCode::BAD_REQUEST,
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.pages.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn retrieve_block(&self, id: &NotionId) -> Result<Block, AppError> {
        self.pause().await;
        self.blocks.get(id).cloned().ok_or_else(|| not_found(id))
    }

    async fn retrieve_children_batch(
        &self,
        parent: &NotionId,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        self.requested_sizes.lock().unwrap().push(page_size);
        self.pause().await;

        if self.failing_parents.contains(parent) {
            return Err(AppError::NotionService {
                code: NotionErrorCode::InternalError,
                message: "boom".to_string(),
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }

        if let Some(cursor) = cursor.filter(|c| c.parse::<usize>().is_err()) {
            return Err(rejected_cursor(cursor));
        }

        let children = self.children.get(parent).map(Vec::as_slice).unwrap_or(&[]);
        Ok(self.batch(children, cursor, page_size))
    }

    async fn query_database_batch(
        &self,
        _database: &NotionId,
        _filter: Option<&Value>,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Page>, AppError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self.batch(&self.records, cursor, page_size))
    }
}

// --- Builders ---

pub fn id_of(block: &Block) -> NotionId {
    NotionId::from(block.id())
}

pub fn paragraph(text: &str) -> Block {
    Block::Paragraph(ParagraphBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::from_spans(vec![RichTextItem::plain_text(text)]),
    })
}

pub fn bold_paragraph(text: &str) -> Block {
    Block::Paragraph(ParagraphBlock {
        common: BlockCommon::default(),
        content: TextBlockContent::from_spans(vec![
            RichTextItem::plain_text(text).with_annotations(Annotations::bold())
        ]),
    })
}

pub fn toggle(text: &str, has_children: bool) -> Block {
    Block::Toggle(ToggleBlock {
        common: BlockCommon::default().with_children_flag(has_children),
        content: TextBlockContent::from_spans(vec![RichTextItem::plain_text(text)]),
    })
}

pub fn table(width: usize) -> Block {
    Block::Table(TableBlock {
        common: BlockCommon::default().with_children_flag(true),
        table_width: width,
        has_column_header: true,
        has_row_header: false,
    })
}

pub fn table_row(cells: &[&str]) -> Block {
    Block::TableRow(TableRowBlock {
        common: BlockCommon::default(),
        cells: cells
            .iter()
            .map(|cell| vec![RichTextItem::plain_text(cell)])
            .collect(),
    })
}

pub fn column_list() -> Block {
    Block::ColumnList(ColumnListBlock {
        common: BlockCommon::default().with_children_flag(true),
    })
}

pub fn column() -> Block {
    Block::Column(ColumnBlock {
        common: BlockCommon::default().with_children_flag(true),
    })
}

pub fn synced_original() -> Block {
    Block::Synced(SyncedBlock {
        common: BlockCommon::default().with_children_flag(true),
        synced_from: None,
    })
}

pub fn synced_copy_of(source: &Block) -> Block {
    Block::Synced(SyncedBlock {
        common: BlockCommon::default(),
        synced_from: Some(SyncedFrom {
            block_id: source.id().clone(),
        }),
    })
}

/// A gallery database record.
pub fn record(kind: &str, title: &str) -> Page {
    Page::new(PageId::new_v4(), title)
        .with_property(
            "type",
            PropertyTypeValue::RichText {
                rich_text: vec![RichTextItem::plain_text(kind)],
            },
        )
        .with_property(
            "Name",
            PropertyTypeValue::Title {
                title: vec![RichTextItem::plain_text(title)],
            },
        )
}

pub fn with_content(page: Page, url: &str) -> Page {
    page.with_property(
        "Content",
        PropertyTypeValue::Files {
            files: vec![File::new("content", url)],
        },
    )
}

pub fn hidden(page: Page) -> Page {
    page.with_property("hidden", PropertyTypeValue::Checkbox { checkbox: true })
}

pub fn with_suffix(page: Page, suffix: &str) -> Page {
    page.with_property(
        "suffix",
        PropertyTypeValue::RichText {
            rich_text: vec![RichTextItem::plain_text(suffix)],
        },
    )
}

pub fn page_id(page: &Page) -> NotionId {
    NotionId::from(&page.id)
}

pub fn new_block_id() -> BlockId {
    BlockId::new_v4()
}
