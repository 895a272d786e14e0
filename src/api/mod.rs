// src/api/mod.rs
//! Notion API interaction: the ability to read records, pages, and blocks.
//!
//! I/O lives in `client`, payload conversion in `parser` and
//! `notion_client_adapter`, and the recursive page walk in
//! `tree_assembler`. Everything above this module depends on the
//! `NotionRepository` trait, never on HTTP details.

pub mod client;
pub mod notion_client_adapter;
pub mod parser;
mod responses;
mod simple_pagination;
pub mod tree_assembler;
mod types;

use crate::error::AppError;
use crate::model::{Block, Page};
use crate::types::NotionId;
use serde_json::Value;

pub use client::NotionHttpClient;
pub use tree_assembler::{AssembledTree, PageTreeAssembler};
pub use types::{PageWindow, PaginatedResponse, PaginationResult, WalkContext};

/// The ability to read content from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError>;
    async fn retrieve_block(&self, id: &NotionId) -> Result<Block, AppError>;

    /// One batch of a block's children, resuming at `cursor`.
    async fn retrieve_children_batch(
        &self,
        parent: &NotionId,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Block>, AppError>;

    /// One batch of database records matching `filter`, resuming at `cursor`.
    async fn query_database_batch(
        &self,
        database: &NotionId,
        filter: Option<&Value>,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Page>, AppError>;

    /// Every record matching `filter`, in the order Notion returns them.
    async fn query_database(
        &self,
        database: &NotionId,
        filter: Option<&Value>,
    ) -> Result<Vec<Page>, AppError> {
        let result = simple_pagination::fetch_all_pages_simple(
            move |page_size, cursor| async move {
                self.query_database_batch(database, filter, cursor.as_deref(), page_size)
                    .await
            },
            None,
        )
        .await?;
        log::debug!(
            "Database {} query returned {} records",
            database,
            result.total_fetched
        );
        Ok(result.items)
    }
}
