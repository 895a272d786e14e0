// src/api/tree_assembler.rs
//! Flattens a page's block tree into `BlockRecord`s.
//!
//! The walk is sequential and depth-first: a block's nested content is
//! fully resolved before its next sibling is processed, and records are
//! emitted in exactly the order Notion returns them. One deadline bounds
//! the whole walk; whatever was assembled before a failure or timeout is
//! returned with flags saying so.

use super::types::{PageWindow, WalkContext};
use super::NotionRepository;
use crate::constants::{
    DEFAULT_REQUEST_DEADLINE, MAX_TREE_DEPTH, MAX_TREE_NODES, NOTION_API_PAGE_SIZE,
    UPSTREAM_CALL_TIMEOUT, UNTITLED,
};
use crate::error::AppError;
use crate::formatting::rich_text::html_escape;
use crate::formatting::{transform_block, BlockRecord, NestedContent, Transformed};
use crate::model::Block;
use crate::types::NotionId;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The result of assembling (part of) a page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssembledTree {
    pub blocks: Vec<BlockRecord>,
    /// Cursor to resume the top-level listing from, when `has_more`.
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// False when any part of the tree was skipped (failure, guard, timeout).
    pub complete: bool,
    pub timed_out: bool,
}

/// Walks block trees through a `NotionRepository`.
#[derive(Clone)]
pub struct PageTreeAssembler {
    repository: Arc<dyn NotionRepository>,
    deadline: Duration,
    call_timeout: Duration,
    max_depth: usize,
    max_nodes: usize,
}

impl PageTreeAssembler {
    pub fn new(repository: Arc<dyn NotionRepository>) -> Self {
        Self {
            repository,
            deadline: DEFAULT_REQUEST_DEADLINE,
            call_timeout: UPSTREAM_CALL_TIMEOUT,
            max_depth: MAX_TREE_DEPTH,
            max_nodes: MAX_TREE_NODES,
        }
    }

    /// Wall-clock budget for one `assemble` call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_limits(mut self, max_depth: usize, max_nodes: usize) -> Self {
        self.max_depth = max_depth;
        self.max_nodes = max_nodes;
        self
    }

    /// Assembles the top-level blocks of `root` selected by `window`,
    /// with every nested structure resolved.
    ///
    /// Fails only when the very first batch is refused for good (an unknown
    /// page or a cursor Notion rejects). Later failures and timeouts yield
    /// the prefix read so far.
    pub async fn assemble(
        &self,
        root: &NotionId,
        window: &PageWindow,
    ) -> Result<AssembledTree, AppError> {
        let started = Instant::now();
        let mut walk = Walk::new(started + self.deadline, self.max_nodes);
        let context = WalkContext::new(self.max_depth);

        let mut blocks = Vec::new();
        let mut cursor = window.cursor.clone();
        let mut has_more = false;
        let mut batches_read = 0usize;

        loop {
            let page_size = match window.limit {
                Some(limit) => match limit.saturating_sub(blocks.len()) {
                    0 => break,
                    remaining => remaining.min(NOTION_API_PAGE_SIZE),
                },
                None => NOTION_API_PAGE_SIZE,
            };

            let call = self
                .repository
                .retrieve_children_batch(root, cursor.as_deref(), page_size);
            let batch = match self.bounded(&mut walk, call).await {
                Ok(batch) => batch,
                Err(e) => {
                    let transient = e.is_retryable() || e.is_timeout();
                    if batches_read == 0 && !transient {
                        log::warn!("Blocks of {} refused: {}", root, e);
                        return Err(e);
                    }
                    log::warn!("Stopped reading blocks of {}: {}", root, e);
                    walk.complete = false;
                    // Only a transient failure is worth resuming from the same cursor
                    has_more = transient && cursor.is_some();
                    break;
                }
            };
            batches_read += 1;

            let mut admitted = 0;
            for block in &batch.results {
                if let Some(record) = self.process_block(block, &context, &mut walk).await {
                    blocks.push(record);
                    admitted += 1;
                }
            }

            if admitted < batch.results.len() {
                // The cursor lies past blocks that were never emitted
                log::warn!("Node limit cut a batch of {}; the load cannot be resumed", root);
                has_more = false;
                break;
            }

            has_more = batch.has_more && batch.next_cursor.is_some();
            cursor = batch.next_cursor;
            if !has_more || walk.exhausted() {
                break;
            }
        }

        let tree = AssembledTree {
            next_cursor: if has_more { cursor } else { None },
            has_more,
            complete: walk.complete && !walk.timed_out,
            timed_out: walk.timed_out,
            blocks,
        };

        log::info!(
            "Assembled {} top-level blocks ({} total) for {} in {:?} (complete: {}, timed out: {})",
            tree.blocks.len(),
            walk.nodes,
            root,
            started.elapsed(),
            tree.complete,
            tree.timed_out
        );

        Ok(tree)
    }

    /// Transforms one block and resolves whatever nested content it needs.
    /// `None` once the node budget is spent.
    fn process_block<'a>(
        &'a self,
        block: &'a Block,
        context: &'a WalkContext,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, Option<BlockRecord>> {
        async move {
            if !walk.admit() {
                return None;
            }

            let Transformed { mut record, nested } = transform_block(block);
            let block_id = NotionId::from(block.id());

            match nested {
                NestedContent::None => {}
                NestedContent::Children => {
                    record.children = self.nested_children(&block_id, context, walk).await;
                }
                NestedContent::Columns => {
                    record.columns = self.nested_children(&block_id, context, walk).await;
                }
                NestedContent::TableRows => {
                    record.rows = self.nested_children(&block_id, context, walk).await;
                }
                NestedContent::SyncedSource(source) => {
                    record.synced_content = self
                        .synced_source(&source, context, walk)
                        .await
                        .map(Box::new);
                }
                NestedContent::PageTitle(page_id) => {
                    let title = self.page_title(&page_id, walk).await;
                    record.text = html_escape(&title);
                    record.title = Some(title);
                }
            }

            Some(record)
        }
        .boxed()
    }

    /// Every child of `parent`, across all batches. `None` when the
    /// children could not be read or lie beyond the depth guard.
    async fn nested_children(
        &self,
        parent: &NotionId,
        context: &WalkContext,
        walk: &mut Walk,
    ) -> Option<Vec<BlockRecord>> {
        if !context.can_descend() {
            log::debug!("Depth limit reached below {}; children left out", parent);
            walk.complete = false;
            return None;
        }
        let child_context = context.descend();

        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let call =
                self.repository
                    .retrieve_children_batch(parent, cursor.as_deref(), NOTION_API_PAGE_SIZE);
            let batch = match self.bounded(walk, call).await {
                Ok(batch) => batch,
                Err(e) => {
                    log::warn!("Children of {} left out: {}", parent, e);
                    walk.complete = false;
                    return None;
                }
            };

            for block in &batch.results {
                if let Some(record) = self.process_block(block, &child_context, walk).await {
                    records.push(record);
                }
            }

            if batch.has_more && batch.next_cursor.is_some() && !walk.exhausted() {
                cursor = batch.next_cursor;
            } else {
                break;
            }
        }

        Some(records)
    }

    /// The original block behind a synced duplicate, transformed with its
    /// own nested content.
    async fn synced_source(
        &self,
        source: &NotionId,
        context: &WalkContext,
        walk: &mut Walk,
    ) -> Option<BlockRecord> {
        if context.has_visited(source) {
            log::warn!("Synced block {} refers back to itself; not expanded again", source);
            walk.complete = false;
            return None;
        }
        if !context.can_descend() {
            walk.complete = false;
            return None;
        }

        let block = match self
            .bounded(walk, self.repository.retrieve_block(source))
            .await
        {
            Ok(block) => block,
            Err(e) => {
                log::warn!("Synced source {} unavailable: {}", source, e);
                walk.complete = false;
                return None;
            }
        };

        let source_context = context.with_visited(source.clone()).descend();
        self.process_block(&block, &source_context, walk).await
    }

    /// Title of a linked page, `Untitled` when it can't be read.
    async fn page_title(&self, page_id: &NotionId, walk: &mut Walk) -> String {
        match self
            .bounded(walk, self.repository.retrieve_page(page_id))
            .await
        {
            Ok(page) => page.title().to_string(),
            Err(e) => {
                log::debug!("Title lookup for {} failed: {}", page_id, e);
                UNTITLED.to_string()
            }
        }
    }

    /// Runs one upstream call within both the per-call timeout and what
    /// is left of the walk's deadline.
    async fn bounded<T, F>(&self, walk: &mut Walk, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let remaining = walk.remaining();
        if walk.timed_out || remaining.is_zero() {
            walk.timed_out = true;
            return Err(AppError::UpstreamTimeout(
                "request deadline exceeded".to_string(),
            ));
        }

        match tokio::time::timeout(remaining.min(self.call_timeout), call).await {
            Ok(result) => {
                if result.as_ref().err().is_some_and(AppError::is_timeout) {
                    walk.timed_out = true;
                }
                result
            }
            Err(elapsed) => {
                walk.timed_out = true;
                Err(elapsed.into())
            }
        }
    }
}

/// Mutable bookkeeping for one `assemble` call.
#[derive(Debug)]
struct Walk {
    deadline: Instant,
    max_nodes: usize,
    nodes: usize,
    complete: bool,
    timed_out: bool,
}

impl Walk {
    fn new(deadline: Instant, max_nodes: usize) -> Self {
        Self {
            deadline,
            max_nodes,
            nodes: 0,
            complete: true,
            timed_out: false,
        }
    }

    fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Counts one more node against the budget.
    fn admit(&mut self) -> bool {
        if self.nodes >= self.max_nodes {
            if self.complete {
                log::warn!("Node limit of {} reached; remaining blocks left out", self.max_nodes);
            }
            self.complete = false;
            return false;
        }
        self.nodes += 1;
        true
    }

    fn exhausted(&self) -> bool {
        self.timed_out || self.nodes >= self.max_nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_node_budget() {
        let mut walk = Walk::new(Instant::now() + Duration::from_secs(1), 2);
        assert!(walk.admit());
        assert!(walk.admit());
        assert!(walk.exhausted());
        assert!(!walk.admit());
        assert!(!walk.complete);
    }

    #[test]
    fn test_expired_walk_has_no_time_left() {
        let walk = Walk::new(Instant::now(), 10);
        assert!(walk.remaining().is_zero());
    }
}
