// src/api/types.rs
//! Type definitions for the Notion API module.

use crate::types::NotionId;
use serde::Deserialize;

// --- Pagination ---

/// One page of a cursor-paginated Notion listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Re-wraps the same cursor state around converted results.
    pub fn with_results<U>(self, results: Vec<U>) -> PaginatedResponse<U> {
        PaginatedResponse {
            object: self.object,
            results,
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        }
    }
}

/// Everything collected by draining a paginated listing.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub total_fetched: usize,
}

/// Which slice of a page's top-level blocks to assemble.
///
/// `limit` caps the number of top-level blocks; `cursor` resumes a prior
/// partial load at the batch boundary it stopped on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl PageWindow {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_none() && self.cursor.is_none()
    }
}

// --- Walk Context ---

/// Immutable context threaded through a recursive page walk.
#[derive(Debug, Clone)]
pub struct WalkContext {
    /// Synced-block sources on the current path (persistent for cheap cloning)
    visited: im::HashSet<NotionId>,
    /// Remaining nesting depth
    pub depth_remaining: usize,
}

impl WalkContext {
    pub fn new(max_depth: usize) -> Self {
        Self {
            visited: im::HashSet::new(),
            depth_remaining: max_depth,
        }
    }

    /// Returns a new context with the given ID marked as visited.
    pub fn with_visited(&self, id: NotionId) -> Self {
        let mut visited = self.visited.clone();
        visited.insert(id);
        Self {
            visited,
            depth_remaining: self.depth_remaining,
        }
    }

    /// Returns a new context one level deeper.
    pub fn descend(&self) -> Self {
        Self {
            visited: self.visited.clone(),
            depth_remaining: self.depth_remaining.saturating_sub(1),
        }
    }

    pub fn can_descend(&self) -> bool {
        self.depth_remaining > 0
    }

    pub fn has_visited(&self, id: &NotionId) -> bool {
        self.visited.contains(id)
    }
}
