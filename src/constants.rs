// src/constants.rs
//! Domain constants that define the operational boundaries of the service.
//!
//! Each constant is named for the domain concept it constrains. Reading
//! them top to bottom tells you how far a page walk may go, how long it
//! may take, and how long its results are reused.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Upper bound for a single Notion API call.
pub const UPSTREAM_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts made for a rate-limited or temporarily unavailable call.
pub const UPSTREAM_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay between retries; doubles up to `UPSTREAM_MAX_BACKOFF`.
pub const UPSTREAM_INITIAL_BACKOFF: Duration = Duration::from_millis(200);

pub const UPSTREAM_MAX_BACKOFF: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Page tree boundaries
// ---------------------------------------------------------------------------

/// Maximum nesting depth when walking a page's block tree.
///
/// Notion nests toggles, columns and synced blocks arbitrarily deep.
/// Anything below this depth is left out and the result is marked
/// incomplete.
pub const MAX_TREE_DEPTH: usize = 20;

/// Maximum number of blocks assembled for one page payload.
pub const MAX_TREE_NODES: usize = 5_000;

/// Default wall-clock budget for assembling one page payload.
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(25);

/// Title used when a record, child page or linked page has none.
pub const UNTITLED: &str = "Untitled";

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// How long listings and assembled pages are reused.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
