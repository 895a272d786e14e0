// src/lib.rs
//! notion-image-bed: a read-only HTTP façade over one Notion database.
//!
//! # Public API
//!
//! - **Error handling**: `AppError`, `ValidationError`
//! - **Configuration**: `ServiceConfig`
//! - **Domain model**: `Page`, `Block`, `RichTextItem`, ...
//! - **Notion access**: `NotionRepository`, `NotionHttpClient`, `PageTreeAssembler`
//! - **Formatting**: `rich_text_to_html`, `transform_block`, `BlockRecord`
//! - **Service and HTTP**: `GalleryService`, `create_router`

pub mod analytics;
pub mod api;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
mod error_recovery;
pub mod formatting;
pub mod model;
pub mod server;
pub mod service;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::ServiceConfig;

// --- Domain Model ---
pub use crate::model::{Block, BlockCommon, Page, PageTitle, Parent, PropertyTypeValue, PropertyValue};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, BlockId, Color, DatabaseId, NotionId, PageId, PropertyName,
    RichTextItem, RichTextType,
};

// --- Notion Access ---
pub use crate::api::{
    AssembledTree, NotionHttpClient, NotionRepository, PageTreeAssembler, PageWindow,
    PaginatedResponse,
};

// --- Formatting ---
pub use crate::formatting::{
    rich_text_to_html, rich_text_to_plain, transform_block, BlockRecord, PageHeader, PagePayload,
};

// --- Catalog, Service, HTTP ---
pub use crate::catalog::{classify_record, RecordKind, RecordSummary};
pub use crate::server::create_router;
pub use crate::service::{GalleryService, ServiceOptions};
