// src/service/mod.rs
//! The gallery façade: listings, content redirects, page payloads and
//! slug resolution on top of a `NotionRepository`, with TTL caching.

mod cache;

pub use cache::TtlCache;

use crate::analytics::measure_tree;
use crate::api::{NotionHttpClient, NotionRepository, PageTreeAssembler, PageWindow};
use crate::catalog::{self, RecordKind, RecordSummary};
use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::formatting::{PageHeader, PagePayload};
use crate::types::{NotionId, ValidatedUrl};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const DATABASE_NOT_CONFIGURED: &str = "Database ID not configured";
const TOKEN_NOT_CONFIGURED: &str = "Notion token not configured";

/// Tunables for a `GalleryService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub cache_ttl: Duration,
    pub request_deadline: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        let config = ServiceConfig::default();
        Self {
            cache_ttl: config.cache_ttl,
            request_deadline: config.request_deadline,
        }
    }
}

/// Outcome of looking up a slug.
#[derive(Debug, Clone, PartialEq)]
pub enum SuffixMatch {
    Unique(RecordSummary),
    Ambiguous(Vec<RecordSummary>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub token_configured: bool,
    pub database_configured: bool,
    /// Number of records held by each cached listing.
    pub cached: CachedListings,
    /// Number of page payloads currently reusable.
    pub cached_pages: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CachedListings {
    pub images: usize,
    pub files: usize,
    pub pages: usize,
}

pub struct GalleryService {
    repository: Option<Arc<dyn NotionRepository>>,
    database_id: Option<NotionId>,
    options: ServiceOptions,
    listings: TtlCache<RecordKind, Vec<RecordSummary>>,
    pages: TtlCache<NotionId, PagePayload>,
}

impl GalleryService {
    pub fn new(
        repository: Option<Arc<dyn NotionRepository>>,
        database_id: Option<NotionId>,
        options: ServiceOptions,
    ) -> Self {
        Self {
            repository,
            database_id,
            listings: TtlCache::new(options.cache_ttl),
            pages: TtlCache::new(options.cache_ttl),
            options,
        }
    }

    /// Builds the service with a live Notion client when a token is configured.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AppError> {
        let repository = match &config.api_key {
            Some(api_key) => {
                let client: Arc<dyn NotionRepository> = Arc::new(NotionHttpClient::new(api_key)?);
                Some(client)
            }
            None => None,
        };

        Ok(Self::new(
            repository,
            config.database_id.clone(),
            ServiceOptions {
                cache_ttl: config.cache_ttl,
                request_deadline: config.request_deadline,
            },
        ))
    }

    fn repository(&self) -> Result<&Arc<dyn NotionRepository>, AppError> {
        self.repository
            .as_ref()
            .ok_or_else(|| AppError::MissingConfiguration(TOKEN_NOT_CONFIGURED.to_string()))
    }

    fn database_id(&self) -> Result<&NotionId, AppError> {
        self.database_id
            .as_ref()
            .ok_or_else(|| AppError::MissingConfiguration(DATABASE_NOT_CONFIGURED.to_string()))
    }

    /// Visible records of `kind`, in database query order.
    pub async fn list(&self, kind: RecordKind) -> Result<Arc<Vec<RecordSummary>>, AppError> {
        let database_id = self.database_id()?;
        let repository = self.repository()?;

        if let Some(cached) = self.listings.get(&kind) {
            log::debug!("Cache hit: {} listing", kind);
            return Ok(cached);
        }

        log::info!("Querying database {} for {} records", database_id, kind);
        let records = repository.query_database(database_id, None).await?;
        let summaries = catalog::classify_records(&records, kind);
        log::info!(
            "Found {} {} out of {} records",
            summaries.len(),
            kind.plural(),
            records.len()
        );

        Ok(self.listings.insert(kind, summaries))
    }

    /// Visible pages whose `suffix` equals `suffix`.
    pub async fn pages_with_suffix(&self, suffix: &str) -> Result<Vec<RecordSummary>, AppError> {
        let suffix = suffix.trim();
        let pages = self.list(RecordKind::Page).await?;
        Ok(pages
            .iter()
            .filter(|page| page.suffix.as_deref() == Some(suffix))
            .cloned()
            .collect())
    }

    pub async fn resolve_suffix(&self, suffix: &str) -> Result<SuffixMatch, AppError> {
        let mut matches = self.pages_with_suffix(suffix).await?;
        match matches.len() {
            0 => Err(AppError::NotFound(format!("No page found for '{}'", suffix))),
            1 => Ok(SuffixMatch::Unique(matches.remove(0))),
            _ => Ok(SuffixMatch::Ambiguous(matches)),
        }
    }

    /// Fresh download URL of the record's first `Content` file.
    ///
    /// Never cached: Notion-hosted URLs are signed and expire.
    pub async fn content_url(&self, kind: RecordKind, id: &str) -> Result<ValidatedUrl, AppError> {
        let repository = self.repository()?;
        let id = NotionId::parse(id)?;

        let page = repository.retrieve_page(&id).await?;
        let url = catalog::content_url(&page)
            .ok_or_else(|| AppError::NotFound(format!("No {} found", kind)))?;

        log::info!("Redirecting {} {} to a fresh URL", kind, id);
        ValidatedUrl::parse(&url).map_err(|e| {
            log::warn!("Unusable content URL on {}: {}", id, e);
            AppError::NotFound(format!("No {} URL found", kind))
        })
    }

    /// The page header and (a window of) its flattened block tree.
    ///
    /// Only full, complete loads are cached.
    pub async fn page_payload(
        &self,
        id: &str,
        window: PageWindow,
    ) -> Result<Arc<PagePayload>, AppError> {
        let repository = self.repository()?;
        let id = NotionId::parse(id)?;

        if window.is_full() {
            if let Some(cached) = self.pages.get(&id) {
                log::debug!("Cache hit: page {}", id);
                return Ok(cached);
            }
        }

        let page = repository.retrieve_page(&id).await?;
        let header = PageHeader::from_page(&page, catalog::show_back(&page));

        let tree = PageTreeAssembler::new(Arc::clone(repository))
            .with_deadline(self.options.request_deadline)
            .assemble(&id, &window)
            .await?;

        let stats = measure_tree(&tree.blocks);
        log::debug!(
            "Page {}: {} blocks, nesting {}, {} page references",
            id,
            stats.total_blocks,
            stats.deepest_nesting,
            stats.page_references
        );

        let cacheable = window.is_full() && tree.complete;
        let payload = PagePayload {
            page: header,
            blocks: tree.blocks,
            has_more: tree.has_more,
            next_cursor: tree.next_cursor,
            complete: tree.complete,
            timed_out: tree.timed_out,
        };

        if cacheable {
            Ok(self.pages.insert(id, payload))
        } else {
            Ok(Arc::new(payload))
        }
    }

    pub fn health(&self) -> HealthReport {
        let cached_count = |kind: RecordKind| self.listings.get(&kind).map_or(0, |list| list.len());
        HealthReport {
            status: "ok",
            token_configured: self.repository.is_some(),
            database_configured: self.database_id.is_some(),
            cached: CachedListings {
                images: cached_count(RecordKind::Image),
                files: cached_count(RecordKind::File),
                pages: cached_count(RecordKind::Page),
            },
            cached_pages: self.pages.len(),
        }
    }
}
