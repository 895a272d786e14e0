// src/server/handlers.rs
//! Route handlers. Each one delegates to `GalleryService` and shapes
//! the JSON or redirect response.

use super::error::ApiError;
use crate::api::PageWindow;
use crate::catalog::{RecordKind, RecordSummary};
use crate::service::{GalleryService, HealthReport, SuffixMatch};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

type SharedService = State<Arc<GalleryService>>;

#[derive(Debug, Default, Deserialize)]
pub struct PagesQuery {
    pub suffix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<usize>,
    pub cursor: Option<String>,
}

impl PageQuery {
    fn into_window(self) -> Result<PageWindow, ApiError> {
        if self.limit == Some(0) {
            return Err(ApiError::bad_request("limit must be at least 1"));
        }
        Ok(PageWindow {
            limit: self.limit,
            cursor: self.cursor.filter(|cursor| !cursor.is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SuffixListing<'a> {
    suffix: &'a str,
    pages: Vec<RecordSummary>,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Notion Image Bed" }))
}

pub async fn health(State(service): SharedService) -> Json<HealthReport> {
    Json(service.health())
}

pub async fn list_images(State(service): SharedService) -> Result<Response, ApiError> {
    listing(&service, RecordKind::Image).await
}

pub async fn list_files(State(service): SharedService) -> Result<Response, ApiError> {
    listing(&service, RecordKind::File).await
}

/// `/pages`, optionally narrowed to one slug with `?suffix=`.
pub async fn list_pages(
    State(service): SharedService,
    query: Result<Query<PagesQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    match query.suffix.as_deref().map(str::trim) {
        Some(suffix) if !suffix.is_empty() => {
            let pages = service.pages_with_suffix(suffix).await?;
            Ok(records_response(RecordKind::Page, &pages))
        }
        _ => listing(&service, RecordKind::Page).await,
    }
}

pub async fn image_redirect(
    State(service): SharedService,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    content_redirect(&service, RecordKind::Image, &id).await
}

pub async fn file_redirect(
    State(service): SharedService,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    content_redirect(&service, RecordKind::File, &id).await
}

pub async fn page(
    State(service): SharedService,
    Path(id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query?;
    let payload = service.page_payload(&id, query.into_window()?).await?;
    Ok(Json(payload.as_ref()).into_response())
}

/// A slug shared by several pages lists them instead of redirecting.
pub async fn resolve_suffix(
    State(service): SharedService,
    Path(suffix): Path<String>,
) -> Result<Response, ApiError> {
    match service.resolve_suffix(&suffix).await? {
        SuffixMatch::Unique(page) => Ok(redirect(format!("/page/{}", page.id))),
        SuffixMatch::Ambiguous(pages) => Ok(Json(SuffixListing {
            suffix: &suffix,
            pages,
        })
        .into_response()),
    }
}

async fn listing(service: &GalleryService, kind: RecordKind) -> Result<Response, ApiError> {
    let records = service.list(kind).await?;
    Ok(records_response(kind, &records))
}

fn records_response(kind: RecordKind, records: &[RecordSummary]) -> Response {
    Json(BTreeMap::from([(kind.plural(), records)])).into_response()
}

async fn content_redirect(
    service: &GalleryService,
    kind: RecordKind,
    id: &str,
) -> Result<Response, ApiError> {
    let url = service.content_url(kind, id).await?;
    Ok(redirect(url.to_string()))
}

fn redirect(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
