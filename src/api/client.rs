// src/api/client.rs
//! Pure HTTP client wrapper for Notion API.
//!
//! This module provides a thin wrapper around reqwest for making
//! HTTP requests to the Notion API. It handles authentication and
//! basic request/response operations without parsing or business logic.

use super::parser;
use super::types::PaginatedResponse;
use crate::constants::{
    UPSTREAM_CALL_TIMEOUT, UPSTREAM_INITIAL_BACKOFF, UPSTREAM_MAX_ATTEMPTS, UPSTREAM_MAX_BACKOFF,
};
use crate::error::AppError;
use crate::error_recovery::retry_with_backoff;
use crate::model::{Block, Page};
use crate::types::{ApiKey, NotionId};
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::Value;

const NOTION_VERSION: &str = "2022-06-28";
const API_BASE_URL: &str = "https://api.notion.com/v1";

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .timeout(UPSTREAM_CALL_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    /// Makes a GET request to the specified endpoint (path without base URL).
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        log::debug!("GET {} -> {}", endpoint, response.status());

        Ok(response)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", API_BASE_URL, endpoint);
        log::debug!("POST {}", url);

        let response = self.client.post(url).json(body).send().await?;
        log::debug!("POST {} -> {}", endpoint, response.status());

        Ok(response)
    }

    /// GET with retries, returning the body alongside its status.
    async fn get_text(&self, endpoint: &str) -> Result<ApiResponse<String>, AppError> {
        retry_with_backoff(
            move || async move {
                let response = self.get(endpoint).await?;
                let result = extract_response_text(response).await?;
                fail_retryable_status(result)
            },
            UPSTREAM_MAX_ATTEMPTS,
            UPSTREAM_INITIAL_BACKOFF,
            UPSTREAM_MAX_BACKOFF,
        )
        .await
    }

    /// POST with retries, returning the body alongside its status.
    async fn post_text(&self, endpoint: &str, body: &Value) -> Result<ApiResponse<String>, AppError> {
        retry_with_backoff(
            move || async move {
                let response = self.post(endpoint, body).await?;
                let result = extract_response_text(response).await?;
                fail_retryable_status(result)
            },
            UPSTREAM_MAX_ATTEMPTS,
            UPSTREAM_INITIAL_BACKOFF,
            UPSTREAM_MAX_BACKOFF,
        )
        .await
    }
}

/// Turns rate-limit and unavailable responses into errors so the retry
/// loop sees them; every other status is left for the parser.
fn fail_retryable_status(result: ApiResponse<String>) -> Result<ApiResponse<String>, AppError> {
    if result.status.is_success() {
        return Ok(result);
    }
    match parser::parse_api_response::<Value>(ApiResponse {
        data: result.data.clone(),
        status: result.status,
        url: result.url.clone(),
    }) {
        Err(e) if e.is_retryable() => Err(e),
        _ => Ok(result),
    }
}

fn children_endpoint(parent: &NotionId, cursor: Option<&str>, page_size: usize) -> String {
    let mut endpoint = format!(
        "blocks/{}/children?page_size={}",
        parent.to_hyphenated(),
        page_size
    );
    if let Some(cursor) = cursor {
        let encoded: String = url::form_urlencoded::byte_serialize(cursor.as_bytes()).collect();
        endpoint.push_str("&start_cursor=");
        endpoint.push_str(&encoded);
    }
    endpoint
}

fn query_body(filter: Option<&Value>, cursor: Option<&str>, page_size: usize) -> Value {
    let mut query = serde_json::json!({ "page_size": page_size });
    if let Some(cursor) = cursor {
        query["start_cursor"] = serde_json::json!(cursor);
    }
    if let Some(filter) = filter {
        query["filter"] = filter.clone();
    }
    query
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &NotionId) -> Result<Page, AppError> {
        let endpoint = format!("pages/{}", id.to_hyphenated());
        let result = self.get_text(&endpoint).await?;
        parser::parse_page_response(result)
    }

    async fn retrieve_block(&self, id: &NotionId) -> Result<Block, AppError> {
        let endpoint = format!("blocks/{}", id.to_hyphenated());
        let result = self.get_text(&endpoint).await?;
        parser::parse_block_response(result)
    }

    async fn retrieve_children_batch(
        &self,
        parent: &NotionId,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Block>, AppError> {
        let endpoint = children_endpoint(parent, cursor, page_size);
        let result = self.get_text(&endpoint).await?;
        parser::parse_blocks_pagination(result)
    }

    async fn query_database_batch(
        &self,
        database: &NotionId,
        filter: Option<&Value>,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<PaginatedResponse<Page>, AppError> {
        let endpoint = format!("databases/{}/query", database.to_hyphenated());
        let body = query_body(filter, cursor, page_size);
        let result = self.post_text(&endpoint, &body).await?;
        parser::parse_pages_pagination(result)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_children_endpoint_carries_pagination() {
        let id = NotionId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(
            children_endpoint(&id, None, 100),
            "blocks/550e8400-e29b-41d4-a716-446655440000/children?page_size=100"
        );
        assert_eq!(
            children_endpoint(&id, Some("a b"), 10),
            "blocks/550e8400-e29b-41d4-a716-446655440000/children?page_size=10&start_cursor=a+b"
        );
    }

    #[test]
    fn test_query_body_includes_filter_and_cursor() {
        let filter = serde_json::json!({"property": "type", "rich_text": {"equals": "image"}});
        let body = query_body(Some(&filter), Some("next"), 100);
        assert_eq!(body["page_size"], 100);
        assert_eq!(body["start_cursor"], "next");
        assert_eq!(body["filter"], filter);

        let bare = query_body(None, None, 50);
        assert!(bare.get("filter").is_none());
        assert!(bare.get("start_cursor").is_none());
    }

    #[test]
    fn test_retryable_status_becomes_error() {
        let throttled = ApiResponse {
            data: r#"{"object":"error","status":429,"code":"rate_limited","message":"slow"}"#
                .to_string(),
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: "u".to_string(),
        };
        assert!(fail_retryable_status(throttled).is_err());

        let missing = ApiResponse {
            data: r#"{"object":"error","status":404,"code":"object_not_found","message":"x"}"#
                .to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
            url: "u".to_string(),
        };
        assert!(fail_retryable_status(missing).is_ok());
    }
}
