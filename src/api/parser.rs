// src/api/parser.rs
//! Turns Notion API responses into domain objects.
//!
//! Listings are parsed record by record: one malformed block or page is
//! logged and dropped (or passed through as unsupported), never fatal
//! for its siblings.

use super::client::ApiResponse;
use super::notion_client_adapter::{
    convert_page_properties, convert_rich_text_array, extract_page_title,
};
use super::responses::{NotionBlock, NotionRichText, ToDomain};
use super::types::PaginatedResponse;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use crate::model::{
    AudioBlock, Block, BlockCommon, FileObject, Icon, Page, Parent, UnsupportedBlock,
};
use crate::types::{BlockId, PageId, RichTextItem};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Parse any Notion API response, mapping error bodies to `AppError`.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_body(&result.data, &result.url)
    } else {
        Err(parse_error_body(&result.data, result.status, &result.url))
    }
}

fn parse_body<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: preview(body),
        }
        .into()
    })
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let head: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

/// Notion's error envelope: `{"object":"error","status":..,"code":..,"message":..}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

fn parse_error_body(body: &str, status: StatusCode, url: &str) -> AppError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => AppError::NotionService {
            code: NotionErrorCode::from_api_response(&error.code),
            message: error.message,
            status,
        },
        Err(_) => AppError::NotionService {
            code: NotionErrorCode::from_http_status(status.as_u16()),
            message: format!("HTTP {} from {}", status, url),
            status,
        },
    }
}

// --- Blocks ---

/// Parse a single-block response.
pub fn parse_block_response(result: ApiResponse<String>) -> Result<Block, AppError> {
    let raw: Value = parse_api_response(result)?;
    block_from_value(raw).ok_or_else(|| {
        AppError::MalformedResponse("Block response has no usable id".to_string())
    })
}

/// Parse one page of block children.
pub fn parse_blocks_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Block>, AppError> {
    let mut response: PaginatedResponse<Value> = parse_api_response(result)?;
    let blocks = std::mem::take(&mut response.results)
        .into_iter()
        .filter_map(block_from_value)
        .collect();
    Ok(response.with_results(blocks))
}

/// Convert one raw block object.
///
/// Types this crate can't model become `Block::Unsupported` carrying the
/// raw type tag and any plain text found under it. `None` only when the
/// block has no usable id.
pub fn block_from_value(raw: Value) -> Option<Block> {
    let block_type = raw
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    let converted = match block_type.as_str() {
        "audio" => audio_from_value(&raw),
        _ => serde_json::from_value::<NotionBlock>(raw.clone())
            .map_err(AppError::from)
            .and_then(ToDomain::to_domain),
    };

    match converted {
        Ok(Block::Unsupported(_)) => unsupported_from_value(&raw, &block_type),
        Ok(block) => Some(patch_from_raw(block, &raw)),
        Err(e) => {
            log::warn!(
                "Block of type '{}' could not be parsed ({}); passing it through as unsupported",
                block_type,
                e
            );
            unsupported_from_value(&raw, &block_type)
        }
    }
}

fn common_from_value(raw: &Value) -> Result<BlockCommon, AppError> {
    let id = raw.get("id").and_then(Value::as_str).unwrap_or_default();
    Ok(BlockCommon {
        id: BlockId::parse(id)?,
        has_children: raw
            .get("has_children")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        archived: raw.get("archived").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn audio_from_value(raw: &Value) -> Result<Block, AppError> {
    let common = common_from_value(raw)?;
    let payload = raw.get("audio").cloned().unwrap_or(Value::Null);
    let caption = caption_from_value(payload.get("caption"));
    let audio: FileObject = serde_json::from_value(payload)?;
    Ok(Block::Audio(AudioBlock {
        common,
        audio,
        caption,
    }))
}

fn unsupported_from_value(raw: &Value, block_type: &str) -> Option<Block> {
    let common = match common_from_value(raw) {
        Ok(common) => common,
        Err(e) => {
            log::warn!("Dropping block of type '{}': {}", block_type, e);
            return None;
        }
    };

    let text = raw
        .get(block_type)
        .and_then(|payload| payload.get("rich_text"))
        .and_then(Value::as_array)
        .map(|spans| {
            spans
                .iter()
                .filter_map(|span| span.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default();

    Some(Block::Unsupported(UnsupportedBlock {
        common,
        block_type: block_type.to_string(),
        text,
    }))
}

/// Rich text under `caption`, or empty when absent or unparseable.
fn caption_from_value(caption: Option<&Value>) -> Vec<RichTextItem> {
    let Some(caption) = caption else {
        return Vec::new();
    };
    serde_json::from_value::<Vec<NotionRichText>>(caption.clone())
        .map_err(AppError::from)
        .and_then(convert_rich_text_array)
        .unwrap_or_else(|e| {
            log::debug!("Ignoring unparseable caption: {}", e);
            Vec::new()
        })
}

/// Fill in the fields notion-client doesn't carry.
fn patch_from_raw(block: Block, raw: &Value) -> Block {
    match block {
        Block::Image(mut image) => {
            image.caption = caption_from_value(raw.pointer("/image/caption"));
            Block::Image(image)
        }
        Block::Video(mut video) => {
            video.caption = caption_from_value(raw.pointer("/video/caption"));
            Block::Video(video)
        }
        Block::File(mut file) => {
            file.name = raw
                .pointer("/file/name")
                .and_then(Value::as_str)
                .map(str::to_string);
            Block::File(file)
        }
        Block::Code(mut code) => {
            if let Some(language) = raw.pointer("/code/language").and_then(Value::as_str) {
                code.language = language.to_string();
            }
            Block::Code(code)
        }
        other => other,
    }
}

// --- Pages ---

/// The page fields read straight from the raw object. Nested objects stay
/// raw so one odd cover or icon doesn't sink the record.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    id: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    created_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    last_edited_time: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    cover: Option<Value>,
    #[serde(default)]
    icon: Option<Value>,
    #[serde(default)]
    parent: Option<Value>,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

/// Parse a single-page response.
pub fn parse_page_response(result: ApiResponse<String>) -> Result<Page, AppError> {
    let raw: Value = parse_api_response(result)?;
    page_from_value(raw)
}

/// Parse one page of database query results.
pub fn parse_pages_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<Page>, AppError> {
    let mut response: PaginatedResponse<Value> = parse_api_response(result)?;
    let pages = std::mem::take(&mut response.results)
        .into_iter()
        .filter_map(|raw| match page_from_value(raw) {
            Ok(page) => Some(page),
            Err(e) => {
                log::warn!("Skipping malformed database record: {}", e);
                None
            }
        })
        .collect();
    Ok(response.with_results(pages))
}

/// Convert one raw page object.
pub fn page_from_value(raw: Value) -> Result<Page, AppError> {
    let envelope: PageEnvelope = serde_json::from_value(raw)?;
    let properties = convert_page_properties(envelope.properties);

    Ok(Page {
        id: PageId::parse(&envelope.id)?,
        title: extract_page_title(&properties),
        url: envelope.url,
        created_time: envelope.created_time,
        last_edited_time: envelope.last_edited_time,
        cover: envelope.cover.and_then(lenient::<FileObject>),
        icon: envelope.icon.and_then(lenient::<Icon>),
        properties,
        parent: envelope.parent.and_then(lenient::<Parent>),
        archived: envelope.archived,
    })
}

fn lenient<T: serde::de::DeserializeOwned>(raw: Value) -> Option<T> {
    if raw.is_null() {
        return None;
    }
    serde_json::from_value(raw)
        .map_err(|e| log::debug!("Ignoring unrecognised page field: {}", e))
        .ok()
}
