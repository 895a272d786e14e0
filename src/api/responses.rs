// src/api/responses.rs
//! Notion API object types, parsed with notion-client's serde definitions.

pub use notion_client::objects::{block::Block as NotionBlock, rich_text::RichText as NotionRichText};

/// Conversion from notion-client types into the domain model.
pub trait ToDomain<T> {
    fn to_domain(self) -> Result<T, crate::error::AppError>;
}

impl ToDomain<crate::model::Block> for NotionBlock {
    fn to_domain(self) -> Result<crate::model::Block, crate::error::AppError> {
        crate::api::notion_client_adapter::convert_block(self)
    }
}
