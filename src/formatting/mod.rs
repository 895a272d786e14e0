// src/formatting/mod.rs
//! Turns Notion blocks and rich text into the JSON records served to clients.

pub mod block_transformer;
pub mod records;
pub mod rich_text;

pub use block_transformer::{transform_block, NestedContent, Transformed};
pub use records::{BlockRecord, PageHeader, PagePayload};
pub use rich_text::{rich_text_to_html, rich_text_to_plain};
