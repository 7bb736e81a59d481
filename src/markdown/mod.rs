//! Markdown module for Note Print
//!
//! Turns note source into printable fragments:
//! - Front matter splitting and parsing
//! - Metadata block construction
//! - Markdown rendering into preview-shaped containers

pub mod frontmatter;
pub mod metadata;
pub mod render;

pub use metadata::metadata_block;
pub use render::{CmarkRenderer, ContentRenderer, MarkdownRenderer, RenderRequest};
